//! Plain-text rendering of the fleet listing.

use fleet_core::{ActionDescriptor, ActionKind, FleetSnapshot, ListingRow};
use shared::{
    domain::{CarStatus, StatusTone},
    format::shorten_address,
};

const HEADERS: [&str; 9] = [
    "Brand",
    "Model",
    "Color",
    "Passengers",
    "A/C",
    "Owner",
    "Price/Day",
    "Status",
    "Actions",
];

pub fn action_cell(action: &ActionDescriptor) -> String {
    let button = if action.enabled {
        format!("[{}]", action.label)
    } else {
        match action.disabled_reason {
            Some(reason) => format!("[{} - {reason}]", action.label),
            None => format!("[{}]", action.label),
        }
    };

    match action.kind {
        ActionKind::None => String::new(),
        ActionKind::Delete | ActionKind::SetFee => button,
        ActionKind::Withdraw => {
            format!("Available: {} {button}", action.amount.unwrap_or_default())
        }
        ActionKind::Rent => match action.quote {
            Some(quote) => format!(
                "Deposit: {} | Fee: {} | Total: {} {button}",
                quote.deposit, quote.admin_fee, quote.total
            ),
            None => button,
        },
    }
}

fn status_cell(status: CarStatus, color: bool) -> String {
    if !color {
        return status.to_string();
    }
    let code = match status.tone() {
        StatusTone::Positive => "32",
        StatusTone::Info => "34",
        StatusTone::Warning => "33",
        StatusTone::Neutral => "90",
    };
    format!("\x1b[{code}m{status}\x1b[0m")
}

fn row_cells(row: &ListingRow, color: bool) -> [String; 9] {
    let car = &row.car;
    [
        car.brand.clone(),
        car.model.clone(),
        car.color.clone(),
        car.passengers.to_string(),
        if car.ac { "Yes" } else { "No" }.to_string(),
        shorten_address(car.owner_address.as_str()),
        format!("${}", car.price_per_day),
        status_cell(car.status, color),
        action_cell(&row.action),
    ]
}

fn visible_width(cell: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for ch in cell.chars() {
        match ch {
            '\x1b' => in_escape = true,
            'm' if in_escape => in_escape = false,
            _ if in_escape => {}
            _ => width += 1,
        }
    }
    width
}

pub fn render_table(rows: &[ListingRow], color: bool) -> String {
    let body: Vec<[String; 9]> = rows.iter().map(|row| row_cells(row, color)).collect();

    let mut widths = HEADERS.map(str::len);
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells.iter()) {
            *width = (*width).max(visible_width(cell));
        }
    }

    let mut out = String::new();
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| {
                let pad = width.saturating_sub(visible_width(cell));
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    out.push_str(&line(headers.as_slice()));
    out.push('\n');
    for cells in &body {
        out.push_str(&line(cells.as_slice()));
        out.push('\n');
    }
    if body.is_empty() {
        out.push_str("(no cars listed)\n");
    }
    out
}

pub fn render_footer(snapshot: &FleetSnapshot, page_action: &ActionDescriptor) -> String {
    let mut out = String::new();
    if page_action.is_rendered() {
        out.push_str(&format!(
            "{} (current fee: {})\n",
            action_cell(page_action),
            snapshot.admin_fee
        ));
    }
    if let Some(hash) = &snapshot.last_tx_hash {
        out.push_str(&format!("Last transaction: {hash}\n"));
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
