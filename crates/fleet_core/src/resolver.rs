//! Role-conditioned action resolution for fleet listing rows.
//!
//! Everything here is pure: the same inputs always produce the same
//! descriptor, and nothing touches fleet state or the network.

use std::fmt;

use shared::domain::{Car, CarStatus, Role, RENTAL_TERM_DAYS, STROOP_SCALE};

use crate::fleet_state::FleetSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Delete,
    SetFee,
    Withdraw,
    Rent,
    None,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Delete => "delete",
            ActionKind::SetFee => "set_fee",
            ActionKind::Withdraw => "withdraw",
            ActionKind::Rent => "rent",
            ActionKind::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    CarNotReturned,
    NoFundsAvailable,
}

impl DisabledReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DisabledReason::CarNotReturned => "car not returned",
            DisabledReason::NoFundsAvailable => "no funds available",
        }
    }
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price breakdown shown to a renter before renting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentQuote {
    pub deposit: i128,
    pub admin_fee: i128,
    pub total: i128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub kind: ActionKind,
    pub label: String,
    pub amount: Option<i128>,
    pub quote: Option<RentQuote>,
    pub enabled: bool,
    pub disabled_reason: Option<DisabledReason>,
}

impl ActionDescriptor {
    fn enabled(kind: ActionKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            amount: None,
            quote: None,
            enabled: true,
            disabled_reason: None,
        }
    }

    pub fn none() -> Self {
        Self {
            kind: ActionKind::None,
            label: String::new(),
            amount: None,
            quote: None,
            enabled: false,
            disabled_reason: None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.kind != ActionKind::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub car: Car,
    pub action: ActionDescriptor,
}

/// Quote for the fixed rental term. Saturates instead of overflowing so the
/// listing can always render; the executor re-checks the amount it submits.
pub fn rent_quote(price_per_day: i128, admin_fee: i128) -> RentQuote {
    let deposit = price_per_day
        .saturating_mul(i128::from(RENTAL_TERM_DAYS))
        .saturating_mul(STROOP_SCALE);
    RentQuote {
        deposit,
        admin_fee,
        total: deposit.saturating_add(admin_fee),
    }
}

/// Resolves the single primary action for one listing row.
pub fn resolve_row_action(
    role: Role,
    car: &Car,
    owner_balance: i128,
    admin_fee: i128,
) -> ActionDescriptor {
    match role {
        Role::Admin => ActionDescriptor::enabled(ActionKind::Delete, "Delete"),
        Role::Owner => {
            let disabled_reason = if car.status != CarStatus::Available {
                Some(DisabledReason::CarNotReturned)
            } else if owner_balance <= 0 {
                Some(DisabledReason::NoFundsAvailable)
            } else {
                None
            };
            ActionDescriptor {
                kind: ActionKind::Withdraw,
                label: "Withdraw".to_string(),
                amount: Some(owner_balance),
                quote: None,
                enabled: disabled_reason.is_none(),
                disabled_reason,
            }
        }
        Role::Renter if car.status == CarStatus::Available => {
            let quote = rent_quote(car.price_per_day, admin_fee);
            ActionDescriptor {
                kind: ActionKind::Rent,
                label: format!("Rent ({})", quote.total),
                amount: Some(quote.total),
                quote: Some(quote),
                enabled: true,
                disabled_reason: None,
            }
        }
        Role::Renter | Role::Anonymous => ActionDescriptor::none(),
    }
}

/// Page-level control that is independent of any row.
pub fn resolve_page_action(role: Role) -> ActionDescriptor {
    match role {
        Role::Admin => ActionDescriptor::enabled(ActionKind::SetFee, "Set Fee"),
        _ => ActionDescriptor::none(),
    }
}

pub fn resolve_listing(snapshot: &FleetSnapshot, role: Role) -> Vec<ListingRow> {
    snapshot
        .cars
        .iter()
        .map(|car| ListingRow {
            action: resolve_row_action(
                role,
                car,
                snapshot.balance_for(&car.owner_address),
                snapshot.admin_fee,
            ),
            car: car.clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
