//! Console commands typed at the fleet prompt.

use anyhow::{anyhow, bail, Result};
use shared::domain::{Role, WalletAddress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    List,
    Rent { owner: WalletAddress },
    Withdraw { owner: WalletAddress },
    Delete { owner: WalletAddress },
    OpenFeeEditor,
    FeeInput { value: String },
    SaveFee,
    CancelFee,
    Return { owner: WalletAddress },
    SwitchSession { role: Role, wallet: WalletAddress },
    Help,
    Quit,
}

impl ConsoleCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ConsoleCommand::List => "list",
            ConsoleCommand::Rent { .. } => "rent",
            ConsoleCommand::Withdraw { .. } => "withdraw",
            ConsoleCommand::Delete { .. } => "delete",
            ConsoleCommand::OpenFeeEditor => "fee_open",
            ConsoleCommand::FeeInput { .. } => "fee_input",
            ConsoleCommand::SaveFee => "fee_save",
            ConsoleCommand::CancelFee => "fee_cancel",
            ConsoleCommand::Return { .. } => "return",
            ConsoleCommand::SwitchSession { .. } => "as",
            ConsoleCommand::Help => "help",
            ConsoleCommand::Quit => "quit",
        }
    }
}

pub const HELP: &str = "\
commands:
  list                      show the fleet for the current role
  rent <owner>              rent the owner's car for the quoted term
  withdraw <owner>          pay out the owner's available balance
  delete <owner>            remove the owner's car (admin)
  fee open|cancel|save      open, cancel or submit the admin fee form
  fee input <value>         type a value into the admin fee form
  return <owner>            return the car you rented from <owner>
  as <role> <wallet>        switch role and wallet
  help                      show this help
  quit                      leave the console";

fn owner_arg(parts: &[&str], command: &str) -> Result<WalletAddress> {
    match parts {
        [owner] => Ok(WalletAddress::new(*owner)),
        _ => bail!("usage: {command} <owner>"),
    }
}

pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((head, rest)) = parts.split_first() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "list" | "ls" => ConsoleCommand::List,
        "rent" => ConsoleCommand::Rent {
            owner: owner_arg(rest, "rent")?,
        },
        "withdraw" => ConsoleCommand::Withdraw {
            owner: owner_arg(rest, "withdraw")?,
        },
        "delete" => ConsoleCommand::Delete {
            owner: owner_arg(rest, "delete")?,
        },
        "return" => ConsoleCommand::Return {
            owner: owner_arg(rest, "return")?,
        },
        "fee" => match rest {
            ["open"] => ConsoleCommand::OpenFeeEditor,
            ["cancel"] => ConsoleCommand::CancelFee,
            ["save"] => ConsoleCommand::SaveFee,
            ["input", value] => ConsoleCommand::FeeInput {
                value: value.to_string(),
            },
            _ => bail!("usage: fee open|cancel|save or fee input <value>"),
        },
        "as" => match rest {
            [role, wallet] => ConsoleCommand::SwitchSession {
                role: role.parse().map_err(|err: String| anyhow!(err))?,
                wallet: WalletAddress::new(*wallet),
            },
            _ => bail!("usage: as <role> <wallet>"),
        },
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(command))
}
