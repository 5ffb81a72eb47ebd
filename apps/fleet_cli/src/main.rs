use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sandbox_ledger::SandboxLedger;
use shared::domain::{Role, Session, WalletAddress};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

mod commands;
mod config;
mod console;
mod render;

use commands::parse_command;
use config::{load_fleet, load_settings};
use console::FleetConsole;

#[derive(Parser, Debug)]
#[command(about = "Role-aware console for the rent-a-car fleet")]
struct Args {
    /// Connected wallet address; empty means disconnected.
    #[arg(long)]
    wallet: Option<String>,
    #[arg(long)]
    role: Option<Role>,
    #[arg(long)]
    fleet_file: Option<String>,
    /// Address the sandbox contract treats as admin.
    #[arg(long)]
    admin: Option<String>,
    #[arg(long)]
    no_color: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Print the listing once and exit.
    List,
    /// Interactive console (default).
    Console,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(wallet) = args.wallet {
        settings.wallet_address = wallet;
    }
    if let Some(role) = args.role {
        settings.role = role;
    }
    if let Some(fleet_file) = args.fleet_file {
        settings.fleet_file = fleet_file;
    }
    if let Some(admin) = args.admin {
        settings.admin_address = admin;
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let cars = load_fleet(Path::new(&settings.fleet_file))?;
    let ledger = SandboxLedger::new(WalletAddress::new(settings.admin_address.clone()));
    let session = Session::new(settings.wallet_address.clone(), settings.role);
    let mut console = FleetConsole::start(ledger, cars, session, !args.no_color)
        .await
        .context("failed to start fleet console")?;

    if args.command == Some(Command::List) {
        print!("{}", console.render().await);
        return Ok(());
    }

    println!("{}", console.render().await);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", console.prompt());
        std::io::stdout().flush().context("failed to flush prompt")?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let name = command.name();
        match console.handle(command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                warn!(command = name, "console: command failed: {err:#}");
                println!("error: {err:#}");
            }
        }
    }
    Ok(())
}
