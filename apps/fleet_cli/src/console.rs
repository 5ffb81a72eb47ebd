use std::sync::Arc;

use anyhow::{bail, Context, Result};
use fleet_core::{
    refresh_admin_fee, refresh_balances, resolve_listing, resolve_page_action,
    resolve_row_action, ActionDescriptor, ActionExecutor, ActionKind, Collaborators, FleetState,
};
use sandbox_ledger::SandboxLedger;
use shared::{
    domain::{Car, Role, Session, WalletAddress, RENTAL_TERM_DAYS},
    format::shorten_address,
    protocol::TxHash,
};
use tracing::{info, warn};

use crate::{
    commands::{ConsoleCommand, HELP},
    render::{render_footer, render_table},
};

/// A disconnected session has no wallet to sign with, so every write fails
/// at the client stage.
fn collaborators_for(ledger: &SandboxLedger, wallet: &WalletAddress) -> Collaborators {
    if wallet.as_str().is_empty() {
        Collaborators::unavailable()
    } else {
        ledger.collaborators_for(wallet)
    }
}

/// One interactive session against the sandbox ledger.
pub struct FleetConsole {
    ledger: SandboxLedger,
    state: Arc<FleetState>,
    session: Session,
    executor: Arc<ActionExecutor>,
    color: bool,
}

impl FleetConsole {
    /// Seeds the ledger with `cars` and loads balances and fee for `session`.
    pub async fn start(
        ledger: SandboxLedger,
        cars: Vec<Car>,
        session: Session,
        color: bool,
    ) -> Result<Self> {
        for car in &cars {
            ledger
                .add_car(car.owner_address.clone(), car.price_per_day)
                .await
                .with_context(|| format!("failed to register car of {}", car.owner_address))?;
        }
        info!(cars = cars.len(), "console: fleet seeded");

        let state = Arc::new(FleetState::new(cars));
        let executor = ActionExecutor::new(
            session.wallet.clone(),
            collaborators_for(&ledger, &session.wallet),
            Arc::clone(&state),
        );
        let console = Self {
            ledger,
            state,
            session,
            executor,
            color,
        };
        tokio::join!(console.refresh_fee(), console.refresh_balances());
        Ok(console)
    }

    pub fn prompt(&self) -> String {
        let wallet = if self.session.wallet.as_str().is_empty() {
            "-".to_string()
        } else {
            shorten_address(self.session.wallet.as_str())
        };
        format!("{}@{wallet}> ", self.session.role)
    }

    pub async fn render(&self) -> String {
        let snapshot = self.state.snapshot().await;
        let rows = resolve_listing(&snapshot, self.session.role);
        let mut out = render_table(&rows, self.color);
        out.push_str(&render_footer(
            &snapshot,
            &resolve_page_action(self.session.role),
        ));
        let editor = &snapshot.fee_editor;
        if editor.is_open() {
            out.push_str(&format!("Fee form open, input: '{}'\n", editor.input()));
        }
        out
    }

    /// Runs one command. Returns `false` once the console should exit.
    pub async fn handle(&mut self, command: ConsoleCommand) -> Result<bool> {
        match command {
            ConsoleCommand::List => println!("{}", self.render().await),
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => return Ok(false),
            ConsoleCommand::Rent { owner } => {
                let car = self.car_of(&owner).await?;
                self.require_row_action(&car, ActionKind::Rent).await?;
                let hash = self
                    .executor
                    .rent(&car, &self.session.wallet, RENTAL_TERM_DAYS)
                    .await?;
                self.report(&hash);
                self.refresh_balances().await;
            }
            ConsoleCommand::Withdraw { owner } => {
                let car = self.car_of(&owner).await?;
                let action = self.require_row_action(&car, ActionKind::Withdraw).await?;
                let amount = action.amount.unwrap_or_default();
                let hash = self.executor.payout(&owner, amount).await?;
                self.report(&hash);
            }
            ConsoleCommand::Delete { owner } => {
                let car = self.car_of(&owner).await?;
                self.require_row_action(&car, ActionKind::Delete).await?;
                let hash = self.executor.delete(&owner).await?;
                self.report(&hash);
                self.refresh_balances().await;
            }
            ConsoleCommand::OpenFeeEditor => {
                self.require_fee_control()?;
                self.state.open_fee_editor().await;
            }
            ConsoleCommand::FeeInput { value } => {
                self.require_open_fee_editor().await?;
                self.state.set_fee_input(value).await;
            }
            ConsoleCommand::CancelFee => {
                self.require_open_fee_editor().await?;
                self.state.close_fee_editor().await;
            }
            ConsoleCommand::SaveFee => {
                self.require_open_fee_editor().await?;
                let hash = self.executor.save_admin_fee().await?;
                self.report(&hash);
            }
            ConsoleCommand::Return { owner } => {
                self.ledger
                    .return_car(&self.session.wallet, &owner)
                    .await
                    .context("return rejected")?;
                self.sync_car_status(&owner).await;
                println!("Car of {} returned", shorten_address(owner.as_str()));
                self.refresh_balances().await;
            }
            ConsoleCommand::SwitchSession { role, wallet } => {
                self.switch_session(role, wallet).await;
                println!("{}", self.render().await);
            }
        }
        Ok(true)
    }

    /// Balances follow role and wallet; the fee follows the wallet only.
    async fn switch_session(&mut self, role: Role, wallet: WalletAddress) {
        let wallet_changed = wallet != self.session.wallet;
        let role_changed = role != self.session.role;
        self.session = Session::new(wallet, role);
        info!(role = %role, wallet = %self.session.wallet, "console: session switched");

        if wallet_changed {
            self.executor = ActionExecutor::new(
                self.session.wallet.clone(),
                collaborators_for(&self.ledger, &self.session.wallet),
                Arc::clone(&self.state),
            );
            self.state.close_fee_editor().await;
            tokio::join!(self.refresh_fee(), self.refresh_balances());
        } else if role_changed {
            self.refresh_balances().await;
        }
    }

    async fn refresh_balances(&self) {
        refresh_balances(&self.state, &self.ledger, &self.session).await;
    }

    async fn refresh_fee(&self) {
        refresh_admin_fee(&self.state, &self.ledger, &self.session.wallet).await;
    }

    async fn sync_car_status(&self, owner: &WalletAddress) {
        let Some(status) = self.ledger.car_status(owner).await else {
            warn!(owner = %owner, "console: car missing on ledger");
            return;
        };
        let mut cars = self.state.cars().await;
        for car in cars.iter_mut().filter(|car| &car.owner_address == owner) {
            car.status = status;
        }
        self.state.replace_cars(cars).await;
    }

    async fn car_of(&self, owner: &WalletAddress) -> Result<Car> {
        let cars = self.state.cars().await;
        match cars.into_iter().find(|car| &car.owner_address == owner) {
            Some(car) => Ok(car),
            None => bail!("no listed car belongs to {owner}"),
        }
    }

    async fn require_row_action(&self, car: &Car, kind: ActionKind) -> Result<ActionDescriptor> {
        let snapshot = self.state.snapshot().await;
        let action = resolve_row_action(
            self.session.role,
            car,
            snapshot.balance_for(&car.owner_address),
            snapshot.admin_fee,
        );
        if action.kind != kind {
            bail!(
                "{} is not available to {} on this car",
                kind.as_str(),
                self.session.role
            );
        }
        if let Some(reason) = action.disabled_reason {
            bail!("{} disabled: {reason}", action.label);
        }
        Ok(action)
    }

    fn require_fee_control(&self) -> Result<()> {
        if resolve_page_action(self.session.role).kind != ActionKind::SetFee {
            bail!("the fee form is only available to the admin");
        }
        Ok(())
    }

    async fn require_open_fee_editor(&self) -> Result<()> {
        self.require_fee_control()?;
        if !self.state.fee_editor().await.is_open() {
            bail!("the fee form is closed (try 'fee open')");
        }
        Ok(())
    }

    fn report(&self, hash: &TxHash) {
        println!("Transaction confirmed: {hash}");
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
