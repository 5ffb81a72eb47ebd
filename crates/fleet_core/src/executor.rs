use std::sync::Arc;

use shared::{
    domain::{Car, WalletAddress, STROOP_SCALE},
    protocol::{ContractCall, TxHash},
};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    error::ExecutorError, fleet_state::FleetState, resolver::ActionKind, Collaborators,
    FleetEvent,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Delete {
        owner: WalletAddress,
    },
    SetAdminFee {
        fee: i128,
    },
    Payout {
        owner: WalletAddress,
        amount: i128,
    },
    Rent {
        car: Car,
        renter: WalletAddress,
        days: u32,
    },
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::Delete { .. } => ActionKind::Delete,
            ActionRequest::SetAdminFee { .. } => ActionKind::SetFee,
            ActionRequest::Payout { .. } => ActionKind::Withdraw,
            ActionRequest::Rent { .. } => ActionKind::Rent,
        }
    }
}

/// Runs write actions for one wallet and reconciles fleet state once the
/// ledger has accepted them. Nothing is reconciled for a failed action.
pub struct ActionExecutor {
    wallet: WalletAddress,
    collaborators: Collaborators,
    state: Arc<FleetState>,
    events: broadcast::Sender<FleetEvent>,
}

impl ActionExecutor {
    pub fn new(
        wallet: WalletAddress,
        collaborators: Collaborators,
        state: Arc<FleetState>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            wallet,
            collaborators,
            state,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FleetEvent> {
        self.events.subscribe()
    }

    pub async fn delete(&self, owner: &WalletAddress) -> Result<TxHash, ExecutorError> {
        let call = ContractCall::RemoveCar {
            owner: owner.clone(),
        };
        let hash = self.run(ActionKind::Delete, &call).await?;

        self.state.remove_car(owner).await;
        self.confirm(ActionKind::Delete, hash).await
    }

    /// Stores `fee` as given; no stroop scaling on this path.
    pub async fn set_admin_fee(&self, fee: i128) -> Result<TxHash, ExecutorError> {
        let call = ContractCall::SetAdminFee { fee };
        let hash = self.run(ActionKind::SetFee, &call).await?;

        self.state.apply_admin_fee(fee).await;
        self.confirm(ActionKind::SetFee, hash).await
    }

    /// Submits the value typed into the fee editor.
    pub async fn save_admin_fee(&self) -> Result<TxHash, ExecutorError> {
        let fee = match self.state.fee_editor().await.parse() {
            Ok(fee) => fee,
            Err(err) => return Err(self.report_failure(ActionKind::SetFee, err)),
        };
        self.set_admin_fee(fee).await
    }

    /// Leaves the local balance as is; the next refresh corrects it.
    pub async fn payout(
        &self,
        owner: &WalletAddress,
        amount: i128,
    ) -> Result<TxHash, ExecutorError> {
        let call = ContractCall::PayoutOwner {
            owner: owner.clone(),
            amount,
        };
        let hash = self.run(ActionKind::Withdraw, &call).await?;

        self.state.invalidate_balances().await;
        self.confirm(ActionKind::Withdraw, hash).await
    }

    pub async fn rent(
        &self,
        car: &Car,
        renter: &WalletAddress,
        days: u32,
    ) -> Result<TxHash, ExecutorError> {
        let Some(amount) = rental_amount(car.price_per_day, days) else {
            let err = ExecutorError::AmountOverflow("rental amount");
            return Err(self.report_failure(ActionKind::Rent, err));
        };
        let call = ContractCall::Rental {
            renter: renter.clone(),
            owner: car.owner_address.clone(),
            total_days_to_rent: days,
            amount,
        };
        let hash = self.run(ActionKind::Rent, &call).await?;

        self.state.mark_rented(&car.owner_address).await;
        self.state.invalidate_balances().await;
        self.confirm(ActionKind::Rent, hash).await
    }

    pub async fn execute(&self, request: ActionRequest) -> Result<TxHash, ExecutorError> {
        match request {
            ActionRequest::Delete { owner } => self.delete(&owner).await,
            ActionRequest::SetAdminFee { fee } => self.set_admin_fee(fee).await,
            ActionRequest::Payout { owner, amount } => self.payout(&owner, amount).await,
            ActionRequest::Rent { car, renter, days } => self.rent(&car, &renter, days).await,
        }
    }

    /// Runs `request` as a background task. The handle resolves to the same
    /// result `execute` would return.
    pub fn dispatch(
        self: &Arc<Self>,
        request: ActionRequest,
    ) -> JoinHandle<Result<TxHash, ExecutorError>> {
        let executor = Arc::clone(self);
        tokio::spawn(async move { executor.execute(request).await })
    }

    async fn run(&self, action: ActionKind, call: &ContractCall) -> Result<TxHash, ExecutorError> {
        info!(
            wallet = %self.wallet,
            action = action.as_str(),
            method = call.method_name(),
            "fleet: submitting contract call"
        );
        self.sign_and_submit(call)
            .await
            .map_err(|err| self.report_failure(action, err))
    }

    async fn sign_and_submit(&self, call: &ContractCall) -> Result<TxHash, ExecutorError> {
        let method = call.method_name();
        let client = self
            .collaborators
            .clients
            .build_client(&self.wallet)
            .await
            .map_err(|source| ExecutorError::Client {
                wallet: self.wallet.clone(),
                source,
            })?;

        let envelope = match call {
            ContractCall::SetAdminFee { fee } => client.set_admin_fee(*fee).await,
            ContractCall::RemoveCar { owner } => client.remove_car(owner).await,
            ContractCall::PayoutOwner { owner, amount } => {
                client.payout_owner(owner, *amount).await
            }
            ContractCall::Rental {
                renter,
                owner,
                total_days_to_rent,
                amount,
            } => {
                client
                    .rental(renter, owner, *total_days_to_rent, *amount)
                    .await
            }
        }
        .map_err(|source| ExecutorError::Invoke { method, source })?;

        let signed = self
            .collaborators
            .signer
            .sign_transaction(&envelope)
            .await
            .map_err(|source| ExecutorError::Sign { method, source })?;

        self.collaborators
            .submitter
            .submit_transaction(&signed)
            .await
            .map_err(|source| ExecutorError::Submit { method, source })
    }

    async fn confirm(&self, action: ActionKind, hash: TxHash) -> Result<TxHash, ExecutorError> {
        self.state.record_tx_hash(hash.clone()).await;
        info!(
            wallet = %self.wallet,
            action = action.as_str(),
            tx_hash = %hash,
            "fleet: transaction confirmed"
        );
        let _ = self.events.send(FleetEvent::TransactionConfirmed {
            action,
            hash: hash.clone(),
        });
        Ok(hash)
    }

    fn report_failure(&self, action: ActionKind, err: ExecutorError) -> ExecutorError {
        warn!(
            wallet = %self.wallet,
            action = action.as_str(),
            stage = err.stage(),
            "fleet: action failed: {err}"
        );
        let _ = self.events.send(FleetEvent::ActionFailed {
            action,
            message: err.to_string(),
        });
        err
    }
}

/// Stroop amount for renting at `price_per_day` for `days`.
pub fn rental_amount(price_per_day: i128, days: u32) -> Option<i128> {
    price_per_day
        .checked_mul(i128::from(days))?
        .checked_mul(STROOP_SCALE)
}

#[cfg(test)]
#[path = "tests/executor_tests.rs"]
mod tests;
