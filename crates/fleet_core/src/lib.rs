use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::WalletAddress,
    protocol::{Envelope, SignedEnvelope, TxHash},
};

pub mod error;
pub mod executor;
pub mod fee_editor;
pub mod fleet_state;
pub mod resolver;

pub use error::ExecutorError;
pub use executor::{ActionExecutor, ActionRequest};
pub use fee_editor::FeeEditor;
pub use fleet_state::{refresh_admin_fee, refresh_balances, FleetSnapshot, FleetState};
pub use resolver::{
    resolve_listing, resolve_page_action, resolve_row_action, ActionDescriptor, ActionKind,
    DisabledReason, ListingRow, RentQuote,
};

/// Contract client bound to the wallet it was built for.
#[async_trait]
pub trait ContractClient: Send + Sync {
    async fn get_owner_balance(&self, owner: &WalletAddress) -> Result<i128>;
    async fn get_admin_fee(&self) -> Result<i128>;
    async fn set_admin_fee(&self, fee: i128) -> Result<Envelope>;
    async fn remove_car(&self, owner: &WalletAddress) -> Result<Envelope>;
    async fn payout_owner(&self, owner: &WalletAddress, amount: i128) -> Result<Envelope>;
    async fn rental(
        &self,
        renter: &WalletAddress,
        owner: &WalletAddress,
        total_days_to_rent: u32,
        amount: i128,
    ) -> Result<Envelope>;
}

#[async_trait]
pub trait ContractClientProvider: Send + Sync {
    async fn build_client(&self, wallet: &WalletAddress) -> Result<Arc<dyn ContractClient>>;
}

#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn sign_transaction(&self, envelope: &Envelope) -> Result<SignedEnvelope>;
}

#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    async fn submit_transaction(&self, signed: &SignedEnvelope) -> Result<TxHash>;
}

pub struct MissingContractClientProvider;

#[async_trait]
impl ContractClientProvider for MissingContractClientProvider {
    async fn build_client(&self, wallet: &WalletAddress) -> Result<Arc<dyn ContractClient>> {
        Err(anyhow!("contract gateway unavailable for wallet {wallet}"))
    }
}

pub struct MissingWalletSigner;

#[async_trait]
impl WalletSigner for MissingWalletSigner {
    async fn sign_transaction(&self, envelope: &Envelope) -> Result<SignedEnvelope> {
        Err(anyhow!(
            "wallet signer unavailable for source {}",
            envelope.source
        ))
    }
}

pub struct MissingLedgerSubmitter;

#[async_trait]
impl LedgerSubmitter for MissingLedgerSubmitter {
    async fn submit_transaction(&self, _signed: &SignedEnvelope) -> Result<TxHash> {
        Err(anyhow!("ledger submitter is unavailable"))
    }
}

/// The three remote collaborators every write action goes through.
#[derive(Clone)]
pub struct Collaborators {
    pub clients: Arc<dyn ContractClientProvider>,
    pub signer: Arc<dyn WalletSigner>,
    pub submitter: Arc<dyn LedgerSubmitter>,
}

impl Collaborators {
    pub fn new(
        clients: Arc<dyn ContractClientProvider>,
        signer: Arc<dyn WalletSigner>,
        submitter: Arc<dyn LedgerSubmitter>,
    ) -> Self {
        Self {
            clients,
            signer,
            submitter,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            clients: Arc::new(MissingContractClientProvider),
            signer: Arc::new(MissingWalletSigner),
            submitter: Arc::new(MissingLedgerSubmitter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetEvent {
    TransactionConfirmed { action: ActionKind, hash: TxHash },
    ActionFailed { action: ActionKind, message: String },
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
