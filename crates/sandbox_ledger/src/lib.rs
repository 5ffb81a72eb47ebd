//! Local stand-in for the rent-a-car contract, the wallet and the ledger.
//!
//! Envelopes are base64-encoded JSON transactions, signatures are SHA-256
//! digests keyed by the signer's address, and submission applies the call to
//! an in-memory contract.

use std::{collections::HashSet, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use fleet_core::{
    Collaborators, ContractClient, ContractClientProvider, LedgerSubmitter, WalletSigner,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::{
    domain::{CarStatus, WalletAddress},
    protocol::{ContractCall, Envelope, SignedEnvelope, TxHash},
};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub mod contract;

pub use contract::{CarRecord, ContractEvent, RentACar, RentalRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnsignedTransaction {
    source: WalletAddress,
    sequence: u64,
    call: ContractCall,
}

struct LedgerState {
    contract: RentACar,
    next_sequence: u64,
    applied: HashSet<String>,
}

#[derive(Clone)]
pub struct SandboxLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl SandboxLedger {
    pub fn new(admin: WalletAddress) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                contract: RentACar::new(admin),
                next_sequence: 1,
                applied: HashSet::new(),
            })),
        }
    }

    /// Collaborators acting for `wallet` against this ledger.
    pub fn collaborators_for(&self, wallet: &WalletAddress) -> Collaborators {
        Collaborators::new(
            Arc::new(self.clone()),
            Arc::new(SandboxWallet::new(wallet.clone())),
            Arc::new(self.clone()),
        )
    }

    pub async fn add_car(&self, owner: WalletAddress, price_per_day: i128) -> Result<()> {
        self.state
            .lock()
            .await
            .contract
            .add_car(owner, price_per_day)?;
        Ok(())
    }

    pub async fn return_car(&self, renter: &WalletAddress, owner: &WalletAddress) -> Result<()> {
        self.state.lock().await.contract.return_car(renter, owner)?;
        info!(renter = %renter, owner = %owner, "sandbox: car returned");
        Ok(())
    }

    /// On-chain status of the owner's car, if it is still registered.
    pub async fn car_status(&self, owner: &WalletAddress) -> Option<CarStatus> {
        let state = self.state.lock().await;
        state.contract.car(owner).ok().map(|car| car.car_status)
    }

    pub async fn admin_balance(&self) -> i128 {
        self.state.lock().await.contract.admin_balance()
    }

    pub async fn contract_balance(&self) -> i128 {
        self.state.lock().await.contract.contract_balance()
    }

    pub async fn events(&self) -> Vec<ContractEvent> {
        self.state.lock().await.contract.events().to_vec()
    }

    async fn envelope_for(&self, source: &WalletAddress, call: ContractCall) -> Result<Envelope> {
        let sequence = {
            let mut state = self.state.lock().await;
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            sequence
        };
        let tx = UnsignedTransaction {
            source: source.clone(),
            sequence,
            call,
        };
        let payload = serde_json::to_vec(&tx).context("failed to encode transaction")?;
        Ok(Envelope {
            source: source.clone(),
            payload_b64: STANDARD.encode(payload),
        })
    }
}

fn signature_for(signer: &WalletAddress, payload_b64: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(signer.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(payload_b64.as_bytes());
    STANDARD.encode(hasher.finalize())
}

fn tx_hash_for(signed: &SignedEnvelope) -> TxHash {
    let mut hasher = Sha256::new();
    hasher.update(signed.envelope.payload_b64.as_bytes());
    hasher.update(signed.signature_b64.as_bytes());
    let digest = hasher.finalize();
    TxHash(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}

#[async_trait]
impl ContractClientProvider for SandboxLedger {
    async fn build_client(&self, wallet: &WalletAddress) -> Result<Arc<dyn ContractClient>> {
        Ok(Arc::new(SandboxClient {
            ledger: self.clone(),
            wallet: wallet.clone(),
        }))
    }
}

#[async_trait]
impl LedgerSubmitter for SandboxLedger {
    async fn submit_transaction(&self, signed: &SignedEnvelope) -> Result<TxHash> {
        if signed.signature_b64 != signature_for(&signed.signer, &signed.envelope.payload_b64) {
            bail!("bad signature from {}", signed.signer);
        }
        let payload = STANDARD
            .decode(&signed.envelope.payload_b64)
            .context("envelope payload is not base64")?;
        let tx: UnsignedTransaction =
            serde_json::from_slice(&payload).context("envelope payload is not a transaction")?;
        if tx.source != signed.signer {
            bail!(
                "transaction source {} was signed by {}",
                tx.source,
                signed.signer
            );
        }

        let hash = tx_hash_for(signed);
        let mut state = self.state.lock().await;
        if state.applied.contains(&hash.0) {
            bail!("transaction {hash} already applied");
        }
        state.contract.apply(&signed.signer, &tx.call)?;
        state.applied.insert(hash.0.clone());
        info!(
            source = %tx.source,
            method = tx.call.method_name(),
            sequence = tx.sequence,
            tx_hash = %hash,
            "sandbox: transaction applied"
        );
        Ok(hash)
    }
}

pub struct SandboxClient {
    ledger: SandboxLedger,
    wallet: WalletAddress,
}

#[async_trait]
impl ContractClient for SandboxClient {
    async fn get_owner_balance(&self, owner: &WalletAddress) -> Result<i128> {
        Ok(self.ledger.state.lock().await.contract.owner_balance(owner)?)
    }

    async fn get_admin_fee(&self) -> Result<i128> {
        Ok(self.ledger.state.lock().await.contract.admin_fee())
    }

    async fn set_admin_fee(&self, fee: i128) -> Result<Envelope> {
        self.ledger
            .envelope_for(&self.wallet, ContractCall::SetAdminFee { fee })
            .await
    }

    async fn remove_car(&self, owner: &WalletAddress) -> Result<Envelope> {
        let call = ContractCall::RemoveCar {
            owner: owner.clone(),
        };
        self.ledger.envelope_for(&self.wallet, call).await
    }

    async fn payout_owner(&self, owner: &WalletAddress, amount: i128) -> Result<Envelope> {
        let call = ContractCall::PayoutOwner {
            owner: owner.clone(),
            amount,
        };
        self.ledger.envelope_for(&self.wallet, call).await
    }

    async fn rental(
        &self,
        renter: &WalletAddress,
        owner: &WalletAddress,
        total_days_to_rent: u32,
        amount: i128,
    ) -> Result<Envelope> {
        let call = ContractCall::Rental {
            renter: renter.clone(),
            owner: owner.clone(),
            total_days_to_rent,
            amount,
        };
        self.ledger.envelope_for(&self.wallet, call).await
    }
}

/// Wallet that only signs envelopes sourced from its own address.
pub struct SandboxWallet {
    address: WalletAddress,
}

impl SandboxWallet {
    pub fn new(address: WalletAddress) -> Self {
        Self { address }
    }
}

#[async_trait]
impl WalletSigner for SandboxWallet {
    async fn sign_transaction(&self, envelope: &Envelope) -> Result<SignedEnvelope> {
        if envelope.source != self.address {
            return Err(anyhow!(
                "wallet {} cannot sign for source {}",
                self.address,
                envelope.source
            ));
        }
        debug!(signer = %self.address, "sandbox: signing envelope");
        Ok(SignedEnvelope {
            envelope: envelope.clone(),
            signer: self.address.clone(),
            signature_b64: signature_for(&self.address, &envelope.payload_b64),
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
