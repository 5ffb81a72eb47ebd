use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Car, CarStatus, WalletAddress},
    protocol::{ContractCall, Envelope, SignedEnvelope, TxHash},
};
use tokio::sync::Mutex;

use crate::{
    Collaborators, ContractClient, ContractClientProvider, LedgerSubmitter, WalletSigner,
};

pub(crate) fn car(owner: &str, status: CarStatus) -> Car {
    Car {
        brand: "Toyota".to_string(),
        model: "Corolla".to_string(),
        color: "Red".to_string(),
        passengers: 5,
        ac: true,
        owner_address: WalletAddress::new(owner),
        price_per_day: 100,
        status,
    }
}

/// Records every contract call and answers reads from fixed tables.
#[derive(Default)]
pub(crate) struct FakeContract {
    pub balances: HashMap<WalletAddress, i128>,
    pub failing_owners: HashSet<WalletAddress>,
    pub admin_fee: Option<i128>,
    pub fail_build: bool,
    pub fail_invoke: bool,
    pub calls: Arc<Mutex<Vec<ContractCall>>>,
    pub built_for: Arc<Mutex<Vec<WalletAddress>>>,
}

impl FakeContract {
    pub fn with_balance(mut self, owner: &str, amount: i128) -> Self {
        self.balances.insert(WalletAddress::new(owner), amount);
        self
    }

    pub fn with_failing_owner(mut self, owner: &str) -> Self {
        self.failing_owners.insert(WalletAddress::new(owner));
        self
    }

    pub fn with_admin_fee(mut self, fee: i128) -> Self {
        self.admin_fee = Some(fee);
        self
    }

    async fn envelope(&self, call: ContractCall) -> Result<Envelope> {
        if self.fail_invoke {
            return Err(anyhow!("simulation failed for {}", call.method_name()));
        }
        let payload_b64 = format!("{}#{}", call.method_name(), self.calls.lock().await.len());
        self.calls.lock().await.push(call);
        Ok(Envelope {
            source: WalletAddress::new("GSOURCE"),
            payload_b64,
        })
    }
}

pub(crate) struct FakeProvider(pub Arc<FakeContract>);

#[async_trait]
impl ContractClientProvider for FakeProvider {
    async fn build_client(&self, wallet: &WalletAddress) -> Result<Arc<dyn ContractClient>> {
        if self.0.fail_build {
            return Err(anyhow!("rpc unreachable"));
        }
        self.0.built_for.lock().await.push(wallet.clone());
        Ok(self.0.clone())
    }
}

#[async_trait]
impl ContractClient for FakeContract {
    async fn get_owner_balance(&self, owner: &WalletAddress) -> Result<i128> {
        if self.failing_owners.contains(owner) {
            return Err(anyhow!("car not found for {owner}"));
        }
        Ok(self.balances.get(owner).copied().unwrap_or_default())
    }

    async fn get_admin_fee(&self) -> Result<i128> {
        self.admin_fee.ok_or_else(|| anyhow!("admin fee unavailable"))
    }

    async fn set_admin_fee(&self, fee: i128) -> Result<Envelope> {
        self.envelope(ContractCall::SetAdminFee { fee }).await
    }

    async fn remove_car(&self, owner: &WalletAddress) -> Result<Envelope> {
        self.envelope(ContractCall::RemoveCar {
            owner: owner.clone(),
        })
        .await
    }

    async fn payout_owner(&self, owner: &WalletAddress, amount: i128) -> Result<Envelope> {
        self.envelope(ContractCall::PayoutOwner {
            owner: owner.clone(),
            amount,
        })
        .await
    }

    async fn rental(
        &self,
        renter: &WalletAddress,
        owner: &WalletAddress,
        total_days_to_rent: u32,
        amount: i128,
    ) -> Result<Envelope> {
        self.envelope(ContractCall::Rental {
            renter: renter.clone(),
            owner: owner.clone(),
            total_days_to_rent,
            amount,
        })
        .await
    }
}

#[derive(Default)]
pub(crate) struct FakeSigner {
    pub refuse: bool,
}

#[async_trait]
impl WalletSigner for FakeSigner {
    async fn sign_transaction(&self, envelope: &Envelope) -> Result<SignedEnvelope> {
        if self.refuse {
            return Err(anyhow!("user rejected the request"));
        }
        Ok(SignedEnvelope {
            envelope: envelope.clone(),
            signer: envelope.source.clone(),
            signature_b64: format!("sig:{}", envelope.payload_b64),
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeSubmitter {
    pub reject: bool,
    pub submitted: Arc<Mutex<Vec<SignedEnvelope>>>,
}

#[async_trait]
impl LedgerSubmitter for FakeSubmitter {
    async fn submit_transaction(&self, signed: &SignedEnvelope) -> Result<TxHash> {
        if self.reject {
            return Err(anyhow!("tx_bad_seq"));
        }
        let mut submitted = self.submitted.lock().await;
        submitted.push(signed.clone());
        Ok(TxHash(format!("hash-{}", submitted.len())))
    }
}

pub(crate) fn collaborators(
    contract: Arc<FakeContract>,
    signer: FakeSigner,
    submitter: FakeSubmitter,
) -> Collaborators {
    Collaborators::new(
        Arc::new(FakeProvider(contract)),
        Arc::new(signer),
        Arc::new(submitter),
    )
}
