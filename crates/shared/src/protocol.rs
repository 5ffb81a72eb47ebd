use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::WalletAddress;

/// A mutating rent-a-car contract invocation with its typed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "args", rename_all = "snake_case")]
pub enum ContractCall {
    SetAdminFee {
        fee: i128,
    },
    RemoveCar {
        owner: WalletAddress,
    },
    PayoutOwner {
        owner: WalletAddress,
        amount: i128,
    },
    Rental {
        renter: WalletAddress,
        owner: WalletAddress,
        total_days_to_rent: u32,
        amount: i128,
    },
}

impl ContractCall {
    pub fn method_name(&self) -> &'static str {
        match self {
            ContractCall::SetAdminFee { .. } => "set_admin_fee",
            ContractCall::RemoveCar { .. } => "remove_car",
            ContractCall::PayoutOwner { .. } => "payout_owner",
            ContractCall::Rental { .. } => "rental",
        }
    }
}

/// Unsigned transaction returned by a contract invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub source: WalletAddress,
    pub payload_b64: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub envelope: Envelope,
    pub signer: WalletAddress,
    pub signature_b64: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
