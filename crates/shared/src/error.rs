use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure codes reported by the rent-a-car contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ContractErrorCode {
    #[error("car not found")]
    CarNotFound,
    #[error("rental not found")]
    RentalNotFound,
    #[error("amount must be positive")]
    AmountMustBePositive,
    #[error("rental duration cannot be zero")]
    RentalDurationCannotBeZero,
    #[error("self rental is not allowed")]
    SelfRentalNotAllowed,
    #[error("balance not available for amount requested")]
    BalanceNotAvailableForAmountRequested,
    #[error("car already registered for owner")]
    CarAlreadyExists,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("signer is not authorized for this call")]
    Unauthorized,
}

#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ContractException {
    pub code: ContractErrorCode,
    pub message: String,
}

impl ContractException {
    pub fn new(code: ContractErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ContractErrorCode> for ContractException {
    fn from(code: ContractErrorCode) -> Self {
        Self {
            code,
            message: code.to_string(),
        }
    }
}
