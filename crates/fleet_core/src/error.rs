use shared::domain::WalletAddress;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to build contract client for wallet {wallet}: {source}")]
    Client {
        wallet: WalletAddress,
        source: anyhow::Error,
    },
    #[error("contract invocation {method} failed: {source}")]
    Invoke {
        method: &'static str,
        source: anyhow::Error,
    },
    #[error("wallet did not sign {method}: {source}")]
    Sign {
        method: &'static str,
        source: anyhow::Error,
    },
    #[error("ledger rejected {method}: {source}")]
    Submit {
        method: &'static str,
        source: anyhow::Error,
    },
    #[error("amount overflow computing {0}")]
    AmountOverflow(&'static str),
    #[error("invalid admin fee input '{0}': expected a non-negative whole number")]
    InvalidFeeInput(String),
}

impl ExecutorError {
    /// Stage of the sign-and-submit pipeline that failed, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            ExecutorError::Client { .. } => "client",
            ExecutorError::Invoke { .. } => "invoke",
            ExecutorError::Sign { .. } => "sign",
            ExecutorError::Submit { .. } => "submit",
            ExecutorError::AmountOverflow(_) | ExecutorError::InvalidFeeInput(_) => "validate",
        }
    }
}
