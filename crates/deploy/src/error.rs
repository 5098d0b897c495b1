//! Failure taxonomy of a deployment run.

use alloy_core::primitives::{Address, B256};

use crate::pipeline::DeploymentStage;

/// Why a deployment run ended in the failed state.
///
/// Every variant keeps the collaborator error as its source so the full chain
/// reaches the operator.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("contract `{contract}` could not be resolved")]
    Resolution {
        contract: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no usable signer account")]
    NoSigner {
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to query balance of {address}")]
    Balance {
        address: Address,
        #[source]
        source: anyhow::Error,
    },

    #[error("deployment transaction was rejected")]
    Submission {
        #[source]
        source: anyhow::Error,
    },

    #[error("deployment transaction {transaction_hash} was not confirmed")]
    ConfirmationTimeout {
        transaction_hash: B256,
        #[source]
        source: anyhow::Error,
    },

    #[error("contract at {address} did not respond as expected")]
    Verification {
        address: Address,
        transaction_hash: B256,
        #[source]
        source: anyhow::Error,
    },
}

impl DeployError {
    /// The stage the run was attempting when it failed.
    pub fn stage(&self) -> DeploymentStage {
        match self {
            Self::Resolution { .. } => DeploymentStage::FactoryResolved,
            Self::NoSigner { .. } => DeploymentStage::SignerResolved,
            Self::Balance { .. } => DeploymentStage::BalanceChecked,
            Self::Submission { .. } => DeploymentStage::Submitted,
            Self::ConfirmationTimeout { .. } => DeploymentStage::Confirmed,
            Self::Verification { .. } => DeploymentStage::Verified,
        }
    }

    /// Name of the error kind as reported to operators.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "ResolutionError",
            Self::NoSigner { .. } => "NoSignerError",
            Self::Balance { .. } => "BalanceError",
            Self::Submission { .. } => "SubmissionError",
            Self::ConfirmationTimeout { .. } => "ConfirmationTimeoutError",
            Self::Verification { .. } => "VerificationError",
        }
    }

    /// Hash of the deployment transaction, if one was broadcast before the failure.
    pub fn transaction_hash(&self) -> Option<B256> {
        match self {
            Self::ConfirmationTimeout {
                transaction_hash, ..
            }
            | Self::Verification {
                transaction_hash, ..
            } => Some(*transaction_hash),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_timeout_keeps_hash() {
        let hash = B256::repeat_byte(0x11);
        let err = DeployError::ConfirmationTimeout {
            transaction_hash: hash,
            source: anyhow::anyhow!("timed out"),
        };
        assert_eq!(err.transaction_hash(), Some(hash));
        assert_eq!(err.stage(), DeploymentStage::Confirmed);
        assert_eq!(err.kind(), "ConfirmationTimeoutError");
        assert!(err.to_string().contains(&hash.to_string()));
    }

    #[test]
    fn test_source_chain_is_preserved() {
        let err = DeployError::Submission {
            source: anyhow::anyhow!("insufficient funds for gas * price + value"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("insufficient funds for gas * price + value")
        );
        assert_eq!(err.transaction_hash(), None);
    }
}
