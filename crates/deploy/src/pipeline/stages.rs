//! Deployment state markers for the type-state pipeline.
//!
//! The order is fixed: Init -> FactoryResolved -> SignerResolved -> BalanceChecked
//! -> Submitted -> Confirmed -> Verified. Each state carries the data gathered so
//! far and is only reachable by consuming its predecessor.

use alloy_core::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::types::{ContractStateSnapshot, DeployedContractHandle, DeploymentTransaction, Signer};

/// Runtime name of each step of a deployment run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum DeploymentStage {
    Init,
    FactoryResolved,
    SignerResolved,
    BalanceChecked,
    Submitted,
    Confirmed,
    Verified,
    Reported,
}

/// Nothing has happened yet.
#[derive(Debug, Clone, Default)]
pub struct Init;

/// A factory for the named contract was found.
#[derive(Debug, Clone)]
pub struct FactoryResolved<F> {
    pub factory: F,
}

/// A funding account was selected.
#[derive(Debug, Clone)]
pub struct SignerResolved<F> {
    pub factory: F,
    pub signer: Signer,
}

/// The funding account balance was observed. Advisory only.
#[derive(Debug, Clone)]
pub struct BalanceChecked<F> {
    pub factory: F,
    pub signer: Signer,
    pub balance: U256,
}

/// The deployment transaction was broadcast.
#[derive(Debug, Clone)]
pub struct Submitted {
    pub signer: Signer,
    pub transaction: DeploymentTransaction,
}

/// The network included and finalized the deployment.
#[derive(Debug, Clone)]
pub struct Confirmed {
    pub signer: Signer,
    pub transaction: DeploymentTransaction,
    pub handle: DeployedContractHandle,
}

/// The deployed contract answered the read-back calls.
#[derive(Debug, Clone)]
pub struct Verified {
    pub signer: Signer,
    pub transaction: DeploymentTransaction,
    pub handle: DeployedContractHandle,
    pub snapshot: ContractStateSnapshot,
}

/// Sealed trait for deployment states.
mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Init {}
    impl<F> Sealed for super::FactoryResolved<F> {}
    impl<F> Sealed for super::SignerResolved<F> {}
    impl<F> Sealed for super::BalanceChecked<F> {}
    impl Sealed for super::Submitted {}
    impl Sealed for super::Confirmed {}
    impl Sealed for super::Verified {}
}

/// Marker trait for valid deployment states.
pub trait DeploymentState: sealed::Sealed {
    const STAGE: DeploymentStage;
}

impl DeploymentState for Init {
    const STAGE: DeploymentStage = DeploymentStage::Init;
}

impl<F> DeploymentState for FactoryResolved<F> {
    const STAGE: DeploymentStage = DeploymentStage::FactoryResolved;
}

impl<F> DeploymentState for SignerResolved<F> {
    const STAGE: DeploymentStage = DeploymentStage::SignerResolved;
}

impl<F> DeploymentState for BalanceChecked<F> {
    const STAGE: DeploymentStage = DeploymentStage::BalanceChecked;
}

impl DeploymentState for Submitted {
    const STAGE: DeploymentStage = DeploymentStage::Submitted;
}

impl DeploymentState for Confirmed {
    const STAGE: DeploymentStage = DeploymentStage::Confirmed;
}

impl DeploymentState for Verified {
    const STAGE: DeploymentStage = DeploymentStage::Verified;
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_stages_advance_in_declaration_order() {
        let stages: Vec<_> = DeploymentStage::iter().collect();
        for pair in stages.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(stages.first(), Some(&DeploymentStage::Init));
        assert_eq!(stages.last(), Some(&DeploymentStage::Reported));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(DeploymentStage::BalanceChecked.to_string(), "balance-checked");
        assert_eq!(<Confirmed as DeploymentState>::STAGE, DeploymentStage::Confirmed);
    }
}
