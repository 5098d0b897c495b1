//! Resolution of compiled contracts into deployable factories.

use std::future::Future;

use anyhow::Result;

use super::chain::ChainClient;
use crate::types::{DeploymentTransaction, Signer};

/// Source of compiled contracts, keyed by contract name.
pub trait ContractFactory {
    type Factory: Factory;

    /// Look up the compiled contract called `contract_name`.
    fn resolve(&self, contract_name: &str) -> Result<Self::Factory>;
}

/// A compiled contract that can be deployed.
pub trait Factory: Send + Sync {
    /// Name of the contract this factory creates.
    fn contract_name(&self) -> &str;

    /// Build and broadcast the creation transaction, authorized by `signer`.
    fn deploy<C: ChainClient>(
        &self,
        client: &C,
        signer: &Signer,
    ) -> impl Future<Output = Result<DeploymentTransaction>> + Send;
}
