//! Access to the blockchain network a contract is deployed to.

use std::future::Future;

use alloy_core::primitives::{Address, B256, U256};
use anyhow::Result;

use crate::types::{
    DeployedContractHandle, DeploymentTransaction, ReadCall, Signer, TransactionRequest,
};

/// Capability object for talking to a chain.
///
/// Passed explicitly to the orchestrator so a run never reaches for an ambient
/// connection. The client owns the confirmation policy: depth, timeout and
/// polling are its concern, the orchestrator only propagates the outcome.
pub trait ChainClient: Send + Sync {
    /// Accounts this client can authorize transactions for.
    fn signers(&self) -> impl Future<Output = Result<Vec<Signer>>> + Send;

    /// Balance of `address` in wei.
    fn balance(&self, address: Address) -> impl Future<Output = Result<U256>> + Send;

    /// Current gas price in wei.
    fn gas_price(&self) -> impl Future<Output = Result<u128>> + Send;

    /// Broadcast a transaction, returning its hash.
    fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> impl Future<Output = Result<B256>> + Send;

    /// Block until `transaction` is included at the client's confirmation depth.
    ///
    /// Fails if the wait times out, the transaction is dropped or it reverted.
    fn wait_for_confirmation(
        &self,
        transaction: &DeploymentTransaction,
    ) -> impl Future<Output = Result<DeployedContractHandle>> + Send;

    /// Execute a read-only accessor on `contract` and decode its integer result.
    fn call_uint(
        &self,
        contract: Address,
        call: &ReadCall,
    ) -> impl Future<Output = Result<U256>> + Send;
}
