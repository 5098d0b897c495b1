//! chainship-deploy - One-shot smart contract deployment with read-back verification.
//!
//! A run resolves a compiled contract, picks a funding account, broadcasts the
//! creation transaction, waits for confirmation, reads baseline state back from
//! the new instance and produces a [`DeploymentReport`].

mod artifacts;
mod config;
mod error;
mod orchestrator;
mod pipeline;
mod report;
mod rpc;
mod rpc_client;
mod traits;
mod types;

pub use artifacts::{ArtifactFactory, ArtifactStore, ContractArtifact, DEFAULT_ARTIFACTS_DIR};
pub use config::{CONFIG_FILENAME, DeployConfig, ENV_PREFIX};
pub use error::DeployError;
pub use orchestrator::{DeploymentOrchestrator, DeploymentSettings};
pub use pipeline::{
    BalanceChecked, Confirmed, Deployment, DeploymentStage, DeploymentState, FactoryResolved,
    Init, MIN_VERIFICATION_READS, SignerResolved, Submitted, Verified,
};
pub use report::DeploymentReport;
pub use rpc_client::{DEFAULT_RPC_URL, RpcChainClient, RpcClientConfig};
pub use traits::{ChainClient, ContractFactory, Factory};
pub use types::{
    ContractStateSnapshot, DeployedContractHandle, DeploymentTransaction, ReadCall, ReadValue,
    Signer, TransactionRequest, ValueUnit,
};
