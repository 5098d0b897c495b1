//! Type-state deployment pipeline.
//!
//! A [`Deployment`] moves strictly forward through its states. Each transition
//! consumes the previous state and either yields the next one or a
//! [`DeployError`], so a contract can not be verified before its deployment was
//! confirmed, nor reported before it was verified.
//!
//! # Example
//!
//! ```no_run
//! use chainship_deploy::{ArtifactStore, Deployment, RpcChainClient, RpcClientConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RpcChainClient::new(RpcClientConfig::default())?;
//! let artifacts = ArtifactStore::new("artifacts");
//!
//! let confirmed = Deployment::new("Counter")
//!     .resolve_factory(&artifacts)?
//!     .resolve_signer(&client, 0)
//!     .await?
//!     .check_balance(&client)
//!     .await?
//!     .submit(&client)
//!     .await?
//!     .confirm(&client)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod stages;

use alloy_core::primitives::utils::format_ether;
use chrono::{DateTime, Utc};

pub use stages::{
    BalanceChecked, Confirmed, DeploymentStage, DeploymentState, FactoryResolved, Init,
    SignerResolved, Submitted, Verified,
};

use crate::{
    error::DeployError,
    report::DeploymentReport,
    traits::{ChainClient, ContractFactory, Factory},
    types::{ContractStateSnapshot, ReadCall, ReadValue},
};

/// Minimum number of read-back calls needed to consider a contract verified.
pub const MIN_VERIFICATION_READS: usize = 2;

/// A single deployment run in state `S`.
#[derive(Debug, Clone)]
pub struct Deployment<S: DeploymentState> {
    contract_name: String,
    state: S,
}

impl<S: DeploymentState> Deployment<S> {
    /// Name of the contract being deployed.
    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    /// Runtime stage of this deployment.
    pub fn stage(&self) -> DeploymentStage {
        S::STAGE
    }

    /// Data accumulated so far.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Split into the contract name and the current state.
    fn into_parts(self) -> (String, S) {
        (self.contract_name, self.state)
    }
}

/// Enter state `N` from state `S`.
fn advance<S: DeploymentState, N: DeploymentState>(
    contract_name: String,
    state: N,
) -> Deployment<N> {
    tracing::debug!(
        contract = %contract_name,
        from = %S::STAGE,
        to = %N::STAGE,
        "Deployment advanced"
    );
    Deployment {
        contract_name,
        state,
    }
}

impl Deployment<Init> {
    /// Start a deployment of `contract_name`. No side effects.
    pub fn new(contract_name: impl Into<String>) -> Self {
        Self {
            contract_name: contract_name.into(),
            state: Init,
        }
    }

    /// Obtain the factory for the contract.
    pub fn resolve_factory<CF: ContractFactory>(
        self,
        factories: &CF,
    ) -> Result<Deployment<FactoryResolved<CF::Factory>>, DeployError> {
        let factory = factories
            .resolve(&self.contract_name)
            .map_err(|source| DeployError::Resolution {
                contract: self.contract_name.clone(),
                source,
            })?;

        tracing::info!(contract = %self.contract_name, "Contract factory resolved");

        Ok(advance::<Init, _>(
            self.contract_name,
            FactoryResolved { factory },
        ))
    }
}

impl<F: Factory> Deployment<FactoryResolved<F>> {
    /// Pick the funding account at `index` among the client's signers.
    pub async fn resolve_signer<C: ChainClient>(
        self,
        client: &C,
        index: usize,
    ) -> Result<Deployment<SignerResolved<F>>, DeployError> {
        let signers = client
            .signers()
            .await
            .map_err(|source| DeployError::NoSigner { source })?;

        let available = signers.len();
        let signer = signers
            .into_iter()
            .nth(index)
            .ok_or_else(|| DeployError::NoSigner {
                source: if available == 0 {
                    anyhow::anyhow!("no accounts are configured on the client")
                } else {
                    anyhow::anyhow!(
                        "signer index {} is out of range ({} accounts available)",
                        index,
                        available
                    )
                },
            })?;

        tracing::info!(deployer = %signer.address, "Deploying contracts with the account");

        let (contract_name, FactoryResolved { factory }) = self.into_parts();
        Ok(advance::<FactoryResolved<F>, _>(
            contract_name,
            SignerResolved { factory, signer },
        ))
    }
}

impl<F: Factory> Deployment<SignerResolved<F>> {
    /// Observe the signer's balance.
    ///
    /// There is no minimum-balance gate: an underfunded signer surfaces as a
    /// submission failure in the next step.
    pub async fn check_balance<C: ChainClient>(
        self,
        client: &C,
    ) -> Result<Deployment<BalanceChecked<F>>, DeployError> {
        let address = self.state.signer.address;
        let balance = client
            .balance(address)
            .await
            .map_err(|source| DeployError::Balance { address, source })?;

        tracing::info!(
            account = %address,
            balance = %format!("{} ETH", format_ether(balance)),
            "Account balance"
        );

        let (contract_name, SignerResolved { factory, signer }) = self.into_parts();
        Ok(advance::<SignerResolved<F>, _>(
            contract_name,
            BalanceChecked {
                factory,
                signer,
                balance,
            },
        ))
    }
}

impl<F: Factory> Deployment<BalanceChecked<F>> {
    /// Broadcast the deployment transaction.
    pub async fn submit<C: ChainClient>(
        self,
        client: &C,
    ) -> Result<Deployment<Submitted>, DeployError> {
        tracing::info!(contract = %self.contract_name, "Deploying contract...");

        let transaction = self
            .state
            .factory
            .deploy(client, &self.state.signer)
            .await
            .map_err(|source| DeployError::Submission { source })?;

        tracing::info!(tx_hash = %transaction.hash, "Deployment transaction submitted");

        let (contract_name, BalanceChecked { signer, .. }) = self.into_parts();
        Ok(advance::<BalanceChecked<F>, _>(
            contract_name,
            Submitted {
                signer,
                transaction,
            },
        ))
    }
}

impl Deployment<Submitted> {
    /// Wait until the client reports the deployment as confirmed.
    ///
    /// The only suspension point of a run. Timeout and depth are the client's
    /// policy; there is no cancellation once the transaction is broadcast.
    pub async fn confirm<C: ChainClient>(
        self,
        client: &C,
    ) -> Result<Deployment<Confirmed>, DeployError> {
        let handle = client
            .wait_for_confirmation(&self.state.transaction)
            .await
            .map_err(|source| DeployError::ConfirmationTimeout {
                transaction_hash: self.state.transaction.hash,
                source,
            })?;

        tracing::info!(
            contract = %self.contract_name,
            address = %handle.address,
            block = handle.block_number,
            "Contract deployed successfully"
        );

        // Informational only, the contract exists whatever the answer.
        match client.gas_price().await {
            Ok(gas_price) => tracing::info!(gas_price, "Gas price"),
            Err(e) => tracing::warn!(error = %e, "Failed to query gas price"),
        }

        let (
            contract_name,
            Submitted {
                signer,
                transaction,
            },
        ) = self.into_parts();
        Ok(advance::<Submitted, _>(
            contract_name,
            Confirmed {
                signer,
                transaction,
                handle,
            },
        ))
    }
}

impl Deployment<Confirmed> {
    /// Read baseline state back from the deployed contract.
    ///
    /// Every call in `calls` must succeed, and at least
    /// [`MIN_VERIFICATION_READS`] are required.
    pub async fn verify<C: ChainClient>(
        self,
        client: &C,
        calls: &[ReadCall],
    ) -> Result<Deployment<Verified>, DeployError> {
        let address = self.state.handle.address;
        let transaction_hash = self.state.transaction.hash;
        let verification_error = |source: anyhow::Error| DeployError::Verification {
            address,
            transaction_hash,
            source,
        };

        if calls.len() < MIN_VERIFICATION_READS {
            return Err(verification_error(anyhow::anyhow!(
                "at least {} read-back calls are required, {} configured",
                MIN_VERIFICATION_READS,
                calls.len()
            )));
        }

        let mut values = Vec::with_capacity(calls.len());
        for call in calls {
            let value = client
                .call_uint(address, call)
                .await
                .map_err(|e| verification_error(e.context(format!("{} failed", call.signature))))?;

            let read = ReadValue {
                call: call.clone(),
                value,
            };
            tracing::info!(
                label = %call.label,
                value = %read.display(),
                "Contract verification"
            );
            values.push(read);
        }

        let (
            contract_name,
            Confirmed {
                signer,
                transaction,
                handle,
            },
        ) = self.into_parts();
        Ok(advance::<Confirmed, _>(
            contract_name,
            Verified {
                signer,
                transaction,
                handle,
                snapshot: ContractStateSnapshot::from(values),
            },
        ))
    }
}

impl Deployment<Verified> {
    /// Assemble the deployment report. Terminal step of a successful run.
    ///
    /// The read-back snapshot is dropped here; it is never cached beyond verification.
    pub fn into_report(self, network: &str, deployed_at: DateTime<Utc>) -> DeploymentReport {
        let (contract_name, state) = self.into_parts();
        DeploymentReport::assemble(
            &contract_name,
            &state.handle,
            &state.signer,
            network,
            deployed_at,
            &state.transaction,
        )
    }
}
