//! Drives a deployment run from start to report.

use chrono::Utc;

use crate::{
    config::DeployConfig,
    error::DeployError,
    pipeline::Deployment,
    report::DeploymentReport,
    traits::{ChainClient, ContractFactory},
    types::ReadCall,
};

/// Per-run inputs of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSettings {
    /// Contract to deploy.
    pub contract_name: String,
    /// Network label recorded in the report. Not derived from the chain.
    pub network: String,
    /// Index of the funding account among the client's signers.
    pub signer_index: usize,
    /// Read-back calls performed after confirmation.
    pub verification: Vec<ReadCall>,
}

impl From<&DeployConfig> for DeploymentSettings {
    fn from(config: &DeployConfig) -> Self {
        Self {
            contract_name: config.contract_name.clone(),
            network: config.network.clone(),
            signer_index: config.signer_index,
            verification: config.verification.clone(),
        }
    }
}

/// Runs the deployment state machine against injected collaborators.
///
/// Runs are independent: nothing is kept between calls to [`run`](Self::run),
/// and running twice deploys two distinct contract instances.
#[derive(Debug, Clone)]
pub struct DeploymentOrchestrator<C, F> {
    client: C,
    factories: F,
    settings: DeploymentSettings,
}

impl<C, F> DeploymentOrchestrator<C, F>
where
    C: ChainClient,
    F: ContractFactory,
{
    pub fn new(client: C, factories: F, settings: DeploymentSettings) -> Self {
        Self {
            client,
            factories,
            settings,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn settings(&self) -> &DeploymentSettings {
        &self.settings
    }

    /// Execute one deployment run.
    ///
    /// Fails fast: the first failing step ends the run and nothing is retried
    /// or rolled back. A transaction broadcast before a failure stays on chain.
    pub async fn run(&self) -> Result<DeploymentReport, DeployError> {
        tracing::info!(
            contract = %self.settings.contract_name,
            network = %self.settings.network,
            "Starting deployment..."
        );

        let verified = Deployment::new(self.settings.contract_name.as_str())
            .resolve_factory(&self.factories)?
            .resolve_signer(&self.client, self.settings.signer_index)
            .await?
            .check_balance(&self.client)
            .await?
            .submit(&self.client)
            .await?
            .confirm(&self.client)
            .await?
            .verify(&self.client, &self.settings.verification)
            .await?;

        let report = verified.into_report(&self.settings.network, Utc::now());

        tracing::info!(
            contract = %report.contract_name,
            address = %report.contract_address,
            tx_hash = %report.transaction_hash,
            "Deployment completed successfully"
        );

        Ok(report)
    }
}
