//! Layered configuration of a deployment run.
//!
//! Values are merged from, in increasing priority: built-in defaults, a TOML
//! file, `CHAINSHIP_*` environment variables and explicit overrides (CLI flags).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    artifacts::DEFAULT_ARTIFACTS_DIR,
    pipeline::MIN_VERIFICATION_READS,
    rpc_client::RpcClientConfig,
    types::{ReadCall, ValueUnit},
};

/// The default name for the configuration file.
pub const CONFIG_FILENAME: &str = "Chainship.toml";

/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "CHAINSHIP_";

/// Everything a deployment run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Name of the contract to deploy, as found in the artifacts.
    pub contract_name: String,
    /// Label of the target network recorded in the report.
    pub network: String,
    /// Directory holding compiled contract artifacts.
    pub artifacts_dir: PathBuf,
    /// Index of the funding account among the node's accounts.
    pub signer_index: usize,
    /// Connection and confirmation policy.
    #[serde(flatten)]
    pub client: RpcClientConfig,
    /// Where to save the deployment report, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Read-only accessors called on the deployed contract.
    pub verification: Vec<ReadCall>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            contract_name: "ProcrastinationMiningProtocol".to_string(),
            network: "Core Testnet".to_string(),
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            signer_index: 0,
            client: RpcClientConfig::default(),
            output: None,
            verification: vec![
                ReadCall::new("Next Task ID", "nextTaskId()", ValueUnit::Plain),
                ReadCall::new("Minimum Stake", "MIN_STAKE()", ValueUnit::Ether),
            ],
        }
    }
}

impl DeployConfig {
    /// Load the configuration.
    ///
    /// `path` may point to a file or to a directory containing
    /// [`CONFIG_FILENAME`]. Without a path, [`CONFIG_FILENAME`] in the working
    /// directory is used if present. `overrides` is merged last; fields it
    /// serializes as absent leave lower layers untouched.
    pub fn load<O: Serialize>(path: Option<&Path>, overrides: O) -> Result<Self> {
        let figment = Self::figment(path)?.merge(Serialized::defaults(overrides));
        let config: Self = figment
            .extract()
            .context("Failed to load deployment configuration")?;
        config.validate()?;

        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    fn figment(path: Option<&Path>) -> Result<Figment> {
        let file = match path {
            Some(path) if !path.exists() => {
                anyhow::bail!("Configuration file or directory not found: {}", path.display())
            }
            Some(path) if path.is_dir() => path.join(CONFIG_FILENAME),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        Ok(Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Reject configurations a run could not succeed with.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.client.rpc_url)
            .with_context(|| format!("Invalid RPC URL: {}", self.client.rpc_url))?;

        if self.contract_name.trim().is_empty() {
            anyhow::bail!("Contract name must not be empty");
        }
        if self.network.trim().is_empty() {
            anyhow::bail!("Network label must not be empty");
        }
        if self.client.confirmations == 0 {
            anyhow::bail!("At least one confirmation is required");
        }
        if self.verification.len() < MIN_VERIFICATION_READS {
            anyhow::bail!(
                "At least {} verification calls are required, {} configured",
                MIN_VERIFICATION_READS,
                self.verification.len()
            );
        }
        if let Some(call) = self.verification.iter().find(|c| !c.signature.ends_with("()")) {
            anyhow::bail!(
                "Verification call {} must be an accessor without arguments",
                call.signature
            );
        }

        Ok(())
    }

    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deploy config to TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}
