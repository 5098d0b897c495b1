use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "chainship")]
#[command(
    author,
    version,
    about = "Deploy a compiled smart contract and verify it answers on chain"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "CHAINSHIP_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a Chainship.toml configuration file (or a directory containing one).
    ///
    /// If not provided, ./Chainship.toml is used when it exists.
    #[arg(long, alias = "conf", env = "CHAINSHIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Save the effective configuration to this path before deploying.
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Configuration overrides, applied on top of the file and environment.
    #[clap(flatten)]
    pub overrides: ConfigOverrides,
}

/// Command line overrides of configuration keys.
///
/// Unset flags are skipped so they do not shadow lower configuration layers.
#[derive(Debug, Clone, Default, Parser, Serialize)]
pub struct ConfigOverrides {
    /// The JSON-RPC endpoint of the target network.
    #[arg(long, alias = "rpc")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// The name of the contract to deploy.
    #[arg(short, long = "contract")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,

    /// The network label recorded in the deployment report.
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// The directory holding compiled contract artifacts.
    #[arg(long, alias = "artifacts")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,

    /// The index of the funding account among the node's accounts.
    #[arg(long, alias = "signer")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_index: Option<usize>,

    /// The number of blocks required before the deployment counts as confirmed.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,

    /// The maximum time to wait for confirmation, in seconds.
    #[arg(long, alias = "timeout")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_timeout_secs: Option<u64>,

    /// Save the deployment report as JSON to this path.
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_flags_are_not_serialized() {
        let cli = Cli::parse_from(["chainship", "--network", "Test Network"]);
        let json = serde_json::to_value(&cli.overrides).unwrap();
        assert_eq!(json, serde_json::json!({ "network": "Test Network" }));
    }

    #[test]
    fn test_parse_all_overrides() {
        let cli = Cli::parse_from([
            "chainship",
            "--rpc",
            "http://127.0.0.1:8545",
            "--contract",
            "Widget",
            "--signer",
            "2",
            "--confirmations",
            "3",
            "--timeout",
            "30",
            "-o",
            "deployments/widget.json",
        ]);
        assert_eq!(cli.overrides.contract_name.as_deref(), Some("Widget"));
        assert_eq!(cli.overrides.signer_index, Some(2));
        assert_eq!(cli.overrides.confirmations, Some(3));
        assert_eq!(cli.overrides.confirmation_timeout_secs, Some(30));
        assert_eq!(
            cli.overrides.output,
            Some(PathBuf::from("deployments/widget.json"))
        );
    }
}
