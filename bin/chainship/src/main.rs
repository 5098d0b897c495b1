//! chainship deploys a compiled smart contract and verifies it answers on chain.

mod cli;

use std::{io::Write, path::Path, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;

use chainship_deploy::{
    ArtifactStore, DeployConfig, DeployError, DeploymentOrchestrator, DeploymentReport,
    DeploymentSettings, RpcChainClient,
};
use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli).await;
    if let Err(e) = &result {
        eprintln!("{}", failure_message(e));
    }
    exit_code(&result)
}

async fn run(cli: Cli) -> Result<DeploymentReport> {
    let config = DeployConfig::load(cli.config.as_deref(), &cli.overrides)?;

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
    }

    let client = RpcChainClient::new(config.client.clone())?;
    let artifacts = ArtifactStore::new(&config.artifacts_dir);

    tracing::info!(
        rpc_url = %client.url(),
        artifacts = %artifacts.root().display(),
        "Deploying to {}...",
        config.network
    );

    let orchestrator =
        DeploymentOrchestrator::new(client, artifacts, DeploymentSettings::from(&config));
    let report = orchestrator.run().await?;

    publish(&report, &mut std::io::stdout().lock(), config.output.as_deref())?;

    Ok(report)
}

/// Write the report JSON to `out` and save it to `output`, if set.
///
/// The contract exists once a report is produced, so a failed save is logged
/// and does not fail the run.
fn publish(report: &DeploymentReport, out: &mut impl Write, output: Option<&Path>) -> Result<()> {
    writeln!(out, "{}", report.to_json()?).context("Failed to write deployment report")?;
    tracing::info!("Deployment summary:\n{}", report.summary_table());

    if let Some(path) = output {
        if let Err(e) = report.save_to_file(path) {
            tracing::error!(
                path = %path.display(),
                error = format!("{:#}", e),
                "Contract deployed but the report could not be saved"
            );
        }
    }

    Ok(())
}

/// 0 once a report was produced, 1 on any failure.
fn exit_code(result: &Result<DeploymentReport>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

/// Operator-facing failure line with the failing stage, the error kind and
/// the full error chain.
fn failure_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<DeployError>() {
        Some(deploy_error) => {
            let mut message = format!(
                "{} failed: {}: {:#}",
                deploy_error.stage(),
                deploy_error.kind(),
                error
            );
            if let Some(hash) = deploy_error.transaction_hash() {
                message.push_str(&format!("\nDeployment transaction: {}", hash));
            }
            message
        }
        None => format!("Deployment failed: {:#}", error),
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    fn sample_report() -> DeploymentReport {
        DeploymentReport {
            contract_name: "Widget".to_string(),
            contract_address: "0x4242424242424242424242424242424242424242".to_string(),
            deployer: "0xabc0000000000000000000000000000000000001".to_string(),
            network: "Test Network".to_string(),
            deployment_time: "2024-05-01T12:30:00.000Z".to_string(),
            transaction_hash: format!("0x{}", "11".repeat(32)),
        }
    }

    #[test]
    fn test_success_exits_zero() {
        assert_eq!(exit_code(&Ok(sample_report())), ExitCode::SUCCESS);
    }

    #[test]
    fn test_failure_exits_non_zero_with_stage_and_kind() {
        let error = anyhow::Error::new(DeployError::Resolution {
            contract: "Widget".to_string(),
            source: anyhow::anyhow!("No artifact named Widget.json"),
        });

        let message = failure_message(&error);
        assert!(
            message.starts_with("factory-resolved failed: ResolutionError: "),
            "{message}"
        );
        assert!(message.contains("No artifact named Widget.json"));
        assert!(!message.contains("Deployment transaction"));

        assert_eq!(exit_code(&Err(error)), ExitCode::FAILURE);
    }

    #[test]
    fn test_failure_after_broadcast_names_transaction() {
        let error = anyhow::Error::new(DeployError::ConfirmationTimeout {
            transaction_hash: Default::default(),
            source: anyhow::anyhow!("Timeout waiting for confirmation"),
        });

        let message = failure_message(&error);
        assert!(
            message.starts_with("confirmed failed: ConfirmationTimeoutError: "),
            "{message}"
        );
        assert!(message.contains("Timeout waiting for confirmation"));
        assert!(message.contains(&format!("Deployment transaction: 0x{}", "00".repeat(32))));
    }

    #[test]
    fn test_configuration_failure_keeps_chain() {
        let error =
            anyhow::anyhow!("Invalid RPC URL: nope").context("Failed to load configuration");
        let message = failure_message(&error);
        assert_eq!(
            message,
            "Deployment failed: Failed to load configuration: Invalid RPC URL: nope"
        );
        assert_eq!(exit_code(&Err(error)), ExitCode::FAILURE);
    }

    #[test]
    fn test_publish_prints_report() {
        let report = sample_report();
        let mut out = Vec::new();
        publish(&report, &mut out, None).unwrap();

        let printed: DeploymentReport = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed, report);
    }

    #[test]
    fn test_publish_survives_unwritable_output() {
        let dir = TempDir::new("chainship-publish").unwrap();
        // A regular file where a parent directory is expected.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let output = blocker.join("report.json");

        let report = sample_report();
        let mut out = Vec::new();
        publish(&report, &mut out, Some(&output)).unwrap();

        assert!(!output.exists());
        let printed: DeploymentReport = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed, report);
        assert_eq!(exit_code(&Ok(report)), ExitCode::SUCCESS);
    }

    #[test]
    fn test_publish_saves_output() {
        let dir = TempDir::new("chainship-publish").unwrap();
        let output = dir.path().join("deployments/widget.json");

        let report = sample_report();
        publish(&report, &mut Vec::new(), Some(&output)).unwrap();

        let saved: DeploymentReport =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(saved, report);
    }
}
