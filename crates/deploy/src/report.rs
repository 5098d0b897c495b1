//! The record emitted by a successful deployment run.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use comfy_table::{Table, presets::UTF8_FULL};
use serde::{Deserialize, Serialize};

use crate::types::{DeployedContractHandle, DeploymentTransaction, Signer};

/// Summary of a deployed contract, consumed by operators and later scripts.
///
/// Serializes to a flat mapping of string values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReport {
    pub contract_name: String,
    pub contract_address: String,
    pub deployer: String,
    pub network: String,
    /// ISO-8601 UTC timestamp, millisecond precision.
    pub deployment_time: String,
    pub transaction_hash: String,
}

impl DeploymentReport {
    /// Build a report from the values gathered during a run. No network access.
    pub fn assemble(
        contract_name: &str,
        handle: &DeployedContractHandle,
        signer: &Signer,
        network: &str,
        deployed_at: DateTime<Utc>,
        transaction: &DeploymentTransaction,
    ) -> Self {
        Self {
            contract_name: contract_name.to_string(),
            contract_address: handle.address.to_string(),
            deployer: signer.address.to_string(),
            network: network.to_string(),
            deployment_time: deployed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            transaction_hash: transaction.hash.to_string(),
        }
    }

    /// Pretty JSON rendering, the machine-readable form of the report.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize deployment report")
    }

    /// Save the report as JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write deployment report to {}", path.display()))?;

        tracing::info!(path = %path.display(), "Deployment report saved");
        Ok(())
    }

    /// Human readable table of the report.
    pub fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec!["Field", "Value"]);
        table.add_row(vec!["Contract", self.contract_name.as_str()]);
        table.add_row(vec!["Address", self.contract_address.as_str()]);
        table.add_row(vec!["Deployer", self.deployer.as_str()]);
        table.add_row(vec!["Network", self.network.as_str()]);
        table.add_row(vec!["Time", self.deployment_time.as_str()]);
        table.add_row(vec!["Transaction", self.transaction_hash.as_str()]);
        table
    }
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::{Address, B256};
    use chrono::TimeZone;
    use tempdir::TempDir;

    use super::*;

    fn sample_report() -> DeploymentReport {
        let handle = DeployedContractHandle {
            address: Address::repeat_byte(0x42),
            transaction_hash: B256::repeat_byte(0x07),
            block_number: 12,
        };
        let transaction = DeploymentTransaction {
            hash: B256::repeat_byte(0x07),
            contract_name: "Widget".to_string(),
        };
        let signer = Signer::from(Address::repeat_byte(0xab));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

        DeploymentReport::assemble("Widget", &handle, &signer, "Test Network", at, &transaction)
    }

    #[test]
    fn test_assemble_fills_every_field() {
        let report = sample_report();
        assert_eq!(report.contract_name, "Widget");
        assert_eq!(report.contract_address, Address::repeat_byte(0x42).to_string());
        assert_eq!(report.deployer, Address::repeat_byte(0xab).to_string());
        assert_eq!(report.network, "Test Network");
        assert_eq!(report.deployment_time, "2024-05-01T12:30:00.000Z");
        assert_eq!(report.transaction_hash, B256::repeat_byte(0x07).to_string());
    }

    #[test]
    fn test_serializes_flat_camel_case_strings() {
        let json = serde_json::to_value(sample_report()).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "contractAddress",
                "contractName",
                "deployer",
                "deploymentTime",
                "network",
                "transactionHash"
            ]
        );
        assert!(object.values().all(|v| v.as_str().is_some_and(|s| !s.is_empty())));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new("chainship-report").unwrap();
        let path = dir.path().join("deployments/widget.json");

        let report = sample_report();
        report.save_to_file(&path).unwrap();

        let saved: DeploymentReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, report);
    }

    #[test]
    fn test_summary_table_lists_address() {
        let rendered = sample_report().summary_table().to_string();
        assert!(rendered.contains(&Address::repeat_byte(0x42).to_string()));
        assert!(rendered.contains("Test Network"));
    }
}
