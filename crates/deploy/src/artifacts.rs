//! Compiled contract artifacts and the factory that deploys them.
//!
//! Artifacts follow the Hardhat layout: one JSON file per contract, named after
//! the contract, somewhere below the artifacts directory
//! (`artifacts/contracts/Counter.sol/Counter.json`). Debug companions
//! (`*.dbg.json`) are ignored.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use alloy_core::primitives::Bytes;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    traits::{ChainClient, ContractFactory, Factory},
    types::{DeploymentTransaction, Signer, TransactionRequest},
};

/// Default location of compiled artifacts, relative to the working directory.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// A compiled contract: its ABI and creation bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    #[serde(default)]
    pub abi: Value,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Load an artifact file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))
    }
}

/// Resolves contract names to artifacts found below a directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the artifact file for `contract_name`.
    fn find(&self, contract_name: &str) -> Result<PathBuf> {
        if !self.root.is_dir() {
            anyhow::bail!(
                "Artifacts directory not found: {} (compile the contracts first)",
                self.root.display()
            );
        }

        let file_name = format!("{}.json", contract_name);
        let mut pending = vec![self.root.clone()];
        let mut found = Vec::new();

        while let Some(dir) = pending.pop() {
            let entries = std::fs::read_dir(&dir)
                .with_context(|| format!("Failed to read directory {}", dir.display()))?;
            for entry in entries {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.file_name() == Some(OsStr::new(&file_name)) {
                    found.push(path);
                }
            }
        }

        match found.len() {
            0 => anyhow::bail!(
                "No artifact named {} below {}",
                file_name,
                self.root.display()
            ),
            1 => Ok(found.remove(0)),
            _ => {
                found.sort();
                anyhow::bail!(
                    "Contract name {} is ambiguous: {}",
                    contract_name,
                    found
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl ContractFactory for ArtifactStore {
    type Factory = ArtifactFactory;

    fn resolve(&self, contract_name: &str) -> Result<ArtifactFactory> {
        let path = self.find(contract_name)?;
        let artifact = ContractArtifact::load_from_file(&path)?;
        tracing::debug!(path = %path.display(), "Loaded contract artifact");
        ArtifactFactory::new(artifact)
    }
}

/// Deploys one compiled contract.
#[derive(Debug, Clone)]
pub struct ArtifactFactory {
    artifact: ContractArtifact,
}

impl ArtifactFactory {
    /// Wrap an artifact, rejecting contracts without creation code.
    pub fn new(artifact: ContractArtifact) -> Result<Self> {
        if artifact.bytecode.is_empty() {
            anyhow::bail!(
                "Contract {} has no bytecode (abstract contract or interface?)",
                artifact.contract_name
            );
        }
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }
}

impl Factory for ArtifactFactory {
    fn contract_name(&self) -> &str {
        &self.artifact.contract_name
    }

    async fn deploy<C: ChainClient>(
        &self,
        client: &C,
        signer: &Signer,
    ) -> Result<DeploymentTransaction> {
        let request = TransactionRequest::create(signer.address, self.artifact.bytecode.clone());
        let hash = client.send_transaction(request).await?;

        Ok(DeploymentTransaction {
            hash,
            contract_name: self.artifact.contract_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    fn write_artifact(root: &Path, source: &str, name: &str, bytecode: &str) {
        let dir = root.join("contracts").join(source);
        std::fs::create_dir_all(&dir).unwrap();
        let artifact = serde_json::json!({
            "_format": "hh-sol-artifact-1",
            "contractName": name,
            "sourceName": format!("contracts/{}", source),
            "abi": [
                {
                    "type": "function",
                    "name": "nextTaskId",
                    "inputs": [],
                    "outputs": [{"type": "uint256"}]
                }
            ],
            "bytecode": bytecode,
            "deployedBytecode": bytecode,
        });
        std::fs::write(dir.join(format!("{}.json", name)), artifact.to_string()).unwrap();
        std::fs::write(dir.join(format!("{}.dbg.json", name)), "{}").unwrap();
    }

    #[test]
    fn test_resolve_nested_artifact() {
        let dir = TempDir::new("chainship-artifacts").unwrap();
        write_artifact(dir.path(), "Widget.sol", "Widget", "0x6080604052");

        let factory = ArtifactStore::new(dir.path()).resolve("Widget").unwrap();
        assert_eq!(factory.contract_name(), "Widget");
        assert_eq!(factory.artifact().bytecode.len(), 5);
        assert_eq!(factory.artifact().abi[0]["name"], "nextTaskId");
    }

    #[test]
    fn test_resolve_unknown_contract() {
        let dir = TempDir::new("chainship-artifacts").unwrap();
        write_artifact(dir.path(), "Widget.sol", "Widget", "0x6080604052");

        let err = ArtifactStore::new(dir.path()).resolve("Gadget").unwrap_err();
        assert!(err.to_string().contains("No artifact named Gadget.json"));
    }

    #[test]
    fn test_resolve_rejects_interface() {
        let dir = TempDir::new("chainship-artifacts").unwrap();
        write_artifact(dir.path(), "IWidget.sol", "IWidget", "0x");

        let err = ArtifactStore::new(dir.path()).resolve("IWidget").unwrap_err();
        assert!(err.to_string().contains("has no bytecode"));
    }

    #[test]
    fn test_resolve_ambiguous_name() {
        let dir = TempDir::new("chainship-artifacts").unwrap();
        write_artifact(dir.path(), "A.sol", "Widget", "0x60");
        write_artifact(dir.path(), "B.sol", "Widget", "0x60");

        let err = ArtifactStore::new(dir.path()).resolve("Widget").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_missing_artifacts_directory() {
        let err = ArtifactStore::new("/nonexistent/chainship/artifacts")
            .resolve("Widget")
            .unwrap_err();
        assert!(err.to_string().contains("Artifacts directory not found"));
    }
}
