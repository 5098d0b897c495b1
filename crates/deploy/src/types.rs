//! Values exchanged between the orchestrator and its collaborators.

use alloy_core::primitives::{Address, B256, Bytes, U256, keccak256, utils::format_ether};
use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

/// An account the chain client can authorize transactions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub address: Address,
}

impl From<Address> for Signer {
    fn from(address: Address) -> Self {
        Self { address }
    }
}

/// A transaction to broadcast from a node-managed account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    /// Destination. `None` for contract creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(rename = "data")]
    pub input: Bytes,
}

impl TransactionRequest {
    /// Build a contract-creation request.
    pub fn create(from: Address, bytecode: Bytes) -> Self {
        Self {
            from,
            to: None,
            input: bytecode,
        }
    }
}

/// A broadcast deployment that has not been confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTransaction {
    pub hash: B256,
    /// Name of the contract the transaction creates.
    pub contract_name: String,
}

/// Reference to a contract instance whose creation has been confirmed.
///
/// Handles are only produced by [`crate::ChainClient::wait_for_confirmation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployedContractHandle {
    pub address: Address,
    pub transaction_hash: B256,
    pub block_number: u64,
}

/// How a value read back from a contract is displayed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValueUnit {
    #[default]
    Plain,
    Ether,
}

/// A read-only accessor on the deployed contract returning a single integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadCall {
    /// Human readable label used in logs.
    pub label: String,
    /// Solidity function signature, e.g. `nextTaskId()`.
    pub signature: String,
    #[serde(default)]
    pub unit: ValueUnit,
}

impl ReadCall {
    pub fn new(label: impl Into<String>, signature: impl Into<String>, unit: ValueUnit) -> Self {
        Self {
            label: label.into(),
            signature: signature.into(),
            unit,
        }
    }

    /// The 4-byte function selector of the signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// ABI calldata for the call. Accessors take no arguments, so this is the bare selector.
    pub fn calldata(&self) -> Bytes {
        Bytes::copy_from_slice(&self.selector())
    }

    /// Format a value returned by this call for display.
    pub fn format_value(&self, value: U256) -> String {
        match self.unit {
            ValueUnit::Plain => value.to_string(),
            ValueUnit::Ether => format!("{} ETH", format_ether(value)),
        }
    }
}

/// A single value read back from a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadValue {
    pub call: ReadCall,
    pub value: U256,
}

impl ReadValue {
    pub fn display(&self) -> String {
        self.call.format_value(self.value)
    }
}

/// Baseline state read from a freshly deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deref, From)]
pub struct ContractStateSnapshot(Vec<ReadValue>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_matches_known_signature() {
        let call = ReadCall::new("transfer", "transfer(address,uint256)", ValueUnit::Plain);
        assert_eq!(call.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(call.calldata().len(), 4);
    }

    #[test]
    fn test_format_value_by_unit() {
        let plain = ReadCall::new("Next Task ID", "nextTaskId()", ValueUnit::Plain);
        assert_eq!(plain.format_value(U256::from(1)), "1");

        let ether = ReadCall::new("Minimum Stake", "MIN_STAKE()", ValueUnit::Ether);
        let value = U256::from(10_000_000_000_000_000u64);
        let formatted = ether.format_value(value);
        assert!(formatted.starts_with("0.01"), "{formatted}");
        assert!(formatted.ends_with(" ETH"));
    }

    #[test]
    fn test_create_request_has_no_destination() {
        let request = TransactionRequest::create(Address::ZERO, Bytes::from_static(&[0x60, 0x80]));
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("to").is_none());
        assert_eq!(json["data"], "0x6080");
    }

    #[test]
    fn test_snapshot_derefs_to_reads() {
        let snapshot = ContractStateSnapshot::from(vec![ReadValue {
            call: ReadCall::new("Next Task ID", "nextTaskId()", ValueUnit::Plain),
            value: U256::from(1),
        }]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].value, U256::from(1));
        assert_eq!(snapshot[0].display(), "1");
    }
}
