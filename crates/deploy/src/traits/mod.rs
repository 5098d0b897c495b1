//! Collaborator seams of a deployment run.
//!
//! The orchestrator never talks to a network or a build directory directly; it
//! is handed a [`ChainClient`] and a [`ContractFactory`] and drives them.

mod chain;
mod factory;

pub use chain::ChainClient;
pub use factory::{ContractFactory, Factory};
