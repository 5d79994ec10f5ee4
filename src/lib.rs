//! batchup - Batched dependency updater library
//!
//! This library provides the core functionality for discovering and batching
//! dependency updates and driving an external, ecosystem-specific update
//! tool:
//! - Version-ceiling resolution from central package declaration files
//! - Update eligibility classification
//! - Batching of related updates into change-set groups
//! - Secure invocation of the external update/discovery tool

pub mod cli;
pub mod constraint;
pub mod domain;
pub mod ecosystem;
pub mod eligibility;
pub mod error;
pub mod fetch;
pub mod grouping;
pub mod invoker;
pub mod orchestrator;
pub mod output;
pub mod progress;
