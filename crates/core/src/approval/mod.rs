//! Expense claim approval engine for Claimflow.
//!
//! This module implements the approval chain state machine: ledger
//! materialization at submission, per-decision processing with step
//! activation, percentage thresholds, override bypass and rejection
//! propagation, plus the authorization scope rules.
//!
//! # Modules
//!
//! - `types` - Approval domain types (ledger, entries, workflow definition)
//! - `error` - Approval-specific error types
//! - `chain` - Ledger materialization at claim submission
//! - `processor` - The per-decision state machine
//! - `scope` - Roles and authorization scope predicates
//! - `store` - Store seams (workflows, claims, user directory)
//! - `memory` - In-memory store implementations
//! - `service` - The facade exposed to the surrounding application

pub mod chain;
pub mod error;
pub mod memory;
pub mod processor;
pub mod scope;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod chain_props;
#[cfg(test)]
mod processor_props;

pub use chain::ChainInitializer;
pub use error::ApprovalError;
pub use memory::{InMemoryClaimStore, InMemoryUserDirectory, InMemoryWorkflowStore};
pub use processor::DecisionProcessor;
pub use scope::{AuthorizationScope, Role, UserProfile};
pub use service::ApprovalService;
pub use store::{ClaimStore, UserDirectory, VersionToken, WorkflowStore};
pub use types::{
    ADMIN_OVERRIDE_STEP, ApprovalEntry, ApprovalLedger, ApprovalStep, ClaimRecord, ClaimStatus,
    Decision, DecisionOutcome, EntryDecision, MANAGER_STEP, WorkflowDefinition,
};
