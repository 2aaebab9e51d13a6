//! Approval error types for the decision engine.
//!
//! This module defines all error types that can occur during chain
//! initialization, decision processing, and scope checks.

use thiserror::Error;

use claimflow_shared::types::{ClaimId, UserId, WorkflowId};

use crate::approval::types::ClaimStatus;

/// Errors that can occur during approval operations.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// A step's required approval percentage is outside [1, 100].
    #[error("Step {step} has required approval percentage {percentage}, expected 1-100")]
    InvalidPercentage {
        /// The offending step number.
        step: u32,
        /// The configured percentage.
        percentage: u8,
    },

    /// A step declares an override approver that is not a member of the
    /// workflow's company.
    #[error("Step {step} override approver {approver} is not a member of the company")]
    UnknownOverrideApprover {
        /// The offending step number.
        step: u32,
        /// The dangling approver reference.
        approver: UserId,
    },

    /// A declared step number is zero or collides with a reserved marker.
    #[error("Step number {step} is not a valid declared step")]
    InvalidStepNumber {
        /// The offending step number.
        step: u32,
    },

    /// Two steps declare the same step number.
    #[error("Step number {step} is declared more than once")]
    DuplicateStepNumber {
        /// The duplicated step number.
        step: u32,
    },

    /// The workflow is not accepting new claims.
    #[error("Workflow {0} is inactive")]
    WorkflowInactive(WorkflowId),

    /// Workflow definition not found.
    #[error("Workflow {0} not found")]
    WorkflowNotFound(WorkflowId),

    /// Claim not found.
    #[error("Claim {0} not found")]
    ClaimNotFound(ClaimId),

    /// User not found in the directory.
    #[error("User {0} not found")]
    UserNotFound(UserId),

    /// A decision was attempted on a terminal ledger.
    #[error("Ledger is already terminal with status {status}")]
    AlreadyTerminal {
        /// The terminal status of the ledger.
        status: ClaimStatus,
    },

    /// The actor is not entitled to act on this claim at all.
    #[error("User {actor} is out of scope for this claim")]
    OutOfScope {
        /// The actor who attempted the decision.
        actor: UserId,
    },

    /// The actor is in scope but has no Pending entry at the active step.
    #[error("User {actor} has no pending approval at the active step")]
    NotActiveApprover {
        /// The actor who attempted the decision.
        actor: UserId,
    },

    /// Optimistic version check failed; the caller may retry.
    #[error("Concurrent modification of claim {0}")]
    Conflict(ClaimId),

    /// The bounded retry loop exhausted its attempts.
    #[error("Gave up on claim {claim} after {attempts} conflicting attempts")]
    RetriesExhausted {
        /// The contended claim.
        claim: ClaimId,
        /// How many attempts were made.
        attempts: u32,
    },

    /// Store backend failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApprovalError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidPercentage { .. }
            | Self::UnknownOverrideApprover { .. }
            | Self::InvalidStepNumber { .. }
            | Self::DuplicateStepNumber { .. }
            | Self::WorkflowInactive(_) => 400,

            Self::OutOfScope { .. } | Self::NotActiveApprover { .. } => 403,

            Self::WorkflowNotFound(_) | Self::ClaimNotFound(_) | Self::UserNotFound(_) => 404,

            Self::Conflict(_) | Self::RetriesExhausted { .. } => 409,

            Self::AlreadyTerminal { .. } => 422,

            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPercentage { .. } => "INVALID_PERCENTAGE",
            Self::UnknownOverrideApprover { .. } => "UNKNOWN_OVERRIDE_APPROVER",
            Self::InvalidStepNumber { .. } => "INVALID_STEP_NUMBER",
            Self::DuplicateStepNumber { .. } => "DUPLICATE_STEP_NUMBER",
            Self::WorkflowInactive(_) => "WORKFLOW_INACTIVE",
            Self::WorkflowNotFound(_) => "WORKFLOW_NOT_FOUND",
            Self::ClaimNotFound(_) => "CLAIM_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::AlreadyTerminal { .. } => "ALREADY_TERMINAL",
            Self::OutOfScope { .. } => "OUT_OF_SCOPE",
            Self::NotActiveApprover { .. } => "NOT_ACTIVE_APPROVER",
            Self::Conflict(_) => "CONCURRENCY_CONFLICT",
            Self::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true if the operation may be retried against a fresh read.
    ///
    /// Validation and permission errors are never retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<ApprovalError> for claimflow_shared::AppError {
    fn from(err: ApprovalError) -> Self {
        let msg = err.to_string();
        match err {
            ApprovalError::InvalidPercentage { .. }
            | ApprovalError::UnknownOverrideApprover { .. }
            | ApprovalError::InvalidStepNumber { .. }
            | ApprovalError::DuplicateStepNumber { .. }
            | ApprovalError::WorkflowInactive(_) => Self::Validation(msg),

            ApprovalError::OutOfScope { .. } | ApprovalError::NotActiveApprover { .. } => {
                Self::Forbidden(msg)
            }

            ApprovalError::WorkflowNotFound(_)
            | ApprovalError::ClaimNotFound(_)
            | ApprovalError::UserNotFound(_) => Self::NotFound(msg),

            ApprovalError::Conflict(_) | ApprovalError::RetriesExhausted { .. } => {
                Self::Conflict(msg)
            }

            ApprovalError::AlreadyTerminal { .. } => Self::BusinessRule(msg),

            ApprovalError::Storage(_) => Self::Storage(msg),
        }
    }
}
