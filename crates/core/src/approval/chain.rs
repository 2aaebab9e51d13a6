//! Approval chain initialization.
//!
//! Materializes the approval ledger for a newly submitted claim from a
//! workflow definition. Entries for every declared step are created up
//! front; advancement later only moves the activation pointer, it never
//! inserts entries.

use std::collections::HashSet;

use claimflow_shared::types::UserId;

use crate::approval::error::ApprovalError;
use crate::approval::types::{
    ADMIN_OVERRIDE_STEP, ApprovalEntry, ApprovalLedger, ClaimStatus, MANAGER_STEP,
    WorkflowDefinition,
};

/// Stateless builder for the initial approval ledger of a claim.
pub struct ChainInitializer;

impl ChainInitializer {
    /// Validates a workflow definition's step configuration.
    ///
    /// `is_company_member` resolves whether an identity belongs to the
    /// workflow's company; it is consulted for every declared override
    /// approver.
    ///
    /// # Errors
    ///
    /// * `InvalidStepNumber` - a step number is zero or reserved
    /// * `DuplicateStepNumber` - two steps share a number
    /// * `InvalidPercentage` - a percentage is outside [1, 100]
    /// * `UnknownOverrideApprover` - an override identity is not a company member
    pub fn validate(
        workflow: &WorkflowDefinition,
        mut is_company_member: impl FnMut(UserId) -> Result<bool, ApprovalError>,
    ) -> Result<(), ApprovalError> {
        let mut seen = HashSet::new();
        for step in &workflow.steps {
            if step.step_number == MANAGER_STEP || step.step_number == ADMIN_OVERRIDE_STEP {
                return Err(ApprovalError::InvalidStepNumber {
                    step: step.step_number,
                });
            }
            if !seen.insert(step.step_number) {
                return Err(ApprovalError::DuplicateStepNumber {
                    step: step.step_number,
                });
            }
            if !(1..=100).contains(&step.required_approval_percentage) {
                return Err(ApprovalError::InvalidPercentage {
                    step: step.step_number,
                    percentage: step.required_approval_percentage,
                });
            }
            if let Some(approver) = step.specific_approver_override
                && !is_company_member(approver)?
            {
                return Err(ApprovalError::UnknownOverrideApprover {
                    step: step.step_number,
                    approver,
                });
            }
        }
        Ok(())
    }

    /// Builds the initial ledger for a newly submitted claim.
    ///
    /// A manager pre-step entry at step 0 is created when the workflow
    /// includes manager approval and the submitter has a manager on
    /// record. One Pending entry is created per approver per declared
    /// step; a step declared with zero approvers contributes no entries
    /// but remains part of the step sequence for advancement.
    ///
    /// # Errors
    ///
    /// Fails with the validation errors documented on [`Self::validate`].
    pub fn initialize(
        workflow: &WorkflowDefinition,
        manager: Option<UserId>,
        is_company_member: impl FnMut(UserId) -> Result<bool, ApprovalError>,
    ) -> Result<ApprovalLedger, ApprovalError> {
        Self::validate(workflow, is_company_member)?;

        let mut entries = Vec::new();
        let current_step = if workflow.include_manager_approval
            && let Some(manager) = manager
        {
            entries.push(ApprovalEntry::pending(MANAGER_STEP, manager));
            MANAGER_STEP
        } else {
            workflow.first_step_number().unwrap_or(1)
        };

        for step in &workflow.steps {
            for &approver in &step.approvers {
                entries.push(ApprovalEntry::pending(step.step_number, approver));
            }
        }

        Ok(ApprovalLedger {
            status: ClaimStatus::Pending,
            current_step,
            entries,
        })
    }
}
