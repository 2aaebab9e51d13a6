//! Approval service facade.
//!
//! Wires the store seams, the scope check, and the decision processor
//! into the two operations exposed to the surrounding application:
//! chain initialization at submission, and decision processing. Each
//! decision executes as one atomic read-modify-write against the claim
//! store, retried a bounded number of times on write conflicts.

use chrono::Utc;
use tracing::{info, warn};

use claimflow_shared::config::EngineConfig;
use claimflow_shared::types::{ClaimId, UserId, WorkflowId};

use crate::approval::chain::ChainInitializer;
use crate::approval::error::ApprovalError;
use crate::approval::processor::DecisionProcessor;
use crate::approval::scope::AuthorizationScope;
use crate::approval::store::{ClaimStore, UserDirectory, WorkflowStore};
use crate::approval::types::{ApprovalLedger, Decision, DecisionOutcome};

/// The approval engine's entry point for the surrounding application.
#[derive(Debug)]
pub struct ApprovalService<W, C, U> {
    workflows: W,
    claims: C,
    directory: U,
    max_retries: u32,
}

impl<W, C, U> ApprovalService<W, C, U>
where
    W: WorkflowStore,
    C: ClaimStore,
    U: UserDirectory,
{
    /// Creates a service over the given stores.
    pub fn new(workflows: W, claims: C, directory: U, config: &EngineConfig) -> Self {
        Self {
            workflows,
            claims,
            directory,
            max_retries: config.max_decide_retries,
        }
    }

    /// Materializes the approval ledger for a newly submitted claim.
    ///
    /// # Errors
    ///
    /// * `WorkflowNotFound` / `WorkflowInactive` - bad workflow reference
    /// * `UserNotFound` - unknown submitter
    /// * `OutOfScope` - submitter does not belong to the workflow's company
    /// * validation errors from [`ChainInitializer::validate`]
    pub fn initialize_chain(
        &self,
        workflow_id: WorkflowId,
        submitter: UserId,
    ) -> Result<ApprovalLedger, ApprovalError> {
        let workflow = self.workflows.get_by_id(workflow_id)?;
        if !workflow.is_active {
            return Err(ApprovalError::WorkflowInactive(workflow_id));
        }

        let submitter_profile = self.directory.profile(submitter)?;
        if submitter_profile.company != workflow.company {
            return Err(ApprovalError::OutOfScope { actor: submitter });
        }

        let ledger = ChainInitializer::initialize(&workflow, submitter_profile.manager, |user| {
            self.directory.is_member(workflow.company, user)
        })?;

        info!(
            workflow = %workflow_id,
            submitter = %submitter,
            entries = ledger.entries.len(),
            current_step = ledger.current_step,
            "approval chain initialized"
        );
        Ok(ledger)
    }

    /// Applies one approver decision to a claim.
    ///
    /// Scope is checked before the state machine runs; a write conflict
    /// restarts the whole read-modify-write cycle against a freshly
    /// loaded ledger, up to the configured retry bound.
    ///
    /// # Errors
    ///
    /// All engine errors pass through unchanged; `RetriesExhausted` is
    /// returned when every attempt hit a write conflict.
    pub fn decide(
        &self,
        claim_id: ClaimId,
        actor: UserId,
        decision: Decision,
        comment: &str,
    ) -> Result<DecisionOutcome, ApprovalError> {
        let actor_profile = self.directory.profile(actor)?;
        let attempts = self.max_retries.saturating_add(1);

        for attempt in 0..attempts {
            let (mut record, token) = self.claims.load(claim_id)?;
            let submitter_profile = self.directory.profile(record.submitted_by)?;
            AuthorizationScope::can_decide(&actor_profile, &submitter_profile, record.company)?;

            let workflow = self.workflows.get_by_id(record.workflow)?;
            let outcome = DecisionProcessor::decide(
                &mut record.ledger,
                &workflow,
                actor,
                actor_profile.role.can_override(),
                decision,
                comment,
                Utc::now(),
            )?;

            match self.claims.save(&record, token) {
                Ok(()) => {
                    info!(
                        claim = %claim_id,
                        actor = %actor,
                        decision = %decision,
                        status = %record.ledger.status,
                        "approval decision committed"
                    );
                    return Ok(outcome);
                }
                Err(err) if err.is_retryable() => {
                    warn!(claim = %claim_id, attempt, "write conflict, retrying against a fresh ledger");
                }
                Err(err) => return Err(err),
            }
        }

        Err(ApprovalError::RetriesExhausted {
            claim: claim_id,
            attempts,
        })
    }
}
