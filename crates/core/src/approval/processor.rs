//! Approval decision processing.
//!
//! This module implements the per-decision state machine: it applies one
//! approver decision to a ledger, enforcing step activation order, the
//! percentage threshold rule, override-approver bypass, rejection
//! propagation, and the admin-override escape hatch.

use chrono::{DateTime, Utc};

use claimflow_shared::types::UserId;

use crate::approval::error::ApprovalError;
use crate::approval::types::{
    ADMIN_OVERRIDE_STEP, ApprovalEntry, ApprovalLedger, ClaimStatus, Decision, DecisionOutcome,
    EntryDecision, WorkflowDefinition,
};

/// Stateless processor applying one decision at a time to a ledger.
///
/// The caller is responsible for scope checks and for committing the
/// mutated ledger atomically; `decide` itself never performs I/O.
pub struct DecisionProcessor;

impl DecisionProcessor {
    /// Applies a single approver decision to the ledger.
    ///
    /// # Arguments
    /// * `ledger` - The claim's approval ledger, mutated in place
    /// * `workflow` - The workflow definition the ledger was built from
    /// * `actor` - The deciding user
    /// * `can_override` - Whether the actor holds the admin override capability
    /// * `decision` - Approve or reject
    /// * `comment` - Free-form comment stored on the entry
    /// * `now` - Decision timestamp
    ///
    /// # Errors
    /// * `AlreadyTerminal` - the ledger already reached a terminal state
    /// * `NotActiveApprover` - the actor has no Pending entry at the active step
    pub fn decide(
        ledger: &mut ApprovalLedger,
        workflow: &WorkflowDefinition,
        actor: UserId,
        can_override: bool,
        decision: Decision,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<DecisionOutcome, ApprovalError> {
        if ledger.status.is_terminal() {
            return Err(ApprovalError::AlreadyTerminal {
                status: ledger.status,
            });
        }

        let Some(active_step) = ledger.active_step() else {
            // Terminal by exhaustion: nothing is decidable via the normal
            // path. Only the admin fallback can finalize such a ledger.
            if can_override {
                return Ok(Self::finalize_by_override(
                    ledger, actor, decision, comment, now,
                ));
            }
            return Err(ApprovalError::NotActiveApprover { actor });
        };

        let located = Self::locate_entry(ledger, active_step, actor, can_override)?;

        let entry = &mut ledger.entries[located];
        entry.decision = decision.into();
        entry.comment = comment.to_string();
        entry.decided_at = Some(now);
        let step = entry.step;

        match decision {
            Decision::Rejected => {
                ledger.status = ClaimStatus::Rejected;
                // Entries above the rejected step are moot; tombstone them
                // instead of deleting so the history stays append-only.
                for e in &mut ledger.entries {
                    if e.step > step && e.decision.is_pending() {
                        e.decision = EntryDecision::Superseded;
                    }
                }
                Ok(DecisionOutcome::Rejected { step })
            }
            Decision::Approved => {
                if Self::step_satisfied(ledger, workflow, step, actor) {
                    Ok(Self::advance(ledger, workflow, step))
                } else {
                    Ok(DecisionOutcome::Recorded { step })
                }
            }
        }
    }

    /// Finds the index of the entry the decision applies to.
    ///
    /// Normally the actor's own Pending entry at the active step. An actor
    /// with the override capability may instead take over any Pending
    /// entry at the active step.
    fn locate_entry(
        ledger: &ApprovalLedger,
        active_step: u32,
        actor: UserId,
        can_override: bool,
    ) -> Result<usize, ApprovalError> {
        let own = ledger.entries.iter().position(|e| {
            e.step == active_step && e.approver == actor && e.decision.is_pending()
        });
        if let Some(idx) = own {
            return Ok(idx);
        }
        if can_override
            && let Some(idx) = ledger
                .entries
                .iter()
                .position(|e| e.step == active_step && e.decision.is_pending())
        {
            return Ok(idx);
        }
        Err(ApprovalError::NotActiveApprover { actor })
    }

    /// The admin fallback for ledgers with no Pending entries left: sets
    /// the terminal status directly and appends a single audit-only entry
    /// carrying the reserved override marker.
    fn finalize_by_override(
        ledger: &mut ApprovalLedger,
        actor: UserId,
        decision: Decision,
        comment: &str,
        now: DateTime<Utc>,
    ) -> DecisionOutcome {
        let status = ClaimStatus::from(decision);
        ledger.status = status;
        ledger.entries.push(ApprovalEntry {
            step: ADMIN_OVERRIDE_STEP,
            approver: actor,
            decision: decision.into(),
            comment: comment.to_string(),
            decided_at: Some(now),
        });
        DecisionOutcome::OverrideFinalized { status }
    }

    /// Evaluates whether a step is satisfied after an approval landed on it.
    fn step_satisfied(
        ledger: &ApprovalLedger,
        workflow: &WorkflowDefinition,
        step: u32,
        actor: UserId,
    ) -> bool {
        let config = workflow.step(step);

        // A designated override approver satisfies the step alone.
        if config.is_some_and(|c| c.specific_approver_override == Some(actor)) {
            return true;
        }

        // The manager pre-step has no declared config: one entry, implicit
        // 100% requirement.
        let required = config.map_or(100, |c| c.required_approval_percentage);

        let mut total = 0usize;
        let mut approved = 0usize;
        for e in ledger.entries_at(step) {
            total += 1;
            if e.decision == EntryDecision::Approved {
                approved += 1;
            }
        }

        // Exact rational comparison; floating division would produce
        // boundary false positives (2/3 vs a 67% requirement must fail).
        total == 0 || approved * 100 >= usize::from(required) * total
    }

    /// Advances past a satisfied step.
    ///
    /// The new current step is the next declared step that still has an
    /// effective Pending entry; declared steps with zero approvers (or
    /// whose entries are already decided) cannot block and are skipped.
    /// With nothing left to decide the claim is fully approved.
    fn advance(
        ledger: &mut ApprovalLedger,
        workflow: &WorkflowDefinition,
        satisfied_step: u32,
    ) -> DecisionOutcome {
        let mut candidate = workflow.next_step_after(satisfied_step);
        while let Some(next) = candidate {
            if ledger.has_pending_at(next) {
                if ledger.current_step == next {
                    // A concurrent approval already moved the pointer here;
                    // recording the decision is all that was left to do.
                    return DecisionOutcome::Recorded {
                        step: satisfied_step,
                    };
                }
                ledger.current_step = next;
                return DecisionOutcome::Advanced {
                    from: satisfied_step,
                    to: next,
                };
            }
            candidate = workflow.next_step_after(next);
        }

        ledger.status = ClaimStatus::Approved;
        DecisionOutcome::FullyApproved
    }
}
