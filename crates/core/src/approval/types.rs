//! Approval domain types for the expense claim decision engine.
//!
//! This module defines the approval ledger embedded in each expense claim,
//! the workflow definition it is materialized from, and the status enums
//! shared by the initializer and the decision processor.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use claimflow_shared::types::{ClaimId, CompanyId, UserId, WorkflowId};

/// Step number of the manager pre-step created when a workflow includes
/// manager approval and the submitter has a manager on record.
pub const MANAGER_STEP: u32 = 0;

/// Reserved step marker for the single audit entry appended when an admin
/// finalizes a claim that has no Pending entries left. Never a real step.
pub const ADMIN_OVERRIDE_STEP: u32 = u32::MAX;

/// Overall status of an expense claim's approval ledger.
///
/// A ledger starts Pending and makes exactly one terminal transition,
/// either to Approved or to Rejected. Once terminal it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// The claim is still moving through its approval chain.
    Pending,
    /// Every required step was satisfied.
    Approved,
    /// A rejection terminated the chain.
    Rejected,
}

impl ClaimStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once the ledger has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decision submitted by an approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Approve the claim at the actor's step.
    Approved,
    /// Reject the claim, terminating the chain.
    Rejected,
}

impl Decision {
    /// Returns the string representation of the decision.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recorded state of a single approval entry.
///
/// `Superseded` is a tombstone: when a rejection at step *k* terminates the
/// chain, entries at steps above *k* are never decided. They stay in the
/// ledger for the audit trail but are excluded from the effective view used
/// for activation and percentage math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDecision {
    /// Awaiting this approver's decision.
    Pending,
    /// The approver approved.
    Approved,
    /// The approver rejected.
    Rejected,
    /// Tombstoned by a rejection at an earlier step; never decided.
    Superseded,
}

impl EntryDecision {
    /// Returns the string representation of the entry decision.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Superseded => "superseded",
        }
    }

    /// Returns true if the entry still awaits a decision.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the entry counts toward activation and percentage
    /// math (everything except tombstones).
    #[must_use]
    pub const fn is_effective(&self) -> bool {
        !matches!(self, Self::Superseded)
    }
}

impl fmt::Display for EntryDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Decision> for EntryDecision {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => Self::Approved,
            Decision::Rejected => Self::Rejected,
        }
    }
}

impl From<Decision> for ClaimStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => Self::Approved,
            Decision::Rejected => Self::Rejected,
        }
    }
}

/// One approver's slot in the ledger, created at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEntry {
    /// Step this entry belongs to (0 = manager pre-step).
    pub step: u32,
    /// The approver expected to decide.
    pub approver: UserId,
    /// Current state of the entry.
    pub decision: EntryDecision,
    /// Comment captured with the decision.
    pub comment: String,
    /// Set exactly once, on the transition out of Pending.
    pub decided_at: Option<DateTime<Utc>>,
}

impl ApprovalEntry {
    /// Creates a fresh Pending entry for an approver at a step.
    #[must_use]
    pub fn pending(step: u32, approver: UserId) -> Self {
        Self {
            step,
            approver,
            decision: EntryDecision::Pending,
            comment: String::new(),
            decided_at: None,
        }
    }
}

/// Per-claim record of approval progress and full decision history.
///
/// Created once by the chain initializer at submission time and mutated
/// exclusively by the decision processor afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalLedger {
    /// Overall claim status.
    pub status: ClaimStatus,
    /// Bookkeeping pointer to the step most recently activated.
    pub current_step: u32,
    /// Append-only decision history, pre-materialized for every step.
    pub entries: Vec<ApprovalEntry>,
}

impl ApprovalLedger {
    /// Iterates the effective (non-tombstoned) entries.
    pub fn effective_entries(&self) -> impl Iterator<Item = &ApprovalEntry> {
        self.entries.iter().filter(|e| e.decision.is_effective())
    }

    /// Iterates the effective entries at one step.
    pub fn entries_at(&self, step: u32) -> impl Iterator<Item = &ApprovalEntry> {
        self.effective_entries().filter(move |e| e.step == step)
    }

    /// The active step: the lowest step number with at least one effective
    /// Pending entry. `None` when no decisions remain possible via the
    /// normal path.
    #[must_use]
    pub fn active_step(&self) -> Option<u32> {
        self.effective_entries()
            .filter(|e| e.decision.is_pending())
            .map(|e| e.step)
            .min()
    }

    /// Returns true if any effective Pending entry exists at a step.
    #[must_use]
    pub fn has_pending_at(&self, step: u32) -> bool {
        self.entries_at(step).any(|e| e.decision.is_pending())
    }
}

/// One stage of a workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStep {
    /// Declared step number (>= 1, unique within the workflow, not
    /// necessarily contiguous).
    pub step_number: u32,
    /// Approvers expected to decide at this step. May be empty, in which
    /// case the step is auto-satisfied and never blocks advancement.
    pub approvers: Vec<UserId>,
    /// Minimum percentage of approvers that must approve, inclusive.
    pub required_approval_percentage: u8,
    /// Designated approver whose single approval satisfies the step
    /// regardless of the percentage rule.
    pub specific_approver_override: Option<UserId>,
}

/// Company-level configuration of ordered approval steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Unique identifier for the workflow.
    pub id: WorkflowId,
    /// Owning company.
    pub company: CompanyId,
    /// Human-readable workflow name.
    pub name: String,
    /// Whether a manager pre-step is created at submission.
    pub include_manager_approval: bool,
    /// Inactive workflows cannot receive new claims.
    pub is_active: bool,
    /// Declared steps. Order in this vector is irrelevant; step numbers
    /// define the sequence.
    pub steps: Vec<ApprovalStep>,
}

impl WorkflowDefinition {
    /// Looks up the declared step with the given number.
    #[must_use]
    pub fn step(&self, step_number: u32) -> Option<&ApprovalStep> {
        self.steps.iter().find(|s| s.step_number == step_number)
    }

    /// The lowest declared step number, if any steps are declared.
    #[must_use]
    pub fn first_step_number(&self) -> Option<u32> {
        self.steps.iter().map(|s| s.step_number).min()
    }

    /// The successor of a step: the smallest declared number greater than
    /// `step_number`.
    #[must_use]
    pub fn next_step_after(&self, step_number: u32) -> Option<u32> {
        self.steps
            .iter()
            .map(|s| s.step_number)
            .filter(|&n| n > step_number)
            .min()
    }
}

/// The claim head the engine reads and writes through the claim store.
///
/// Receipt, currency, and category handling belong to the surrounding
/// application; only the fields the engine needs are carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Unique identifier for the claim.
    pub id: ClaimId,
    /// The employee who submitted the claim.
    pub submitted_by: UserId,
    /// Owning company.
    pub company: CompanyId,
    /// The workflow the approval chain was materialized from.
    pub workflow: WorkflowId,
    /// Claim amount in the company's default currency.
    pub amount: Decimal,
    /// Approval progress and history.
    pub ledger: ApprovalLedger,
}

/// Result of applying one decision to a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The decision was recorded but the step threshold is not yet met;
    /// the ledger stays Pending at the same step.
    Recorded {
        /// The step the decision landed on.
        step: u32,
    },
    /// The step was satisfied and the chain advanced.
    Advanced {
        /// The satisfied step.
        from: u32,
        /// The newly activated step.
        to: u32,
    },
    /// The final step was satisfied; the claim is Approved.
    FullyApproved,
    /// A rejection terminated the chain.
    Rejected {
        /// The step the rejection landed on.
        step: u32,
    },
    /// An admin finalized a ledger with no Pending entries left.
    OverrideFinalized {
        /// The terminal status set by the admin's decision.
        status: ClaimStatus,
    },
}

impl DecisionOutcome {
    /// Returns true if the outcome left the ledger in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::FullyApproved | Self::Rejected { .. } | Self::OverrideFinalized { .. }
        )
    }
}
