//! Property-based tests for the decision processor.
//!
//! Validates the ledger invariants under randomized workflows and
//! decision sequences: one-way status transitions, append-only history,
//! monotone step activation, and exact threshold arithmetic.

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use claimflow_shared::types::{CompanyId, UserId, WorkflowId};

use crate::approval::chain::ChainInitializer;
use crate::approval::processor::DecisionProcessor;
use crate::approval::types::{
    ApprovalStep, ClaimStatus, Decision, WorkflowDefinition,
};

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|x| UserId::from_uuid(Uuid::from_u128(x)))
}

/// Workflows with 1-4 sequential steps of 0-3 approvers each.
fn arb_workflow() -> impl Strategy<Value = WorkflowDefinition> {
    prop::collection::vec(
        (prop::collection::vec(arb_user(), 0..=3), 1u8..=100),
        1..=4,
    )
    .prop_map(|raw_steps| WorkflowDefinition {
        id: WorkflowId::new(),
        company: CompanyId::new(),
        name: "generated".to_string(),
        include_manager_approval: false,
        is_active: true,
        steps: raw_steps
            .into_iter()
            .enumerate()
            .map(|(i, (approvers, percentage))| ApprovalStep {
                step_number: u32::try_from(i).unwrap() + 1,
                approvers,
                required_approval_percentage: percentage,
                specific_approver_override: None,
            })
            .collect(),
    })
}

fn approve(
    ledger: &mut crate::approval::types::ApprovalLedger,
    workflow: &WorkflowDefinition,
    actor: UserId,
    decision: Decision,
) -> Result<crate::approval::types::DecisionOutcome, crate::approval::error::ApprovalError> {
    DecisionProcessor::decide(ledger, workflow, actor, false, decision, "", Utc::now())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Approving with every pending approver, lowest step first, always
    /// terminates in Approved without ever shrinking the history.
    #[test]
    fn prop_unanimous_approval_terminates_approved(workflow in arb_workflow()) {
        let mut ledger =
            ChainInitializer::initialize(&workflow, None, |_| Ok(true)).unwrap();
        let initial_len = ledger.entries.len();
        prop_assume!(initial_len > 0);

        let mut remaining = initial_len;
        while let Some(step) = ledger.active_step() {
            prop_assert!(remaining > 0, "more decisions than entries");
            remaining -= 1;
            let actor = ledger
                .entries_at(step)
                .find(|e| e.decision.is_pending())
                .map(|e| e.approver)
                .unwrap();
            approve(&mut ledger, &workflow, actor, Decision::Approved).unwrap();
        }

        prop_assert_eq!(ledger.status, ClaimStatus::Approved);
        prop_assert_eq!(ledger.entries.len(), initial_len);
        for entry in &ledger.entries {
            prop_assert!(entry.decided_at.is_some());
        }
    }

    /// Under arbitrary decision sequences the ledger never leaves a
    /// terminal state, history only grows, and the active step never
    /// moves backwards.
    #[test]
    fn prop_ledger_invariants_under_random_decisions(
        workflow in arb_workflow(),
        events in prop::collection::vec(
            (any::<prop::sample::Index>(), any::<bool>()),
            0..12,
        ),
    ) {
        let mut ledger =
            ChainInitializer::initialize(&workflow, None, |_| Ok(true)).unwrap();
        prop_assume!(!ledger.entries.is_empty());

        for (pick, approve_it) in events {
            let actor = ledger.entries[pick.index(ledger.entries.len())].approver;
            let decision = if approve_it {
                Decision::Approved
            } else {
                Decision::Rejected
            };

            let status_before = ledger.status;
            let len_before = ledger.entries.len();
            let active_before = ledger.active_step();

            let result = approve(&mut ledger, &workflow, actor, decision);

            if status_before.is_terminal() {
                prop_assert!(result.is_err());
                prop_assert_eq!(ledger.status, status_before);
            }
            prop_assert!(ledger.entries.len() >= len_before);
            if let (Some(before), Some(after)) = (active_before, ledger.active_step()) {
                prop_assert!(after >= before);
            }
        }
    }

    /// A single rejection at the active step terminates the chain and
    /// leaves no effective entries above the rejected step, while the
    /// full history is preserved.
    #[test]
    fn prop_rejection_tombstones_future_steps(
        workflow in arb_workflow(),
        approvals in 0usize..6,
    ) {
        let mut ledger =
            ChainInitializer::initialize(&workflow, None, |_| Ok(true)).unwrap();
        let initial_len = ledger.entries.len();
        prop_assume!(initial_len > 0);

        // Burn a few approvals first so the rejection can land mid-chain
        for _ in 0..approvals {
            let Some(step) = ledger.active_step() else { break };
            if ledger.status.is_terminal() {
                break;
            }
            let actor = ledger
                .entries_at(step)
                .find(|e| e.decision.is_pending())
                .map(|e| e.approver)
                .unwrap();
            approve(&mut ledger, &workflow, actor, Decision::Approved).unwrap();
        }

        let Some(step) = ledger.active_step() else { return Ok(()) };
        if ledger.status.is_terminal() {
            return Ok(());
        }
        let actor = ledger
            .entries_at(step)
            .find(|e| e.decision.is_pending())
            .map(|e| e.approver)
            .unwrap();
        approve(&mut ledger, &workflow, actor, Decision::Rejected).unwrap();

        prop_assert_eq!(ledger.status, ClaimStatus::Rejected);
        prop_assert_eq!(ledger.entries.len(), initial_len);
        prop_assert!(ledger.effective_entries().all(|e| e.step <= step));
    }

    /// The percentage rule is exact rational arithmetic: a single-step
    /// chain is approved after k of n approvals iff k*100 >= p*n.
    #[test]
    fn prop_threshold_is_exact(
        n in 1usize..=6,
        k_seed in any::<prop::sample::Index>(),
        percentage in 1u8..=100,
    ) {
        let approvers: Vec<UserId> = (0..n).map(|_| UserId::new()).collect();
        let k = k_seed.index(n + 1);
        let workflow = WorkflowDefinition {
            id: WorkflowId::new(),
            company: CompanyId::new(),
            name: "threshold".to_string(),
            include_manager_approval: false,
            is_active: true,
            steps: vec![ApprovalStep {
                step_number: 1,
                approvers: approvers.clone(),
                required_approval_percentage: percentage,
                specific_approver_override: None,
            }],
        };
        let mut ledger =
            ChainInitializer::initialize(&workflow, None, |_| Ok(true)).unwrap();

        for actor in approvers.iter().take(k) {
            if ledger.status.is_terminal() {
                break;
            }
            approve(&mut ledger, &workflow, *actor, Decision::Approved).unwrap();
        }

        let expected_approved = k * 100 >= usize::from(percentage) * n;
        prop_assert_eq!(
            ledger.status == ClaimStatus::Approved,
            expected_approved,
            "k={} n={} p={}", k, n, percentage
        );
    }
}
