//! Property-based tests for chain initialization.
//!
//! Validates that the materialized ledger always reflects the workflow
//! configuration, regardless of step shapes, gaps, and manager settings.

use proptest::prelude::*;
use uuid::Uuid;

use claimflow_shared::types::{CompanyId, UserId, WorkflowId};

use crate::approval::chain::ChainInitializer;
use crate::approval::error::ApprovalError;
use crate::approval::types::{ApprovalStep, ClaimStatus, MANAGER_STEP, WorkflowDefinition};

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|x| UserId::from_uuid(Uuid::from_u128(x)))
}

/// Strategy for workflows with 0-4 steps of 0-3 approvers each. Step
/// numbers are spaced to exercise non-contiguous sequences.
fn arb_workflow() -> impl Strategy<Value = WorkflowDefinition> {
    (
        prop::collection::vec(
            (prop::collection::vec(arb_user(), 0..=3), 1u8..=100, 1u32..=3),
            0..=4,
        ),
        any::<bool>(),
    )
        .prop_map(|(raw_steps, include_manager)| {
            let mut next_number = 0u32;
            let steps = raw_steps
                .into_iter()
                .map(|(approvers, percentage, gap)| {
                    next_number += gap;
                    ApprovalStep {
                        step_number: next_number,
                        approvers,
                        required_approval_percentage: percentage,
                        specific_approver_override: None,
                    }
                })
                .collect();
            WorkflowDefinition {
                id: WorkflowId::new(),
                company: CompanyId::new(),
                name: "generated".to_string(),
                include_manager_approval: include_manager,
                is_active: true,
                steps,
            }
        })
}

fn member(_: UserId) -> Result<bool, ApprovalError> {
    Ok(true)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The ledger carries exactly one entry per configured approver, plus
    /// the manager pre-step entry when applicable.
    #[test]
    fn prop_entry_count_matches_configuration(
        workflow in arb_workflow(),
        manager in proptest::option::of(arb_user()),
    ) {
        let ledger = ChainInitializer::initialize(&workflow, manager, member).unwrap();

        let manager_entries =
            usize::from(workflow.include_manager_approval && manager.is_some());
        let approver_entries: usize =
            workflow.steps.iter().map(|s| s.approvers.len()).sum();
        prop_assert_eq!(ledger.entries.len(), manager_entries + approver_entries);
    }

    /// Every entry starts Pending with no decision timestamp, and the
    /// ledger starts Pending.
    #[test]
    fn prop_initial_ledger_is_all_pending(
        workflow in arb_workflow(),
        manager in proptest::option::of(arb_user()),
    ) {
        let ledger = ChainInitializer::initialize(&workflow, manager, member).unwrap();

        prop_assert_eq!(ledger.status, ClaimStatus::Pending);
        for entry in &ledger.entries {
            prop_assert!(entry.decision.is_pending());
            prop_assert!(entry.decided_at.is_none());
            prop_assert!(entry.comment.is_empty());
        }
    }

    /// The current step is the manager pre-step when one was created,
    /// otherwise the lowest declared step number (1 with no steps).
    #[test]
    fn prop_current_step_rule(
        workflow in arb_workflow(),
        manager in proptest::option::of(arb_user()),
    ) {
        let ledger = ChainInitializer::initialize(&workflow, manager, member).unwrap();

        let expected = if workflow.include_manager_approval && manager.is_some() {
            MANAGER_STEP
        } else {
            workflow.first_step_number().unwrap_or(1)
        };
        prop_assert_eq!(ledger.current_step, expected);
    }

    /// Any step percentage outside [1, 100] is rejected with a
    /// ValidationError naming the step.
    #[test]
    fn prop_out_of_range_percentage_rejected(
        workflow in arb_workflow(),
        bad in prop_oneof![Just(0u8), 101u8..],
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!workflow.steps.is_empty());
        let mut workflow = workflow;
        let idx = pick.index(workflow.steps.len());
        workflow.steps[idx].required_approval_percentage = bad;
        let bad_step = workflow.steps[idx].step_number;

        let err = ChainInitializer::initialize(&workflow, None, member).unwrap_err();
        let is_expected = matches!(
            err,
            ApprovalError::InvalidPercentage { step, percentage }
                if step == bad_step && percentage == bad
        );
        prop_assert!(is_expected);
    }

    /// An override approver outside the company is always rejected.
    #[test]
    fn prop_foreign_override_approver_rejected(
        workflow in arb_workflow(),
        outsider in arb_user(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!workflow.steps.is_empty());
        let mut workflow = workflow;
        let idx = pick.index(workflow.steps.len());
        workflow.steps[idx].specific_approver_override = Some(outsider);

        let err = ChainInitializer::initialize(&workflow, None, |u| Ok(u != outsider))
            .unwrap_err();
        let is_expected = matches!(err, ApprovalError::UnknownOverrideApprover { .. });
        prop_assert!(is_expected);
    }
}
