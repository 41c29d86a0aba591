//! Deliverable lifecycle. Review-stage advancement is driven by the approval
//! aggregator (`crate::review`); this table bounds which persisted moves are
//! legal at all. Rejection is reachable from every review stage and
//! resubmission re-enters at submitted; approved is terminal.

use crate::error::AppError;
use crate::models::DeliverableStatus;

/// Allowed next states keyed by current state.
pub fn allowed_next(current: DeliverableStatus) -> &'static [DeliverableStatus] {
    use DeliverableStatus::*;
    match current {
        Pending => &[Submitted],
        Submitted => &[InternalReview, Rejected],
        InternalReview => &[PendingProjectApproval, ClientReview, Rejected],
        PendingProjectApproval => &[ClientReview, Rejected],
        ClientReview => &[Approved, Rejected],
        Rejected => &[Submitted],
        Approved => &[],
    }
}

/// Whether `current -> attempted` appears in the allow-list.
pub fn deliverable_transition_allowed(
    current: DeliverableStatus,
    attempted: DeliverableStatus,
) -> bool {
    allowed_next(current).contains(&attempted)
}

/// Check a transition, failing with an invalid-state error naming both
/// states.
pub fn ensure_deliverable_transition(
    current: DeliverableStatus,
    attempted: DeliverableStatus,
) -> Result<(), AppError> {
    if deliverable_transition_allowed(current, attempted) {
        Ok(())
    } else {
        Err(AppError::invalid_state("deliverable", current, attempted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DeliverableStatus::*;

    const ALL: [DeliverableStatus; 7] = [
        Pending,
        Submitted,
        InternalReview,
        PendingProjectApproval,
        ClientReview,
        Approved,
        Rejected,
    ];

    #[test]
    fn test_canonical_sequence_is_a_walk_of_the_table() {
        let walk = [
            Pending,
            Submitted,
            InternalReview,
            PendingProjectApproval,
            ClientReview,
            Approved,
        ];
        for pair in walk.windows(2) {
            assert!(
                deliverable_transition_allowed(pair[0], pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_project_tier_skip_edge_exists() {
        // With no project approvers configured the deliverable moves straight
        // from internal review to client review.
        assert!(deliverable_transition_allowed(InternalReview, ClientReview));
    }

    #[test]
    fn test_rejection_reachable_from_every_review_stage() {
        for stage in [Submitted, InternalReview, PendingProjectApproval, ClientReview] {
            assert!(
                deliverable_transition_allowed(stage, Rejected),
                "{} -> rejected should be allowed",
                stage
            );
        }
        assert!(!deliverable_transition_allowed(Pending, Rejected));
        assert!(!deliverable_transition_allowed(Approved, Rejected));
    }

    #[test]
    fn test_resubmission_re_enters_at_submitted() {
        assert_eq!(allowed_next(Rejected), &[Submitted]);
    }

    #[test]
    fn test_approved_is_terminal_and_immutable() {
        for target in ALL {
            assert!(!deliverable_transition_allowed(Approved, target));
        }
    }

    #[test]
    fn test_cannot_skip_submission() {
        assert!(!deliverable_transition_allowed(Pending, InternalReview));
        assert!(!deliverable_transition_allowed(Pending, ClientReview));
        assert!(!deliverable_transition_allowed(Pending, Approved));
        assert!(!deliverable_transition_allowed(Submitted, Approved));
    }

    #[test]
    fn test_invalid_transition_error_names_both_states() {
        let err = ensure_deliverable_transition(Approved, Submitted).unwrap_err();
        match err {
            AppError::InvalidState {
                entity,
                current,
                attempted,
            } => {
                assert_eq!(entity, "deliverable");
                assert_eq!(current, "approved");
                assert_eq!(attempted, "submitted");
            }
            other => panic!("Expected InvalidState, got {:?}", other),
        }
    }
}
