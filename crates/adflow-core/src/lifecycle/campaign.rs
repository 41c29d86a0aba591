//! Campaign lifecycle: draft -> active -> in_review -> {approved | active}
//! -> completed -> archived. Rejection from review returns the campaign to
//! active; archived is terminal and freezes the whole aggregate.

use crate::error::AppError;
use crate::models::CampaignStatus;

/// Allowed next states keyed by current state. Strict allow-list: anything
/// absent here is an invalid transition.
pub fn allowed_next(current: CampaignStatus) -> &'static [CampaignStatus] {
    use CampaignStatus::*;
    match current {
        Draft => &[Active],
        Active => &[InReview],
        InReview => &[Approved, Active],
        Approved => &[Completed],
        Completed => &[Archived],
        Archived => &[],
    }
}

/// Whether `current -> attempted` appears in the allow-list.
pub fn campaign_transition_allowed(current: CampaignStatus, attempted: CampaignStatus) -> bool {
    allowed_next(current).contains(&attempted)
}

/// Check a transition, failing with an invalid-state error naming both
/// states.
pub fn ensure_campaign_transition(
    current: CampaignStatus,
    attempted: CampaignStatus,
) -> Result<(), AppError> {
    if campaign_transition_allowed(current, attempted) {
        Ok(())
    } else {
        Err(AppError::invalid_state("campaign", current, attempted))
    }
}

/// Archival freezes the aggregate: name/type/dates/brief/attachments
/// mutations must independently check this even when no status transition is
/// attempted.
pub fn is_frozen(status: CampaignStatus) -> bool {
    status == CampaignStatus::Archived
}

#[cfg(test)]
mod tests {
    use super::*;
    use CampaignStatus::*;

    const ALL: [CampaignStatus; 6] = [Draft, Active, InReview, Approved, Completed, Archived];

    #[test]
    fn test_happy_path_is_a_walk_of_the_table() {
        let walk = [Draft, Active, InReview, Approved, Completed, Archived];
        for pair in walk.windows(2) {
            assert!(
                campaign_transition_allowed(pair[0], pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_review_rejection_returns_to_active() {
        assert!(campaign_transition_allowed(InReview, Active));
        assert!(campaign_transition_allowed(Active, InReview));
    }

    #[test]
    fn test_archived_is_terminal() {
        for target in ALL {
            assert!(!campaign_transition_allowed(Archived, target));
        }
        assert!(is_frozen(Archived));
        assert!(!is_frozen(Completed));
    }

    #[test]
    fn test_no_transition_skips_a_state() {
        assert!(!campaign_transition_allowed(Draft, InReview));
        assert!(!campaign_transition_allowed(Draft, Approved));
        assert!(!campaign_transition_allowed(Active, Approved));
        assert!(!campaign_transition_allowed(Active, Completed));
        assert!(!campaign_transition_allowed(InReview, Completed));
        assert!(!campaign_transition_allowed(Approved, Archived));
    }

    #[test]
    fn test_invalid_transition_error_names_both_states() {
        let err = ensure_campaign_transition(Draft, Completed).unwrap_err();
        match err {
            AppError::InvalidState {
                entity,
                current,
                attempted,
            } => {
                assert_eq!(entity, "campaign");
                assert_eq!(current, "draft");
                assert_eq!(attempted, "completed");
            }
            other => panic!("Expected InvalidState, got {:?}", other),
        }
    }

    #[test]
    fn test_no_backward_edges_except_rejection() {
        assert!(!campaign_transition_allowed(Active, Draft));
        assert!(!campaign_transition_allowed(Approved, InReview));
        assert!(!campaign_transition_allowed(Completed, Approved));
    }
}
