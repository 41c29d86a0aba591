//! Approval aggregation.
//!
//! Effective deliverable status is derived, not stored: every decision write
//! replays the approval ledger for the latest version against the tier
//! rosters and recomputes the status inside the same transaction. The stored
//! status column is a cache of the last value computed here.
//!
//! Quorum rules per tier:
//! - campaign: ALL assigned campaign approvers must approve; a single reject
//!   from anyone is immediate (reject never waits for quorum);
//! - project: ANY ONE project approver suffices; the tier is skipped when the
//!   project has no approvers configured;
//! - client: ANY ONE approver-flagged client contact suffices (terminal
//!   approval).
//!
//! Decisions are attached to the version they were made for; a resubmission
//! (new version) starts from an empty decision set.

use uuid::Uuid;

use crate::models::{Approval, ApprovalDecision, ApprovalTier, DeliverableStatus};

/// The approver rosters a deliverable is evaluated against. Campaign and
/// project approvers are membership ids; client approvers are contact ids.
#[derive(Debug, Clone, Default)]
pub struct TierRosters {
    pub campaign_approvers: Vec<Uuid>,
    pub project_approvers: Vec<Uuid>,
    pub client_approvers: Vec<Uuid>,
}

/// A decision stripped to what aggregation needs.
#[derive(Debug, Clone)]
pub struct RecordedDecision {
    pub tier: ApprovalTier,
    pub decision: ApprovalDecision,
    pub membership_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
}

impl From<&Approval> for RecordedDecision {
    fn from(a: &Approval) -> Self {
        RecordedDecision {
            tier: a.tier,
            decision: a.decision,
            membership_id: a.decided_by_membership_id,
            contact_id: a.decided_by_contact_id,
        }
    }
}

/// Filter a deliverable's full approval history down to the decisions made
/// for one version. Prior-version decisions stay attached to their version
/// and never count toward a newer version's quorum.
pub fn decisions_for_version(approvals: &[Approval], version_id: Uuid) -> Vec<RecordedDecision> {
    approvals
        .iter()
        .filter(|a| a.version_id == version_id)
        .map(RecordedDecision::from)
        .collect()
}

/// The tier allowed to record decisions while the deliverable sits in the
/// given status. `None` means no tier may decide (not under review).
pub fn review_tier_for(status: DeliverableStatus) -> Option<ApprovalTier> {
    match status {
        DeliverableStatus::Submitted | DeliverableStatus::InternalReview => {
            Some(ApprovalTier::Campaign)
        }
        DeliverableStatus::PendingProjectApproval => Some(ApprovalTier::Project),
        DeliverableStatus::ClientReview => Some(ApprovalTier::Client),
        DeliverableStatus::Pending
        | DeliverableStatus::Approved
        | DeliverableStatus::Rejected => None,
    }
}

/// Derive the effective review status from the latest version's decisions.
///
/// Rejection is unconditional: one rejecting decision at any tier flips the
/// deliverable to rejected, discarding pending decisions. Approvals only
/// count toward quorum when the decider is on the corresponding roster, so
/// roster changes re-evaluate cleanly on the next decision write.
pub fn derive_status(rosters: &TierRosters, decisions: &[RecordedDecision]) -> DeliverableStatus {
    if decisions
        .iter()
        .any(|d| d.decision == ApprovalDecision::Rejected)
    {
        return DeliverableStatus::Rejected;
    }

    let approved_by = |tier: ApprovalTier, id: Uuid| {
        decisions.iter().any(|d| {
            d.tier == tier
                && d.decision == ApprovalDecision::Approved
                && (d.membership_id == Some(id) || d.contact_id == Some(id))
        })
    };

    if rosters
        .client_approvers
        .iter()
        .any(|&contact| approved_by(ApprovalTier::Client, contact))
    {
        return DeliverableStatus::Approved;
    }

    let campaign_quorum = rosters
        .campaign_approvers
        .iter()
        .all(|&member| approved_by(ApprovalTier::Campaign, member));

    if !campaign_quorum {
        return if decisions.is_empty() {
            DeliverableStatus::Submitted
        } else {
            DeliverableStatus::InternalReview
        };
    }

    if rosters.project_approvers.is_empty() {
        return DeliverableStatus::ClientReview;
    }
    if rosters
        .project_approvers
        .iter()
        .any(|&member| approved_by(ApprovalTier::Project, member))
    {
        return DeliverableStatus::ClientReview;
    }

    DeliverableStatus::PendingProjectApproval
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rosters(campaign: &[Uuid], project: &[Uuid], client: &[Uuid]) -> TierRosters {
        TierRosters {
            campaign_approvers: campaign.to_vec(),
            project_approvers: project.to_vec(),
            client_approvers: client.to_vec(),
        }
    }

    fn member_decision(
        tier: ApprovalTier,
        decision: ApprovalDecision,
        membership_id: Uuid,
    ) -> RecordedDecision {
        RecordedDecision {
            tier,
            decision,
            membership_id: Some(membership_id),
            contact_id: None,
        }
    }

    fn contact_decision(decision: ApprovalDecision, contact_id: Uuid) -> RecordedDecision {
        RecordedDecision {
            tier: ApprovalTier::Client,
            decision,
            membership_id: None,
            contact_id: Some(contact_id),
        }
    }

    #[test]
    fn test_campaign_quorum_requires_all_approvers() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rosters = rosters(&[a, b, c], &[Uuid::new_v4()], &[Uuid::new_v4()]);

        let mut decisions = vec![member_decision(
            ApprovalTier::Campaign,
            ApprovalDecision::Approved,
            a,
        )];
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::InternalReview
        );

        decisions.push(member_decision(
            ApprovalTier::Campaign,
            ApprovalDecision::Approved,
            b,
        ));
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::InternalReview
        );

        decisions.push(member_decision(
            ApprovalTier::Campaign,
            ApprovalDecision::Approved,
            c,
        ));
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::PendingProjectApproval
        );
    }

    #[test]
    fn test_single_reject_short_circuits_even_with_pending_decisions() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rosters = rosters(&[a, b, c], &[], &[Uuid::new_v4()]);

        let decisions = vec![
            member_decision(ApprovalTier::Campaign, ApprovalDecision::Approved, a),
            member_decision(ApprovalTier::Campaign, ApprovalDecision::Rejected, b),
        ];
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::Rejected
        );
    }

    #[test]
    fn test_project_tier_any_one_approver_suffices() {
        let campaign_approver = Uuid::new_v4();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        let rosters = rosters(&[campaign_approver], &[p1, p2], &[Uuid::new_v4()]);

        let mut decisions = vec![member_decision(
            ApprovalTier::Campaign,
            ApprovalDecision::Approved,
            campaign_approver,
        )];
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::PendingProjectApproval
        );

        decisions.push(member_decision(
            ApprovalTier::Project,
            ApprovalDecision::Approved,
            p2,
        ));
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::ClientReview
        );
    }

    #[test]
    fn test_project_tier_skipped_when_no_approvers_configured() {
        let campaign_approver = Uuid::new_v4();
        let rosters = rosters(&[campaign_approver], &[], &[Uuid::new_v4()]);

        let decisions = vec![member_decision(
            ApprovalTier::Campaign,
            ApprovalDecision::Approved,
            campaign_approver,
        )];
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::ClientReview
        );
    }

    #[test]
    fn test_client_tier_any_one_contact_reaches_approved() {
        let campaign_approver = Uuid::new_v4();
        let contact = Uuid::new_v4();
        let rosters = rosters(&[campaign_approver], &[], &[contact, Uuid::new_v4()]);

        let decisions = vec![
            member_decision(ApprovalTier::Campaign, ApprovalDecision::Approved, campaign_approver),
            contact_decision(ApprovalDecision::Approved, contact),
        ];
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::Approved
        );
    }

    #[test]
    fn test_client_reject_with_comment_lands_on_rejected() {
        let campaign_approver = Uuid::new_v4();
        let contact = Uuid::new_v4();
        let rosters = rosters(&[campaign_approver], &[], &[contact]);

        let decisions = vec![
            member_decision(ApprovalTier::Campaign, ApprovalDecision::Approved, campaign_approver),
            contact_decision(ApprovalDecision::Rejected, contact),
        ];
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::Rejected
        );
    }

    #[test]
    fn test_off_roster_approval_does_not_count_toward_quorum() {
        let on_roster = Uuid::new_v4();
        let removed = Uuid::new_v4();
        let rosters = rosters(&[on_roster], &[], &[Uuid::new_v4()]);

        let decisions = vec![member_decision(
            ApprovalTier::Campaign,
            ApprovalDecision::Approved,
            removed,
        )];
        assert_eq!(
            derive_status(&rosters, &decisions),
            DeliverableStatus::InternalReview
        );
    }

    #[test]
    fn test_no_decisions_stays_submitted() {
        let rosters = rosters(&[Uuid::new_v4()], &[], &[Uuid::new_v4()]);
        assert_eq!(derive_status(&rosters, &[]), DeliverableStatus::Submitted);
    }

    #[test]
    fn test_decisions_for_version_excludes_prior_versions() {
        let deliverable_id = Uuid::new_v4();
        let v1 = Uuid::new_v4();
        let v2 = Uuid::new_v4();
        let contact = Uuid::new_v4();

        let history = vec![
            Approval {
                id: Uuid::new_v4(),
                deliverable_id,
                version_id: v1,
                tier: ApprovalTier::Client,
                decision: ApprovalDecision::Rejected,
                decided_by_membership_id: None,
                decided_by_contact_id: Some(contact),
                comment: Some("colors off".to_string()),
                created_at: Utc::now(),
            },
            Approval {
                id: Uuid::new_v4(),
                deliverable_id,
                version_id: v2,
                tier: ApprovalTier::Campaign,
                decision: ApprovalDecision::Approved,
                decided_by_membership_id: Some(Uuid::new_v4()),
                decided_by_contact_id: None,
                comment: None,
                created_at: Utc::now(),
            },
        ];

        let v2_decisions = decisions_for_version(&history, v2);
        assert_eq!(v2_decisions.len(), 1);
        assert_eq!(v2_decisions[0].tier, ApprovalTier::Campaign);

        // v1's rejection is still queryable from history but must not drag a
        // resubmitted deliverable back to rejected.
        let rosters = rosters(&[Uuid::new_v4()], &[], &[contact]);
        assert_ne!(
            derive_status(&rosters, &v2_decisions),
            DeliverableStatus::Rejected
        );
    }

    #[test]
    fn test_review_tier_per_status() {
        assert_eq!(
            review_tier_for(DeliverableStatus::Submitted),
            Some(ApprovalTier::Campaign)
        );
        assert_eq!(
            review_tier_for(DeliverableStatus::InternalReview),
            Some(ApprovalTier::Campaign)
        );
        assert_eq!(
            review_tier_for(DeliverableStatus::PendingProjectApproval),
            Some(ApprovalTier::Project)
        );
        assert_eq!(
            review_tier_for(DeliverableStatus::ClientReview),
            Some(ApprovalTier::Client)
        );
        assert_eq!(review_tier_for(DeliverableStatus::Pending), None);
        assert_eq!(review_tier_for(DeliverableStatus::Approved), None);
        assert_eq!(review_tier_for(DeliverableStatus::Rejected), None);
    }

    /// Campaign created with approvers [U1, U2]: U1 approves (no tier
    /// advance), U2 approves (tier advances; skips to client review when the
    /// project has no approvers).
    #[test]
    fn test_two_approver_walkthrough() {
        let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
        let with_project = rosters(&[u1, u2], &[Uuid::new_v4()], &[Uuid::new_v4()]);
        let without_project = rosters(&[u1, u2], &[], &[Uuid::new_v4()]);

        let mut decisions = vec![member_decision(
            ApprovalTier::Campaign,
            ApprovalDecision::Approved,
            u1,
        )];
        assert_eq!(
            derive_status(&with_project, &decisions),
            DeliverableStatus::InternalReview
        );

        decisions.push(member_decision(
            ApprovalTier::Campaign,
            ApprovalDecision::Approved,
            u2,
        ));
        assert_eq!(
            derive_status(&with_project, &decisions),
            DeliverableStatus::PendingProjectApproval
        );
        assert_eq!(
            derive_status(&without_project, &decisions),
            DeliverableStatus::ClientReview
        );
    }
}
