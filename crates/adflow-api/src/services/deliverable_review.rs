//! Deliverable review service: versions, submission, and the decision write
//! path that drives the approval aggregation.

use chrono::NaiveDate;
use uuid::Uuid;

use adflow_core::lifecycle::deliverable::ensure_deliverable_transition;
use adflow_core::models::{
    Approval, ApprovalDecision, ApprovalTier, Campaign, CampaignStatus, Deliverable,
    DeliverableStatus, DeliverableType, DeliverableVersion,
};
use adflow_core::review::{review_tier_for, TierRosters};
use adflow_core::validation::{
    validate_name, validate_rejection_comment, validate_text, validate_title,
};
use adflow_core::{AppError, Permission};
use adflow_db::{
    ApprovalRepository, CampaignRepository, ClientRepository, DeliverableRepository,
    ProjectRepository,
};

use crate::auth::gate::AccessGate;
use crate::auth::models::Caller;
use crate::services::audit::{snapshot, AuditLogger};

#[derive(Clone)]
pub struct DeliverableService {
    gate: AccessGate,
    campaigns: CampaignRepository,
    projects: ProjectRepository,
    clients: ClientRepository,
    deliverables: DeliverableRepository,
    approvals: ApprovalRepository,
    audit: AuditLogger,
}

impl DeliverableService {
    pub fn new(
        gate: AccessGate,
        campaigns: CampaignRepository,
        projects: ProjectRepository,
        clients: ClientRepository,
        deliverables: DeliverableRepository,
        approvals: ApprovalRepository,
        audit: AuditLogger,
    ) -> Self {
        Self {
            gate,
            campaigns,
            projects,
            clients,
            deliverables,
            approvals,
            audit,
        }
    }

    pub async fn create_deliverable(
        &self,
        caller: &Caller,
        campaign_id: Uuid,
        title: &str,
        deliverable_type: DeliverableType,
        due_on: Option<NaiveDate>,
    ) -> Result<Deliverable, AppError> {
        validate_title("title", title)?;
        let campaign = self
            .gate
            .require_campaign(caller, campaign_id, Permission::DeliverableManage)
            .await?;
        if campaign.status == CampaignStatus::Archived {
            return Err(AppError::invalid_state(
                "campaign",
                campaign.status,
                "create_deliverable",
            ));
        }

        let deliverable = self
            .deliverables
            .create(campaign_id, campaign.agency_id, title, deliverable_type, due_on)
            .await
            .map_err(AppError::from)?;

        self.audit
            .record(
                deliverable.agency_id,
                "deliverable",
                deliverable.id,
                "deliverable_created",
                caller,
                None,
                snapshot(&deliverable),
                serde_json::json!({}),
            )
            .await;
        Ok(deliverable)
    }

    /// Append a new version and point the client-facing preview at it.
    pub async fn upload_version(
        &self,
        caller: &Caller,
        deliverable_id: Uuid,
        file_name: &str,
        file_key: &str,
    ) -> Result<DeliverableVersion, AppError> {
        validate_name("file_name", file_name)?;
        let (deliverable, _campaign) = self
            .gate
            .require_deliverable(caller, deliverable_id, Permission::DeliverableManage)
            .await?;
        if deliverable.status == DeliverableStatus::Approved {
            return Err(AppError::invalid_state(
                "deliverable",
                deliverable.status,
                "upload_version",
            ));
        }

        let membership_id = match caller {
            Caller::Member(member) => member.membership_id,
            Caller::Portal(_) => {
                return Err(AppError::Forbidden(
                    "Portal identities cannot upload versions".to_string(),
                ))
            }
        };

        let version = self
            .deliverables
            .insert_version(deliverable_id, file_name, file_key, membership_id)
            .await
            .map_err(AppError::from)?;
        let _ = self
            .deliverables
            .set_preview_version(deliverable_id, Some(version.id))
            .await
            .map_err(AppError::from)?;

        self.audit
            .record(
                deliverable.agency_id,
                "deliverable",
                deliverable.id,
                "deliverable_version_uploaded",
                caller,
                None,
                snapshot(&version),
                serde_json::json!({ "version_number": version.version_number }),
            )
            .await;
        Ok(version)
    }

    /// Submit for review. Requires at least one uploaded version; legal from
    /// `pending` (first submission) and `rejected` (resubmission).
    pub async fn submit_for_review(
        &self,
        caller: &Caller,
        deliverable_id: Uuid,
    ) -> Result<Deliverable, AppError> {
        let (deliverable, _campaign) = self
            .gate
            .require_deliverable(caller, deliverable_id, Permission::DeliverableManage)
            .await?;
        ensure_deliverable_transition(deliverable.status, DeliverableStatus::Submitted)?;

        let version_count = self
            .deliverables
            .count_versions(deliverable_id)
            .await
            .map_err(AppError::from)?;
        if version_count == 0 {
            return Err(AppError::validation(
                "versions",
                "at least one uploaded version is required before submitting",
            ));
        }

        let updated = self
            .deliverables
            .transition_status(deliverable_id, deliverable.status, DeliverableStatus::Submitted)
            .await
            .map_err(AppError::from)?;
        let updated = match updated {
            Some(updated) => updated,
            None => {
                let current = self.reread(deliverable_id).await?;
                return Err(AppError::invalid_state(
                    "deliverable",
                    current.status,
                    DeliverableStatus::Submitted,
                ));
            }
        };

        self.audit
            .record(
                updated.agency_id,
                "deliverable",
                updated.id,
                "deliverable_submitted",
                caller,
                snapshot(&deliverable),
                snapshot(&updated),
                serde_json::json!({ "version_count": version_count }),
            )
            .await;
        Ok(updated)
    }

    /// Record an approve/reject decision at a review tier and refresh the
    /// derived status. Decisions are append-only and always target the
    /// latest version.
    #[allow(clippy::too_many_arguments)]
    pub async fn decide(
        &self,
        caller: &Caller,
        deliverable_id: Uuid,
        version_id: Uuid,
        tier: ApprovalTier,
        decision: ApprovalDecision,
        comment: Option<&str>,
    ) -> Result<(Approval, Deliverable), AppError> {
        match decision {
            ApprovalDecision::Rejected => validate_rejection_comment(comment)?,
            ApprovalDecision::Approved => {
                if let Some(comment) = comment {
                    validate_text("comment", comment)?;
                }
            }
        }

        let (deliverable, campaign) = self
            .gate
            .require_deliverable(caller, deliverable_id, Permission::DeliverableReview)
            .await?;

        if review_tier_for(deliverable.status) != Some(tier) {
            return Err(AppError::invalid_state(
                "deliverable",
                deliverable.status,
                format!("{}_tier_decision", tier),
            ));
        }

        let version = self
            .deliverables
            .get_version(version_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;
        if version.deliverable_id != deliverable_id {
            return Err(AppError::validation(
                "version_id",
                "version does not belong to this deliverable",
            ));
        }
        let latest = self
            .deliverables
            .latest_version(deliverable_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;
        if latest.id != version_id {
            return Err(AppError::validation(
                "version_id",
                "decisions must target the latest version",
            ));
        }

        let (membership_id, contact_id) =
            self.resolve_decider(caller, tier, &campaign).await?;

        let rosters = self.load_rosters(&campaign).await?;

        let result = self
            .approvals
            .record_decision(
                deliverable_id,
                version_id,
                tier,
                decision,
                membership_id,
                contact_id,
                comment,
                deliverable.status,
                &rosters,
            )
            .await
            .map_err(AppError::from)?;

        let (approval, updated) = match result {
            Some(pair) => pair,
            None => {
                let current = self.reread(deliverable_id).await?;
                return Err(AppError::invalid_state(
                    "deliverable",
                    current.status,
                    format!("{}_tier_decision", tier),
                ));
            }
        };

        self.audit
            .record(
                updated.agency_id,
                "deliverable",
                updated.id,
                "deliverable_decision_recorded",
                caller,
                snapshot(&deliverable),
                snapshot(&updated),
                serde_json::json!({
                    "tier": tier,
                    "decision": decision,
                    "version_id": version_id,
                }),
            )
            .await;
        Ok((approval, updated))
    }

    /// Delete the latest version, provided nothing references it. Clears the
    /// preview pointer when it pointed at the deleted version.
    pub async fn delete_version(
        &self,
        caller: &Caller,
        deliverable_id: Uuid,
        version_id: Uuid,
    ) -> Result<(), AppError> {
        let (deliverable, _campaign) = self
            .gate
            .require_deliverable(caller, deliverable_id, Permission::DeliverableManage)
            .await?;

        let version = self
            .deliverables
            .get_version(version_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;
        if version.deliverable_id != deliverable_id {
            return Err(AppError::NotFound("Version not found".to_string()));
        }

        if self
            .approvals
            .version_is_referenced(version_id)
            .await
            .map_err(AppError::from)?
        {
            return Err(AppError::validation(
                "version_id",
                "cannot delete a version referenced by approvals",
            ));
        }

        let deleted = self
            .deliverables
            .delete_version(deliverable_id, version_id)
            .await
            .map_err(AppError::from)?;
        if !deleted {
            return Err(AppError::validation(
                "version_id",
                "only the latest unreferenced version can be deleted",
            ));
        }

        self.audit
            .record(
                deliverable.agency_id,
                "deliverable",
                deliverable.id,
                "deliverable_version_deleted",
                caller,
                snapshot(&version),
                None,
                serde_json::json!({}),
            )
            .await;
        Ok(())
    }

    pub async fn get_detail(
        &self,
        caller: &Caller,
        deliverable_id: Uuid,
    ) -> Result<(Deliverable, Vec<DeliverableVersion>, Vec<Approval>), AppError> {
        let (deliverable, _campaign) = self
            .gate
            .require_deliverable(caller, deliverable_id, Permission::CampaignView)
            .await?;
        let versions = self
            .deliverables
            .list_versions(deliverable_id)
            .await
            .map_err(AppError::from)?;
        let approvals = self
            .approvals
            .list_for_deliverable(deliverable_id)
            .await
            .map_err(AppError::from)?;
        Ok((deliverable, versions, approvals))
    }

    async fn resolve_decider(
        &self,
        caller: &Caller,
        tier: ApprovalTier,
        campaign: &Campaign,
    ) -> Result<(Option<Uuid>, Option<Uuid>), AppError> {
        match tier {
            ApprovalTier::Campaign => {
                let member = match caller {
                    Caller::Member(member) => member,
                    Caller::Portal(_) => {
                        return Err(AppError::Forbidden(
                            "Campaign-tier decisions require an agency membership".to_string(),
                        ))
                    }
                };
                let roster = self
                    .campaigns
                    .list_approver_membership_ids(campaign.id)
                    .await
                    .map_err(AppError::from)?;
                if !roster.contains(&member.membership_id) {
                    return Err(AppError::Forbidden(
                        "Caller is not a campaign approver".to_string(),
                    ));
                }
                Ok((Some(member.membership_id), None))
            }
            ApprovalTier::Project => {
                let member = match caller {
                    Caller::Member(member) => member,
                    Caller::Portal(_) => {
                        return Err(AppError::Forbidden(
                            "Project-tier decisions require an agency membership".to_string(),
                        ))
                    }
                };
                let roster = self
                    .projects
                    .list_approver_membership_ids(campaign.project_id)
                    .await
                    .map_err(AppError::from)?;
                if !roster.contains(&member.membership_id) {
                    return Err(AppError::Forbidden(
                        "Caller is not a project approver".to_string(),
                    ));
                }
                Ok((Some(member.membership_id), None))
            }
            ApprovalTier::Client => match caller {
                Caller::Portal(portal) => Ok((None, Some(portal.contact_id))),
                Caller::Member(_) => Err(AppError::Forbidden(
                    "Client-tier decisions require a client-portal identity".to_string(),
                )),
            },
        }
    }

    async fn load_rosters(&self, campaign: &Campaign) -> Result<TierRosters, AppError> {
        let campaign_approvers = self
            .campaigns
            .list_approver_membership_ids(campaign.id)
            .await
            .map_err(AppError::from)?;
        let project = self
            .projects
            .get(campaign.project_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
        let project_approvers = self
            .projects
            .list_approver_membership_ids(project.id)
            .await
            .map_err(AppError::from)?;
        let client_approvers = self
            .clients
            .list_approver_contact_ids(project.client_id)
            .await
            .map_err(AppError::from)?;
        Ok(TierRosters {
            campaign_approvers,
            project_approvers,
            client_approvers,
        })
    }

    async fn reread(&self, deliverable_id: Uuid) -> Result<Deliverable, AppError> {
        self.deliverables
            .get(deliverable_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Deliverable not found".to_string()))
    }
}
