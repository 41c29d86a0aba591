//! Campaign lifecycle service: creation with its approver invariant, state
//! transitions, and archive-frozen detail mutations.

use chrono::NaiveDate;
use uuid::Uuid;

use adflow_core::lifecycle::campaign::{ensure_campaign_transition, is_frozen};
use adflow_core::models::{
    Campaign, CampaignMember, CampaignRole, CampaignStatus, CampaignType, ProjectStatus,
};
use adflow_core::validation::{
    validate_approver_list, validate_date_range, validate_name, validate_text,
};
use adflow_core::{AppError, Permission};
use adflow_db::{CampaignRepository, MembershipRepository};

use crate::auth::gate::AccessGate;
use crate::auth::models::Caller;
use crate::services::audit::{snapshot, AuditLogger};

#[derive(Clone)]
pub struct CampaignService {
    gate: AccessGate,
    memberships: MembershipRepository,
    campaigns: CampaignRepository,
    audit: AuditLogger,
}

impl CampaignService {
    pub fn new(
        gate: AccessGate,
        memberships: MembershipRepository,
        campaigns: CampaignRepository,
        audit: AuditLogger,
    ) -> Self {
        Self {
            gate,
            memberships,
            campaigns,
            audit,
        }
    }

    /// Create a campaign in `draft` with its initial approver roster. The
    /// >= 1 approver invariant is checked before any row is written, and the
    /// campaign plus roster insert is one transaction.
    pub async fn create_campaign(
        &self,
        caller: &Caller,
        project_id: Uuid,
        name: &str,
        campaign_type: CampaignType,
        approver_user_ids: &[Uuid],
    ) -> Result<Campaign, AppError> {
        validate_name("name", name)?;
        validate_approver_list(approver_user_ids)?;

        let project = self
            .gate
            .require_project(caller, project_id, Permission::CampaignManage)
            .await?;
        if project.status == ProjectStatus::Archived {
            return Err(AppError::invalid_state(
                "project",
                project.status,
                "create_campaign",
            ));
        }

        let memberships = self
            .memberships
            .list_active_by_users(project.agency_id, approver_user_ids)
            .await
            .map_err(AppError::from)?;
        if memberships.len() != approver_user_ids.len() {
            return Err(AppError::validation(
                "approver_user_ids",
                "every approver must have an active membership in this agency",
            ));
        }

        let members: Vec<(Uuid, CampaignRole)> = memberships
            .iter()
            .map(|m| (m.id, CampaignRole::Approver))
            .collect();

        let campaign = self
            .campaigns
            .create_with_members(project_id, project.agency_id, name, campaign_type, &members)
            .await
            .map_err(AppError::from)?;

        self.audit
            .record(
                campaign.agency_id,
                "campaign",
                campaign.id,
                "campaign_created",
                caller,
                None,
                snapshot(&campaign),
                serde_json::json!({ "approver_count": members.len() }),
            )
            .await;
        Ok(campaign)
    }

    /// Execute one lifecycle transition. The allow-list is checked against
    /// the status the caller saw, and the write is compare-and-set on that
    /// same status, so a concurrent transition surfaces as invalid-state
    /// with the actual current status.
    pub async fn transition(
        &self,
        caller: &Caller,
        campaign_id: Uuid,
        next: CampaignStatus,
        action: &str,
    ) -> Result<Campaign, AppError> {
        let campaign = self
            .gate
            .require_campaign(caller, campaign_id, Permission::CampaignManage)
            .await?;
        ensure_campaign_transition(campaign.status, next)?;

        let updated = self
            .campaigns
            .transition_status(campaign_id, campaign.status, next)
            .await
            .map_err(AppError::from)?;
        let updated = match updated {
            Some(updated) => updated,
            None => {
                let current = self
                    .campaigns
                    .get(campaign_id)
                    .await
                    .map_err(AppError::from)?
                    .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;
                return Err(AppError::invalid_state("campaign", current.status, next));
            }
        };

        self.audit
            .record(
                updated.agency_id,
                "campaign",
                updated.id,
                action,
                caller,
                snapshot(&campaign),
                snapshot(&updated),
                serde_json::json!({ "from": campaign.status, "to": next }),
            )
            .await;
        Ok(updated)
    }

    pub async fn update_details(
        &self,
        caller: &Caller,
        campaign_id: Uuid,
        name: Option<&str>,
        campaign_type: Option<CampaignType>,
    ) -> Result<Campaign, AppError> {
        if let Some(name) = name {
            validate_name("name", name)?;
        }
        let campaign = self
            .gate
            .require_campaign(caller, campaign_id, Permission::CampaignManage)
            .await?;
        self.ensure_not_frozen(&campaign, "update_details")?;

        let updated = self
            .campaigns
            .update_details(campaign_id, name, campaign_type)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| {
                AppError::invalid_state("campaign", CampaignStatus::Archived, "update_details")
            })?;

        self.audit
            .record(
                updated.agency_id,
                "campaign",
                updated.id,
                "campaign_details_updated",
                caller,
                snapshot(&campaign),
                snapshot(&updated),
                serde_json::json!({}),
            )
            .await;
        Ok(updated)
    }

    pub async fn set_dates(
        &self,
        caller: &Caller,
        campaign_id: Uuid,
        starts_on: Option<NaiveDate>,
        ends_on: Option<NaiveDate>,
    ) -> Result<Campaign, AppError> {
        validate_date_range(starts_on, ends_on)?;
        let campaign = self
            .gate
            .require_campaign(caller, campaign_id, Permission::CampaignManage)
            .await?;
        self.ensure_not_frozen(&campaign, "set_dates")?;

        let updated = self
            .campaigns
            .set_dates(campaign_id, starts_on, ends_on)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| {
                AppError::invalid_state("campaign", CampaignStatus::Archived, "set_dates")
            })?;

        self.audit
            .record(
                updated.agency_id,
                "campaign",
                updated.id,
                "campaign_dates_set",
                caller,
                snapshot(&campaign),
                snapshot(&updated),
                serde_json::json!({}),
            )
            .await;
        Ok(updated)
    }

    pub async fn update_brief(
        &self,
        caller: &Caller,
        campaign_id: Uuid,
        brief: Option<&str>,
        attachments: Option<&serde_json::Value>,
    ) -> Result<Campaign, AppError> {
        if let Some(brief) = brief {
            validate_text("brief", brief)?;
        }
        let campaign = self
            .gate
            .require_campaign(caller, campaign_id, Permission::CampaignManage)
            .await?;
        self.ensure_not_frozen(&campaign, "update_brief")?;

        let updated = self
            .campaigns
            .update_brief(campaign_id, brief, attachments)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| {
                AppError::invalid_state("campaign", CampaignStatus::Archived, "update_brief")
            })?;

        self.audit
            .record(
                updated.agency_id,
                "campaign",
                updated.id,
                "campaign_brief_updated",
                caller,
                snapshot(&campaign),
                snapshot(&updated),
                serde_json::json!({}),
            )
            .await;
        Ok(updated)
    }

    pub async fn assign_user(
        &self,
        caller: &Caller,
        campaign_id: Uuid,
        membership_id: Uuid,
        role: CampaignRole,
    ) -> Result<CampaignMember, AppError> {
        let campaign = self
            .gate
            .require_campaign(caller, campaign_id, Permission::CampaignManage)
            .await?;
        self.ensure_not_frozen(&campaign, "assign_user")?;

        let membership = self
            .memberships
            .get(membership_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;
        if membership.agency_id != campaign.agency_id || !membership.is_active {
            return Err(AppError::validation(
                "membership_id",
                "must be an active membership of the owning agency",
            ));
        }

        let member = self
            .campaigns
            .add_member(campaign_id, membership_id, role)
            .await
            .map_err(AppError::from)?;

        self.audit
            .record(
                campaign.agency_id,
                "campaign",
                campaign.id,
                "campaign_user_assigned",
                caller,
                None,
                snapshot(&member),
                serde_json::json!({ "role": role }),
            )
            .await;
        Ok(member)
    }

    pub async fn remove_user(
        &self,
        caller: &Caller,
        campaign_id: Uuid,
        membership_id: Uuid,
    ) -> Result<(), AppError> {
        let campaign = self
            .gate
            .require_campaign(caller, campaign_id, Permission::CampaignManage)
            .await?;
        self.ensure_not_frozen(&campaign, "remove_user")?;

        let removed = self
            .campaigns
            .remove_member(campaign_id, membership_id)
            .await
            .map_err(AppError::from)?;
        if !removed {
            return Err(AppError::validation(
                "membership_id",
                "member not found, or removing them would leave the campaign without an approver",
            ));
        }

        self.audit
            .record(
                campaign.agency_id,
                "campaign",
                campaign.id,
                "campaign_user_removed",
                caller,
                None,
                None,
                serde_json::json!({ "membership_id": membership_id }),
            )
            .await;
        Ok(())
    }

    fn ensure_not_frozen(&self, campaign: &Campaign, attempted: &str) -> Result<(), AppError> {
        if is_frozen(campaign.status) {
            return Err(AppError::invalid_state(
                "campaign",
                campaign.status,
                attempted,
            ));
        }
        Ok(())
    }
}
