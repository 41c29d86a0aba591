//! Access gate: the single chokepoint consulted before any read or write
//! that touches a protected resource.
//!
//! Given the resolved caller and a target resource, the gate walks the
//! ownership chain (deliverable -> campaign -> project -> client -> agency),
//! checks the caller's membership against the permission matrix, and returns
//! the resource. Distinct resolution paths exist per scope because the chain
//! differs.
//!
//! Cross-tenant probes get not-found, not forbidden: resource existence
//! itself would leak which agencies exist. Forbidden is reserved for callers
//! who can see the resource but lack the permission.

use uuid::Uuid;

use adflow_core::models::{Campaign, Client, Deliverable, Project};
use adflow_core::{role_grants, AppError, Permission};
use adflow_db::{CampaignRepository, ClientRepository, DeliverableRepository, ProjectRepository};

use crate::auth::models::{Caller, MemberIdentity};

#[derive(Clone)]
pub struct AccessGate {
    clients: ClientRepository,
    projects: ProjectRepository,
    campaigns: CampaignRepository,
    deliverables: DeliverableRepository,
}

impl AccessGate {
    pub fn new(
        clients: ClientRepository,
        projects: ProjectRepository,
        campaigns: CampaignRepository,
        deliverables: DeliverableRepository,
    ) -> Self {
        Self {
            clients,
            projects,
            campaigns,
            deliverables,
        }
    }

    /// Role check against the permission matrix. Portal identities hold no
    /// staff permissions; resource-scoped portal access goes through the
    /// resource methods below.
    pub fn require_permission<'c>(
        &self,
        caller: &'c Caller,
        permission: Permission,
    ) -> Result<&'c MemberIdentity, AppError> {
        match caller {
            Caller::Member(member) => {
                if role_grants(member.role, permission) {
                    Ok(member)
                } else {
                    Err(AppError::Forbidden(format!(
                        "Missing permission: {}",
                        permission.label()
                    )))
                }
            }
            Caller::Portal(_) => Err(AppError::Forbidden(
                "Portal identities cannot perform this action".to_string(),
            )),
        }
    }

    /// Agency-scoped authorization (ledger operations, member management,
    /// email config).
    pub fn require_agency(
        &self,
        caller: &Caller,
        agency_id: Uuid,
        permission: Permission,
    ) -> Result<(), AppError> {
        if caller.agency_id() != agency_id {
            return Err(AppError::NotFound("Agency not found".to_string()));
        }
        self.require_permission(caller, permission)?;
        Ok(())
    }

    pub async fn require_client(
        &self,
        caller: &Caller,
        client_id: Uuid,
        permission: Permission,
    ) -> Result<Client, AppError> {
        let client = self
            .clients
            .get(client_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;
        if client.agency_id != caller.agency_id() {
            return Err(AppError::NotFound("Client not found".to_string()));
        }
        self.require_permission(caller, permission)?;
        Ok(client)
    }

    pub async fn require_project(
        &self,
        caller: &Caller,
        project_id: Uuid,
        permission: Permission,
    ) -> Result<Project, AppError> {
        let project = self
            .projects
            .get(project_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
        if project.agency_id != caller.agency_id() {
            return Err(AppError::NotFound("Project not found".to_string()));
        }
        self.require_permission(caller, permission)?;
        Ok(project)
    }

    pub async fn require_campaign(
        &self,
        caller: &Caller,
        campaign_id: Uuid,
        permission: Permission,
    ) -> Result<Campaign, AppError> {
        let campaign = self
            .campaigns
            .get(campaign_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;
        if campaign.agency_id != caller.agency_id() {
            return Err(AppError::NotFound("Campaign not found".to_string()));
        }

        match caller {
            Caller::Member(_) => {
                self.require_permission(caller, permission)?;
            }
            Caller::Portal(portal) => {
                // Portal callers may only look at campaigns of their own
                // client.
                if permission != Permission::CampaignView {
                    return Err(AppError::Forbidden(
                        "Portal identities cannot perform this action".to_string(),
                    ));
                }
                let project = self
                    .projects
                    .get(campaign.project_id)
                    .await
                    .map_err(AppError::from)?
                    .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;
                if project.client_id != portal.client_id {
                    return Err(AppError::NotFound("Campaign not found".to_string()));
                }
            }
        }
        Ok(campaign)
    }

    /// Deliverable-scoped authorization. Returns the deliverable together
    /// with its campaign, which every caller ends up needing.
    pub async fn require_deliverable(
        &self,
        caller: &Caller,
        deliverable_id: Uuid,
        permission: Permission,
    ) -> Result<(Deliverable, Campaign), AppError> {
        let deliverable = self
            .deliverables
            .get(deliverable_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Deliverable not found".to_string()))?;
        if deliverable.agency_id != caller.agency_id() {
            return Err(AppError::NotFound("Deliverable not found".to_string()));
        }

        let campaign = self
            .campaigns
            .get(deliverable.campaign_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Deliverable not found".to_string()))?;

        match caller {
            Caller::Member(_) => {
                self.require_permission(caller, permission)?;
            }
            Caller::Portal(portal) => {
                if permission != Permission::CampaignView
                    && permission != Permission::DeliverableReview
                {
                    return Err(AppError::Forbidden(
                        "Portal identities cannot perform this action".to_string(),
                    ));
                }
                let project = self
                    .projects
                    .get(campaign.project_id)
                    .await
                    .map_err(AppError::from)?
                    .ok_or_else(|| AppError::NotFound("Deliverable not found".to_string()))?;
                if project.client_id != portal.client_id {
                    return Err(AppError::NotFound("Deliverable not found".to_string()));
                }
            }
        }
        Ok((deliverable, campaign))
    }
}
