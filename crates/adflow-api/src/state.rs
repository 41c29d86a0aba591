//! Application state: repositories, the access gate, and domain services,
//! shared across handlers behind an Arc.

use sqlx::PgPool;

use adflow_core::Config;
use adflow_db::{
    ActivityLogRepository, AgencyRepository, ApprovalRepository, CampaignRepository,
    ClientRepository, CreatorRepository, DeliverableRepository, EmailConfigRepository,
    MembershipRepository, PaymentRepository, ProjectRepository, SocialJobRepository,
    UserRepository,
};

use crate::auth::gate::AccessGate;
use crate::services::{
    AuditLogger, CampaignService, DeliverableService, MeteringService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: UserRepository,
    pub agencies: AgencyRepository,
    pub memberships: MembershipRepository,
    pub clients: ClientRepository,
    pub projects: ProjectRepository,
    pub campaigns: CampaignRepository,
    pub deliverables: DeliverableRepository,
    pub creators: CreatorRepository,
    pub payments: PaymentRepository,
    pub social_jobs: SocialJobRepository,
    pub activity_log: ActivityLogRepository,
    pub email_configs: EmailConfigRepository,
    pub gate: AccessGate,
    pub audit: AuditLogger,
    pub campaign_service: CampaignService,
    pub deliverable_service: DeliverableService,
    pub metering_service: MeteringService,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Self {
        let users = UserRepository::new(pool.clone());
        let agencies = AgencyRepository::new(pool.clone());
        let memberships = MembershipRepository::new(pool.clone());
        let clients = ClientRepository::new(pool.clone());
        let projects = ProjectRepository::new(pool.clone());
        let campaigns = CampaignRepository::new(pool.clone());
        let deliverables = DeliverableRepository::new(pool.clone());
        let approvals = ApprovalRepository::new(pool.clone());
        let creators = CreatorRepository::new(pool.clone());
        let payments = PaymentRepository::new(pool.clone());
        let social_jobs = SocialJobRepository::new(pool.clone());
        let activity_log = ActivityLogRepository::new(pool.clone());
        let email_configs = EmailConfigRepository::new(pool.clone());

        let gate = AccessGate::new(
            clients.clone(),
            projects.clone(),
            campaigns.clone(),
            deliverables.clone(),
        );
        let audit = AuditLogger::new(activity_log.clone());

        let campaign_service = CampaignService::new(
            gate.clone(),
            memberships.clone(),
            campaigns.clone(),
            audit.clone(),
        );
        let deliverable_service = DeliverableService::new(
            gate.clone(),
            campaigns.clone(),
            projects.clone(),
            clients.clone(),
            deliverables.clone(),
            approvals.clone(),
            audit.clone(),
        );
        let metering_service = MeteringService::new(
            gate.clone(),
            agencies.clone(),
            creators.clone(),
            social_jobs.clone(),
            audit.clone(),
        );

        Self {
            config,
            users,
            agencies,
            memberships,
            clients,
            projects,
            campaigns,
            deliverables,
            creators,
            payments,
            social_jobs,
            activity_log,
            email_configs,
            gate,
            audit,
            campaign_service,
            deliverable_service,
            metering_service,
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
