//! Role/permission matrix.
//!
//! Authorization is a closed enum of permissions mapped through an explicit
//! matrix, resolved once per request by the access gate. No string
//! comparisons anywhere.

use crate::models::MemberRole;

/// Permission required by an operation. Each mutation and protected query
/// names exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Campaign lifecycle transitions and detail/brief/date mutations.
    CampaignManage,
    /// Read access to campaigns and their deliverables.
    CampaignView,
    /// Create deliverables, upload versions, submit for review.
    DeliverableManage,
    /// Record approve/reject decisions at the campaign tier.
    DeliverableReview,
    /// Create and archive projects, manage project approvers/users.
    ProjectManage,
    /// Create and deactivate clients, manage client contacts.
    ClientManage,
    /// Add memberships and change member roles.
    MemberManage,
    /// Spend agency credits on metered fetch operations.
    CreditSpend,
    /// Read the agency email configuration.
    EmailConfigView,
}

impl Permission {
    /// Stable label used in forbidden errors and audit metadata.
    pub fn label(self) -> &'static str {
        match self {
            Permission::CampaignManage => "campaign:manage",
            Permission::CampaignView => "campaign:view",
            Permission::DeliverableManage => "deliverable:manage",
            Permission::DeliverableReview => "deliverable:review",
            Permission::ProjectManage => "project:manage",
            Permission::ClientManage => "client:manage",
            Permission::MemberManage => "member:manage",
            Permission::CreditSpend => "credit:spend",
            Permission::EmailConfigView => "email-config:view",
        }
    }
}

/// The permission matrix: role x permission -> bool.
///
/// Admins hold every permission. Account managers run the commercial side
/// and everything below it, except member administration. Operators run
/// campaigns day-to-day and may spend credits, but cannot touch clients,
/// projects, or memberships. Internal approvers only view and decide.
pub fn role_grants(role: MemberRole, permission: Permission) -> bool {
    use MemberRole::*;
    use Permission::*;

    match (role, permission) {
        (Admin, _) => true,

        (AccountManager, MemberManage) => false,
        (AccountManager, _) => true,

        (Operator, CampaignManage) => true,
        (Operator, CampaignView) => true,
        (Operator, DeliverableManage) => true,
        (Operator, CreditSpend) => true,
        (Operator, _) => false,

        (InternalApprover, CampaignView) => true,
        (InternalApprover, DeliverableReview) => true,
        (InternalApprover, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;

    #[test]
    fn test_admin_holds_every_permission() {
        for permission in [
            Permission::CampaignManage,
            Permission::CampaignView,
            Permission::DeliverableManage,
            Permission::DeliverableReview,
            Permission::ProjectManage,
            Permission::ClientManage,
            Permission::MemberManage,
            Permission::CreditSpend,
            Permission::EmailConfigView,
        ] {
            assert!(role_grants(MemberRole::Admin, permission));
        }
    }

    #[test]
    fn test_only_admin_manages_members() {
        assert!(role_grants(MemberRole::Admin, Permission::MemberManage));
        assert!(!role_grants(
            MemberRole::AccountManager,
            Permission::MemberManage
        ));
        assert!(!role_grants(MemberRole::Operator, Permission::MemberManage));
        assert!(!role_grants(
            MemberRole::InternalApprover,
            Permission::MemberManage
        ));
    }

    #[test]
    fn test_operator_scope() {
        assert!(role_grants(MemberRole::Operator, Permission::CampaignManage));
        assert!(role_grants(MemberRole::Operator, Permission::CreditSpend));
        assert!(!role_grants(MemberRole::Operator, Permission::ClientManage));
        assert!(!role_grants(MemberRole::Operator, Permission::ProjectManage));
        assert!(!role_grants(
            MemberRole::Operator,
            Permission::DeliverableReview
        ));
    }

    #[test]
    fn test_internal_approver_reviews_only() {
        assert!(role_grants(
            MemberRole::InternalApprover,
            Permission::DeliverableReview
        ));
        assert!(role_grants(
            MemberRole::InternalApprover,
            Permission::CampaignView
        ));
        assert!(!role_grants(
            MemberRole::InternalApprover,
            Permission::CampaignManage
        ));
        assert!(!role_grants(
            MemberRole::InternalApprover,
            Permission::CreditSpend
        ));
    }
}
