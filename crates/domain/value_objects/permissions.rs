use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::enums::team_roles::TeamRole;

/// Named capability a team member may hold. The role → permission mapping
/// below is static configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageTeam,
    DeleteTeam,
    InviteMembers,
    RemoveMembers,
    ManageRoles,
    ViewBilling,
    ManageBilling,
    ManageIntegrations,
    ViewContacts,
    ManageContacts,
    ManagePipeline,
    ManageTasks,
    ManageQuotes,
    ManageInvoices,
    ManageExpenses,
    ManageTickets,
    ManageSocial,
    ViewReports,
}

impl Permission {
    pub const ALL: [Permission; 18] = [
        Permission::ManageTeam,
        Permission::DeleteTeam,
        Permission::InviteMembers,
        Permission::RemoveMembers,
        Permission::ManageRoles,
        Permission::ViewBilling,
        Permission::ManageBilling,
        Permission::ManageIntegrations,
        Permission::ViewContacts,
        Permission::ManageContacts,
        Permission::ManagePipeline,
        Permission::ManageTasks,
        Permission::ManageQuotes,
        Permission::ManageInvoices,
        Permission::ManageExpenses,
        Permission::ManageTickets,
        Permission::ManageSocial,
        Permission::ViewReports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageTeam => "manage_team",
            Permission::DeleteTeam => "delete_team",
            Permission::InviteMembers => "invite_members",
            Permission::RemoveMembers => "remove_members",
            Permission::ManageRoles => "manage_roles",
            Permission::ViewBilling => "view_billing",
            Permission::ManageBilling => "manage_billing",
            Permission::ManageIntegrations => "manage_integrations",
            Permission::ViewContacts => "view_contacts",
            Permission::ManageContacts => "manage_contacts",
            Permission::ManagePipeline => "manage_pipeline",
            Permission::ManageTasks => "manage_tasks",
            Permission::ManageQuotes => "manage_quotes",
            Permission::ManageInvoices => "manage_invoices",
            Permission::ManageExpenses => "manage_expenses",
            Permission::ManageTickets => "manage_tickets",
            Permission::ManageSocial => "manage_social",
            Permission::ViewReports => "view_reports",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace('-', "_");
        Permission::ALL
            .into_iter()
            .find(|permission| permission.as_str() == normalized)
            .ok_or_else(|| format!("Unknown permission: {}", value))
    }
}

const OWNER_PERMISSIONS: &[Permission] = &Permission::ALL;

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ManageTeam,
    Permission::InviteMembers,
    Permission::RemoveMembers,
    Permission::ViewBilling,
    Permission::ManageIntegrations,
    Permission::ViewContacts,
    Permission::ManageContacts,
    Permission::ManagePipeline,
    Permission::ManageTasks,
    Permission::ManageQuotes,
    Permission::ManageInvoices,
    Permission::ManageExpenses,
    Permission::ManageTickets,
    Permission::ManageSocial,
    Permission::ViewReports,
];

const MEMBER_PERMISSIONS: &[Permission] = &[
    Permission::ViewContacts,
    Permission::ManageContacts,
    Permission::ManagePipeline,
    Permission::ManageTasks,
    Permission::ManageQuotes,
    Permission::ManageTickets,
    Permission::ManageSocial,
];

/// Fixed permission set of a role.
pub fn permissions_for(role: TeamRole) -> &'static [Permission] {
    match role {
        TeamRole::Owner => OWNER_PERMISSIONS,
        TeamRole::Admin => ADMIN_PERMISSIONS,
        TeamRole::Member => MEMBER_PERMISSIONS,
    }
}

/// Deny-by-default: no role means no permission.
pub fn has_permission(role: Option<TeamRole>, permission: Permission) -> bool {
    match role {
        Some(role) => permissions_for(role).contains(&permission),
        None => false,
    }
}

/// Same as [`has_permission`] for a raw role value as stored in the database.
pub fn role_has_permission(role: Option<&str>, permission: Permission) -> bool {
    has_permission(role.and_then(TeamRole::parse), permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_role_is_denied_everything() {
        for permission in Permission::ALL {
            assert!(!has_permission(None, permission), "{permission}");
        }
    }

    #[test]
    fn owner_holds_every_permission() {
        for permission in Permission::ALL {
            assert!(has_permission(Some(TeamRole::Owner), permission));
        }
    }

    #[test]
    fn admin_cannot_touch_billing_or_delete_team() {
        let admin = Some(TeamRole::Admin);
        assert!(has_permission(admin, Permission::ManageTeam));
        assert!(has_permission(admin, Permission::ViewBilling));
        assert!(!has_permission(admin, Permission::ManageBilling));
        assert!(!has_permission(admin, Permission::DeleteTeam));
        assert!(!has_permission(admin, Permission::ManageRoles));
    }

    #[test]
    fn member_is_limited_to_day_to_day_work() {
        let member = Some(TeamRole::Member);
        assert!(has_permission(member, Permission::ManageContacts));
        assert!(has_permission(member, Permission::ManageSocial));
        assert!(!has_permission(member, Permission::ManageTeam));
        assert!(!has_permission(member, Permission::ViewBilling));
        assert!(!has_permission(member, Permission::InviteMembers));
    }

    #[test]
    fn resolution_matches_the_role_table() {
        for role in TeamRole::ALL {
            for permission in Permission::ALL {
                assert_eq!(
                    has_permission(Some(role), permission),
                    permissions_for(role).contains(&permission)
                );
            }
        }
    }

    #[test]
    fn raw_role_values_fall_back_to_deny() {
        assert!(role_has_permission(Some("owner"), Permission::DeleteTeam));
        assert!(!role_has_permission(Some("guest"), Permission::ViewContacts));
        assert!(!role_has_permission(None, Permission::ViewContacts));
    }

    #[test]
    fn permission_names_parse() {
        assert_eq!("view_billing".parse::<Permission>(), Ok(Permission::ViewBilling));
        assert_eq!("Manage-Team".parse::<Permission>(), Ok(Permission::ManageTeam));
        assert!("launch_rockets".parse::<Permission>().is_err());
    }
}
