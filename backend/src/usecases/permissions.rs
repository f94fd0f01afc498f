use anyhow::Result;
use crates::domain::{
    repositories::team_members::TeamMemberRepository,
    value_objects::{
        enums::team_roles::TeamRole,
        permissions::{Permission, has_permission, permissions_for},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("permission denied: {permission}")]
    Denied { permission: Permission },
}

/// Role-based access answers for one team member.
pub struct PermissionUseCase<T>
where
    T: TeamMemberRepository + Send + Sync + 'static,
{
    team_member_repo: Arc<T>,
}

impl<T> PermissionUseCase<T>
where
    T: TeamMemberRepository + Send + Sync + 'static,
{
    pub fn new(team_member_repo: Arc<T>) -> Self {
        Self { team_member_repo }
    }

    /// `None` when the user is not a member or holds an unrecognised role.
    pub async fn member_role(&self, team_id: Uuid, user_id: Uuid) -> Result<Option<TeamRole>> {
        let member = self.team_member_repo.find_member(team_id, user_id).await?;
        Ok(member.and_then(|member| member.team_role()))
    }

    pub async fn member_permissions(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<(Option<TeamRole>, Vec<Permission>)> {
        let role = self.member_role(team_id, user_id).await?;
        let permissions = role
            .map(|role| permissions_for(role).to_vec())
            .unwrap_or_default();
        Ok((role, permissions))
    }

    pub async fn member_has_permission(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        permission: Permission,
    ) -> Result<bool> {
        let role = self.member_role(team_id, user_id).await?;
        let allowed = has_permission(role, permission);

        debug!(
            %team_id,
            %user_id,
            role = role.map(|role| role.as_str()).unwrap_or("none"),
            %permission,
            allowed,
            "permissions: resolved"
        );

        Ok(allowed)
    }

    pub async fn ensure_permission(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        permission: Permission,
    ) -> Result<()> {
        if self
            .member_has_permission(team_id, user_id, permission)
            .await?
        {
            Ok(())
        } else {
            Err(PermissionError::Denied { permission }.into())
        }
    }
}
