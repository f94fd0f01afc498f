use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::team_members::TeamMemberEntity;

#[automock]
#[async_trait]
pub trait TeamMemberRepository {
    async fn find_member(&self, team_id: Uuid, user_id: Uuid)
    -> Result<Option<TeamMemberEntity>>;
}
