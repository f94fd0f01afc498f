use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{domain::value_objects::enums::team_roles::TeamRole, infra::db::postgres::schema::team_members};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = team_members)]
#[diesel(primary_key(team_id, user_id))]
pub struct TeamMemberEntity {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TeamMemberEntity {
    /// `None` when the stored value is not a known role.
    pub fn team_role(&self) -> Option<TeamRole> {
        TeamRole::parse(&self.role)
    }
}
