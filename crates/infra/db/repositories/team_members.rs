use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::team_members};
use domain::{
    entities::team_members::TeamMemberEntity, repositories::team_members::TeamMemberRepository,
};

pub struct TeamMemberPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TeamMemberPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TeamMemberRepository for TeamMemberPostgres {
    async fn find_member(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TeamMemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = team_members::table
            .find((team_id, user_id))
            .select(TeamMemberEntity::as_select())
            .first::<TeamMemberEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
