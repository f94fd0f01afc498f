use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::social_accounts};
use domain::{
    entities::social_accounts::SocialAccountEntity,
    repositories::social_accounts::SocialAccountRepository,
    value_objects::enums::social_providers::SocialProvider,
};

pub struct SocialAccountPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SocialAccountPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SocialAccountRepository for SocialAccountPostgres {
    async fn find_account(
        &self,
        user_id: Uuid,
        provider: SocialProvider,
    ) -> Result<Option<SocialAccountEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = social_accounts::table
            .filter(social_accounts::user_id.eq(user_id))
            .filter(social_accounts::provider.eq(provider.to_string()))
            .order(social_accounts::updated_at.desc())
            .select(SocialAccountEntity::as_select())
            .first::<SocialAccountEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_connected_user_ids(&self, provider: SocialProvider) -> Result<Vec<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = social_accounts::table
            .filter(social_accounts::provider.eq(provider.to_string()))
            .select(social_accounts::user_id)
            .distinct()
            .load::<Uuid>(&mut conn)?;

        Ok(results)
    }
}
