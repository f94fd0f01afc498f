use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::social_posts};
use domain::{
    entities::social_posts::SocialPostEntity,
    repositories::social_posts::SocialPostRepository,
    value_objects::enums::{post_statuses::PostStatus, social_providers::SocialProvider},
};

pub struct SocialPostPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SocialPostPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SocialPostRepository for SocialPostPostgres {
    async fn list_due_posts(
        &self,
        provider: SocialProvider,
        user_id: Option<Uuid>,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<SocialPostEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = social_posts::table
            .select(SocialPostEntity::as_select())
            .filter(social_posts::provider.eq(provider.to_string()))
            .filter(social_posts::status.eq(PostStatus::Scheduled.to_string()))
            .filter(social_posts::scheduled_at.le(now))
            .order(social_posts::scheduled_at.asc())
            .into_boxed();

        if let Some(user_id) = user_id {
            query = query.filter(social_posts::user_id.eq(user_id));
        }

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let results = query.load::<SocialPostEntity>(&mut conn)?;

        Ok(results)
    }

    async fn claim_post(&self, post_id: Uuid, claimed_at: DateTime<Utc>) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Conditional on the current status so only one pass wins the row.
        let updated = update(social_posts::table)
            .filter(social_posts::id.eq(post_id))
            .filter(social_posts::status.eq(PostStatus::Scheduled.to_string()))
            .set((
                social_posts::status.eq(PostStatus::Publishing.to_string()),
                social_posts::claimed_at.eq(Some(claimed_at)),
                social_posts::updated_at.eq(claimed_at),
            ))
            .execute(&mut conn)?;

        Ok(updated == 1)
    }

    async fn mark_published(
        &self,
        post_id: Uuid,
        external_post_id: String,
        published_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(social_posts::table.find(post_id))
            .filter(social_posts::status.eq(PostStatus::Publishing.to_string()))
            .set((
                social_posts::status.eq(PostStatus::Published.to_string()),
                social_posts::published_at.eq(Some(published_at)),
                social_posts::external_post_id.eq(Some(external_post_id)),
                social_posts::error_message.eq::<Option<String>>(None),
                social_posts::updated_at.eq(published_at),
            ))
            .execute(&mut conn)?;

        Ok(updated == 1)
    }

    async fn mark_failed(&self, post_id: Uuid, error_message: String) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(social_posts::table.find(post_id))
            .filter(social_posts::status.eq(PostStatus::Publishing.to_string()))
            .set((
                social_posts::status.eq(PostStatus::Failed.to_string()),
                social_posts::error_message.eq(Some(error_message)),
                social_posts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated == 1)
    }

    async fn fail_stale_claims(
        &self,
        provider: SocialProvider,
        claimed_before: DateTime<Utc>,
        error_message: String,
    ) -> Result<Vec<SocialPostEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = update(social_posts::table)
            .filter(social_posts::provider.eq(provider.to_string()))
            .filter(social_posts::status.eq(PostStatus::Publishing.to_string()))
            .filter(social_posts::claimed_at.lt(claimed_before))
            .set((
                social_posts::status.eq(PostStatus::Failed.to_string()),
                social_posts::error_message.eq(Some(error_message)),
                social_posts::updated_at.eq(Utc::now()),
            ))
            .returning(SocialPostEntity::as_returning())
            .get_results::<SocialPostEntity>(&mut conn)?;

        Ok(results)
    }
}
