use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::subscriptions},
};
use domain::{
    entities::subscriptions::SubscriptionEntity,
    repositories::subscriptions::SubscriptionRepository,
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_current_active_non_free_subscription(
        &self,
        team_id: Uuid,
        free_plan_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();
        let granting_statuses: Vec<String> = SubscriptionStatus::ALL
            .into_iter()
            .filter(SubscriptionStatus::grants_plan)
            .map(|status| status.to_string())
            .collect();

        let result = subscriptions::table
            .filter(subscriptions::team_id.eq(team_id))
            .filter(subscriptions::plan_id.ne(free_plan_id))
            .filter(subscriptions::status.eq_any(granting_statuses))
            .filter(subscriptions::starts_at.le(now))
            .filter(subscriptions::ends_at.gt(now))
            .order(subscriptions::ends_at.desc())
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
