use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::repositories::usage::UsageRepository;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{contacts, invoices, quotes, social_accounts, social_posts, tasks, team_members, tickets},
};

pub struct UsagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UsagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UsageRepository for UsagePostgres {
    async fn count_contacts(&self, team_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = contacts::table
            .filter(contacts::team_id.eq(team_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_team_members(&self, team_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = team_members::table
            .filter(team_members::team_id.eq(team_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_tasks(&self, team_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = tasks::table
            .filter(tasks::team_id.eq(team_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_quotes_since(&self, team_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = quotes::table
            .filter(quotes::team_id.eq(team_id))
            .filter(quotes::created_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_tickets_since(&self, team_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = tickets::table
            .filter(tickets::team_id.eq(team_id))
            .filter(tickets::created_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_invoices_since(&self, team_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = invoices::table
            .filter(invoices::team_id.eq(team_id))
            .filter(invoices::created_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_social_accounts(&self, team_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = social_accounts::table
            .filter(social_accounts::team_id.eq(team_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_social_posts_since(&self, team_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = social_posts::table
            .filter(social_posts::team_id.eq(team_id))
            .filter(social_posts::created_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }
}
