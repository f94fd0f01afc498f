use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

/// Counting queries behind the usage-limit checkers, all scoped to one team.
#[automock]
#[async_trait]
pub trait UsageRepository {
    async fn count_contacts(&self, team_id: Uuid) -> Result<i64>;

    async fn count_team_members(&self, team_id: Uuid) -> Result<i64>;

    async fn count_tasks(&self, team_id: Uuid) -> Result<i64>;

    async fn count_quotes_since(&self, team_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    async fn count_tickets_since(&self, team_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    async fn count_invoices_since(&self, team_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    async fn count_social_accounts(&self, team_id: Uuid) -> Result<i64>;

    async fn count_social_posts_since(&self, team_id: Uuid, since: DateTime<Utc>) -> Result<i64>;
}
