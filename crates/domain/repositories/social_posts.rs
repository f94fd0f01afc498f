use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::social_posts::SocialPostEntity,
    value_objects::enums::social_providers::SocialProvider,
};

#[automock]
#[async_trait]
pub trait SocialPostRepository {
    /// Rows with `status = 'scheduled'` and `scheduled_at <= now`, oldest first.
    async fn list_due_posts(
        &self,
        provider: SocialProvider,
        user_id: Option<Uuid>,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<SocialPostEntity>>;

    /// Moves the row from `scheduled` to `publishing`. Returns `false` when
    /// another pass got there first.
    async fn claim_post(&self, post_id: Uuid, claimed_at: DateTime<Utc>) -> Result<bool>;

    /// Both outcomes only apply to a row still in `publishing`. `false` means
    /// the claim was lost, e.g. to the stale-claim sweep.
    async fn mark_published(
        &self,
        post_id: Uuid,
        external_post_id: String,
        published_at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn mark_failed(&self, post_id: Uuid, error_message: String) -> Result<bool>;

    /// Fails rows stuck in `publishing` since before `claimed_before`.
    async fn fail_stale_claims(
        &self,
        provider: SocialProvider,
        claimed_before: DateTime<Utc>,
        error_message: String,
    ) -> Result<Vec<SocialPostEntity>>;
}
