use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    /// Latest subscription of the team that is active now and not on the free plan.
    async fn find_current_active_non_free_subscription(
        &self,
        team_id: Uuid,
        free_plan_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>>;
}
