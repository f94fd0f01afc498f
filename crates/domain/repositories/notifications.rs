use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::notifications::InsertNotificationEntity;

#[automock]
#[async_trait]
pub trait NotificationRepository {
    async fn create(&self, notification: InsertNotificationEntity) -> Result<Uuid>;
}
