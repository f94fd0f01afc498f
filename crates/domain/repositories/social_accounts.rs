use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::social_accounts::SocialAccountEntity,
    value_objects::enums::social_providers::SocialProvider,
};

#[automock]
#[async_trait]
pub trait SocialAccountRepository {
    async fn find_account(
        &self,
        user_id: Uuid,
        provider: SocialProvider,
    ) -> Result<Option<SocialAccountEntity>>;

    /// Users with a stored credential for the provider.
    async fn list_connected_user_ids(&self, provider: SocialProvider) -> Result<Vec<Uuid>>;
}
