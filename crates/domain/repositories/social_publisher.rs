use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::{social_accounts::SocialAccountEntity, social_posts::SocialPostEntity},
    value_objects::{
        enums::social_providers::SocialProvider,
        social_posts::{PublishError, PublishedPost},
    },
};

/// One third-party publish API.
#[automock]
#[async_trait]
pub trait SocialPublisher {
    fn provider(&self) -> SocialProvider;

    async fn publish(
        &self,
        account: &SocialAccountEntity,
        post: &SocialPostEntity,
    ) -> Result<PublishedPost, PublishError>;
}
