use async_trait::async_trait;

use super::graph_api::GraphApiClient;
use crate::domain::{
    entities::{social_accounts::SocialAccountEntity, social_posts::SocialPostEntity},
    repositories::social_publisher::SocialPublisher,
    value_objects::{
        enums::social_providers::SocialProvider,
        social_posts::{PublishError, PublishedPost},
    },
};

/// Publishes to a Facebook page feed.
pub struct FacebookPublisher {
    graph: GraphApiClient,
}

impl FacebookPublisher {
    pub fn new(graph: GraphApiClient) -> Self {
        Self { graph }
    }
}

/// Form fields for `POST /{page_id}/feed`.
pub fn feed_form(post: &SocialPostEntity) -> Result<Vec<(&'static str, String)>, PublishError> {
    let message = post.content.trim();
    let link = post
        .link_url
        .as_deref()
        .map(str::trim)
        .filter(|link| !link.is_empty());

    if message.is_empty() && link.is_none() {
        return Err(PublishError::InvalidPost {
            provider: SocialProvider::Facebook,
            reason: "post has neither message nor link".to_string(),
        });
    }

    let mut form = Vec::new();
    if !message.is_empty() {
        form.push(("message", message.to_string()));
    }
    if let Some(link) = link {
        form.push(("link", link.to_string()));
    }
    Ok(form)
}

#[async_trait]
impl SocialPublisher for FacebookPublisher {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Facebook
    }

    async fn publish(
        &self,
        account: &SocialAccountEntity,
        post: &SocialPostEntity,
    ) -> Result<PublishedPost, PublishError> {
        let form = feed_form(post)?;

        let created = self
            .graph
            .post_for_id(
                SocialProvider::Facebook,
                &account.external_account_id,
                "feed",
                &account.access_token,
                form,
            )
            .await?;

        Ok(PublishedPost {
            external_post_id: created.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn post(content: &str, link_url: Option<&str>) -> SocialPostEntity {
        let now = Utc::now();
        SocialPostEntity {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider: "facebook".to_string(),
            content: content.to_string(),
            link_url: link_url.map(str::to_string),
            media_url: None,
            status: "publishing".to_string(),
            scheduled_at: now,
            claimed_at: Some(now),
            published_at: None,
            external_post_id: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn feed_form_carries_message_and_link() {
        let form = feed_form(&post(" Spring sale ", Some("https://shop.example"))).unwrap();
        assert_eq!(
            form,
            vec![
                ("message", "Spring sale".to_string()),
                ("link", "https://shop.example".to_string()),
            ]
        );
    }

    #[test]
    fn link_only_post_is_valid() {
        let form = feed_form(&post("", Some("https://shop.example"))).unwrap();
        assert_eq!(form, vec![("link", "https://shop.example".to_string())]);
    }

    #[test]
    fn empty_post_is_rejected_before_calling_the_api() {
        let err = feed_form(&post("   ", Some(" "))).unwrap_err();
        assert!(matches!(err, PublishError::InvalidPost { .. }));
    }
}
