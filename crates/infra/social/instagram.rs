use async_trait::async_trait;
use tracing::debug;

use super::graph_api::GraphApiClient;
use crate::domain::{
    entities::{social_accounts::SocialAccountEntity, social_posts::SocialPostEntity},
    repositories::social_publisher::SocialPublisher,
    value_objects::{
        enums::social_providers::SocialProvider,
        social_posts::{PublishError, PublishedPost},
    },
};

/// Two-step Instagram content publishing: create a media container, then
/// publish it.
pub struct InstagramPublisher {
    graph: GraphApiClient,
}

impl InstagramPublisher {
    pub fn new(graph: GraphApiClient) -> Self {
        Self { graph }
    }
}

/// Instagram captions do not render links, so the link is appended as text.
pub fn caption(post: &SocialPostEntity) -> String {
    let content = post.content.trim();
    match post.link_url.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        Some(link) if content.is_empty() => link.to_string(),
        Some(link) => format!("{content}\n\n{link}"),
        None => content.to_string(),
    }
}

pub fn media_url(post: &SocialPostEntity) -> Result<String, PublishError> {
    post.media_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PublishError::InvalidPost {
            provider: SocialProvider::Instagram,
            reason: "instagram posts require an image".to_string(),
        })
}

#[async_trait]
impl SocialPublisher for InstagramPublisher {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Instagram
    }

    async fn publish(
        &self,
        account: &SocialAccountEntity,
        post: &SocialPostEntity,
    ) -> Result<PublishedPost, PublishError> {
        let image_url = media_url(post)?;

        let container = self
            .graph
            .post_for_id(
                SocialProvider::Instagram,
                &account.external_account_id,
                "media",
                &account.access_token,
                vec![("image_url", image_url), ("caption", caption(post))],
            )
            .await?;

        debug!(
            post_id = %post.id,
            creation_id = %container.id,
            "instagram: media container created"
        );

        let published = self
            .graph
            .post_for_id(
                SocialProvider::Instagram,
                &account.external_account_id,
                "media_publish",
                &account.access_token,
                vec![("creation_id", container.id)],
            )
            .await?;

        Ok(PublishedPost {
            external_post_id: published.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn post(content: &str, link_url: Option<&str>, media_url: Option<&str>) -> SocialPostEntity {
        let now = Utc::now();
        SocialPostEntity {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider: "instagram".to_string(),
            content: content.to_string(),
            link_url: link_url.map(str::to_string),
            media_url: media_url.map(str::to_string),
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
    fn caption_appends_link() {
        let post = post("New arrivals", Some("https://shop.example"), None);
        assert_eq!(caption(&post), "New arrivals\n\nhttps://shop.example");
    }

    #[test]
    fn caption_without_link_is_content() {
        assert_eq!(caption(&post(" Hello ", None, None)), "Hello");
    }

    #[test]
    fn post_without_image_is_invalid() {
        let err = media_url(&post("Hello", None, Some("  "))).unwrap_err();
        assert!(matches!(
            err,
            PublishError::InvalidPost {
                provider: SocialProvider::Instagram,
                ..
            }
        ));
        assert_eq!(
            media_url(&post("Hello", None, Some("https://cdn.example/a.jpg"))).unwrap(),
            "https://cdn.example/a.jpg"
        );
    }
}
