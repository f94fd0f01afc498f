use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    entities::{
        notifications::{InsertNotificationEntity, SOCIAL_POST_FAILED_KIND},
        social_posts::SocialPostEntity,
    },
    repositories::{
        notifications::NotificationRepository, social_accounts::SocialAccountRepository,
        social_posts::SocialPostRepository, social_publisher::SocialPublisher,
    },
    value_objects::{
        enums::social_providers::SocialProvider,
        social_posts::{
            DispatchPostsResult, PublishError, PublishPostsParams, PublishPostsResult,
            PublishedPost, push_capped,
        },
    },
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, error, info, warn};

pub const STALE_CLAIM_MESSAGE: &str = "publish interrupted before completion";

/// Error messages are stored on the post and shown to the user.
const MAX_ERROR_MESSAGE_CHARS: usize = 1000;

pub struct PublishScheduledPostsUseCase {
    post_repository: Arc<dyn SocialPostRepository + Send + Sync>,
    account_repository: Arc<dyn SocialAccountRepository + Send + Sync>,
    notification_repository: Arc<dyn NotificationRepository + Send + Sync>,
    publishers: HashMap<SocialProvider, Arc<dyn SocialPublisher + Send + Sync>>,
}

impl PublishScheduledPostsUseCase {
    pub fn new(
        post_repository: Arc<dyn SocialPostRepository + Send + Sync>,
        account_repository: Arc<dyn SocialAccountRepository + Send + Sync>,
        notification_repository: Arc<dyn NotificationRepository + Send + Sync>,
        publishers: Vec<Arc<dyn SocialPublisher + Send + Sync>>,
    ) -> Self {
        let publishers = publishers
            .into_iter()
            .map(|publisher| (publisher.provider(), publisher))
            .collect();

        Self {
            post_repository,
            account_repository,
            notification_repository,
            publishers,
        }
    }

    pub fn providers(&self) -> Vec<SocialProvider> {
        SocialProvider::ALL
            .into_iter()
            .filter(|provider| self.publishers.contains_key(provider))
            .collect()
    }

    /// One polling pass over the due posts of a provider.
    pub async fn run(&self, params: PublishPostsParams) -> Result<PublishPostsResult> {
        let provider = params.provider;
        let publisher = self
            .publishers
            .get(&provider)
            .ok_or_else(|| anyhow!("no publisher registered for {}", provider))?;
        let limit = params.limit.filter(|l| *l > 0);

        let posts: Vec<SocialPostEntity> = self
            .post_repository
            .list_due_posts(provider, params.user_id, params.now, limit)
            .await?
            .into_iter()
            .filter(|post| {
                let due = post.is_due_at(params.now);
                if !due {
                    warn!(
                        post_id = %post.id,
                        %provider,
                        status = %post.status,
                        scheduled_at = %post.scheduled_at,
                        "publish_posts: listed post is not due; skipping"
                    );
                }
                due
            })
            .collect();

        let mut result = PublishPostsResult {
            scanned: posts.len(),
            ..Default::default()
        };

        for post in posts {
            push_capped(&mut result.candidate_ids, post.id);

            if params.dry_run {
                continue;
            }

            match self.post_repository.claim_post(post.id, Utc::now()).await {
                Ok(true) => result.claimed += 1,
                Ok(false) => {
                    debug!(
                        post_id = %post.id,
                        %provider,
                        "publish_posts: already claimed by another pass; skipping"
                    );
                    result.skipped_already_claimed += 1;
                    continue;
                }
                Err(err) => {
                    error!(
                        post_id = %post.id,
                        %provider,
                        error = ?err,
                        "publish_posts: failed to claim post"
                    );
                    continue;
                }
            }

            match self
                .publish_claimed(publisher.as_ref(), &post, params.now)
                .await
            {
                Ok(published) => {
                    self.record_success(&post, published).await;
                    result.published += 1;
                    push_capped(&mut result.published_ids, post.id);
                }
                Err(err) => {
                    self.record_failure(provider, &post, &format!("{:#}", err))
                        .await;
                    result.failed += 1;
                    push_capped(&mut result.failed_ids, post.id);
                }
            }
        }

        info!(
            %provider,
            user_id = ?params.user_id,
            scanned = result.scanned,
            claimed = result.claimed,
            published = result.published,
            failed = result.failed,
            skipped_already_claimed = result.skipped_already_claimed,
            dry_run = params.dry_run,
            "publish_posts: completed"
        );

        Ok(result)
    }

    /// Runs one pass per user holding a connected account for the provider.
    /// A failing user pass does not stop the others.
    pub async fn dispatch(
        &self,
        provider: SocialProvider,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<DispatchPostsResult> {
        let user_ids = self
            .account_repository
            .list_connected_user_ids(provider)
            .await?;

        let mut result = DispatchPostsResult {
            users: user_ids.len(),
            ..Default::default()
        };

        for user_id in user_ids {
            let params = PublishPostsParams {
                provider,
                user_id: Some(user_id),
                now,
                limit,
                dry_run: false,
            };

            match self.run(params).await {
                Ok(user_result) => result.totals.merge(user_result),
                Err(err) => {
                    error!(
                        %provider,
                        %user_id,
                        error = ?err,
                        "publish_posts: user pass failed"
                    );
                    result.users_failed += 1;
                }
            }
        }

        info!(
            %provider,
            users = result.users,
            users_failed = result.users_failed,
            published = result.totals.published,
            failed = result.totals.failed,
            "publish_posts: dispatch completed"
        );

        Ok(result)
    }

    /// Fails posts a crashed pass left in `publishing`. They are not retried,
    /// since the provider may already have accepted them.
    pub async fn fail_stale_claims(
        &self,
        provider: SocialProvider,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Result<usize> {
        let stale = self
            .post_repository
            .fail_stale_claims(provider, now - stale_after, STALE_CLAIM_MESSAGE.to_string())
            .await?;

        for post in &stale {
            warn!(
                post_id = %post.id,
                %provider,
                claimed_at = ?post.claimed_at,
                "publish_posts: stale claim marked failed"
            );
            self.notify_failure(provider, post, STALE_CLAIM_MESSAGE).await;
        }

        Ok(stale.len())
    }

    async fn publish_claimed(
        &self,
        publisher: &(dyn SocialPublisher + Send + Sync),
        post: &SocialPostEntity,
        now: DateTime<Utc>,
    ) -> Result<PublishedPost> {
        let provider = publisher.provider();
        let account = self
            .account_repository
            .find_account(post.user_id, provider)
            .await?
            .ok_or(PublishError::MissingCredential(provider))?;

        if account.is_expired_at(now) {
            return Err(PublishError::CredentialExpired(provider).into());
        }

        Ok(publisher.publish(&account, post).await?)
    }

    async fn record_success(&self, post: &SocialPostEntity, published: PublishedPost) {
        info!(
            post_id = %post.id,
            provider = %post.provider,
            external_post_id = %published.external_post_id,
            "publish_posts: published"
        );

        match self
            .post_repository
            .mark_published(post.id, published.external_post_id, Utc::now())
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(
                post_id = %post.id,
                "publish_posts: claim lost before the post was marked published"
            ),
            // Left in `publishing`; the stale-claim sweep fails it later.
            Err(err) => error!(
                post_id = %post.id,
                error = ?err,
                "publish_posts: published but failed to update post status"
            ),
        }
    }

    async fn record_failure(&self, provider: SocialProvider, post: &SocialPostEntity, message: &str) {
        let message = truncate_message(message);
        warn!(
            post_id = %post.id,
            %provider,
            error = %message,
            "publish_posts: publish failed"
        );

        match self
            .post_repository
            .mark_failed(post.id, message.clone())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                // Whoever took the claim owns the outcome and its notification.
                warn!(
                    post_id = %post.id,
                    %provider,
                    "publish_posts: claim lost before the post was marked failed"
                );
                return;
            }
            Err(err) => error!(
                post_id = %post.id,
                error = ?err,
                "publish_posts: failed to mark post failed"
            ),
        }

        self.notify_failure(provider, post, &message).await;
    }

    async fn notify_failure(&self, provider: SocialProvider, post: &SocialPostEntity, message: &str) {
        let notification = failure_notification(provider, post, message);
        if let Err(err) = self.notification_repository.create(notification).await {
            error!(
                post_id = %post.id,
                error = ?err,
                "publish_posts: failed to create failure notification"
            );
        }
    }
}

fn failure_notification(
    provider: SocialProvider,
    post: &SocialPostEntity,
    message: &str,
) -> InsertNotificationEntity {
    InsertNotificationEntity {
        user_id: post.user_id,
        team_id: Some(post.team_id),
        kind: SOCIAL_POST_FAILED_KIND.to_string(),
        title: format!("Scheduled {} post failed", provider),
        body: message.to_string(),
        is_read: false,
        created_at: Utc::now(),
    }
}

fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_MESSAGE_CHARS {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(MAX_ERROR_MESSAGE_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests;
