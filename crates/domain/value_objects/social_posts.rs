use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::enums::social_providers::SocialProvider;

/// Maximum ids echoed back per list in a pass summary.
pub const MAX_REPORTED_IDS: usize = 20;

#[derive(Debug, Clone)]
pub struct PublishPostsParams {
    pub provider: SocialProvider,
    /// Restricts the pass to one user's posts (dispatch fan-out).
    pub user_id: Option<Uuid>,
    pub now: DateTime<Utc>,
    pub limit: Option<i64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishPostsResult {
    pub scanned: usize,
    pub claimed: usize,
    pub published: usize,
    pub failed: usize,
    pub skipped_already_claimed: usize,
    pub candidate_ids: Vec<Uuid>,
    pub published_ids: Vec<Uuid>,
    pub failed_ids: Vec<Uuid>,
}

impl PublishPostsResult {
    pub fn merge(&mut self, other: PublishPostsResult) {
        self.scanned += other.scanned;
        self.claimed += other.claimed;
        self.published += other.published;
        self.failed += other.failed;
        self.skipped_already_claimed += other.skipped_already_claimed;
        extend_capped(&mut self.candidate_ids, other.candidate_ids);
        extend_capped(&mut self.published_ids, other.published_ids);
        extend_capped(&mut self.failed_ids, other.failed_ids);
    }
}

pub fn push_capped(ids: &mut Vec<Uuid>, id: Uuid) {
    if ids.len() < MAX_REPORTED_IDS {
        ids.push(id);
    }
}

fn extend_capped(ids: &mut Vec<Uuid>, other: Vec<Uuid>) {
    for id in other {
        push_capped(ids, id);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchPostsResult {
    pub users: usize,
    pub users_failed: usize,
    pub totals: PublishPostsResult,
}

/// Id the provider assigned to a published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub external_post_id: String,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no connected {0} account for user")]
    MissingCredential(SocialProvider),

    #[error("{0} access token expired")]
    CredentialExpired(SocialProvider),

    #[error("{provider} post is invalid: {reason}")]
    InvalidPost {
        provider: SocialProvider,
        reason: String,
    },

    #[error("{provider} api error: {message}")]
    Api {
        provider: SocialProvider,
        status: Option<u16>,
        message: String,
    },

    #[error("{provider} request failed: {message}")]
    Transport {
        provider: SocialProvider,
        message: String,
    },
}
