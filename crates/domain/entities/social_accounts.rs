use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::social_accounts;

/// Stored OAuth credential of one user for one provider.
#[derive(Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = social_accounts)]
pub struct SocialAccountEntity {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    /// Facebook page id or Instagram business user id.
    pub external_account_id: String,
    pub access_token: String,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SocialAccountEntity {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

// Hand-written so access tokens never end up in logs.
impl std::fmt::Debug for SocialAccountEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialAccountEntity")
            .field("id", &self.id)
            .field("team_id", &self.team_id)
            .field("user_id", &self.user_id)
            .field("provider", &self.provider)
            .field("external_account_id", &self.external_account_id)
            .field("access_token", &"[REDACTED]")
            .field("token_expires_at", &self.token_expires_at)
            .finish()
    }
}
