use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

use super::plans::LimitValue;

/// Resource a plan puts a ceiling on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LimitName {
    Contacts,
    TeamMembers,
    Tasks,
    Quotes,
    Tickets,
    Invoices,
    SocialAccounts,
    SocialPosts,
}

impl LimitName {
    pub const ALL: [LimitName; 8] = [
        LimitName::Contacts,
        LimitName::TeamMembers,
        LimitName::Tasks,
        LimitName::Quotes,
        LimitName::Tickets,
        LimitName::Invoices,
        LimitName::SocialAccounts,
        LimitName::SocialPosts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LimitName::Contacts => "contacts",
            LimitName::TeamMembers => "team_members",
            LimitName::Tasks => "tasks",
            LimitName::Quotes => "quotes",
            LimitName::Tickets => "tickets",
            LimitName::Invoices => "invoices",
            LimitName::SocialAccounts => "social_accounts",
            LimitName::SocialPosts => "social_posts",
        }
    }

    /// Periodic limits only count rows created since the billing period start.
    pub fn is_periodic(&self) -> bool {
        matches!(
            self,
            LimitName::Quotes | LimitName::Tickets | LimitName::Invoices | LimitName::SocialPosts
        )
    }
}

impl Display for LimitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitName {
    type Err = UsageLimitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace('-', "_");
        let normalized = normalized.strip_prefix("max_").unwrap_or(&normalized);
        LimitName::ALL
            .into_iter()
            .find(|limit| limit.as_str() == normalized)
            .ok_or_else(|| UsageLimitError::UnknownLimit(value.to_string()))
    }
}

/// Parameters of one usage check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageScope {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub period_start: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCheckRequest {
    pub limit: LimitName,
    pub scope: UsageScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageCheckOutcome {
    pub limit: LimitName,
    pub current: i64,
    pub max: LimitValue,
    pub allowed: bool,
    pub remaining: Option<i64>,
}

impl UsageCheckOutcome {
    pub fn evaluate(limit: LimitName, current: i64, max: LimitValue) -> Self {
        Self {
            limit,
            current,
            max,
            allowed: max.allows(current),
            remaining: max.remaining(current),
        }
    }
}

#[derive(Debug, Error)]
pub enum UsageLimitError {
    #[error("unknown usage limit: {0}")]
    UnknownLimit(String),

    /// A limit exists on the plan but nothing counts it yet. Surfaced loudly
    /// instead of permitting unlimited usage.
    #[error("usage limit checker not implemented: {0}")]
    NotImplemented(LimitName),

    #[error("{limit} limit reached: current={current} max={max}")]
    LimitReached {
        limit: LimitName,
        current: i64,
        max: LimitValue,
    },
}
