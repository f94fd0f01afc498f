use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use super::usage_limits::LimitName;

/// Fixed UUID representing the free plan.
pub const FREE_PLAN_ID: Uuid = Uuid::nil();

/// Subscription tier, taken from `plans.code`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Pro,
    Premium,
    /// Negotiated plan whose ceilings live in `plans.limits`.
    Custom,
}

impl PlanTier {
    /// Any code that is not one of the built-in tiers is a custom plan.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "free" => PlanTier::Free,
            "pro" => PlanTier::Pro,
            "premium" => PlanTier::Premium,
            _ => PlanTier::Custom,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Premium => "premium",
            PlanTier::Custom => "custom",
        }
    }
}

impl Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ceiling on one resource. Serialized as a number or `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLimitValue", into = "RawLimitValue")]
pub enum LimitValue {
    Bounded(i64),
    Unbounded,
}

impl LimitValue {
    /// Whether one more row may be created when `current` rows exist.
    pub fn allows(&self, current: i64) -> bool {
        match self {
            LimitValue::Unbounded => true,
            LimitValue::Bounded(max) => current < *max,
        }
    }

    pub fn remaining(&self, current: i64) -> Option<i64> {
        match self {
            LimitValue::Unbounded => None,
            LimitValue::Bounded(max) => Some(max.saturating_sub(current).max(0)),
        }
    }
}

impl Default for LimitValue {
    /// Missing entries deny creation.
    fn default() -> Self {
        LimitValue::Bounded(0)
    }
}

impl Display for LimitValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitValue::Bounded(max) => write!(f, "{}", max),
            LimitValue::Unbounded => f.write_str("unlimited"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawLimitValue {
    Count(i64),
    Keyword(String),
}

impl TryFrom<RawLimitValue> for LimitValue {
    type Error = String;

    fn try_from(value: RawLimitValue) -> Result<Self, Self::Error> {
        match value {
            RawLimitValue::Count(max) => Ok(LimitValue::Bounded(max)),
            RawLimitValue::Keyword(keyword) if keyword.eq_ignore_ascii_case("unlimited") => {
                Ok(LimitValue::Unbounded)
            }
            RawLimitValue::Keyword(keyword) => Err(format!("invalid limit value: {}", keyword)),
        }
    }
}

impl From<LimitValue> for RawLimitValue {
    fn from(value: LimitValue) -> Self {
        match value {
            LimitValue::Bounded(max) => RawLimitValue::Count(max),
            LimitValue::Unbounded => RawLimitValue::Keyword("unlimited".to_string()),
        }
    }
}

/// Numeric ceilings attached to a plan. Stored as JSONB for custom plans.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PlanLimits {
    #[serde(default)]
    pub max_contacts: LimitValue,

    #[serde(default)]
    pub max_team_members: LimitValue,

    #[serde(default)]
    pub max_tasks: LimitValue,

    #[serde(default)]
    pub max_quotes: LimitValue,

    #[serde(default)]
    pub max_tickets: LimitValue,

    #[serde(default)]
    pub max_invoices: LimitValue,

    #[serde(default)]
    pub max_social_accounts: LimitValue,

    #[serde(default)]
    pub max_social_posts: LimitValue,
}

impl PlanLimits {
    pub fn free() -> Self {
        Self {
            max_contacts: LimitValue::Bounded(15),
            max_team_members: LimitValue::Bounded(2),
            max_tasks: LimitValue::Bounded(25),
            max_quotes: LimitValue::Bounded(5),
            max_tickets: LimitValue::Bounded(10),
            max_invoices: LimitValue::Bounded(5),
            max_social_accounts: LimitValue::Bounded(1),
            max_social_posts: LimitValue::Bounded(10),
        }
    }

    pub fn pro() -> Self {
        Self {
            max_contacts: LimitValue::Bounded(2_500),
            max_team_members: LimitValue::Bounded(10),
            max_tasks: LimitValue::Bounded(1_000),
            max_quotes: LimitValue::Bounded(100),
            max_tickets: LimitValue::Bounded(500),
            max_invoices: LimitValue::Bounded(100),
            max_social_accounts: LimitValue::Bounded(5),
            max_social_posts: LimitValue::Bounded(300),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            max_contacts: LimitValue::Unbounded,
            max_team_members: LimitValue::Unbounded,
            max_tasks: LimitValue::Unbounded,
            max_quotes: LimitValue::Unbounded,
            max_tickets: LimitValue::Unbounded,
            max_invoices: LimitValue::Unbounded,
            max_social_accounts: LimitValue::Unbounded,
            max_social_posts: LimitValue::Unbounded,
        }
    }

    /// Static table for built-in tiers. Custom plans carry their own JSON and
    /// fall back to all-zero when it is missing or malformed.
    pub fn for_tier(tier: PlanTier, custom: Option<&serde_json::Value>) -> Self {
        match tier {
            PlanTier::Free => Self::free(),
            PlanTier::Pro => Self::pro(),
            PlanTier::Premium => Self::unbounded(),
            PlanTier::Custom => custom
                .and_then(|raw| serde_json::from_value(raw.clone()).ok())
                .unwrap_or_default(),
        }
    }

    pub fn get(&self, limit: LimitName) -> LimitValue {
        match limit {
            LimitName::Contacts => self.max_contacts,
            LimitName::TeamMembers => self.max_team_members,
            LimitName::Tasks => self.max_tasks,
            LimitName::Quotes => self.max_quotes,
            LimitName::Tickets => self.max_tickets,
            LimitName::Invoices => self.max_invoices,
            LimitName::SocialAccounts => self.max_social_accounts,
            LimitName::SocialPosts => self.max_social_posts,
        }
    }
}
