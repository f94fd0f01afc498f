use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};
use crates::domain::{
    repositories::{
        plans::PlanRepository, subscriptions::SubscriptionRepository, usage::UsageRepository,
    },
    value_objects::usage_limits::{
        LimitName, UsageCheckOutcome, UsageCheckRequest, UsageLimitError, UsageScope,
    },
};
use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};
use tracing::{debug, info};

use super::plan_resolver::PlanResolver;

pub type CountFuture = Pin<Box<dyn Future<Output = Result<i64>> + Send>>;
pub type UsageCounter = Arc<dyn Fn(UsageScope) -> CountFuture + Send + Sync>;

/// Counting function per limit name. A limit without a counter is reported
/// as not implemented rather than treated as unlimited.
#[derive(Clone, Default)]
pub struct UsageLimitRegistry {
    counters: HashMap<LimitName, UsageCounter>,
}

impl UsageLimitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every limit counted through `UsageRepository`.
    pub fn with_default_counters<U>(usage_repo: Arc<U>) -> Self
    where
        U: UsageRepository + Send + Sync + 'static,
    {
        let mut registry = Self::new();

        registry.register_with(LimitName::Contacts, &usage_repo, |repo, scope| async move {
            repo.count_contacts(scope.team_id).await
        });
        registry.register_with(LimitName::TeamMembers, &usage_repo, |repo, scope| async move {
            repo.count_team_members(scope.team_id).await
        });
        registry.register_with(LimitName::Tasks, &usage_repo, |repo, scope| async move {
            repo.count_tasks(scope.team_id).await
        });
        registry.register_with(LimitName::Quotes, &usage_repo, |repo, scope| async move {
            repo.count_quotes_since(scope.team_id, scope.period_start)
                .await
        });
        registry.register_with(LimitName::Tickets, &usage_repo, |repo, scope| async move {
            repo.count_tickets_since(scope.team_id, scope.period_start)
                .await
        });
        registry.register_with(LimitName::Invoices, &usage_repo, |repo, scope| async move {
            repo.count_invoices_since(scope.team_id, scope.period_start)
                .await
        });
        registry.register_with(
            LimitName::SocialAccounts,
            &usage_repo,
            |repo, scope| async move { repo.count_social_accounts(scope.team_id).await },
        );
        registry.register_with(LimitName::SocialPosts, &usage_repo, |repo, scope| async move {
            repo.count_social_posts_since(scope.team_id, scope.period_start)
                .await
        });

        registry
    }

    pub fn register<F, Fut>(&mut self, limit: LimitName, counter: F)
    where
        F: Fn(UsageScope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<i64>> + Send + 'static,
    {
        let counter: UsageCounter = Arc::new(move |scope| Box::pin(counter(scope)) as CountFuture);
        self.counters.insert(limit, counter);
    }

    /// Registers a counter that needs a shared repository handle.
    pub fn register_with<R, F, Fut>(&mut self, limit: LimitName, repo: &Arc<R>, count: F)
    where
        R: Send + Sync + 'static + ?Sized,
        F: Fn(Arc<R>, UsageScope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<i64>> + Send + 'static,
    {
        let repo = Arc::clone(repo);
        self.register(limit, move |scope| count(Arc::clone(&repo), scope));
    }

    pub fn counter(&self, limit: LimitName) -> Option<UsageCounter> {
        self.counters.get(&limit).cloned()
    }

    pub fn registered(&self) -> Vec<LimitName> {
        LimitName::ALL
            .into_iter()
            .filter(|limit| self.counters.contains_key(limit))
            .collect()
    }
}

/// Start of the calendar month (UTC) that contains `now`.
pub fn current_period_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .with_day(1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|start| start.and_utc())
        .unwrap_or(now)
}

pub struct UsageLimitChecker<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    registry: Arc<UsageLimitRegistry>,
    plan_resolver: Arc<PlanResolver<P, S>>,
}

impl<P, S> UsageLimitChecker<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(registry: Arc<UsageLimitRegistry>, plan_resolver: Arc<PlanResolver<P, S>>) -> Self {
        Self {
            registry,
            plan_resolver,
        }
    }

    pub async fn check(&self, request: UsageCheckRequest) -> Result<UsageCheckOutcome> {
        let UsageCheckRequest { limit, scope } = request;

        let counter = self
            .registry
            .counter(limit)
            .ok_or(UsageLimitError::NotImplemented(limit))?;

        let team = self.plan_resolver.limits_for_team(scope.team_id).await?;
        let max = team.limits.get(limit);

        let current = counter(scope).await?;
        let outcome = UsageCheckOutcome::evaluate(limit, current, max);

        debug!(
            team_id = %scope.team_id,
            user_id = %scope.user_id,
            tier = %team.tier,
            source = %team.source,
            %limit,
            current,
            %max,
            allowed = outcome.allowed,
            "usage_limits: checked"
        );

        Ok(outcome)
    }

    pub async fn check_by_name(&self, limit: &str, scope: UsageScope) -> Result<UsageCheckOutcome> {
        let limit: LimitName = limit.parse()?;
        self.check(UsageCheckRequest { limit, scope }).await
    }

    /// Like [`Self::check`], but a disallowed outcome is an error.
    pub async fn ensure_within_limit(&self, request: UsageCheckRequest) -> Result<UsageCheckOutcome> {
        let outcome = self.check(request).await?;
        if !outcome.allowed {
            info!(
                team_id = %request.scope.team_id,
                limit = %outcome.limit,
                current = outcome.current,
                max = %outcome.max,
                "usage_limits: limit reached"
            );
            return Err(UsageLimitError::LimitReached {
                limit: outcome.limit,
                current: outcome.current,
                max: outcome.max,
            }
            .into());
        }
        Ok(outcome)
    }
}
