use anyhow::{Context, Result};
use crates::domain::{
    entities::plans::PlanEntity,
    repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
    value_objects::plans::{PlanLimits, PlanTier},
};
use std::{fmt::Display, sync::Arc};
use tracing::debug;
use uuid::Uuid;

/// Where a team's ceilings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Subscription(Uuid),
    FreeFallback,
}

impl Display for PlanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanSource::Subscription(id) => write!(f, "subscription:{}", id),
            PlanSource::FreeFallback => f.write_str("free_fallback"),
        }
    }
}

/// Ceilings that currently apply to a team.
#[derive(Debug, Clone)]
pub struct TeamLimits {
    pub plan_id: Uuid,
    pub tier: PlanTier,
    pub source: PlanSource,
    pub limits: PlanLimits,
}

/// Maps a team to the plan its billing grants. A team without a paid
/// subscription that grants access today is on the free plan.
pub struct PlanResolver<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    plans: Arc<P>,
    subscriptions: Arc<S>,
    free_plan_id: Uuid,
}

impl<P, S> PlanResolver<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(plans: Arc<P>, subscriptions: Arc<S>, free_plan_id: Uuid) -> Self {
        Self {
            plans,
            subscriptions,
            free_plan_id,
        }
    }

    pub async fn resolve_effective_plan_for_team(&self, team_id: Uuid) -> Result<PlanEntity> {
        let (plan, _) = self.load_plan(team_id).await?;
        Ok(plan)
    }

    pub async fn limits_for_team(&self, team_id: Uuid) -> Result<TeamLimits> {
        let (plan, source) = self.load_plan(team_id).await?;
        Ok(TeamLimits {
            plan_id: plan.id,
            tier: plan.tier,
            source,
            limits: plan.limits,
        })
    }

    /// Lookup failures propagate and never fall back to the free plan.
    async fn load_plan(&self, team_id: Uuid) -> Result<(PlanEntity, PlanSource)> {
        let subscription = self
            .subscriptions
            .find_current_active_non_free_subscription(team_id, self.free_plan_id)
            .await
            .with_context(|| format!("loading subscription of team {}", team_id))?;

        let (plan_id, source) = match subscription {
            Some(subscription) => (
                subscription.plan_id,
                PlanSource::Subscription(subscription.id),
            ),
            None => (self.free_plan_id, PlanSource::FreeFallback),
        };

        let plan = self
            .plans
            .find_by_id(plan_id)
            .await
            .with_context(|| format!("loading plan {} ({})", plan_id, source))?;

        debug!(%team_id, %plan_id, tier = %plan.tier, %source, "plan_resolver: resolved");
        Ok((plan, source))
    }
}
