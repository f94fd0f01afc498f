use crate::{
    auth::{AuthConfig, AuthUser},
    axum_http::error_responses::AppError,
    usecases::{
        permissions::PermissionUseCase,
        plan_resolver::PlanResolver,
        usage_limits::{UsageLimitChecker, UsageLimitRegistry, current_period_start},
    },
};
use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use crates::{
    domain::{
        repositories::{
            plans::PlanRepository, subscriptions::SubscriptionRepository,
            team_members::TeamMemberRepository,
        },
        value_objects::{
            enums::team_roles::TeamRole,
            permissions::Permission,
            plans::FREE_PLAN_ID,
            usage_limits::{UsageCheckOutcome, UsageScope},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            plans::PlanPostgres, subscriptions::SubscriptionPostgres,
            team_members::TeamMemberPostgres, usage::UsagePostgres,
        },
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub struct TeamsState<T, P, S>
where
    T: TeamMemberRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub permissions: Arc<PermissionUseCase<T>>,
    pub usage: Arc<UsageLimitChecker<P, S>>,
    pub auth: AuthConfig,
}

impl<T, P, S> Clone for TeamsState<T, P, S>
where
    T: TeamMemberRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            permissions: Arc::clone(&self.permissions),
            usage: Arc::clone(&self.usage),
            auth: self.auth.clone(),
        }
    }
}

impl<T, P, S> FromRef<TeamsState<T, P, S>> for AuthConfig
where
    T: TeamMemberRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    fn from_ref(state: &TeamsState<T, P, S>) -> Self {
        state.auth.clone()
    }
}

pub fn routes(db_pool: Arc<PgPoolSquad>, auth: AuthConfig) -> Router {
    let team_member_repository = TeamMemberPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let usage_repository = UsagePostgres::new(Arc::clone(&db_pool));

    let plan_resolver = PlanResolver::new(
        Arc::new(plan_repository),
        Arc::new(subscription_repository),
        FREE_PLAN_ID,
    );
    let registry = UsageLimitRegistry::with_default_counters(Arc::new(usage_repository));

    let state = TeamsState {
        permissions: Arc::new(PermissionUseCase::new(Arc::new(team_member_repository))),
        usage: Arc::new(UsageLimitChecker::new(
            Arc::new(registry),
            Arc::new(plan_resolver),
        )),
        auth,
    };

    Router::new()
        .route(
            "/:team_id/permissions",
            get(list_permissions::<TeamMemberPostgres, PlanPostgres, SubscriptionPostgres>),
        )
        .route(
            "/:team_id/permissions/:permission",
            get(check_permission::<TeamMemberPostgres, PlanPostgres, SubscriptionPostgres>),
        )
        .route(
            "/:team_id/usage/:limit",
            get(check_usage::<TeamMemberPostgres, PlanPostgres, SubscriptionPostgres>),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct TeamPermissionsResponse {
    pub team_id: Uuid,
    pub role: TeamRole,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct PermissionCheckResponse {
    pub permission: Permission,
    pub allowed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsageQuery {
    pub period_start: Option<DateTime<Utc>>,
}

pub async fn list_permissions<T, P, S>(
    State(state): State<TeamsState<T, P, S>>,
    auth: AuthUser,
    Path(team_id): Path<Uuid>,
) -> Result<Json<TeamPermissionsResponse>, AppError>
where
    T: TeamMemberRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let (role, permissions) = state
        .permissions
        .member_permissions(team_id, auth.user_id)
        .await?;
    let role = role.ok_or(AppError::Forbidden)?;

    Ok(Json(TeamPermissionsResponse {
        team_id,
        role,
        permissions,
    }))
}

pub async fn check_permission<T, P, S>(
    State(state): State<TeamsState<T, P, S>>,
    auth: AuthUser,
    Path((team_id, permission)): Path<(Uuid, String)>,
) -> Result<Json<PermissionCheckResponse>, AppError>
where
    T: TeamMemberRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let permission: Permission = permission.parse().map_err(AppError::BadRequest)?;
    let allowed = state
        .permissions
        .member_has_permission(team_id, auth.user_id, permission)
        .await?;

    Ok(Json(PermissionCheckResponse {
        permission,
        allowed,
    }))
}

pub async fn check_usage<T, P, S>(
    State(state): State<TeamsState<T, P, S>>,
    auth: AuthUser,
    Path((team_id, limit)): Path<(Uuid, String)>,
    Query(query): Query<UsageQuery>,
) -> Result<Json<UsageCheckOutcome>, AppError>
where
    T: TeamMemberRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    if state
        .permissions
        .member_role(team_id, auth.user_id)
        .await?
        .is_none()
    {
        return Err(AppError::Forbidden);
    }

    let scope = UsageScope {
        team_id,
        user_id: auth.user_id,
        period_start: resolve_period_start(query.period_start, Utc::now()),
    };

    let outcome = state.usage.check_by_name(&limit, scope).await?;
    Ok(Json(outcome))
}

/// A period that starts in the future would count nothing, so it is capped at `now`.
fn resolve_period_start(requested: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match requested {
        Some(start) => start.min(now),
        None => current_period_start(now),
    }
}
