use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use crates::domain::value_objects::{
    enums::social_providers::SocialProvider,
    social_posts::{DispatchPostsResult, PublishPostsParams, PublishPostsResult},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::usecases::publish_scheduled_posts::PublishScheduledPostsUseCase;

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/social/facebook/publish" \
//     -H "Authorization: Bearer $INTERNAL_PUBLISH_TOKEN" \
//     -H "Content-Type: application/json" \
//     -d '{"limit":20,"dry_run":true}'

#[derive(Clone)]
pub struct PublishRouteState {
    internal_token: Option<Arc<str>>,
    default_limit: Option<i64>,
    usecase: Arc<PublishScheduledPostsUseCase>,
}

pub fn routes(
    internal_token: Option<String>,
    default_limit: Option<i64>,
    usecase: Arc<PublishScheduledPostsUseCase>,
) -> Router {
    Router::new()
        .route("/:provider/publish", post(publish_posts))
        .route("/:provider/dispatch", post(dispatch_posts))
        .with_state(PublishRouteState {
            internal_token: internal_token.map(Arc::from),
            default_limit,
            usecase,
        })
}

#[derive(Debug, Default, Deserialize)]
pub struct PublishPostsRequest {
    pub user_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DispatchPostsRequest {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PublishPostsResponse {
    pub provider: SocialProvider,
    pub dry_run: bool,
    #[serde(flatten)]
    pub result: PublishPostsResult,
}

#[derive(Debug, Serialize)]
pub struct DispatchPostsResponse {
    pub provider: SocialProvider,
    #[serde(flatten)]
    pub result: DispatchPostsResult,
}

pub async fn publish_posts(
    State(state): State<PublishRouteState>,
    Path(provider): Path<String>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    payload: Option<Json<PublishPostsRequest>>,
) -> Response {
    let provider = match authorize(&state, bearer.as_ref(), &provider) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let params = PublishPostsParams {
        provider,
        user_id: payload.user_id,
        now: Utc::now(),
        limit: payload.limit.or(state.default_limit),
        dry_run: payload.dry_run.unwrap_or(false),
    };
    let dry_run = params.dry_run;

    match state.usecase.run(params).await {
        Ok(result) => Json(PublishPostsResponse {
            provider,
            dry_run,
            result,
        })
        .into_response(),
        Err(err) => {
            error!(%provider, error = ?err, "publish_posts: usecase failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "publish failed").into_response()
        }
    }
}

pub async fn dispatch_posts(
    State(state): State<PublishRouteState>,
    Path(provider): Path<String>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    payload: Option<Json<DispatchPostsRequest>>,
) -> Response {
    let provider = match authorize(&state, bearer.as_ref(), &provider) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let limit = payload.limit.or(state.default_limit);

    match state.usecase.dispatch(provider, Utc::now(), limit).await {
        Ok(result) => Json(DispatchPostsResponse { provider, result }).into_response(),
        Err(err) => {
            error!(%provider, error = ?err, "dispatch_posts: usecase failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "dispatch failed").into_response()
        }
    }
}

/// Token check first, so unauthenticated callers cannot probe provider names.
fn authorize(
    state: &PublishRouteState,
    bearer: Option<&TypedHeader<Authorization<Bearer>>>,
    provider: &str,
) -> Result<SocialProvider, Response> {
    let Some(expected_token) = state.internal_token.as_deref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "publish token is not configured",
        )
            .into_response());
    };

    match bearer {
        Some(TypedHeader(Authorization(bearer))) if bearer.token() == expected_token => {}
        _ => return Err((StatusCode::UNAUTHORIZED, "unauthorized").into_response()),
    }

    provider
        .parse::<SocialProvider>()
        .map_err(|message| (StatusCode::BAD_REQUEST, message).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::{
        notifications::MockNotificationRepository, social_accounts::MockSocialAccountRepository,
        social_posts::MockSocialPostRepository, social_publisher::MockSocialPublisher,
    };

    fn state(
        token: Option<&str>,
        posts: MockSocialPostRepository,
        accounts: MockSocialAccountRepository,
    ) -> PublishRouteState {
        let mut publisher = MockSocialPublisher::new();
        publisher
            .expect_provider()
            .return_const(SocialProvider::Facebook);

        PublishRouteState {
            internal_token: token.map(Arc::from),
            default_limit: Some(50),
            usecase: Arc::new(PublishScheduledPostsUseCase::new(
                Arc::new(posts),
                Arc::new(accounts),
                Arc::new(MockNotificationRepository::new()),
                vec![Arc::new(publisher)],
            )),
        }
    }

    fn bearer(token: &str) -> Option<TypedHeader<Authorization<Bearer>>> {
        Some(TypedHeader(Authorization::bearer(token).unwrap()))
    }

    #[tokio::test]
    async fn missing_token_config_is_unavailable() {
        let response = publish_posts(
            State(state(
                None,
                MockSocialPostRepository::new(),
                MockSocialAccountRepository::new(),
            )),
            Path("facebook".to_string()),
            bearer("anything"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn wrong_or_missing_bearer_is_unauthorized() {
        let response = publish_posts(
            State(state(
                Some("secret"),
                MockSocialPostRepository::new(),
                MockSocialAccountRepository::new(),
            )),
            Path("facebook".to_string()),
            bearer("guess"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = dispatch_posts(
            State(state(
                Some("secret"),
                MockSocialPostRepository::new(),
                MockSocialAccountRepository::new(),
            )),
            Path("facebook".to_string()),
            None,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_provider_is_bad_request() {
        let response = publish_posts(
            State(state(
                Some("secret"),
                MockSocialPostRepository::new(),
                MockSocialAccountRepository::new(),
            )),
            Path("myspace".to_string()),
            bearer("secret"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn authorized_publish_runs_a_pass_with_default_limit() {
        let mut posts = MockSocialPostRepository::new();
        posts
            .expect_list_due_posts()
            .withf(|provider, user_id, _, limit| {
                *provider == SocialProvider::Facebook && user_id.is_none() && *limit == Some(50)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let response = publish_posts(
            State(state(
                Some("secret"),
                posts,
                MockSocialAccountRepository::new(),
            )),
            Path("Facebook".to_string()),
            bearer("secret"),
            Some(Json(PublishPostsRequest::default())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn authorized_dispatch_fans_out() {
        let mut accounts = MockSocialAccountRepository::new();
        accounts
            .expect_list_connected_user_ids()
            .times(1)
            .returning(|_| Ok(vec![]));

        let response = dispatch_posts(
            State(state(
                Some("secret"),
                MockSocialPostRepository::new(),
                accounts,
            )),
            Path("facebook".to_string()),
            bearer("secret"),
            Some(Json(DispatchPostsRequest { limit: Some(5) })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn usecase_failure_is_internal_error() {
        let mut accounts = MockSocialAccountRepository::new();
        accounts
            .expect_list_connected_user_ids()
            .returning(|_| Err(anyhow::anyhow!("db down")));

        let response = dispatch_posts(
            State(state(
                Some("secret"),
                MockSocialPostRepository::new(),
                accounts,
            )),
            Path("facebook".to_string()),
            bearer("secret"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
