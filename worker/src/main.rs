use anyhow::Result;
use chrono::Duration as ChronoDuration;
use crates::domain::repositories::{
    notifications::NotificationRepository, social_accounts::SocialAccountRepository,
    social_posts::SocialPostRepository, social_publisher::SocialPublisher,
};
use crates::infra::{
    db::{
        postgres::postgres_connection,
        repositories::{
            notifications::NotificationPostgres, social_accounts::SocialAccountPostgres,
            social_posts::SocialPostPostgres,
        },
    },
    social::{
        facebook::FacebookPublisher, graph_api::GraphApiClient, instagram::InstagramPublisher,
    },
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{
    axum_http, config,
    publishing::{self, worker::PublishLoopConfig},
    usecases::publish_scheduled_posts::PublishScheduledPostsUseCase,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let post_repository: Arc<dyn SocialPostRepository + Send + Sync> =
        Arc::new(SocialPostPostgres::new(Arc::clone(&db_pool_arc)));
    let account_repository: Arc<dyn SocialAccountRepository + Send + Sync> =
        Arc::new(SocialAccountPostgres::new(Arc::clone(&db_pool_arc)));
    let notification_repository: Arc<dyn NotificationRepository + Send + Sync> =
        Arc::new(NotificationPostgres::new(Arc::clone(&db_pool_arc)));

    let graph_client = GraphApiClient::new(dotenvy_env.graph_api.clone())?;
    let publishers: Vec<Arc<dyn SocialPublisher + Send + Sync>> = vec![
        Arc::new(FacebookPublisher::new(graph_client.clone())),
        Arc::new(InstagramPublisher::new(graph_client)),
    ];

    let publish_usecase = Arc::new(PublishScheduledPostsUseCase::new(
        post_repository,
        account_repository,
        notification_repository,
        publishers,
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let server_usecase = Arc::clone(&publish_usecase);
    let http_server =
        tokio::spawn(async move { axum_http::http_serve::start(server_config, server_usecase).await });

    let publishing_config = &dotenvy_env.publishing;
    if publishing_config.loop_enabled {
        let loop_config = PublishLoopConfig {
            poll_interval: Duration::from_secs(publishing_config.poll_interval_secs.max(1)),
            batch_limit: Some(publishing_config.batch_limit),
            stale_after: ChronoDuration::minutes(publishing_config.stale_claim_minutes.max(1)),
        };
        let publish_loop = tokio::spawn(publishing::worker::run(publish_usecase, loop_config));

        tokio::select! {
            result = http_server => result??,
            result = publish_loop => result??,
        };
    } else {
        info!("publish_loop: disabled; serving internal triggers only");
        http_server.await??;
    }

    Ok(())
}
