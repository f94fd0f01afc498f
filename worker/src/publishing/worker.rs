use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use std::{sync::Arc, time::Duration};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::usecases::publish_scheduled_posts::PublishScheduledPostsUseCase;

#[derive(Debug, Clone)]
pub struct PublishLoopConfig {
    pub poll_interval: Duration,
    pub batch_limit: Option<i64>,
    pub stale_after: ChronoDuration,
}

/// Polls every registered provider: stale claims are failed first, then one
/// pass per connected user publishes whatever is due.
pub async fn run(usecase: Arc<PublishScheduledPostsUseCase>, config: PublishLoopConfig) -> Result<()> {
    info!(
        poll_interval_secs = config.poll_interval.as_secs(),
        batch_limit = ?config.batch_limit,
        stale_after_minutes = config.stale_after.num_minutes(),
        "publish_loop: starting worker loop"
    );

    let mut ticker = interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        tick(&usecase, &config).await;
    }
}

async fn tick(usecase: &PublishScheduledPostsUseCase, config: &PublishLoopConfig) {
    for provider in usecase.providers() {
        let now = Utc::now();

        if let Err(err) = usecase
            .fail_stale_claims(provider, now, config.stale_after)
            .await
        {
            error!(
                %provider,
                error = ?err,
                "publish_loop: failed to sweep stale claims"
            );
        }

        if let Err(err) = usecase.dispatch(provider, now, config.batch_limit).await {
            error!(
                %provider,
                error = ?err,
                "publish_loop: dispatch failed"
            );
        }
    }
}
