use super::config_model::{Database, DotEnvyConfig, Publishing, WorkerServer};
use anyhow::{Context, Result};
use crates::infra::social::graph_api::GraphApiConfig;
use std::str::FromStr;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?
            .parse()
            .context("SERVER_PORT_WORKER is invalid")?,
        body_limit: or_default("SERVER_BODY_LIMIT", 1)?,
        timeout: or_default("SERVER_TIMEOUT", 120)?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let publishing = Publishing {
        internal_token: optional("INTERNAL_PUBLISH_TOKEN"),
        loop_enabled: or_default("PUBLISH_LOOP_ENABLED", true)?,
        poll_interval_secs: or_default("PUBLISH_POLL_INTERVAL_SECS", 60)?,
        batch_limit: or_default("PUBLISH_BATCH_LIMIT", 50)?,
        stale_claim_minutes: or_default("PUBLISH_STALE_CLAIM_MINUTES", 15)?,
    };

    let graph_api = GraphApiConfig {
        base_url: optional("GRAPH_API_BASE_URL")
            .unwrap_or_else(|| "https://graph.facebook.com".to_string()),
        version: optional("GRAPH_API_VERSION").unwrap_or_else(|| "v19.0".to_string()),
        app_secret: optional("FACEBOOK_APP_SECRET"),
        timeout_secs: or_default("SOCIAL_API_TIMEOUT_SECS", 15)?,
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        publishing,
        graph_api,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

/// Unset and blank values are treated the same.
fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(value) => value
            .parse()
            .with_context(|| format!("{key} is invalid")),
        None => Ok(default),
    }
}
