mod config;
mod discord;
mod layer;
mod notifier;

use anyhow::Result;
use config::ObservabilityConfig;
use discord::DiscordAlertSink;
use layer::AlertLayer;
use notifier::AlertDispatcher;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber: `RUST_LOG`-driven fmt output with local
/// timestamps, plus Discord alerts when `DISCORD_WEBHOOK_URL` is set.
///
/// Must be called from inside a Tokio runtime.
pub fn init_observability(component: &str) -> Result<()> {
    let config = ObservabilityConfig::from_env(component);
    let mut warnings = config.warnings.clone();

    let alert_layer = config.discord.as_ref().and_then(|discord| {
        match DiscordAlertSink::new(discord.webhook_url.clone()) {
            Ok(sink) => {
                let dispatcher = AlertDispatcher::spawn(vec![Arc::new(sink)]);
                Some(
                    AlertLayer::new(dispatcher, config.service_context.clone(), discord.min_level)
                        .with_filter(LevelFilter::from_level(discord.min_level)),
                )
            }
            Err(err) => {
                warnings.push(format!("Discord alert sink could not be built: {err}"));
                None
            }
        }
    });
    let alerts_enabled = alert_layer.is_some();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(alert_layer)
        .with(env_filter)
        .try_init()?;

    let context = &config.service_context;
    for warning in &warnings {
        warn!(
            service = %context.service_name,
            environment = %context.environment,
            component = %context.component,
            warning = %warning,
            "observability config warning"
        );
    }

    info!(
        service = %context.service_name,
        environment = %context.environment,
        component = %context.component,
        discord_alerts = alerts_enabled,
        "observability initialized"
    );

    Ok(())
}
