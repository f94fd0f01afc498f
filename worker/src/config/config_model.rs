use crates::infra::social::graph_api::GraphApiConfig;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub publishing: Publishing,
    pub graph_api: GraphApiConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Clone)]
pub struct Publishing {
    /// Bearer token for the internal trigger endpoints. Unset disables them.
    pub internal_token: Option<String>,
    pub loop_enabled: bool,
    pub poll_interval_secs: u64,
    pub batch_limit: i64,
    pub stale_claim_minutes: i64,
}

impl std::fmt::Debug for Publishing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publishing")
            .field(
                "internal_token",
                &self.internal_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("loop_enabled", &self.loop_enabled)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("batch_limit", &self.batch_limit)
            .field("stale_claim_minutes", &self.stale_claim_minutes)
            .finish()
    }
}
