use anyhow::{Context, Result};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::error;

use crate::domain::value_objects::{
    enums::social_providers::SocialProvider, social_posts::PublishError,
};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct GraphApiConfig {
    pub base_url: String,
    pub version: String,
    /// Enables `appsecret_proof` on every call when set.
    pub app_secret: Option<String>,
    pub timeout_secs: u64,
}

/// Thin reqwest wrapper shared by the Facebook and Instagram publishers.
#[derive(Clone)]
pub struct GraphApiClient {
    http: Client,
    config: GraphApiConfig,
}

#[derive(Debug, Deserialize)]
pub struct GraphIdResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetails {
    message: Option<String>,
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<i64>,
    fbtrace_id: Option<String>,
}

impl GraphApiClient {
    pub fn new(config: GraphApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build graph api http client")?;

        Ok(Self { http, config })
    }

    pub fn endpoint(&self, node_id: &str, edge: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.version.trim_matches('/'),
            node_id,
            edge
        )
    }

    /// https://developers.facebook.com/docs/graph-api/securing-requests#appsecret_proof
    pub fn appsecret_proof(&self, access_token: &str) -> Option<String> {
        let secret = self.config.app_secret.as_deref()?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(access_token.as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// POSTs a form to `{node_id}/{edge}` and returns the created object id.
    pub async fn post_for_id(
        &self,
        provider: SocialProvider,
        node_id: &str,
        edge: &str,
        access_token: &str,
        mut form: Vec<(&'static str, String)>,
    ) -> Result<GraphIdResponse, PublishError> {
        form.push(("access_token", access_token.to_string()));
        if let Some(proof) = self.appsecret_proof(access_token) {
            form.push(("appsecret_proof", proof));
        }

        let response = self
            .http
            .post(self.endpoint(node_id, edge))
            .form(&form)
            .send()
            .await
            .map_err(|err| sanitize_reqwest_error(provider, err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| sanitize_reqwest_error(provider, err))?;

        if !status.is_success() {
            let message = graph_error_message(&body)
                .unwrap_or_else(|| format!("request to /{edge} failed with status {status}"));
            error!(
                provider = %provider,
                status = %status,
                edge,
                error_message = %message,
                "graph_api: request failed"
            );
            return Err(PublishError::Api {
                provider,
                status: Some(status.as_u16()),
                message,
            });
        }

        serde_json::from_str::<GraphIdResponse>(&body).map_err(|_| PublishError::Api {
            provider,
            status: Some(status.as_u16()),
            message: format!("unexpected response from /{edge}: missing id"),
        })
    }
}

/// Extracts a readable message from a Graph API error envelope.
pub fn graph_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<GraphErrorEnvelope>(body).ok()?;
    let details = envelope.error;
    let message = details.message.unwrap_or_else(|| "unknown error".to_string());

    let mut qualifiers = Vec::new();
    if let Some(type_) = details.type_ {
        qualifiers.push(type_);
    }
    if let Some(code) = details.code {
        qualifiers.push(format!("code {code}"));
    }
    if let Some(trace) = details.fbtrace_id {
        qualifiers.push(format!("trace {trace}"));
    }

    if qualifiers.is_empty() {
        Some(message)
    } else {
        Some(format!("{} ({})", message, qualifiers.join(", ")))
    }
}

// reqwest errors can carry the request URL; keep tokens out of stored messages.
fn sanitize_reqwest_error(provider: SocialProvider, error: reqwest::Error) -> PublishError {
    let message = if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_decode() || error.is_body() {
        "failed to read response body"
    } else {
        "request failed"
    };

    PublishError::Transport {
        provider,
        message: message.to_string(),
    }
}
