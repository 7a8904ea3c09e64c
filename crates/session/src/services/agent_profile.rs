//! `UCP-Agent` header parsing and platform profile resolution.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use domain::PlatformConfig;
use serde_json::Value;

use crate::error::ProfileError;

/// Capability whose config carries the platform's webhook URL.
pub const ORDER_CAPABILITY: &str = "dev.ucp.shopping.order";

/// Extracts the quoted value of `name="..."` from a structured header.
pub fn header_attribute<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = header.find(&needle)? + needle.len();
    let len = header[start..].find('"')?;
    (len > 0).then(|| &header[start..start + len])
}

/// The protocol version the agent speaks, if it announced one.
pub fn agent_version(header: &str) -> Option<&str> {
    header_attribute(header, "version")
}

/// Reference to the agent's profile document (data URI or URL).
pub fn agent_profile_uri(header: &str) -> Option<&str> {
    header_attribute(header, "profile")
}

/// Pulls `config.webhook_url` out of the order capability of a profile.
pub fn webhook_url_from_profile(profile: &Value) -> Option<String> {
    profile
        .get("ucp")?
        .get("capabilities")?
        .as_array()?
        .iter()
        .find(|c| c.get("name").and_then(Value::as_str) == Some(ORDER_CAPABILITY))?
        .get("config")?
        .get("webhook_url")?
        .as_str()
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Resolves agent profiles into platform configuration.
#[derive(Debug, Clone)]
pub struct AgentProfileResolver {
    client: reqwest::Client,
}

impl AgentProfileResolver {
    /// Creates a resolver whose remote fetches give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Resolves the platform config advertised by a `UCP-Agent` header.
    ///
    /// Any failure to load or parse the profile yields `None`.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, header: Option<&str>) -> Option<PlatformConfig> {
        let uri = agent_profile_uri(header?)?;
        let profile = match self.load(uri).await {
            Ok(profile) => profile?,
            Err(e) => {
                tracing::warn!(%uri, error = %e, "failed to fetch or parse agent profile");
                return None;
            }
        };
        let webhook_url = webhook_url_from_profile(&profile)?;
        Some(PlatformConfig {
            webhook_url: Some(webhook_url),
        })
    }

    /// Loads the profile document. `Ok(None)` means the URI names nothing
    /// this resolver can fetch, or the server answered with an error status.
    async fn load(&self, uri: &str) -> Result<Option<Value>, ProfileError> {
        if let Some(rest) = uri.strip_prefix("data:") {
            let Some((_, encoded)) = rest.split_once(',') else {
                return Ok(None);
            };
            let bytes = STANDARD.decode(encoded)?;
            let profile = serde_json::from_slice(&bytes)?;
            return Ok(Some(profile));
        }

        if uri.starts_with("http") {
            let response = self.client.get(uri).send().await?;
            if !response.status().is_success() {
                return Ok(None);
            }
            let profile = response.json().await?;
            return Ok(Some(profile));
        }

        Ok(None)
    }
}
