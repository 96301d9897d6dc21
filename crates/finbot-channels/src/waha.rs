//! WAHA gateway client.

use finbot_core::{
    config::WahaConfig,
    error::{BotError, ResolveError},
    phone,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout for outbound sends.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for LID lookups.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for one WAHA instance/session.
pub struct WahaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    session: String,
    country_code: String,
}

/// `POST /api/sendText` payload.
#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    session: &'a str,
    #[serde(rename = "chatId")]
    chat_id: String,
    text: &'a str,
}

/// `GET /api/{session}/lids/{lid}` response body.
#[derive(Debug, Deserialize)]
struct LidRecord {
    /// Phone number in `@c.us` form, absent when the directory has no binding.
    #[serde(default)]
    pn: Option<String>,
}

impl WahaClient {
    /// Create from config values.
    pub fn new(config: &WahaConfig, country_code: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            session: config.session.clone(),
            country_code: country_code.to_string(),
        }
    }

    /// Send plain text to a phone number (any accepted shape).
    pub async fn send_text(&self, phone_raw: &str, text: &str) -> Result<(), BotError> {
        let chat_id = phone::to_chat_address(phone_raw, &self.country_code);
        let url = format!("{}/api/sendText", self.base_url);

        let payload = SendTextRequest {
            session: &self.session,
            chat_id,
            text,
        };

        debug!("waha: sendText to {}", payload.chat_id);

        let resp = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .timeout(SEND_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BotError::Channel(format!("sendText request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Channel(format!(
                "sendText returned {status}: {body}"
            )));
        }

        Ok(())
    }

    /// Resolve a LID alias to a canonical phone number.
    ///
    /// The binding is owned by the WAHA directory and is never cached
    /// here: every call is a fresh lookup.
    pub async fn resolve_lid(&self, lid_identifier: &str) -> Result<String, ResolveError> {
        let lid = phone::extract_lid(lid_identifier);
        let url = format!("{}/api/{}/lids/{lid}", self.base_url, self.session);

        debug!("waha: resolving lid {lid}");

        let resp = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| ResolveError::Unresolvable(format!("lid lookup failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            warn!("waha: lid lookup for {lid} returned {status}");
            return Err(ResolveError::Unresolvable(format!(
                "lid lookup returned {status}"
            )));
        }

        let record: LidRecord = resp
            .json()
            .await
            .map_err(|e| ResolveError::Unresolvable(format!("lid response parse failed: {e}")))?;

        match record.pn {
            Some(pn) if !pn.trim().is_empty() => Ok(pn),
            _ => Err(ResolveError::Unresolvable(format!(
                "directory has no phone for lid {lid}"
            ))),
        }
    }
}
