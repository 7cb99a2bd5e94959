//! WordPress catalog-plugin client.
//!
//! Talks to the `esim-global/v1` REST namespace of the WordPress site:
//! catalog data, per-ICCID lookups and the topup operations. Authenticates
//! with HTTP Basic (application password) when configured, falling back to
//! a bearer token; Basic takes precedence.
//!
//! Per-call timeouts are fixed: 10s for reachability probes, 30s for data
//! calls, 60s for topup execution. Calls are never retried here - recovery
//! is the caller's fallback chain.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use esim_global_core::Iccid;
use esim_global_core::catalog::{Country, Product};

use crate::config::GatewayConfig;

/// Timeout for reachability probes.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for data calls (catalog, ICCID, topup plans/history).
pub const DATA_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for topup execution, which can block on the upstream provider.
pub const TOPUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur when talking to the WordPress backend.
#[derive(Debug, Error)]
pub enum WordPressError {
    /// Client could not be constructed from the configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// HTTP request failed (connection, timeout, protocol).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The plugin route is not registered on the site (404 + `rest_no_route`).
    #[error("catalog endpoint not registered upstream (rest_no_route)")]
    RouteNotFound,

    /// The requested record does not exist upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The upstream answered 200 but reported an error in the body.
    #[error("upstream reported error: {0}")]
    Upstream(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl WordPressError {
    /// Whether this is a connection-level failure (cannot reach the host).
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect())
    }

    /// Whether this is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// The catalog payload: both arrays default to empty when absent.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogPayload {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub countries: Vec<Country>,
}

/// A successful per-ICCID answer from the primary source.
///
/// The plugin serves a flat record; every field is optional and the
/// normalization in `resolve` decides the fallbacks. A 200 body carrying
/// the `not_found` or `error` marker is a miss, not a success.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrimaryIccidPayload {
    #[serde(default)]
    pub not_found: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub sim_id: Option<String>,
    #[serde(default)]
    pub subscriber_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub activation_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub total_data: Option<String>,
    #[serde(default)]
    pub used_data: Option<String>,
    #[serde(default)]
    pub remaining_data: Option<String>,
}

/// A topup plan as served by the upstream, passed through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopupPlan {
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data_amount: String,
    pub validity_days: i64,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_regions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_countries: Option<Vec<String>>,
}

fn default_currency() -> String {
    "ILS".to_string()
}

#[derive(Debug, Default, Deserialize)]
struct TopupPlansEnvelope {
    #[serde(default)]
    plans: Vec<TopupPlan>,
}

/// Outcome of a topup execution, passed through from the upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopupReceipt {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub iccid: String,
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_reference: Option<String>,
}

/// One entry in an eSIM's topup history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopupHistoryItem {
    pub transaction_id: String,
    pub plan_id: String,
    pub plan_name: String,
    pub created_at: String,
    pub activation_date: String,
    pub expiry_date: String,
    pub amount: String,
    pub price: String,
    pub currency: String,
    pub status: String,
}

/// Topup history for one eSIM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopupHistory {
    pub status: String,
    pub iccid: String,
    #[serde(default)]
    pub history: Vec<TopupHistoryItem>,
    #[serde(default)]
    pub count: usize,
}

// =============================================================================
// WordPressClient
// =============================================================================

/// Client for the WordPress catalog plugin.
#[derive(Clone)]
pub struct WordPressClient {
    client: reqwest::Client,
    base_url: String,
}

impl WordPressClient {
    /// Create a new client with prebuilt auth headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be encoded into a header
    /// or the HTTP client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, WordPressError> {
        let mut headers = HeaderMap::new();
        if let Some(auth) = auth_header(config)? {
            headers.insert(AUTHORIZATION, auth);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.wordpress_url.clone(),
        })
    }

    /// The configured site base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn plugin_url(&self, path: &str) -> String {
        format!("{}/wp-json/esim-global/v1/{path}", self.base_url)
    }

    /// Fetch the full catalog (products and countries).
    ///
    /// # Errors
    ///
    /// Returns `RouteNotFound` when the plugin route is not registered,
    /// `Status` for any other non-success answer, `Http` on connection or
    /// timeout failures, and `Parse` on a malformed body.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<CatalogPayload, WordPressError> {
        let url = self.plugin_url("data");
        debug!(%url, "fetching catalog");

        let response = self.client.get(&url).timeout(DATA_TIMEOUT).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND && body.contains("rest_no_route") {
            return Err(WordPressError::RouteNotFound);
        }
        if !status.is_success() {
            return Err(WordPressError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Look up one eSIM by ICCID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a 404 answer or a 200 body carrying the
    /// `not_found` marker, `Upstream` when the body carries an `error`
    /// marker, and the usual transport errors otherwise.
    #[instrument(skip(self), fields(iccid = %iccid))]
    pub async fn fetch_iccid(&self, iccid: &Iccid) -> Result<PrimaryIccidPayload, WordPressError> {
        let url = self.plugin_url(&format!("iccid/{iccid}"));
        debug!(%url, "fetching ICCID record");

        let response = self.client.get(&url).timeout(DATA_TIMEOUT).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(WordPressError::NotFound(iccid.to_string()));
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(WordPressError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let payload: PrimaryIccidPayload = serde_json::from_str(&body)?;
        if payload.not_found {
            return Err(WordPressError::NotFound(iccid.to_string()));
        }
        if let Some(error) = &payload.error {
            return Err(WordPressError::Upstream(error.clone()));
        }

        Ok(payload)
    }

    /// Fetch the available topup plans.
    ///
    /// # Errors
    ///
    /// Returns `Status` on a non-success answer and the usual transport
    /// errors; a missing `plans` array parses as empty.
    #[instrument(skip(self))]
    pub async fn fetch_topup_plans(&self) -> Result<Vec<TopupPlan>, WordPressError> {
        let url = self.plugin_url("topup-plans");
        let response = self.client.get(&url).timeout(DATA_TIMEOUT).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(WordPressError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let envelope: TopupPlansEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.plans)
    }

    /// Execute a topup for an eSIM.
    ///
    /// # Errors
    ///
    /// A non-success answer surfaces as `Upstream` carrying the body's
    /// `message` field when present; transport errors as `Http`.
    #[instrument(skip(self), fields(iccid = %iccid, plan_id = %plan_id))]
    pub async fn execute_topup(
        &self,
        iccid: &Iccid,
        plan_id: &str,
        payment_reference: Option<&str>,
    ) -> Result<TopupReceipt, WordPressError> {
        let url = self.plugin_url("execute-topup");

        let mut payload = serde_json::json!({
            "iccid": iccid.as_str(),
            "plan_id": plan_id,
        });
        if let (Some(reference), Some(map)) = (payment_reference, payload.as_object_mut()) {
            map.insert(
                "payment_reference".to_string(),
                serde_json::Value::String(reference.to_string()),
            );
        }

        let response = self
            .client
            .post(&url)
            .timeout(TOPUP_TIMEOUT)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| {
                    format!("Error executing topup: HTTP {status} - {}", truncate(&body, 200))
                });
            return Err(WordPressError::Upstream(message));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the topup history for one eSIM.
    ///
    /// # Errors
    ///
    /// Returns `Status` on a non-success answer and the usual transport
    /// errors otherwise.
    #[instrument(skip(self), fields(iccid = %iccid))]
    pub async fn fetch_topup_history(&self, iccid: &Iccid) -> Result<TopupHistory, WordPressError> {
        let url = self.plugin_url(&format!("topup-history/{iccid}"));
        let response = self.client.get(&url).timeout(DATA_TIMEOUT).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(WordPressError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // Reachability probes
    // =========================================================================

    /// Probe the site root.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the site is unreachable.
    pub async fn probe_site(&self) -> Result<StatusCode, reqwest::Error> {
        let response = self
            .client
            .get(&self.base_url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;
        Ok(response.status())
    }

    /// Probe the generic REST API root (`/wp-json`).
    ///
    /// # Errors
    ///
    /// Returns the transport error when the API root is unreachable.
    pub async fn probe_api_root(&self) -> Result<StatusCode, reqwest::Error> {
        let url = format!("{}/wp-json", self.base_url);
        let response = self.client.get(&url).timeout(PROBE_TIMEOUT).send().await?;
        Ok(response.status())
    }

    /// Probe the plugin data endpoint itself.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the endpoint is unreachable.
    pub async fn probe_data_endpoint(&self) -> Result<StatusCode, reqwest::Error> {
        let url = self.plugin_url("data");
        let response = self.client.get(&url).timeout(PROBE_TIMEOUT).send().await?;
        Ok(response.status())
    }

    /// Probe the plugin test route, logging the outcome.
    pub async fn probe_test_endpoint(&self) {
        let url = self.plugin_url("test");
        debug!(%url, "probing plugin test endpoint");
        match self.client.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("plugin test endpoint reachable");
            }
            Ok(response) => {
                tracing::warn!(
                    status = %response.status(),
                    "plugin test endpoint failed; the plugin may not be registered or the REST API is disabled"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "error connecting to plugin test endpoint");
            }
        }
    }

    /// Escalating connectivity diagnostics after a connection failure:
    /// first the base site, then the generic REST API root. Each step
    /// narrows down where the chain breaks; results are logged only.
    pub async fn diagnose_connectivity(&self) {
        match self.probe_site().await {
            Ok(status) if status.as_u16() < 400 => {
                tracing::warn!(
                    %status,
                    "site is reachable but the catalog endpoint is not; checking the REST API root"
                );
                match self.probe_api_root().await {
                    Ok(api_status) if api_status.as_u16() < 400 => {
                        tracing::warn!(
                            "REST API is working but the catalog plugin endpoint is unavailable; check that the plugin is activated and registers its routes"
                        );
                    }
                    Ok(api_status) => {
                        tracing::warn!(
                            status = %api_status,
                            "REST API root is not accessible; check site settings and security plugins"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "error accessing the REST API root");
                    }
                }
            }
            Ok(status) => {
                tracing::warn!(%status, "site returned an error status");
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "site is not reachable; check the configured base URL and that the site is running"
                );
            }
        }
    }
}

/// Build the Authorization header. Basic (app password, spaces stripped)
/// takes precedence over the bearer token; neither configured means no
/// header at all.
fn auth_header(config: &GatewayConfig) -> Result<Option<HeaderValue>, WordPressError> {
    let value = if let (Some(username), Some(password)) =
        (&config.wordpress_username, &config.wordpress_app_password)
    {
        let compact = password.expose_secret().replace(' ', "");
        let credentials = BASE64.encode(format!("{username}:{compact}"));
        Some(format!("Basic {credentials}"))
    } else {
        config
            .wordpress_api_key
            .as_ref()
            .map(|key| format!("Bearer {}", key.expose_secret()))
    };

    value
        .map(|v| {
            let mut header = HeaderValue::from_str(&v)
                .map_err(|e| WordPressError::Configuration(e.to_string()))?;
            header.set_sensitive(true);
            Ok(header)
        })
        .transpose()
}

fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}
