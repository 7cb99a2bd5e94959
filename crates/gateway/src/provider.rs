//! Secondary provider (OCS) API client.
//!
//! Used only when the primary source declines an ICCID lookup. The provider
//! exposes a subscriber record and that subscriber's prepaid packages, each
//! behind a custom-header API key.

use core::fmt;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use esim_global_core::Iccid;

use crate::config::ProviderConfig;
use crate::wordpress::DATA_TIMEOUT;

/// Errors that can occur when talking to the provider API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Client could not be constructed from the configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// HTTP request failed (connection, timeout, protocol).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A record id the provider serves either as a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    String(String),
    Number(i64),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The subscriber record, unwrapped from `getSingleSubscriber`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSubscriber {
    #[serde(default)]
    pub sim: Option<ProviderSim>,
}

/// The SIM block of a subscriber record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSim {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub state: Option<String>,
}

/// One prepaid package with raw byte counters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPackage {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub pckdatabyte: i64,
    #[serde(default)]
    pub useddatabyte: i64,
    #[serde(default)]
    pub tsactivationutc: Option<String>,
    #[serde(default)]
    pub tsexpirationutc: Option<String>,
    #[serde(rename = "packageTemplate", default)]
    pub package_template: Option<PackageTemplate>,
}

/// The plan template a package was created from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageTemplate {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SubscriberEnvelope {
    #[serde(rename = "getSingleSubscriber", default)]
    subscriber: Option<ProviderSubscriber>,
}

#[derive(Debug, Default, Deserialize)]
struct PackagesEnvelope {
    #[serde(rename = "listSubscriberPrepaidPackages", default)]
    listing: Option<PackagesListing>,
}

#[derive(Debug, Default, Deserialize)]
struct PackagesListing {
    #[serde(default)]
    packages: Vec<ProviderPackage>,
}

// =============================================================================
// ProviderClient
// =============================================================================

/// Client for the provider OCS API.
#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProviderClient {
    /// Create a new provider client.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential cannot be encoded into a header or
    /// the HTTP client fails to build.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;
        api_key.set_sensitive(true);
        headers.insert("X-API-KEY", api_key);

        if let (Some(id), Some(secret)) = (&config.client_id, &config.client_secret) {
            headers.insert(
                "X-CLIENT-ID",
                HeaderValue::from_str(id)
                    .map_err(|e| ProviderError::Configuration(e.to_string()))?,
            );
            let mut secret_value = HeaderValue::from_str(secret.expose_secret())
                .map_err(|e| ProviderError::Configuration(e.to_string()))?;
            secret_value.set_sensitive(true);
            headers.insert("X-CLIENT-SECRET", secret_value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetch a subscriber record by ICCID.
    ///
    /// # Errors
    ///
    /// Returns `Status` on a non-success answer and transport errors
    /// otherwise; a missing `getSingleSubscriber` block parses as empty.
    #[instrument(skip(self), fields(iccid = %iccid))]
    pub async fn fetch_subscriber(&self, iccid: &Iccid) -> Result<ProviderSubscriber, ProviderError> {
        let url = format!("{}/subscribers/{iccid}", self.base_url);
        debug!(%url, "fetching provider subscriber");

        let response = self.client.get(&url).timeout(DATA_TIMEOUT).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let envelope: SubscriberEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.subscriber.unwrap_or_default())
    }

    /// Fetch a subscriber's prepaid packages.
    ///
    /// # Errors
    ///
    /// Returns `Status` on a non-success answer and transport errors
    /// otherwise; a missing listing parses as empty.
    #[instrument(skip(self), fields(iccid = %iccid))]
    pub async fn fetch_packages(&self, iccid: &Iccid) -> Result<Vec<ProviderPackage>, ProviderError> {
        let url = format!("{}/subscribers/{iccid}/packages", self.base_url);
        debug!(%url, "fetching provider packages");

        let response = self.client.get(&url).timeout(DATA_TIMEOUT).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let envelope: PackagesEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.listing.unwrap_or_default().packages)
    }
}
