//! The client-visible ICCID lookup record.

use serde::{Deserialize, Serialize};

use crate::types::DataSource;

/// Everything the gateway reports about one eSIM profile.
///
/// Composed per request from whichever upstream answered; never persisted.
/// Which optional fields are populated depends on the answering source -
/// `country` and `network` only come from the primary source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IccidInfo {
    pub iccid: String,
    pub data_source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Set when the provider answered for the subscriber but its package
    /// listing failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
