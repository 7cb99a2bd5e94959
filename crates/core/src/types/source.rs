//! Data-source tags for ICCID lookups.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Which upstream answered an ICCID lookup.
///
/// The wire labels are part of the public response contract, so they are
/// kept verbatim even where the internal names differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataSource {
    /// The site catalog backend answered directly.
    #[serde(rename = "wordpress_primary")]
    Primary,
    /// The OCS provider answered after the primary source declined.
    #[serde(rename = "telco_vision_fallback")]
    ProviderFallback,
    /// Built-in fixture data, only when explicitly permitted.
    #[serde(rename = "sample_data")]
    Sample,
    /// Every source failed or declined.
    #[serde(rename = "none")]
    #[default]
    None,
}

impl DataSource {
    /// The wire label for this source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "wordpress_primary",
            Self::ProviderFallback => "telco_vision_fallback",
            Self::Sample => "sample_data",
            Self::None => "none",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
