//! Per-ICCID fallback resolution.
//!
//! Sources are tried in a fixed trust order: the site catalog backend,
//! then the OCS provider, then (only when explicitly permitted) the
//! built-in sample record. Each tier is consulted only after every higher
//! tier definitively failed or declined to answer. The answering tier is
//! carried as a tagged variant; each variant keeps its own record shape
//! and its own normalization into the client-visible [`IccidInfo`].
//!
//! The three normalization branches are deliberately separate: which
//! fields get populated, and from where, differs per source (for example
//! `country`/`network` only exist on the primary branch).

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use esim_global_core::IccidInfo;
use esim_global_core::types::{DataSource, Iccid, bytes_to_gb, gb_to_bytes};

use crate::provider::{ProviderPackage, ProviderSubscriber};
use crate::state::AppState;
use crate::wordpress::PrimaryIccidPayload;

/// Which tier answered an ICCID lookup, carrying that tier's payload.
#[derive(Debug)]
pub enum ResolvedIccid {
    /// The site catalog backend answered directly.
    Primary(PrimaryIccidPayload),
    /// The provider answered for the subscriber; `partial_data` is set when
    /// its package listing failed afterwards.
    Provider {
        subscriber: ProviderSubscriber,
        packages: Vec<ProviderPackage>,
        partial_data: bool,
    },
    /// The built-in synthetic record.
    Sample,
    /// Every tier failed or declined.
    Unavailable { error: String },
}

impl ResolvedIccid {
    /// Whether the resolution carries any subscriber data. A record without
    /// one must surface to clients as a 404, not as an empty success.
    #[must_use]
    pub fn has_subscriber(&self) -> bool {
        match self {
            Self::Primary(_) | Self::Sample => true,
            Self::Provider { subscriber, .. } => subscriber.sim.is_some(),
            Self::Unavailable { .. } => false,
        }
    }

    /// Shape the resolution into the client-visible record.
    #[must_use]
    pub fn into_info(self, iccid: &Iccid) -> IccidInfo {
        match self {
            Self::Primary(payload) => shape_primary(payload, iccid),
            Self::Provider {
                subscriber,
                packages,
                partial_data,
            } => shape_provider(&subscriber, &packages, partial_data, iccid),
            Self::Sample => shape_sample(iccid),
            Self::Unavailable { error } => IccidInfo {
                iccid: iccid.to_string(),
                data_source: DataSource::None,
                error: Some(error),
                ..IccidInfo::default()
            },
        }
    }
}

/// Resolve an ICCID through the source priority chain.
pub async fn resolve_iccid(state: &AppState, iccid: &Iccid) -> ResolvedIccid {
    match state.wordpress().fetch_iccid(iccid).await {
        Ok(payload) => {
            debug!(%iccid, "primary source answered ICCID lookup");
            return ResolvedIccid::Primary(payload);
        }
        Err(err) => {
            info!(%iccid, error = %err, "primary source declined ICCID lookup, trying provider fallback");
        }
    }

    if let Some(provider) = state.provider() {
        match provider.fetch_subscriber(iccid).await {
            Ok(subscriber) => {
                return match provider.fetch_packages(iccid).await {
                    Ok(packages) => ResolvedIccid::Provider {
                        subscriber,
                        packages,
                        partial_data: false,
                    },
                    Err(err) => {
                        warn!(%iccid, error = %err, "provider package listing failed, returning partial data");
                        ResolvedIccid::Provider {
                            subscriber,
                            packages: Vec::new(),
                            partial_data: true,
                        }
                    }
                };
            }
            Err(err) => {
                warn!(%iccid, error = %err, "provider subscriber lookup failed");
            }
        }
    } else {
        debug!("provider fallback not configured, skipping");
    }

    if state.config().allow_sample_fallback {
        info!(%iccid, "returning sample record as final fallback");
        return ResolvedIccid::Sample;
    }

    ResolvedIccid::Unavailable {
        error: "No data available from any source".to_string(),
    }
}

// =============================================================================
// Per-source shaping
// =============================================================================

fn shape_primary(payload: PrimaryIccidPayload, iccid: &Iccid) -> IccidInfo {
    let sim_id = payload.sim_id.clone();
    let subscriber_id = sim_id
        .clone()
        .or(payload.subscriber_id)
        .unwrap_or_else(|| format!("sub_{}", iccid.tail(6)));

    let mut info = IccidInfo {
        iccid: iccid.to_string(),
        data_source: DataSource::Primary,
        subscriber_id: Some(subscriber_id),
        status: Some(payload.status.unwrap_or_else(|| "active".to_string())),
        provider_reference: Some(sim_id.unwrap_or_default()),
        country: Some(payload.country.unwrap_or_default()),
        network: Some(payload.network.unwrap_or_default()),
        last_updated: Some(payload.last_updated.unwrap_or_else(now_iso)),
        ..IccidInfo::default()
    };

    // Plan fields only when the backend actually reported a plan.
    if payload.plan_id.is_some() || payload.total_data.is_some() {
        info.activation_date = Some(payload.activation_date.unwrap_or_default());
        info.expiry_date = Some(payload.expiry_date.unwrap_or_default());
        info.plan_id = Some(payload.plan_id.unwrap_or_default());
        info.plan_name = Some(payload.plan_name.unwrap_or_default());
        info.total_data = Some(payload.total_data.unwrap_or_default());
        info.used_data = Some(payload.used_data.unwrap_or_default());
        info.remaining_data = Some(payload.remaining_data.unwrap_or_default());
    }

    info
}

fn shape_provider(
    subscriber: &ProviderSubscriber,
    packages: &[ProviderPackage],
    partial_data: bool,
    iccid: &Iccid,
) -> IccidInfo {
    let sim = subscriber.sim.clone().unwrap_or_default();
    let sim_id = sim.id.map(|id| id.to_string());

    let mut info = IccidInfo {
        iccid: iccid.to_string(),
        data_source: DataSource::ProviderFallback,
        subscriber_id: Some(
            sim_id
                .clone()
                .unwrap_or_else(|| format!("sub_{}", iccid.tail(6))),
        ),
        status: Some(
            sim.state
                .unwrap_or_else(|| "UNKNOWN".to_string())
                .to_lowercase(),
        ),
        provider_reference: Some(sim_id.unwrap_or_default()),
        last_updated: Some(now_iso()),
        partial_data,
        ..IccidInfo::default()
    };

    if let Some(package) = packages.iter().find(|p| p.active) {
        info.activation_date = Some(package.tsactivationutc.clone().unwrap_or_default());
        info.expiry_date = Some(package.tsexpirationutc.clone().unwrap_or_default());
        info.plan_id = Some(format!(
            "plan_{}",
            package.id.as_ref().map(ToString::to_string).unwrap_or_default()
        ));
        info.plan_name = Some(
            package
                .package_template
                .as_ref()
                .and_then(|t| t.name.clone())
                .unwrap_or_else(|| "Unknown Plan".to_string()),
        );

        let remaining = package.pckdatabyte - package.useddatabyte;
        info.total_data = Some(bytes_to_gb(package.pckdatabyte));
        info.used_data = Some(bytes_to_gb(package.useddatabyte));
        info.remaining_data = Some(bytes_to_gb(remaining));
    }

    info
}

fn shape_sample(iccid: &Iccid) -> IccidInfo {
    let now = Utc::now();
    let total = gb_to_bytes("10GB");
    let used = gb_to_bytes("1GB");

    IccidInfo {
        iccid: iccid.to_string(),
        data_source: DataSource::Sample,
        subscriber_id: Some(format!("sample_{}", iccid.tail(6))),
        status: Some("activated".to_string()),
        provider_reference: Some(format!("sample_{}", iccid.tail(6))),
        last_updated: Some(now.to_rfc3339()),
        activation_date: Some((now - Duration::days(5)).to_rfc3339()),
        expiry_date: Some((now + Duration::days(25)).to_rfc3339()),
        plan_id: Some("plan_sample_package_001".to_string()),
        plan_name: Some("Sample Global 10GB Package".to_string()),
        total_data: Some(bytes_to_gb(total)),
        used_data: Some(bytes_to_gb(used)),
        remaining_data: Some(bytes_to_gb(total - used)),
        ..IccidInfo::default()
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider::{PackageTemplate, ProviderSim, RawId};
    use esim_global_core::types::BYTES_PER_GB;

    fn iccid() -> Iccid {
        Iccid::parse("8997250000012345678").unwrap()
    }

    #[test]
    fn test_shape_primary_full_record() {
        let payload = PrimaryIccidPayload {
            sim_id: Some("sim_42".to_string()),
            status: Some("active".to_string()),
            country: Some("IL".to_string()),
            network: Some("Partner".to_string()),
            plan_id: Some("planA".to_string()),
            plan_name: Some("Global 5GB".to_string()),
            total_data: Some("5GB".to_string()),
            used_data: Some("1GB".to_string()),
            remaining_data: Some("4GB".to_string()),
            activation_date: Some("2026-07-01".to_string()),
            expiry_date: Some("2026-07-31".to_string()),
            ..PrimaryIccidPayload::default()
        };

        let info = shape_primary(payload, &iccid());
        assert_eq!(info.data_source, DataSource::Primary);
        assert_eq!(info.subscriber_id.as_deref(), Some("sim_42"));
        assert_eq!(info.country.as_deref(), Some("IL"));
        assert_eq!(info.network.as_deref(), Some("Partner"));
        assert_eq!(info.plan_id.as_deref(), Some("planA"));
        assert_eq!(info.total_data.as_deref(), Some("5GB"));
    }

    #[test]
    fn test_shape_primary_defaults() {
        let info = shape_primary(PrimaryIccidPayload::default(), &iccid());
        assert_eq!(info.subscriber_id.as_deref(), Some("sub_345678"));
        assert_eq!(info.status.as_deref(), Some("active"));
        // No plan reported: plan fields stay absent.
        assert!(info.plan_id.is_none());
        assert!(info.total_data.is_none());
    }

    #[test]
    fn test_shape_provider_picks_first_active_package() {
        let subscriber = ProviderSubscriber {
            sim: Some(ProviderSim {
                id: Some(RawId::Number(4417)),
                state: Some("ACTIVATED".to_string()),
            }),
        };
        let packages = vec![
            ProviderPackage {
                id: Some(RawId::Number(1)),
                active: false,
                ..ProviderPackage::default()
            },
            ProviderPackage {
                id: Some(RawId::Number(2)),
                active: true,
                pckdatabyte: 10 * BYTES_PER_GB,
                useddatabyte: BYTES_PER_GB,
                tsactivationutc: Some("2026-07-30T00:00:00Z".to_string()),
                tsexpirationutc: Some("2026-08-29T00:00:00Z".to_string()),
                package_template: Some(PackageTemplate {
                    name: Some("Global 10GB".to_string()),
                }),
                ..ProviderPackage::default()
            },
        ];

        let info = shape_provider(&subscriber, &packages, false, &iccid());
        assert_eq!(info.data_source, DataSource::ProviderFallback);
        assert_eq!(info.subscriber_id.as_deref(), Some("4417"));
        assert_eq!(info.status.as_deref(), Some("activated"));
        assert_eq!(info.plan_id.as_deref(), Some("plan_2"));
        assert_eq!(info.plan_name.as_deref(), Some("Global 10GB"));
        assert_eq!(info.total_data.as_deref(), Some("10.00GB"));
        assert_eq!(info.used_data.as_deref(), Some("1.00GB"));
        assert_eq!(info.remaining_data.as_deref(), Some("9.00GB"));
        // country/network are primary-branch fields only.
        assert!(info.country.is_none());
        assert!(info.network.is_none());
    }

    #[test]
    fn test_shape_provider_without_packages_keeps_subscriber() {
        let subscriber = ProviderSubscriber {
            sim: Some(ProviderSim {
                id: Some(RawId::String("abc".to_string())),
                state: None,
            }),
        };
        let info = shape_provider(&subscriber, &[], true, &iccid());
        assert_eq!(info.status.as_deref(), Some("unknown"));
        assert!(info.partial_data);
        assert!(info.plan_id.is_none());
    }

    #[test]
    fn test_shape_sample_fixed_record() {
        let info = shape_sample(&iccid());
        assert_eq!(info.data_source, DataSource::Sample);
        assert_eq!(info.subscriber_id.as_deref(), Some("sample_345678"));
        assert_eq!(info.status.as_deref(), Some("activated"));
        assert_eq!(info.total_data.as_deref(), Some("10.00GB"));
        assert_eq!(info.used_data.as_deref(), Some("1.00GB"));
        assert_eq!(info.remaining_data.as_deref(), Some("9.00GB"));
        assert_eq!(info.plan_name.as_deref(), Some("Sample Global 10GB Package"));
    }

    #[test]
    fn test_unavailable_has_no_subscriber() {
        let resolved = ResolvedIccid::Unavailable {
            error: "No data available from any source".to_string(),
        };
        assert!(!resolved.has_subscriber());

        let info = resolved.into_info(&iccid());
        assert_eq!(info.data_source, DataSource::None);
        assert!(info.subscriber_id.is_none());
        assert!(info.error.is_some());
    }

    #[test]
    fn test_provider_without_sim_has_no_subscriber() {
        let resolved = ResolvedIccid::Provider {
            subscriber: ProviderSubscriber { sim: None },
            packages: Vec::new(),
            partial_data: false,
        };
        assert!(!resolved.has_subscriber());
    }
}
