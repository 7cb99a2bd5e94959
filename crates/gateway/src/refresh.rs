//! Catalog refresh: the fallback chain and the background scheduler.
//!
//! [`refresh_catalog`] never fails past its own boundary: every failure
//! path either leaves the snapshot unchanged (stale data continues to
//! serve) or, when explicitly permitted, substitutes the built-in sample
//! set. Retry cadence is strictly the fixed refresh interval; there is no
//! backoff.

use tracing::{debug, error, info, warn};

use esim_global_core::sample::{sample_countries, sample_products};

use crate::state::AppState;
use crate::wordpress::WordPressError;

/// Refresh the catalog snapshot through the source priority chain.
///
/// Single-flight: when a refresh is already running this returns
/// immediately without touching any source. In sample-data mode the
/// fixtures are seeded once and no network source is ever called.
pub async fn refresh_catalog(state: &AppState) {
    let Some(_guard) = state.snapshot().begin_refresh() else {
        debug!("catalog refresh already in flight, skipping");
        return;
    };

    if state.config().use_sample_data {
        // Idempotent: only the first refresh seeds the fixtures.
        if state.snapshot().get().last_updated.is_none() {
            info!("sample-data mode: seeding built-in catalog");
            state.snapshot().commit(sample_products(), sample_countries());
        }
        return;
    }

    if state.config().probe_test_endpoint {
        state.wordpress().probe_test_endpoint().await;
    }

    match state.wordpress().fetch_catalog().await {
        Ok(payload) => {
            let (products, countries) = (payload.products.len(), payload.countries.len());
            state
                .snapshot()
                .commit(payload.products, payload.countries);
            info!(products, countries, "catalog refreshed");
        }
        Err(err) => handle_refresh_failure(state, &err).await,
    }
}

/// Log what went wrong, run escalating connectivity diagnostics where they
/// help, and degrade to sample data only when the fallback is permitted.
async fn handle_refresh_failure(state: &AppState, err: &WordPressError) {
    match err {
        WordPressError::RouteNotFound => {
            error!(
                "catalog endpoint not found (rest_no_route); check that the plugin is activated, \
                 permalinks are saved, and the REST API is not disabled by a security plugin"
            );
        }
        err if err.is_timeout() => {
            warn!("timeout fetching catalog; the site may be slow to respond");
        }
        err if err.is_connect() => {
            error!(error = %err, "connection error fetching catalog");
            state.wordpress().diagnose_connectivity().await;
        }
        err => {
            error!(error = %err, "error fetching catalog");
        }
    }

    if state.config().allow_sample_fallback {
        warn!("substituting built-in sample catalog after refresh failure");
        state.snapshot().commit(sample_products(), sample_countries());
    }
    // Otherwise the snapshot stays as it was; stale data keeps serving
    // until the next scheduled attempt.
}

/// Background refresh loop: refresh, sleep `REFRESH_INTERVAL`, forever.
///
/// `refresh_catalog` converts every failure internally, so nothing can
/// terminate the loop. The caller owns the spawned task handle and aborts
/// it on shutdown.
pub async fn run_scheduler(state: AppState) {
    let interval = state.config().refresh_interval;
    loop {
        refresh_catalog(&state).await;
        tokio::time::sleep(interval).await;
    }
}
