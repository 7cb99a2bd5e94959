//! Health and diagnostics route handlers.

use axum::{Json, extract::State};
use chrono::Utc;
use serde_json::{Value, json};

use crate::middleware::RequireApiKey;
use crate::state::AppState;

/// `GET /api/health` - open health probe.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.snapshot().get();
    let connected = snapshot.last_updated.is_some();

    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().timestamp(),
        "last_updated": snapshot.last_updated.clone().unwrap_or_else(|| "never".to_string()),
        "wordpress_url": state.config().wordpress_url,
        "connection_status": if connected { "connected" } else { "disconnected" },
        "using_sample_data": state.config().use_sample_data,
    }))
}

/// `GET /api/debug` - configuration echo plus live connectivity checks.
///
/// The three probes escalate from the site root to the REST API root to
/// the plugin endpoint itself; all are skipped in sample-data mode.
pub async fn debug(_auth: RequireApiKey, State(state): State<AppState>) -> Json<Value> {
    let config = state.config();
    let snapshot = state.snapshot().get();

    let connection_tests = if config.use_sample_data {
        json!({
            "wordpress_base_url": skipped_probe(&config.wordpress_url),
            "wordpress_api_base": skipped_probe(&format!("{}/wp-json", config.wordpress_url)),
            "esim_plugin_endpoint": skipped_probe(&format!(
                "{}/wp-json/esim-global/v1/data",
                config.wordpress_url
            )),
        })
    } else {
        let site = state.wordpress().probe_site().await;
        let api_root = state.wordpress().probe_api_root().await;
        let plugin = state.wordpress().probe_data_endpoint().await;

        json!({
            "wordpress_base_url": probe_result(&config.wordpress_url, &site),
            "wordpress_api_base": probe_result(&format!("{}/wp-json", config.wordpress_url), &api_root),
            "esim_plugin_endpoint": probe_result(
                &format!("{}/wp-json/esim-global/v1/data", config.wordpress_url),
                &plugin,
            ),
        })
    };

    Json(json!({
        "config": {
            "wordpress_url": config.wordpress_url,
            "refresh_interval": config.refresh_interval.as_secs(),
            "debug_mode": config.debug_mode,
            "using_sample_data": config.use_sample_data,
            "allow_sample_data_fallback": config.allow_sample_fallback,
            "provider_configured": config.provider.is_some(),
        },
        "connection_tests": connection_tests,
        "data_store": {
            "has_products": !snapshot.products.is_empty(),
            "product_count": snapshot.products.len(),
            "has_countries": !snapshot.countries.is_empty(),
            "country_count": snapshot.countries.len(),
            "last_updated": snapshot.last_updated,
            "refreshing": state.snapshot().is_refreshing(),
        },
    }))
}

fn skipped_probe(url: &str) -> Value {
    json!({
        "url": url,
        "reachable": "skipped (using sample data)",
        "error": Value::Null,
    })
}

fn probe_result(url: &str, outcome: &Result<reqwest::StatusCode, reqwest::Error>) -> Value {
    match outcome {
        Ok(status) => json!({
            "url": url,
            "reachable": status.as_u16() < 400,
            "error": Value::Null,
        }),
        Err(err) => json!({
            "url": url,
            "reachable": false,
            "error": err.to_string(),
        }),
    }
}
