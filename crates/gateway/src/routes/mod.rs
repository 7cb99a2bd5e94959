//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog (X-API-Key when configured)
//! GET  /api/esim-data                     - Full snapshot (products + countries)
//! GET  /api/products                      - All products
//! GET  /api/products/filter               - Filtered products
//! GET  /api/products/{product_id}         - One product
//! GET  /api/countries                     - All countries
//! GET  /api/countries/region/{region}     - Countries in a region
//! GET  /api/price-groups                  - Distinct price groups
//!
//! # Subscribers
//! GET  /api/iccid/{iccid}                 - ICCID lookup through the fallback chain
//!
//! # Topups
//! GET  /api/topup/plans                   - Available topup plans
//! POST /api/topup/execute                 - Execute a topup
//! GET  /api/topup/history/{iccid}         - Topup history for one eSIM
//!
//! # Operational
//! GET  /api/health                        - Health probe (open access)
//! GET  /api/debug                         - Config echo + connectivity diagnostics
//! ```

pub mod catalog;
pub mod health;
pub mod iccid;
pub mod topup;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the gateway router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/esim-data", get(catalog::esim_data))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/filter", get(catalog::filter))
        .route("/api/products/{product_id}", get(catalog::product_by_id))
        .route("/api/countries", get(catalog::list_countries))
        .route(
            "/api/countries/region/{region_code}",
            get(catalog::countries_by_region),
        )
        .route("/api/price-groups", get(catalog::list_price_groups))
        .route("/api/iccid/{iccid}", get(iccid::lookup))
        .route("/api/topup/plans", get(topup::plans))
        .route("/api/topup/execute", post(topup::execute))
        .route("/api/topup/history/{iccid}", get(topup::history))
        .route("/api/health", get(health::health))
        .route("/api/debug", get(health::debug))
}
