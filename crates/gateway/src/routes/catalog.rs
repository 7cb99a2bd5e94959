//! Catalog route handlers.
//!
//! Every handler reads the current snapshot; when the relevant half is
//! empty it triggers one synchronous refresh attempt first (bounded by the
//! resolver's own timeouts) and then serves whatever is present.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Serialize;

use esim_global_core::catalog::{
    Country, Product, ProductFilter, countries_in_region, filter_products, find_product,
    price_groups,
};

use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::refresh::refresh_catalog;
use crate::snapshot::CatalogSnapshot;
use crate::state::AppState;

/// The full-snapshot response.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub products: Vec<Product>,
    pub countries: Vec<Country>,
    pub timestamp: i64,
    pub last_updated: Option<String>,
}

/// A product listing plus the snapshot's refresh stamp.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
    pub last_updated: Option<String>,
}

/// A country listing plus the snapshot's refresh stamp.
#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<Country>,
    pub last_updated: Option<String>,
}

/// The distinct price groups plus the snapshot's refresh stamp.
#[derive(Debug, Serialize)]
pub struct PriceGroupsResponse {
    pub price_groups: Vec<String>,
    pub last_updated: Option<String>,
}

/// Snapshot read that refreshes on demand when the products half is empty.
async fn snapshot_with_products(state: &AppState) -> Arc<CatalogSnapshot> {
    let snapshot = state.snapshot().get();
    if snapshot.products.is_empty() {
        refresh_catalog(state).await;
        return state.snapshot().get();
    }
    snapshot
}

/// Snapshot read that refreshes on demand when the countries half is empty.
async fn snapshot_with_countries(state: &AppState) -> Arc<CatalogSnapshot> {
    let snapshot = state.snapshot().get();
    if snapshot.countries.is_empty() {
        refresh_catalog(state).await;
        return state.snapshot().get();
    }
    snapshot
}

/// `GET /api/esim-data` - the full snapshot, 503 while no data exists.
pub async fn esim_data(
    _auth: RequireApiKey,
    State(state): State<AppState>,
) -> Result<Json<DataResponse>> {
    let mut snapshot = state.snapshot().get();
    if snapshot.products.is_empty() || snapshot.countries.is_empty() {
        refresh_catalog(&state).await;
        snapshot = state.snapshot().get();
    }
    if snapshot.products.is_empty() || snapshot.countries.is_empty() {
        return Err(AppError::Unavailable(
            "Data not available yet. Please check server logs for connection issues.".to_string(),
        ));
    }

    Ok(Json(DataResponse {
        products: snapshot.products.clone(),
        countries: snapshot.countries.clone(),
        timestamp: Utc::now().timestamp(),
        last_updated: snapshot.last_updated.clone(),
    }))
}

/// `GET /api/products` - all products.
pub async fn list_products(
    _auth: RequireApiKey,
    State(state): State<AppState>,
) -> Json<ProductsResponse> {
    let snapshot = snapshot_with_products(&state).await;
    Json(ProductsResponse {
        products: snapshot.products.clone(),
        last_updated: snapshot.last_updated.clone(),
    })
}

/// `GET /api/countries` - all countries.
pub async fn list_countries(
    _auth: RequireApiKey,
    State(state): State<AppState>,
) -> Json<CountriesResponse> {
    let snapshot = snapshot_with_countries(&state).await;
    Json(CountriesResponse {
        countries: snapshot.countries.clone(),
        last_updated: snapshot.last_updated.clone(),
    })
}

/// `GET /api/products/{product_id}` - one product by id.
pub async fn product_by_id(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>> {
    let snapshot = snapshot_with_products(&state).await;
    find_product(&snapshot.products, &product_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product with ID {product_id} not found")))
}

/// `GET /api/products/filter` - products matching the query criteria.
pub async fn filter(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Query(criteria): Query<ProductFilter>,
) -> Json<ProductsResponse> {
    let snapshot = snapshot_with_products(&state).await;
    Json(ProductsResponse {
        products: filter_products(&snapshot.products, &snapshot.countries, &criteria),
        last_updated: snapshot.last_updated.clone(),
    })
}

/// `GET /api/countries/region/{region_code}` - countries in one region.
pub async fn countries_by_region(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(region_code): Path<String>,
) -> Json<CountriesResponse> {
    let snapshot = snapshot_with_countries(&state).await;
    Json(CountriesResponse {
        countries: countries_in_region(&snapshot.countries, &region_code),
        last_updated: snapshot.last_updated.clone(),
    })
}

/// `GET /api/price-groups` - the distinct non-empty price groups, sorted.
pub async fn list_price_groups(
    _auth: RequireApiKey,
    State(state): State<AppState>,
) -> Json<PriceGroupsResponse> {
    let snapshot = snapshot_with_products(&state).await;
    Json(PriceGroupsResponse {
        price_groups: price_groups(&snapshot.products),
        last_updated: snapshot.last_updated.clone(),
    })
}
