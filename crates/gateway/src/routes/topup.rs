//! Topup route handlers.
//!
//! These proxy the upstream topup operations. The plan listing degrades to
//! an empty set on upstream failure; execution and history surface
//! upstream errors as client-visible 400s with the upstream's message.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use esim_global_core::Iccid;

use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::state::AppState;
use crate::wordpress::{TopupHistory, TopupPlan, TopupReceipt, WordPressError};

/// Body of a topup execution request.
#[derive(Debug, Deserialize)]
pub struct TopupRequest {
    pub iccid: String,
    pub plan_id: String,
    #[serde(default)]
    pub payment_reference: Option<String>,
}

/// Response envelope for the plan listing.
#[derive(Debug, Serialize)]
pub struct TopupPlansResponse {
    pub status: String,
    pub plans: Vec<TopupPlan>,
    pub count: usize,
}

fn parse_iccid(raw: &str) -> Result<Iccid> {
    Iccid::parse(raw).map_err(|_| {
        AppError::BadRequest("Invalid ICCID format. ICCID should be 18-22 digits.".to_string())
    })
}

/// `GET /api/topup/plans` - the available topup plans.
///
/// Upstream failure is logged and degrades to an empty list rather than an
/// error status.
pub async fn plans(
    _auth: RequireApiKey,
    State(state): State<AppState>,
) -> Json<TopupPlansResponse> {
    let plans = match state.wordpress().fetch_topup_plans().await {
        Ok(plans) => plans,
        Err(err) => {
            warn!(error = %err, "failed to fetch topup plans");
            Vec::new()
        }
    };

    let count = plans.len();
    Json(TopupPlansResponse {
        status: "success".to_string(),
        plans,
        count,
    })
}

/// `POST /api/topup/execute` - execute a topup for an eSIM.
pub async fn execute(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Json(request): Json<TopupRequest>,
) -> Result<Json<TopupReceipt>> {
    let iccid = parse_iccid(&request.iccid)?;

    let receipt = state
        .wordpress()
        .execute_topup(&iccid, &request.plan_id, request.payment_reference.as_deref())
        .await
        .map_err(|err| AppError::BadRequest(execution_error_message(&err)))?;

    if receipt.status == "error" {
        return Err(AppError::BadRequest(receipt.message));
    }

    Ok(Json(receipt))
}

/// `GET /api/topup/history/{iccid}` - topup history for one eSIM.
pub async fn history(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(iccid): Path<String>,
) -> Result<Json<TopupHistory>> {
    let iccid = parse_iccid(&iccid)?;

    let history = state
        .wordpress()
        .fetch_topup_history(&iccid)
        .await
        .map_err(|err| {
            warn!(error = %err, "failed to fetch topup history");
            AppError::BadRequest("Error fetching topup history".to_string())
        })?;

    if history.status == "error" {
        return Err(AppError::BadRequest("Error fetching topup history".to_string()));
    }

    Ok(Json(history))
}

fn execution_error_message(err: &WordPressError) -> String {
    match err {
        WordPressError::Upstream(message) => message.clone(),
        other => format!("Connection error: {other}"),
    }
}
