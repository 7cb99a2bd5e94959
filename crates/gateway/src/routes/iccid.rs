//! ICCID lookup route handler.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::debug;

use esim_global_core::{Iccid, IccidInfo};

use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::resolve::resolve_iccid;
use crate::state::AppState;

/// `GET /api/iccid/{iccid}` - resolve one eSIM through the fallback chain.
///
/// Malformed ICCIDs are rejected before any upstream call; a resolution
/// carrying no subscriber data surfaces as 404.
pub async fn lookup(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(iccid): Path<String>,
) -> Result<Json<IccidInfo>> {
    let iccid = Iccid::parse(&iccid).map_err(|_| {
        AppError::BadRequest("Invalid ICCID format. ICCID should be 18-22 digits.".to_string())
    })?;

    let resolved = resolve_iccid(&state, &iccid).await;
    debug!(%iccid, has_subscriber = resolved.has_subscriber(), "ICCID lookup resolved");

    if !resolved.has_subscriber() {
        return Err(AppError::NotFound(format!(
            "No data found for ICCID: {iccid}. Please check the ICCID and try again."
        )));
    }

    Ok(Json(resolved.into_info(&iccid)))
}
