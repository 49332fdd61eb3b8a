use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::services::dashboard::DashboardStatsResponse;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatsQuery {
    /// Calendar year for the monthly buckets; defaults to the current year
    pub year: Option<i32>,
}

/// Get dashboard statistics
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    summary = "Get dashboard statistics",
    description = "Order counts, revenue totals, monthly revenue buckets for one year, and the top products by quantity sold",
    params(StatsQuery),
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<DashboardStatsResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<DashboardStatsResponse>>, ServiceError> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let stats = state.services.dashboard.get_stats(year).await?;
    Ok(Json(ApiResponse::success(stats)))
}
