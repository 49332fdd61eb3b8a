use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::services::notifications::NotificationResponse;
use crate::{errors::ServiceError, ApiResponse, AppState, ListQuery, PaginatedResponse};

/// List notifications
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    summary = "List notifications",
    description = "Get new-order notifications, newest first",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Notifications retrieved successfully", body = ApiResponse<PaginatedResponse<NotificationResponse>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<NotificationResponse>>>, ServiceError> {
    let limit = state.config.clamp_page_size(query.limit);
    let result = state
        .services
        .notifications
        .list_notifications(query.page, limit)
        .await?;

    let total_pages = (result.total + limit - 1) / limit;
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: result.notifications,
        total: result.total,
        page: result.page,
        limit,
        total_pages,
    })))
}

/// Delete a notification
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    summary = "Delete notification",
    description = "Dismiss a notification",
    params(
        ("id" = Uuid, Path, description = "Notification ID"),
    ),
    responses(
        (status = 204, description = "Notification deleted successfully"),
        (status = 404, description = "Notification not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.notifications.delete_notification(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
