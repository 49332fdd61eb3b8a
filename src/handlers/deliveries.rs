use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::services::deliveries::{CreateDeliveryRequest, DeliveryResponse};
use crate::{errors::ServiceError, handlers::validation_messages, ApiResponse, AppState};

/// List delivery options
#[utoipa::path(
    get,
    path = "/api/v1/deliveries",
    summary = "List deliveries",
    description = "Get all delivery options",
    responses(
        (status = 200, description = "Deliveries retrieved successfully", body = ApiResponse<Vec<DeliveryResponse>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_deliveries(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DeliveryResponse>>>, ServiceError> {
    let deliveries = state.services.deliveries.list_deliveries().await?;
    Ok(Json(ApiResponse::success(deliveries)))
}

/// Create a delivery option
#[utoipa::path(
    post,
    path = "/api/v1/deliveries",
    summary = "Create delivery",
    description = "Add a delivery option; its fee is added to checkout totals",
    request_body = CreateDeliveryRequest,
    responses(
        (status = 201, description = "Delivery created successfully", body = ApiResponse<DeliveryResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_delivery(
    State(state): State<AppState>,
    Json(request): Json<CreateDeliveryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DeliveryResponse>>), ServiceError> {
    if let Err(validation_errors) = request.validate() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::validation_errors(validation_messages(
                &validation_errors,
            ))),
        ));
    }

    let delivery = state.services.deliveries.create_delivery(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(delivery))))
}

/// Delete a delivery option
#[utoipa::path(
    delete,
    path = "/api/v1/deliveries/{id}",
    summary = "Delete delivery",
    description = "Remove a delivery option. Checkouts that already reference it keep their stored totals.",
    params(
        ("id" = Uuid, Path, description = "Delivery ID"),
    ),
    responses(
        (status = 204, description = "Delivery deleted successfully"),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.deliveries.delete_delivery(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
