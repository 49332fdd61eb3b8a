use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::aggregation::AggregatedCheckout;
use crate::entities::checkout::CheckoutStatus;
use crate::services::checkout_status::{CheckoutStatusResponse, UpdateCheckoutStatusRequest};
use crate::services::checkouts::{
    CheckoutResponse, CreateCheckoutRequest, NewCheckoutItem,
};
use crate::{
    errors::ServiceError, handlers::validation_messages, ApiResponse, AppState, ListQuery,
    PaginatedResponse,
};

/// One line of the aggregated admin view, carrying the product snapshot
/// when the product row still exists.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AggregatedItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub size: Option<String>,
    pub quantity: i32,
}

/// A checkout with its line items, as shown on the admin orders page.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AggregatedCheckoutView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub city: String,
    pub region: String,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub status: CheckoutStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<AggregatedItemView>,
}

fn map_aggregated(group: AggregatedCheckout) -> AggregatedCheckoutView {
    let items = group
        .items
        .into_iter()
        .map(|entry| AggregatedItemView {
            id: entry.item.id,
            product_id: entry.item.product_id,
            product_name: entry.product.as_ref().map(|p| p.name.clone()),
            unit_price: entry.product.as_ref().map(|p| p.price),
            size: entry.item.size,
            quantity: entry.item.quantity,
        })
        .collect();

    AggregatedCheckoutView {
        id: group.checkout.id,
        first_name: group.checkout.first_name,
        last_name: group.checkout.last_name,
        address: group.checkout.address,
        phone: group.checkout.phone,
        city: group.checkout.city,
        region: group.checkout.region,
        subtotal: group.checkout.subtotal,
        total: group.checkout.total,
        status: group.checkout.status,
        created_at: group.checkout.created_at,
        items,
    }
}

/// List checkouts with pagination
#[utoipa::path(
    get,
    path = "/api/v1/checkouts",
    summary = "List checkouts",
    description = "Get a paginated list of checkouts, newest first",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Checkouts retrieved successfully", body = ApiResponse<PaginatedResponse<CheckoutResponse>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_checkouts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<CheckoutResponse>>>, ServiceError> {
    let limit = state.config.clamp_page_size(query.limit);
    let result = state
        .services
        .checkouts
        .list_checkouts(query.page, limit)
        .await?;

    let total_pages = (result.total + limit - 1) / limit;
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: result.checkouts,
        total: result.total,
        page: result.page,
        limit,
        total_pages,
    })))
}

/// List checkouts grouped with their items
#[utoipa::path(
    get,
    path = "/api/v1/checkouts/aggregated",
    summary = "List aggregated checkouts",
    description = "Get all checkouts grouped with their line items and product snapshots. Checkouts without items are omitted.",
    responses(
        (status = 200, description = "Aggregated checkouts retrieved successfully", body = ApiResponse<Vec<AggregatedCheckoutView>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_aggregated_checkouts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AggregatedCheckoutView>>>, ServiceError> {
    let groups = state.services.checkouts.list_aggregated().await?;
    let views = groups.into_iter().map(map_aggregated).collect();
    Ok(Json(ApiResponse::success(views)))
}

/// Create a new checkout
#[utoipa::path(
    post,
    path = "/api/v1/checkouts",
    summary = "Create checkout",
    description = "Create a checkout together with its first line item",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 201, description = "Checkout created successfully", body = ApiResponse<CheckoutResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or delivery not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CheckoutResponse>>), ServiceError> {
    if let Err(validation_errors) = request.validate() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::validation_errors(validation_messages(
                &validation_errors,
            ))),
        ));
    }

    let checkout = state.services.checkouts.create_checkout(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(checkout))))
}

/// Get checkout by ID
#[utoipa::path(
    get,
    path = "/api/v1/checkouts/{id}",
    summary = "Get checkout",
    description = "Get a checkout and its line items by ID",
    params(
        ("id" = Uuid, Path, description = "Checkout ID"),
    ),
    responses(
        (status = 200, description = "Checkout retrieved successfully", body = ApiResponse<CheckoutResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 404, description = "Checkout not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, ServiceError> {
    match state.services.checkouts.get_checkout(id).await? {
        Some(checkout) => Ok(Json(ApiResponse::success(checkout))),
        None => Err(ServiceError::NotFound(format!(
            "Checkout with ID {} not found",
            id
        ))),
    }
}

/// Delete checkout
#[utoipa::path(
    delete,
    path = "/api/v1/checkouts/{id}",
    summary = "Delete checkout",
    description = "Delete a checkout and all of its line items",
    params(
        ("id" = Uuid, Path, description = "Checkout ID"),
    ),
    responses(
        (status = 204, description = "Checkout deleted successfully"),
        (status = 404, description = "Checkout not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.checkouts.delete_checkout(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add item to checkout
#[utoipa::path(
    post,
    path = "/api/v1/checkouts/{id}/items",
    summary = "Add checkout item",
    description = "Add a line item to a pending checkout and recompute its totals",
    params(
        ("id" = Uuid, Path, description = "Checkout ID"),
    ),
    request_body = NewCheckoutItem,
    responses(
        (status = 200, description = "Item added successfully", body = ApiResponse<CheckoutResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data or checkout no longer pending", body = crate::errors::ErrorResponse),
        (status = 404, description = "Checkout or product not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn add_checkout_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NewCheckoutItem>,
) -> Result<(StatusCode, Json<ApiResponse<CheckoutResponse>>), ServiceError> {
    if let Err(validation_errors) = request.validate() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::validation_errors(validation_messages(
                &validation_errors,
            ))),
        ));
    }

    let checkout = state.services.checkouts.add_item(id, request).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(checkout))))
}

/// Get checkout status
#[utoipa::path(
    get,
    path = "/api/v1/checkouts/{id}/status",
    summary = "Get checkout status",
    description = "Get the current lifecycle status of a checkout",
    params(
        ("id" = Uuid, Path, description = "Checkout ID"),
    ),
    responses(
        (status = 200, description = "Status retrieved successfully", body = ApiResponse<CheckoutStatus>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 404, description = "Checkout not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_checkout_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CheckoutStatus>>, ServiceError> {
    let status = state.services.checkout_status.get_status(id).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// Update checkout status
#[utoipa::path(
    put,
    path = "/api/v1/checkouts/{id}/status",
    summary = "Update checkout status",
    description = "Move a checkout through its lifecycle. Setting the current status again is a no-op; a canceled checkout cannot change again.",
    params(
        ("id" = Uuid, Path, description = "Checkout ID"),
    ),
    request_body = UpdateCheckoutStatusRequest,
    responses(
        (status = 200, description = "Status updated successfully", body = ApiResponse<CheckoutStatusResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 404, description = "Checkout not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed from the current status", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_checkout_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCheckoutStatusRequest>,
) -> Result<Json<ApiResponse<CheckoutStatusResponse>>, ServiceError> {
    let updated = state
        .services
        .checkout_status
        .update_status(id, request.status)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::AggregatedItem;
    use crate::entities::{checkout, checkout_item, product};
    use rust_decimal_macros::dec;

    fn group_with_one_item(product: Option<product::Model>) -> AggregatedCheckout {
        let checkout = checkout::Model {
            id: Uuid::new_v4(),
            first_name: "Amina".into(),
            last_name: "Haddad".into(),
            address: "12 Rue des Oliviers".into(),
            phone: "+21655501234".into(),
            city: "Tunis".into(),
            region: "Tunis".into(),
            subtotal: dec!(10.00),
            total: dec!(17.00),
            delivery_id: None,
            status: CheckoutStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        };
        let item = checkout_item::Model {
            id: Uuid::new_v4(),
            checkout_id: checkout.id,
            product_id: product.as_ref().map(|p| p.id).unwrap_or_else(Uuid::new_v4),
            size: Some("M".into()),
            quantity: 2,
            created_at: Utc::now(),
        };
        AggregatedCheckout {
            checkout,
            items: vec![AggregatedItem { item, product }],
        }
    }

    #[test]
    fn map_aggregated_carries_product_snapshot() {
        let product = product::Model {
            id: Uuid::new_v4(),
            name: "Linen shirt".into(),
            price: dec!(5.00),
            image_url: None,
            category_id: None,
            created_at: Utc::now(),
            updated_at: None,
        };

        let view = map_aggregated(group_with_one_item(Some(product)));

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].product_name.as_deref(), Some("Linen shirt"));
        assert_eq!(view.items[0].unit_price, Some(dec!(5.00)));
        assert_eq!(view.items[0].quantity, 2);
    }

    #[test]
    fn map_aggregated_tolerates_deleted_products() {
        let view = map_aggregated(group_with_one_item(None));

        assert!(view.items[0].product_name.is_none());
        assert!(view.items[0].unit_price.is_none());
    }
}
