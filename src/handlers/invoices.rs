use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::services::invoicing::{InvoiceDocument, InvoicePage};
use crate::{errors::ServiceError, ApiResponse, AppState};

/// Get the invoice for one checkout
#[utoipa::path(
    get,
    path = "/api/v1/checkouts/{id}/invoice",
    summary = "Get checkout invoice",
    description = "Shape a checkout into its printable invoice. Line totals are computed from current product prices; the invoice total is the stored checkout total.",
    params(
        ("id" = Uuid, Path, description = "Checkout ID"),
    ),
    responses(
        (status = 200, description = "Invoice retrieved successfully", body = ApiResponse<InvoiceDocument>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 404, description = "Checkout not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_checkout_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InvoiceDocument>>, ServiceError> {
    let invoice = state.services.invoices.invoice_for_checkout(id).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

/// Get all invoices, paginated for printing
#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    summary = "List invoice pages",
    description = "Shape every checkout with items into an invoice and pack the invoices onto print pages by vertical space",
    responses(
        (status = 200, description = "Invoice pages retrieved successfully", body = ApiResponse<Vec<InvoicePage>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_invoice_pages(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<InvoicePage>>>, ServiceError> {
    let pages = state.services.invoices.invoices_for_all().await?;
    Ok(Json(ApiResponse::success(pages)))
}
