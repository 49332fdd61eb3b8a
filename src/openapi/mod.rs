use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Admin API",
        version = "0.1.0",
        description = r#"
# Storefront Admin API

Backend for a storefront admin panel: order intake, order status workflow,
printable invoices, catalog and delivery management, and new-order
notifications.

## Checkouts

A checkout is an order placed by a customer. It is created together with its
first line item in one transaction, so an empty checkout never exists. Totals
are stored on the checkout row; the optional delivery fee is included.

## Invoices

Invoices are shaped on demand. Line totals are unit price times quantity at
render time; a deleted product renders with a placeholder name and a zero
unit price. The invoice total is always the stored checkout total. The
all-invoices endpoint packs invoices onto print pages by vertical space.

## Pagination

List endpoints support pagination with the following query parameters:
- `page`: Page number (default: 1)
- `limit`: Items per page (default: 20, max: 100)
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "checkouts", description = "Checkout management and status workflow"),
        (name = "invoices", description = "Invoice shaping and print pagination"),
        (name = "products", description = "Product catalog"),
        (name = "deliveries", description = "Delivery options"),
        (name = "notifications", description = "New-order notifications"),
        (name = "dashboard", description = "Admin dashboard statistics")
    ),
    paths(
        // Checkouts
        crate::handlers::checkouts::list_checkouts,
        crate::handlers::checkouts::list_aggregated_checkouts,
        crate::handlers::checkouts::create_checkout,
        crate::handlers::checkouts::get_checkout,
        crate::handlers::checkouts::delete_checkout,
        crate::handlers::checkouts::add_checkout_item,
        crate::handlers::checkouts::get_checkout_status,
        crate::handlers::checkouts::update_checkout_status,

        // Invoices
        crate::handlers::invoices::get_checkout_invoice,
        crate::handlers::invoices::list_invoice_pages,

        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Deliveries
        crate::handlers::deliveries::list_deliveries,
        crate::handlers::deliveries::create_delivery,
        crate::handlers::deliveries::delete_delivery,

        // Notifications
        crate::handlers::notifications::list_notifications,
        crate::handlers::notifications::delete_notification,

        // Dashboard
        crate::handlers::dashboard::get_dashboard_stats,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Checkout types
            crate::entities::checkout::CheckoutStatus,
            crate::services::checkouts::CheckoutResponse,
            crate::services::checkouts::CheckoutItemResponse,
            crate::services::checkouts::CreateCheckoutRequest,
            crate::services::checkouts::NewCheckoutItem,
            crate::services::checkout_status::UpdateCheckoutStatusRequest,
            crate::services::checkout_status::CheckoutStatusResponse,
            crate::handlers::checkouts::AggregatedCheckoutView,
            crate::handlers::checkouts::AggregatedItemView,

            // Invoice types
            crate::services::invoicing::InvoiceDocument,
            crate::services::invoicing::InvoiceRow,
            crate::services::invoicing::InvoicePage,

            // Catalog types
            crate::services::products::ProductResponse,
            crate::services::products::CreateProductRequest,
            crate::services::products::UpdateProductRequest,
            crate::services::deliveries::DeliveryResponse,
            crate::services::deliveries::CreateDeliveryRequest,

            // Notification types
            crate::services::notifications::NotificationResponse,

            // Dashboard types
            crate::services::dashboard::DashboardStatsResponse,
            crate::services::dashboard::MonthlyRevenue,
            crate::services::dashboard::TopProduct,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_core_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).expect("document should serialize");

        assert!(json.contains("Storefront Admin API"));
        assert!(json.contains("/api/v1/checkouts"));
        assert!(json.contains("/api/v1/checkouts/aggregated"));
        assert!(json.contains("/api/v1/checkouts/{id}/invoice"));
        assert!(json.contains("/api/v1/dashboard/stats"));
    }
}
