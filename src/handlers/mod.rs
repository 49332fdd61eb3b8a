pub mod checkouts;
pub mod dashboard;
pub mod deliveries;
pub mod invoices;
pub mod notifications;
pub mod products;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;
use validator::ValidationErrors;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub checkouts: Arc<crate::services::checkouts::CheckoutService>,
    pub checkout_status: Arc<crate::services::checkout_status::CheckoutStatusService>,
    pub invoices: Arc<crate::services::invoicing::InvoiceService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub deliveries: Arc<crate::services::deliveries::DeliveryService>,
    pub dashboard: Arc<crate::services::dashboard::DashboardService>,
    pub notifications: Arc<crate::services::notifications::NotificationService>,
}

impl AppServices {
    /// Build the services container shared by all handlers.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let checkouts = Arc::new(crate::services::checkouts::CheckoutService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let checkout_status = Arc::new(
            crate::services::checkout_status::CheckoutStatusService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            ),
        );
        let invoices = Arc::new(crate::services::invoicing::InvoiceService::new(
            db_pool.clone(),
        ));
        let products = Arc::new(crate::services::products::ProductService::new(
            db_pool.clone(),
            Some(event_sender),
        ));
        let deliveries = Arc::new(crate::services::deliveries::DeliveryService::new(
            db_pool.clone(),
        ));
        let dashboard = Arc::new(crate::services::dashboard::DashboardService::new(
            db_pool.clone(),
        ));
        let notifications = Arc::new(crate::services::notifications::NotificationService::new(
            db_pool,
        ));

        Self {
            checkouts,
            checkout_status,
            invoices,
            products,
            deliveries,
            dashboard,
            notifications,
        }
    }
}

/// Flatten validator output into one message per failed field check.
pub(crate) fn validation_messages(validation_errors: &ValidationErrors) -> Vec<String> {
    validation_errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            let field = field.to_string();
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error.message.as_ref().unwrap_or(&"Invalid value".into())
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "First name is required"))]
        first_name: String,
    }

    #[test]
    fn validation_messages_name_the_field() {
        let probe = Probe {
            first_name: String::new(),
        };
        let errors = probe.validate().unwrap_err();

        let messages = validation_messages(&errors);

        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("first_name:"));
        assert!(messages[0].contains("First name is required"));
    }
}
