use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::checkout::CheckoutStatus;
use crate::entities::notification;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Events emitted by the services and consumed by `process_events`.
///
/// `CheckoutCreated` carries the customer fields needed for the
/// notification row so the consumer never has to read the checkout back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CheckoutCreated {
        checkout_id: Uuid,
        first_name: String,
        last_name: String,
        total: Decimal,
    },
    CheckoutStatusChanged {
        checkout_id: Uuid,
        old_status: CheckoutStatus,
        new_status: CheckoutStatus,
    },
    CheckoutDeleted(Uuid),
    ProductCreated {
        product_id: Uuid,
        name: String,
    },
    ProductDeleted {
        product_id: Uuid,
        name: String,
    },
}

/// Consumes events from the channel until every sender is dropped.
///
/// This task is the only writer of notification rows. Routing every
/// order-created reaction through one consumer serializes those writes;
/// request handlers never touch the notifications table directly.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, db: Arc<DbPool>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::CheckoutCreated {
                checkout_id,
                first_name,
                last_name,
                total,
            } => {
                if let Err(e) =
                    handle_checkout_created(&db, checkout_id, &first_name, &last_name, &total)
                        .await
                {
                    error!(
                        "Failed to handle checkout created event: checkout_id={}, error={}",
                        checkout_id, e
                    );
                }
            }
            Event::CheckoutStatusChanged {
                checkout_id,
                old_status,
                new_status,
            } => {
                info!(
                    "Checkout {} status changed: {} -> {}",
                    checkout_id, old_status, new_status
                );
            }
            Event::CheckoutDeleted(checkout_id) => {
                info!("Checkout {} deleted", checkout_id);
            }
            Event::ProductCreated { product_id, name } => {
                info!("Product {} created: {}", product_id, name);
            }
            Event::ProductDeleted { product_id, name } => {
                info!("Product {} deleted: {}", product_id, name);
            }
        }
    }

    warn!("Event processing loop has ended");
}

async fn handle_checkout_created(
    db: &DbPool,
    checkout_id: Uuid,
    first_name: &str,
    last_name: &str,
    total: &Decimal,
) -> Result<(), String> {
    let row = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("New Order".to_string()),
        body: Set(new_order_body(first_name, last_name, total)),
        checkout_id: Set(Some(checkout_id)),
        ..Default::default()
    };

    row.insert(db)
        .await
        .map_err(|e| format!("Failed to insert notification: {}", e))?;

    info!("Recorded new-order notification for checkout {}", checkout_id);
    Ok(())
}

fn new_order_body(first_name: &str, last_name: &str, total: &Decimal) -> String {
    format!("{} {} - Total: ${}", first_name, last_name, total)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_order_body_matches_notification_format() {
        let body = new_order_body("Amina", "Haddad", &dec!(120.50));
        assert_eq!(body, "Amina Haddad - Total: $120.50");
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let sender = EventSender::new(tx);
        let result = sender.send(Event::CheckoutDeleted(Uuid::new_v4())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn events_arrive_in_send_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        sender
            .send(Event::CheckoutDeleted(first))
            .await
            .expect("send");
        sender
            .send(Event::CheckoutDeleted(second))
            .await
            .expect("send");
        drop(sender);

        assert!(matches!(rx.recv().await, Some(Event::CheckoutDeleted(id)) if id == first));
        assert!(matches!(rx.recv().await, Some(Event::CheckoutDeleted(id)) if id == second));
        assert!(rx.recv().await.is_none());
    }
}
