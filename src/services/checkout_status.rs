use crate::{
    db::DbPool,
    entities::checkout::{
        ActiveModel as CheckoutActiveModel, CheckoutStatus, Entity as CheckoutEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Transition table for the checkout lifecycle.
///
/// Setting the current status again is always permitted and treated as a
/// no-op by the service. A canceled checkout is terminal; a delivered
/// checkout may still be canceled.
pub fn is_valid_transition(from: CheckoutStatus, to: CheckoutStatus) -> bool {
    use CheckoutStatus::*;
    match (from, to) {
        _ if from == to => true,
        (Pending, Delivered) | (Pending, Canceled) => true,
        (Delivered, Canceled) => true,
        (Delivered, Pending) => false,
        (Canceled, _) => false,
        _ => false,
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCheckoutStatusRequest {
    pub status: CheckoutStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutStatusResponse {
    pub id: Uuid,
    pub status: CheckoutStatus,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Service for moving checkouts through their lifecycle
#[derive(Clone)]
pub struct CheckoutStatusService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CheckoutStatusService {
    /// Creates a new checkout status service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Sets a checkout's status, enforcing the transition table.
    ///
    /// Setting the status a checkout already has succeeds without touching
    /// the row, so retries are safe.
    #[instrument(skip(self), fields(checkout_id = %checkout_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        checkout_id: Uuid,
        new_status: CheckoutStatus,
    ) -> Result<CheckoutStatusResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to start transaction for status update");
            ServiceError::DatabaseError(e)
        })?;

        let checkout = CheckoutEntity::find_by_id(checkout_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, checkout_id = %checkout_id, "Failed to find checkout for status update");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(checkout_id = %checkout_id, "Checkout not found for status update");
                ServiceError::NotFound("Checkout not found".to_string())
            })?;

        let old_status = checkout.status;

        if old_status == new_status {
            info!(checkout_id = %checkout_id, status = %new_status, "Status unchanged, nothing to do");
            return Ok(CheckoutStatusResponse {
                id: checkout.id,
                status: checkout.status,
                updated_at: checkout.updated_at,
            });
        }

        if !is_valid_transition(old_status, new_status) {
            warn!(
                checkout_id = %checkout_id,
                old_status = %old_status,
                new_status = %new_status,
                "Rejected status transition"
            );
            return Err(ServiceError::InvalidStatusTransition(format!(
                "Cannot move checkout from {} to {}",
                old_status, new_status
            )));
        }

        let mut checkout_active_model: CheckoutActiveModel = checkout.into();
        checkout_active_model.status = Set(new_status);
        checkout_active_model.updated_at = Set(Some(now));

        let updated_checkout = checkout_active_model.update(&txn).await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to update checkout status");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to commit status update transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            checkout_id = %checkout_id,
            old_status = %old_status,
            new_status = %new_status,
            "Checkout status updated successfully"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::CheckoutStatusChanged {
                    checkout_id,
                    old_status,
                    new_status,
                })
                .await
            {
                warn!(error = %e, checkout_id = %checkout_id, "Failed to send status changed event");
            }
        }

        Ok(CheckoutStatusResponse {
            id: updated_checkout.id,
            status: updated_checkout.status,
            updated_at: updated_checkout.updated_at,
        })
    }

    /// Reads a checkout's current status
    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    pub async fn get_status(&self, checkout_id: Uuid) -> Result<CheckoutStatus, ServiceError> {
        let db = &*self.db_pool;

        let checkout = CheckoutEntity::find_by_id(checkout_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, checkout_id = %checkout_id, "Failed to fetch checkout status");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound("Checkout not found".to_string()))?;

        Ok(checkout.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use CheckoutStatus::*;

    #[rstest]
    #[case(Pending, Pending, true)]
    #[case(Pending, Delivered, true)]
    #[case(Pending, Canceled, true)]
    #[case(Delivered, Pending, false)]
    #[case(Delivered, Delivered, true)]
    #[case(Delivered, Canceled, true)]
    #[case(Canceled, Pending, false)]
    #[case(Canceled, Delivered, false)]
    #[case(Canceled, Canceled, true)]
    fn transition_table(
        #[case] from: CheckoutStatus,
        #[case] to: CheckoutStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(is_valid_transition(from, to), allowed);
    }

    #[test]
    fn full_lifecycle_ends_canceled() {
        // Pending -> Delivered -> Canceled is a legal path
        let mut status = Pending;
        for next in [Delivered, Canceled] {
            assert!(is_valid_transition(status, next));
            status = next;
        }
        assert_eq!(status, Canceled);
    }
}
