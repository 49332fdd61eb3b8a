use crate::{
    db::DbPool,
    entities::delivery::{self, Entity as DeliveryEntity},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request payload for creating a delivery option
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateDeliveryRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Delivery name must be between 1 and 100 characters"
    ))]
    pub name: String,
    pub fee: Decimal,
}

/// Delivery option data returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryResponse {
    pub id: Uuid,
    pub name: String,
    pub fee: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Service for managing the delivery options offered at checkout
#[derive(Clone)]
pub struct DeliveryService {
    db_pool: Arc<DbPool>,
}

impl DeliveryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Create a delivery option
    #[instrument(skip(self, request), fields(delivery_name = %request.name))]
    pub async fn create_delivery(
        &self,
        request: CreateDeliveryRequest,
    ) -> Result<DeliveryResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let delivery = delivery::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.clone()),
            fee: Set(request.fee),
            created_at: Set(Utc::now()),
        };

        let saved = delivery.insert(db).await.map_err(|e| {
            error!("Failed to create delivery option: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(delivery_id = %saved.id, "Delivery option created");

        Ok(model_to_response(saved))
    }

    /// List all delivery options, oldest first so the default option stays on top
    #[instrument(skip(self))]
    pub async fn list_deliveries(&self) -> Result<Vec<DeliveryResponse>, ServiceError> {
        let db = &*self.db_pool;

        let deliveries = DeliveryEntity::find()
            .order_by_asc(delivery::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to list delivery options: {}", e);
                ServiceError::DatabaseError(e)
            })?;

        Ok(deliveries.into_iter().map(model_to_response).collect())
    }

    /// Delete a delivery option
    #[instrument(skip(self))]
    pub async fn delete_delivery(&self, delivery_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let delivery = DeliveryEntity::find_by_id(delivery_id)
            .one(db)
            .await
            .map_err(|e| {
                error!("Failed to fetch delivery option {}: {}", delivery_id, e);
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Delivery option with ID {} not found",
                    delivery_id
                ))
            })?;

        delivery.delete(db).await.map_err(|e| {
            error!("Failed to delete delivery option {}: {}", delivery_id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(delivery_id = %delivery_id, "Delivery option deleted");

        Ok(())
    }
}

fn model_to_response(model: delivery::Model) -> DeliveryResponse {
    DeliveryResponse {
        id: model.id,
        name: model.name,
        fee: model.fee,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn model_to_response_preserves_fields() {
        let model = delivery::Model {
            id: Uuid::new_v4(),
            name: "Courier".to_string(),
            fee: dec!(4.50),
            created_at: Utc::now(),
        };
        let id = model.id;

        let response = model_to_response(model);

        assert_eq!(response.id, id);
        assert_eq!(response.name, "Courier");
        assert_eq!(response.fee, dec!(4.50));
    }

    #[test]
    fn create_request_rejects_blank_name() {
        let request = CreateDeliveryRequest {
            name: String::new(),
            fee: dec!(4.50),
        };

        assert!(request.validate().is_err());
    }
}
