use crate::{
    aggregation::{aggregate_item_rows, AggregatedCheckout, ItemRow},
    db::DbPool,
    entities::checkout::{
        self, ActiveModel as CheckoutActiveModel, CheckoutStatus, Entity as CheckoutEntity,
        Model as CheckoutModel,
    },
    entities::checkout_item::{
        self, ActiveModel as CheckoutItemActiveModel, Entity as CheckoutItemEntity,
        Model as CheckoutItemModel,
    },
    entities::delivery::Entity as DeliveryEntity,
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request/Response types for the checkout service
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewCheckoutItem {
    pub product_id: Uuid,
    /// Free-text size label, e.g. "M" or "42"
    pub size: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCheckoutRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Region is required"))]
    pub region: String,
    pub delivery_id: Option<Uuid>,
    /// The first line item; a checkout is never created empty
    #[validate]
    pub item: NewCheckoutItem,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub size: Option<String>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub city: String,
    pub region: String,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub delivery_id: Option<Uuid>,
    pub status: CheckoutStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Vec<CheckoutItemResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutListResponse {
    pub checkouts: Vec<CheckoutResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for managing checkouts and their line items
#[derive(Clone)]
pub struct CheckoutService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CheckoutService {
    /// Creates a new checkout service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a checkout together with its first line item in one transaction
    #[instrument(skip(self, request), fields(product_id = %request.item.product_id))]
    pub async fn create_checkout(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let checkout_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for checkout creation");
            ServiceError::DatabaseError(e)
        })?;

        let product = ProductEntity::find_by_id(request.item.product_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, product_id = %request.item.product_id, "Failed to fetch product");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(product_id = %request.item.product_id, "Product not found for checkout");
                ServiceError::NotFound(format!("Product {} not found", request.item.product_id))
            })?;

        let delivery_fee = self
            .resolve_delivery_fee(&txn, request.delivery_id)
            .await?;

        let subtotal = line_subtotal(product.price, request.item.quantity);
        let total = subtotal + delivery_fee;

        let checkout_active_model = CheckoutActiveModel {
            id: Set(checkout_id),
            first_name: Set(request.first_name.clone()),
            last_name: Set(request.last_name.clone()),
            address: Set(request.address),
            phone: Set(request.phone),
            city: Set(request.city),
            region: Set(request.region),
            subtotal: Set(subtotal),
            total: Set(total),
            delivery_id: Set(request.delivery_id),
            status: Set(CheckoutStatus::Pending),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let checkout_model = checkout_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to create checkout in database");
            ServiceError::DatabaseError(e)
        })?;

        let item_active_model = CheckoutItemActiveModel {
            id: Set(Uuid::new_v4()),
            checkout_id: Set(checkout_id),
            product_id: Set(request.item.product_id),
            size: Set(request.item.size.clone()),
            quantity: Set(request.item.quantity),
            created_at: Set(now),
        };

        let item_model = item_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to create checkout item in database");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to commit checkout creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(checkout_id = %checkout_id, total = %total, "Checkout created successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::CheckoutCreated {
                    checkout_id,
                    first_name: request.first_name,
                    last_name: request.last_name,
                    total,
                })
                .await
            {
                warn!(error = %e, checkout_id = %checkout_id, "Failed to send checkout created event");
            }
        }

        Ok(compose_response(checkout_model, vec![item_model]))
    }

    /// Adds a line item to an existing pending checkout and recomputes totals
    #[instrument(skip(self, item), fields(checkout_id = %checkout_id, product_id = %item.product_id))]
    pub async fn add_item(
        &self,
        checkout_id: Uuid,
        item: NewCheckoutItem,
    ) -> Result<CheckoutResponse, ServiceError> {
        item.validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to start transaction for item addition");
            ServiceError::DatabaseError(e)
        })?;

        let checkout = CheckoutEntity::find_by_id(checkout_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, checkout_id = %checkout_id, "Failed to find checkout for item addition");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(checkout_id = %checkout_id, "Checkout not found for item addition");
                ServiceError::NotFound("Checkout not found".to_string())
            })?;

        if checkout.status != CheckoutStatus::Pending {
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot add items to a {} checkout",
                checkout.status
            )));
        }

        let product = ProductEntity::find_by_id(item.product_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, product_id = %item.product_id, "Failed to fetch product");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(product_id = %item.product_id, "Product not found for item addition");
                ServiceError::NotFound(format!("Product {} not found", item.product_id))
            })?;

        let delivery_fee = self
            .resolve_delivery_fee(&txn, checkout.delivery_id)
            .await?;

        let subtotal = checkout.subtotal + line_subtotal(product.price, item.quantity);
        let total = subtotal + delivery_fee;

        let item_active_model = CheckoutItemActiveModel {
            id: Set(Uuid::new_v4()),
            checkout_id: Set(checkout_id),
            product_id: Set(item.product_id),
            size: Set(item.size),
            quantity: Set(item.quantity),
            created_at: Set(now),
        };

        item_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to create checkout item in database");
            ServiceError::DatabaseError(e)
        })?;

        let mut checkout_active_model: CheckoutActiveModel = checkout.into();
        checkout_active_model.subtotal = Set(subtotal);
        checkout_active_model.total = Set(total);
        checkout_active_model.updated_at = Set(Some(now));

        let updated_checkout = checkout_active_model.update(&txn).await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to update checkout totals");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to commit item addition transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(checkout_id = %checkout_id, subtotal = %subtotal, total = %total, "Checkout item added successfully");

        let items = self.fetch_items(checkout_id).await?;
        Ok(compose_response(updated_checkout, items))
    }

    /// Retrieves a checkout by ID including its line items
    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    pub async fn get_checkout(
        &self,
        checkout_id: Uuid,
    ) -> Result<Option<CheckoutResponse>, ServiceError> {
        let db = &*self.db_pool;

        let checkout = CheckoutEntity::find_by_id(checkout_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, checkout_id = %checkout_id, "Failed to fetch checkout from database");
                ServiceError::DatabaseError(e)
            })?;

        match checkout {
            Some(checkout_model) => {
                let items = self.fetch_items(checkout_id).await?;
                Ok(Some(compose_response(checkout_model, items)))
            }
            None => {
                info!(checkout_id = %checkout_id, "Checkout not found");
                Ok(None)
            }
        }
    }

    /// Lists checkouts with pagination, newest first
    #[instrument(skip(self))]
    pub async fn list_checkouts(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<CheckoutListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = CheckoutEntity::find()
            .order_by_desc(checkout::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count checkouts");
            ServiceError::DatabaseError(e)
        })?;

        let checkouts = paginator.fetch_page(page.saturating_sub(1)).await.map_err(|e| {
            error!(error = %e, page = page, per_page = per_page, "Failed to fetch checkouts page");
            ServiceError::DatabaseError(e)
        })?;

        let mut responses = Vec::with_capacity(checkouts.len());
        for checkout_model in checkouts {
            let items = self.fetch_items(checkout_model.id).await?;
            responses.push(compose_response(checkout_model, items));
        }

        info!(total = total, page = page, per_page = per_page, returned_count = responses.len(), "Checkouts listed successfully");

        Ok(CheckoutListResponse {
            checkouts: responses,
            total,
            page,
            per_page,
        })
    }

    /// Lists all checkouts grouped with their items and products, newest
    /// checkout first. Checkouts without any items do not appear.
    #[instrument(skip(self))]
    pub async fn list_aggregated(&self) -> Result<Vec<AggregatedCheckout>, ServiceError> {
        let rows = load_item_rows(&self.db_pool).await?;
        Ok(aggregate_item_rows(rows))
    }

    /// Deletes a checkout and all of its line items
    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    pub async fn delete_checkout(&self, checkout_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to start transaction for checkout deletion");
            ServiceError::DatabaseError(e)
        })?;

        let checkout = CheckoutEntity::find_by_id(checkout_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, checkout_id = %checkout_id, "Failed to find checkout for deletion");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(checkout_id = %checkout_id, "Checkout not found for deletion");
                ServiceError::NotFound("Checkout not found".to_string())
            })?;

        CheckoutItemEntity::delete_many()
            .filter(checkout_item::Column::CheckoutId.eq(checkout_id))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, checkout_id = %checkout_id, "Failed to delete checkout items");
                ServiceError::DatabaseError(e)
            })?;

        checkout.delete(&txn).await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to delete checkout");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, checkout_id = %checkout_id, "Failed to commit checkout deletion transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(checkout_id = %checkout_id, "Checkout deleted successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::CheckoutDeleted(checkout_id)).await {
                warn!(error = %e, checkout_id = %checkout_id, "Failed to send checkout deleted event");
            }
        }

        Ok(())
    }

    async fn fetch_items(
        &self,
        checkout_id: Uuid,
    ) -> Result<Vec<CheckoutItemModel>, ServiceError> {
        let db = &*self.db_pool;
        CheckoutItemEntity::find()
            .filter(checkout_item::Column::CheckoutId.eq(checkout_id))
            .order_by_asc(checkout_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, checkout_id = %checkout_id, "Failed to fetch checkout items");
                ServiceError::DatabaseError(e)
            })
    }

    async fn resolve_delivery_fee<C: ConnectionTrait>(
        &self,
        conn: &C,
        delivery_id: Option<Uuid>,
    ) -> Result<Decimal, ServiceError> {
        let Some(delivery_id) = delivery_id else {
            return Ok(Decimal::ZERO);
        };

        let delivery = DeliveryEntity::find_by_id(delivery_id)
            .one(conn)
            .await
            .map_err(|e| {
                error!(error = %e, delivery_id = %delivery_id, "Failed to fetch delivery option");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(delivery_id = %delivery_id, "Delivery option not found");
                ServiceError::NotFound(format!("Delivery option {} not found", delivery_id))
            })?;

        Ok(delivery.fee)
    }
}

/// Fetches every line item joined with its checkout and product, newest
/// checkout first and items in insertion order. Shared by the aggregated
/// listing and by invoice generation.
pub(crate) async fn load_item_rows(db: &DbPool) -> Result<Vec<ItemRow>, ServiceError> {
    let joined = CheckoutItemEntity::find()
        .find_also_related(CheckoutEntity)
        .order_by_desc(checkout::Column::CreatedAt)
        .order_by_asc(checkout_item::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch checkout items with checkouts");
            ServiceError::DatabaseError(e)
        })?;

    let product_ids: Vec<Uuid> = joined.iter().map(|(item, _)| item.product_id).collect();
    let products: HashMap<Uuid, product::Model> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        ProductEntity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch products for aggregation");
                ServiceError::DatabaseError(e)
            })?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    Ok(joined
        .into_iter()
        .filter_map(|(item, maybe_checkout)| {
            let checkout = maybe_checkout?;
            let product = products.get(&item.product_id).cloned();
            Some(ItemRow {
                item,
                checkout,
                product,
            })
        })
        .collect())
}

/// Line subtotal for a single item
fn line_subtotal(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}

/// Converts a checkout model and its items to response format
fn compose_response(model: CheckoutModel, items: Vec<CheckoutItemModel>) -> CheckoutResponse {
    CheckoutResponse {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        address: model.address,
        phone: model.phone,
        city: model.city,
        region: model.region,
        subtotal: model.subtotal,
        total: model.total,
        delivery_id: model.delivery_id,
        status: model.status,
        created_at: model.created_at,
        updated_at: model.updated_at,
        items: items
            .into_iter()
            .map(|item| CheckoutItemResponse {
                id: item.id,
                product_id: item.product_id,
                size: item.size,
                quantity: item.quantity,
                created_at: item.created_at,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::address::en::{CityName, StreetName};
    use fake::faker::name::en::{FirstName, LastName};
    use fake::faker::phone_number::en::PhoneNumber;
    use fake::Fake;
    use rust_decimal_macros::dec;

    fn checkout_request(item: NewCheckoutItem) -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            address: StreetName().fake(),
            phone: PhoneNumber().fake(),
            city: CityName().fake(),
            region: CityName().fake(),
            delivery_id: None,
            item,
        }
    }

    #[test]
    fn line_subtotal_multiplies_price_by_quantity() {
        assert_eq!(line_subtotal(dec!(5.00), 2), dec!(10.00));
        assert_eq!(line_subtotal(dec!(19.99), 3), dec!(59.97));
        assert_eq!(line_subtotal(dec!(7.50), 1), dec!(7.50));
    }

    #[test]
    fn compose_response_carries_items_in_order() {
        let now = Utc::now();
        let checkout_id = Uuid::new_v4();

        let model = CheckoutModel {
            id: checkout_id,
            first_name: "Amina".to_string(),
            last_name: "Haddad".to_string(),
            address: "12 Rue de Carthage".to_string(),
            phone: "21612345".to_string(),
            city: "Tunis".to_string(),
            region: "Tunis".to_string(),
            subtotal: dec!(30.00),
            total: dec!(37.00),
            delivery_id: None,
            status: CheckoutStatus::Pending,
            created_at: now,
            updated_at: Some(now),
        };

        let first_item = CheckoutItemModel {
            id: Uuid::new_v4(),
            checkout_id,
            product_id: Uuid::new_v4(),
            size: Some("M".to_string()),
            quantity: 2,
            created_at: now,
        };
        let second_item = CheckoutItemModel {
            id: Uuid::new_v4(),
            checkout_id,
            product_id: Uuid::new_v4(),
            size: None,
            quantity: 1,
            created_at: now,
        };

        let response = compose_response(model, vec![first_item.clone(), second_item.clone()]);

        assert_eq!(response.id, checkout_id);
        assert_eq!(response.status, CheckoutStatus::Pending);
        assert_eq!(response.total, dec!(37.00));
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].id, first_item.id);
        assert_eq!(response.items[1].id, second_item.id);
        assert_eq!(response.items[0].size.as_deref(), Some("M"));
    }

    #[test]
    fn create_request_rejects_zero_quantity() {
        let request = checkout_request(NewCheckoutItem {
            product_id: Uuid::new_v4(),
            size: None,
            quantity: 0,
        });

        assert!(request.validate().is_err());
    }

    #[test]
    fn create_request_accepts_a_single_unit() {
        let request = checkout_request(NewCheckoutItem {
            product_id: Uuid::new_v4(),
            size: Some("M".to_string()),
            quantity: 1,
        });

        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_blank_first_name() {
        let mut request = checkout_request(NewCheckoutItem {
            product_id: Uuid::new_v4(),
            size: None,
            quantity: 1,
        });
        request.first_name = String::new();

        assert!(request.validate().is_err());
    }
}
