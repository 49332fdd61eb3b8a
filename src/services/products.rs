use crate::{
    db::DbPool,
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request payload for creating a product
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    pub price: Decimal,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
}

/// Request payload for updating a product; absent fields are left untouched
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    pub price: Option<Decimal>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
}

/// Product data returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Paginated product listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for product catalog operations
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Create a new product
    #[instrument(skip(self, request), fields(product_name = %request.name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.clone()),
            price: Set(request.price),
            image_url: Set(request.image_url.clone()),
            category_id: Set(request.category_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let saved = product.insert(db).await.map_err(|e| {
            error!("Failed to create product: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(product_id = %saved.id, "Product created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ProductCreated {
                    product_id: saved.id,
                    name: saved.name.clone(),
                })
                .await
            {
                error!("Failed to send product created event: {}", e);
            }
        }

        Ok(model_to_response(saved))
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<Option<ProductResponse>, ServiceError> {
        let db = &*self.db_pool;

        let product = ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(|e| {
                error!("Failed to fetch product {}: {}", product_id, e);
                ServiceError::DatabaseError(e)
            })?;

        Ok(product.map(model_to_response))
    }

    /// List products, newest first, with optional name search
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u64,
        per_page: u64,
        search: Option<String>,
    ) -> Result<ProductListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = ProductEntity::find().order_by_desc(product::Column::CreatedAt);
        if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(product::Column::Name.contains(term));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator.num_items().await.map_err(|e| {
            error!("Failed to count products: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let products = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| {
                error!("Failed to fetch products page {}: {}", page, e);
                ServiceError::DatabaseError(e)
            })?;

        Ok(ProductListResponse {
            products: products.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Update a product; only the provided fields change
    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let product = ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(|e| {
                error!("Failed to fetch product {}: {}", product_id, e);
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {} not found", product_id))
            })?;

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(category_id) = request.category_id {
            active.category_id = Set(Some(category_id));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(|e| {
            error!("Failed to update product {}: {}", product_id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(product_id = %updated.id, "Product updated");

        Ok(model_to_response(updated))
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let product = ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(|e| {
                error!("Failed to fetch product {}: {}", product_id, e);
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {} not found", product_id))
            })?;

        let name = product.name.clone();
        product.delete(db).await.map_err(|e| {
            error!("Failed to delete product {}: {}", product_id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(product_id = %product_id, product_name = %name, "Product deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ProductDeleted {
                    product_id,
                    name,
                })
                .await
            {
                error!("Failed to send product deleted event: {}", e);
            }
        }

        Ok(())
    }
}

fn model_to_response(model: product::Model) -> ProductResponse {
    ProductResponse {
        id: model.id,
        name: model.name,
        price: model.price,
        image_url: model.image_url,
        category_id: model.category_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
