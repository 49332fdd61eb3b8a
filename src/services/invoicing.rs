use crate::{
    aggregation::{aggregate_item_rows, AggregatedCheckout, AggregatedItem},
    db::DbPool,
    entities::checkout::Entity as CheckoutEntity,
    entities::checkout_item::{self, Entity as CheckoutItemEntity},
    entities::product::Entity as ProductEntity,
    errors::ServiceError,
    services::checkouts::load_item_rows,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Layout constants for paginating invoices into fixed-height pages.
///
/// Units are abstract layout points. A checkout block occupies a header,
/// one row per line item and a footer with the total.
pub const PAGE_BODY_HEIGHT: u32 = 700;
pub const BLOCK_HEADER_HEIGHT: u32 = 90;
pub const ROW_HEIGHT: u32 = 18;
pub const BLOCK_FOOTER_HEIGHT: u32 = 30;

/// Shown in place of the product name when the product row is gone
const MISSING_PRODUCT_NAME: &str = "Unknown product";

/// One line of an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceRow {
    /// 1-based position within the invoice
    pub index: u32,
    pub product_name: String,
    pub size: Option<String>,
    pub quantity: i32,
    /// Current unit price, zero when the product no longer exists
    pub unit_price: Decimal,
    /// `unit_price * quantity`, computed while shaping
    pub line_total: Decimal,
}

/// Invoice data for a single checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceDocument {
    pub checkout_id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub rows: Vec<InvoiceRow>,
    /// The total stored on the checkout, delivery fee included. Not
    /// recomputed from the rows, so it stays correct when a product has
    /// been deleted or repriced since the order was placed.
    pub total: Decimal,
}

/// One page worth of invoices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvoicePage {
    /// 1-based page number
    pub number: u32,
    pub invoices: Vec<InvoiceDocument>,
}

/// Shapes an aggregated checkout into invoice data
pub fn shape_invoice(aggregated: &AggregatedCheckout) -> InvoiceDocument {
    let checkout = &aggregated.checkout;

    let rows = aggregated
        .items
        .iter()
        .enumerate()
        .map(|(position, entry)| shape_row(position as u32 + 1, entry))
        .collect();

    InvoiceDocument {
        checkout_id: checkout.id,
        customer_name: format!("{} {}", checkout.first_name, checkout.last_name),
        address: checkout.address.clone(),
        city: checkout.city.clone(),
        region: checkout.region.clone(),
        phone: checkout.phone.clone(),
        created_at: checkout.created_at,
        rows,
        total: checkout.total,
    }
}

fn shape_row(index: u32, entry: &AggregatedItem) -> InvoiceRow {
    let (product_name, unit_price) = match &entry.product {
        Some(product) => (product.name.clone(), product.price),
        None => (MISSING_PRODUCT_NAME.to_string(), Decimal::ZERO),
    };

    InvoiceRow {
        index,
        product_name,
        size: entry.item.size.clone(),
        quantity: entry.item.quantity,
        unit_price,
        line_total: unit_price * Decimal::from(entry.item.quantity),
    }
}

/// Vertical space one invoice block occupies
pub fn block_height(document: &InvoiceDocument) -> u32 {
    BLOCK_HEADER_HEIGHT + document.rows.len() as u32 * ROW_HEIGHT + BLOCK_FOOTER_HEIGHT
}

/// Packs invoice blocks into pages greedily.
///
/// A block that does not fit in the remaining space starts a new page.
/// Blocks are never split, so a block taller than a whole page still gets
/// a page of its own.
pub fn paginate_invoices(documents: Vec<InvoiceDocument>) -> Vec<InvoicePage> {
    let mut pages: Vec<InvoicePage> = Vec::new();
    let mut current: Vec<InvoiceDocument> = Vec::new();
    let mut used: u32 = 0;

    for document in documents {
        let height = block_height(&document);
        if !current.is_empty() && used + height > PAGE_BODY_HEIGHT {
            pages.push(InvoicePage {
                number: pages.len() as u32 + 1,
                invoices: std::mem::take(&mut current),
            });
            used = 0;
        }
        used += height;
        current.push(document);
    }

    if !current.is_empty() {
        pages.push(InvoicePage {
            number: pages.len() as u32 + 1,
            invoices: current,
        });
    }

    pages
}

/// Service producing invoice data for single checkouts and paginated
/// all-checkout exports
#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DbPool>,
}

impl InvoiceService {
    /// Creates a new invoice service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Builds the invoice for one checkout
    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    pub async fn invoice_for_checkout(
        &self,
        checkout_id: Uuid,
    ) -> Result<InvoiceDocument, ServiceError> {
        let db = &*self.db_pool;

        let checkout = CheckoutEntity::find_by_id(checkout_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, checkout_id = %checkout_id, "Failed to fetch checkout for invoice");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(checkout_id = %checkout_id, "Checkout not found for invoice");
                ServiceError::NotFound("Checkout not found".to_string())
            })?;

        let items = CheckoutItemEntity::find()
            .find_also_related(ProductEntity)
            .filter(checkout_item::Column::CheckoutId.eq(checkout_id))
            .order_by_asc(checkout_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, checkout_id = %checkout_id, "Failed to fetch items for invoice");
                ServiceError::DatabaseError(e)
            })?
            .into_iter()
            .map(|(item, product)| AggregatedItem { item, product })
            .collect();

        Ok(shape_invoice(&AggregatedCheckout { checkout, items }))
    }

    /// Builds invoices for every checkout that has at least one item,
    /// newest first, packed into fixed-height pages
    #[instrument(skip(self))]
    pub async fn invoices_for_all(&self) -> Result<Vec<InvoicePage>, ServiceError> {
        let rows = load_item_rows(&self.db_pool).await?;
        let documents = aggregate_item_rows(rows).iter().map(shape_invoice).collect();
        Ok(paginate_invoices(documents))
    }
}
