use crate::{
    db::DbPool,
    entities::{
        checkout::{self, Entity as CheckoutEntity},
        checkout_item::{self, Entity as CheckoutItemEntity},
        product::{self, Entity as ProductEntity},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

const MONTHS_PER_YEAR: u32 = 12;
const TOP_PRODUCTS_LIMIT: u64 = 5;

/// Revenue and order count for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRevenue {
    /// 1-based month number, January is 1
    pub month: u32,
    pub checkouts: u64,
    pub revenue: Decimal,
}

/// A product ranked by total quantity sold across all checkouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i64,
}

/// Aggregate statistics shown on the admin dashboard
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsResponse {
    pub year: i32,
    pub total_checkouts: u64,
    pub total_revenue: Decimal,
    pub average_checkout_value: Decimal,
    /// Twelve entries, January through December of the requested year
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub top_products: Vec<TopProduct>,
    pub product_count: u64,
}

/// Read-only service producing the admin dashboard statistics
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Collect dashboard statistics; monthly buckets cover the given year
    #[instrument(skip(self))]
    pub async fn get_stats(&self, year: i32) -> Result<DashboardStatsResponse, ServiceError> {
        let db = &*self.db_pool;

        let checkouts_query = async {
            CheckoutEntity::find()
                .select_only()
                .column(checkout::Column::CreatedAt)
                .column(checkout::Column::Total)
                .into_tuple::<(DateTime<Utc>, Decimal)>()
                .all(db)
                .await
                .map_err(|e| {
                    error!("Failed to load checkout totals: {}", e);
                    ServiceError::DatabaseError(e)
                })
        };

        let ranked_query = async {
            CheckoutItemEntity::find()
                .select_only()
                .column(checkout_item::Column::ProductId)
                .column_as(checkout_item::Column::Quantity.sum(), "total_quantity")
                .group_by(checkout_item::Column::ProductId)
                .order_by_desc(checkout_item::Column::Quantity.sum())
                .limit(TOP_PRODUCTS_LIMIT)
                .into_tuple::<(Uuid, i64)>()
                .all(db)
                .await
                .map_err(|e| {
                    error!("Failed to rank products by quantity: {}", e);
                    ServiceError::DatabaseError(e)
                })
        };

        let count_query = async {
            ProductEntity::find().count(db).await.map_err(|e| {
                error!("Failed to count products: {}", e);
                ServiceError::DatabaseError(e)
            })
        };

        let (checkout_rows, ranked, product_count) =
            futures::try_join!(checkouts_query, ranked_query, count_query)?;

        let total_checkouts = checkout_rows.len() as u64;
        let total_revenue: Decimal = checkout_rows.iter().map(|(_, total)| *total).sum();
        let average_checkout_value = average_value(total_revenue, total_checkouts);
        let monthly_revenue = monthly_buckets(year, &checkout_rows);

        let product_ids: Vec<Uuid> = ranked.iter().map(|(id, _)| *id).collect();
        let names: HashMap<Uuid, String> = ProductEntity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to load product names: {}", e);
                ServiceError::DatabaseError(e)
            })?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let top_products = attach_product_names(ranked, &names);

        Ok(DashboardStatsResponse {
            year,
            total_checkouts,
            total_revenue,
            average_checkout_value,
            monthly_revenue,
            top_products,
            product_count,
        })
    }
}

fn average_value(total_revenue: Decimal, total_checkouts: u64) -> Decimal {
    if total_checkouts == 0 {
        Decimal::ZERO
    } else {
        total_revenue / Decimal::from(total_checkouts)
    }
}

/// Bucket checkout totals into the twelve months of `year`. Rows outside
/// the year are ignored.
fn monthly_buckets(year: i32, rows: &[(DateTime<Utc>, Decimal)]) -> Vec<MonthlyRevenue> {
    let mut buckets: Vec<MonthlyRevenue> = (1..=MONTHS_PER_YEAR)
        .map(|month| MonthlyRevenue {
            month,
            checkouts: 0,
            revenue: Decimal::ZERO,
        })
        .collect();

    for (created_at, total) in rows {
        if created_at.year() != year {
            continue;
        }
        let bucket = &mut buckets[(created_at.month() - 1) as usize];
        bucket.checkouts += 1;
        bucket.revenue += *total;
    }

    buckets
}

/// Resolve ranked product IDs to display names. Products deleted since the
/// sale keep their rank under a placeholder name.
fn attach_product_names(
    ranked: Vec<(Uuid, i64)>,
    names: &HashMap<Uuid, String>,
) -> Vec<TopProduct> {
    ranked
        .into_iter()
        .map(|(product_id, quantity)| TopProduct {
            product_id,
            name: names
                .get(&product_id)
                .cloned()
                .unwrap_or_else(|| "Unknown product".to_string()),
            quantity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn buckets_always_cover_twelve_months() {
        let buckets = monthly_buckets(2025, &[]);

        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].month, 1);
        assert_eq!(buckets[11].month, 12);
        assert!(buckets.iter().all(|b| b.revenue == Decimal::ZERO));
    }

    #[test]
    fn buckets_sum_to_the_year_revenue() {
        let rows = vec![
            (at(2025, 1, 10), dec!(40.00)),
            (at(2025, 1, 25), dec!(10.00)),
            (at(2025, 6, 3), dec!(25.00)),
            (at(2024, 12, 31), dec!(99.00)),
        ];

        let buckets = monthly_buckets(2025, &rows);
        let bucket_total: Decimal = buckets.iter().map(|b| b.revenue).sum();

        assert_eq!(bucket_total, dec!(75.00));
        assert_eq!(buckets[0].checkouts, 2);
        assert_eq!(buckets[0].revenue, dec!(50.00));
        assert_eq!(buckets[5].revenue, dec!(25.00));
    }

    #[test]
    fn rows_from_other_years_do_not_leak_into_buckets() {
        let rows = vec![(at(2023, 7, 1), dec!(500.00))];

        let buckets = monthly_buckets(2025, &rows);

        assert!(buckets.iter().all(|b| b.checkouts == 0));
    }

    #[test]
    fn average_is_zero_without_checkouts() {
        assert_eq!(average_value(Decimal::ZERO, 0), Decimal::ZERO);
    }

    #[test]
    fn average_divides_revenue_by_count() {
        assert_eq!(average_value(dec!(90.00), 3), dec!(30.00));
    }

    #[test]
    fn deleted_products_keep_their_rank_with_a_placeholder() {
        let known = Uuid::new_v4();
        let gone = Uuid::new_v4();
        let mut names = HashMap::new();
        names.insert(known, "Linen shirt".to_string());

        let top = attach_product_names(vec![(gone, 9), (known, 4)], &names);

        assert_eq!(top[0].name, "Unknown product");
        assert_eq!(top[0].quantity, 9);
        assert_eq!(top[1].name, "Linen shirt");
    }
}
