//! Grouping of flat checkout-item rows into per-checkout structures.
//!
//! Joined reads return one row per checkout item, each carrying its parent
//! checkout and (when the product still exists) a product snapshot. The
//! admin views and the invoice shaper both want the transpose: one entry
//! per checkout holding its items in order. `aggregate_item_rows` performs
//! that grouping as a pure function.
//!
//! Checkouts are discovered only through their items, so a checkout with
//! zero items never appears in the output. Callers that need empty
//! checkouts too should list the checkout entity directly.

use serde::{Deserialize, Serialize};

use crate::entities::{checkout, checkout_item, product};

/// One row of a joined checkout-item read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    pub item: checkout_item::Model,
    pub checkout: checkout::Model,
    /// `None` when the referenced product row no longer exists.
    pub product: Option<product::Model>,
}

/// A checkout item together with its product snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedItem {
    pub item: checkout_item::Model,
    pub product: Option<product::Model>,
}

/// A checkout annotated with its items in input order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedCheckout {
    pub checkout: checkout::Model,
    pub items: Vec<AggregatedItem>,
}

/// Groups joined item rows by checkout identity.
///
/// Groups appear in order of first appearance of each checkout id in the
/// input; within a group, items keep their relative input order. Two rows
/// with the same checkout id merge into one group no matter how far apart
/// they sit in the input.
pub fn aggregate_item_rows(rows: Vec<ItemRow>) -> Vec<AggregatedCheckout> {
    let mut index: std::collections::HashMap<_, usize> = std::collections::HashMap::new();
    let mut groups: Vec<AggregatedCheckout> = Vec::with_capacity(rows.len());

    for row in rows {
        let entry = AggregatedItem {
            item: row.item,
            product: row.product,
        };
        match index.get(&row.checkout.id) {
            Some(&slot) => groups[slot].items.push(entry),
            None => {
                index.insert(row.checkout.id, groups.len());
                groups.push(AggregatedCheckout {
                    checkout: row.checkout,
                    items: vec![entry],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::entities::checkout::CheckoutStatus;
    use crate::entities::{checkout, checkout_item, product};

    use super::ItemRow;

    pub fn checkout_model(id: u128) -> checkout::Model {
        checkout::Model {
            id: Uuid::from_u128(id),
            first_name: "Amina".into(),
            last_name: "Haddad".into(),
            address: "12 Rue des Oliviers".into(),
            phone: "+21655501234".into(),
            city: "Tunis".into(),
            region: "Tunis".into(),
            subtotal: Decimal::ZERO,
            total: Decimal::ZERO,
            delivery_id: None,
            status: CheckoutStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn product_model(id: u128, price: Decimal) -> product::Model {
        product::Model {
            id: Uuid::from_u128(id),
            name: format!("Product {id}"),
            price,
            image_url: None,
            category_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn item_row(
        item_id: u128,
        checkout_id: u128,
        product_id: u128,
        quantity: i32,
        price: Decimal,
    ) -> ItemRow {
        ItemRow {
            item: checkout_item::Model {
                id: Uuid::from_u128(item_id),
                checkout_id: Uuid::from_u128(checkout_id),
                product_id: Uuid::from_u128(product_id),
                size: None,
                quantity,
                created_at: Utc::now(),
            },
            checkout: checkout_model(checkout_id),
            product: Some(product_model(product_id, price)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::test_fixtures::item_row;
    use super::*;

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate_item_rows(Vec::new()).is_empty());
    }

    #[test]
    fn groups_by_checkout_identity() {
        let rows = vec![
            item_row(1, 1, 10, 2, dec!(5)),
            item_row(2, 1, 11, 1, dec!(20)),
            item_row(3, 2, 10, 3, dec!(5)),
        ];

        let groups = aggregate_item_rows(rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].checkout.id, Uuid::from_u128(1));
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[1].checkout.id, Uuid::from_u128(2));
        assert_eq!(groups[1].items.len(), 1);
    }

    #[test]
    fn preserves_first_appearance_order_of_checkouts() {
        let rows = vec![
            item_row(1, 7, 10, 1, dec!(1)),
            item_row(2, 3, 10, 1, dec!(1)),
            item_row(3, 7, 11, 1, dec!(1)),
            item_row(4, 5, 10, 1, dec!(1)),
            item_row(5, 3, 11, 1, dec!(1)),
        ];

        let groups = aggregate_item_rows(rows);

        let order: Vec<Uuid> = groups.iter().map(|g| g.checkout.id).collect();
        assert_eq!(
            order,
            vec![
                Uuid::from_u128(7),
                Uuid::from_u128(3),
                Uuid::from_u128(5)
            ]
        );
    }

    #[test]
    fn interleaved_rows_merge_into_one_group() {
        let rows = vec![
            item_row(1, 1, 10, 1, dec!(1)),
            item_row(2, 2, 10, 1, dec!(1)),
            item_row(3, 1, 11, 1, dec!(1)),
            item_row(4, 2, 11, 1, dec!(1)),
            item_row(5, 1, 12, 1, dec!(1)),
        ];

        let groups = aggregate_item_rows(rows);

        assert_eq!(groups.len(), 2);
        let first: Vec<Uuid> = groups[0].items.iter().map(|e| e.item.id).collect();
        assert_eq!(
            first,
            vec![
                Uuid::from_u128(1),
                Uuid::from_u128(3),
                Uuid::from_u128(5)
            ]
        );
        let second: Vec<Uuid> = groups[1].items.iter().map(|e| e.item.id).collect();
        assert_eq!(second, vec![Uuid::from_u128(2), Uuid::from_u128(4)]);
    }

    #[test]
    fn every_row_lands_in_exactly_one_group() {
        let rows = vec![
            item_row(1, 1, 10, 1, dec!(1)),
            item_row(2, 2, 10, 1, dec!(1)),
            item_row(3, 1, 11, 1, dec!(1)),
        ];
        let input_ids: Vec<Uuid> = rows.iter().map(|r| r.item.id).collect();

        let groups = aggregate_item_rows(rows);

        let mut seen: Vec<Uuid> = groups
            .iter()
            .flat_map(|g| g.items.iter().map(|e| e.item.id))
            .collect();
        assert_eq!(seen.len(), input_ids.len());
        seen.sort();
        let mut expected = input_ids;
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn missing_product_is_carried_through() {
        let mut row = item_row(1, 1, 10, 2, dec!(5));
        row.product = None;

        let groups = aggregate_item_rows(vec![row]);

        assert_eq!(groups.len(), 1);
        assert!(groups[0].items[0].product.is_none());
    }
}
