//! Property-based tests for checkout aggregation, invoice pagination and
//! the status workflow.
//!
//! These tests use proptest to verify invariants across a wide range of
//! inputs, helping to catch edge cases that unit tests might miss.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use storefront_admin_api::aggregation::{aggregate_item_rows, ItemRow};
use storefront_admin_api::entities::checkout::CheckoutStatus;
use storefront_admin_api::entities::{checkout, checkout_item, product};
use storefront_admin_api::services::checkout_status::is_valid_transition;
use storefront_admin_api::services::invoicing::{
    block_height, paginate_invoices, shape_invoice, InvoiceDocument, InvoiceRow, PAGE_BODY_HEIGHT,
};
use uuid::Uuid;

// Strategies for generating test data

fn status_strategy() -> impl Strategy<Value = CheckoutStatus> {
    prop_oneof![
        Just(CheckoutStatus::Pending),
        Just(CheckoutStatus::Delivered),
        Just(CheckoutStatus::Canceled),
    ]
}

/// Joined rows over a small pool of checkouts and products. Product slot 0
/// stands for a deleted product and yields `None`.
fn rows_strategy() -> impl Strategy<Value = Vec<ItemRow>> {
    prop::collection::vec((0u8..8, 0u8..6, 1i32..5), 0..40).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(position, (checkout_seq, product_seq, quantity))| {
                item_row(position as u128 + 1, checkout_seq, product_seq, quantity)
            })
            .collect()
    })
}

fn documents_strategy() -> impl Strategy<Value = Vec<InvoiceDocument>> {
    prop::collection::vec(0usize..12, 0..12).prop_map(|row_counts| {
        row_counts
            .into_iter()
            .enumerate()
            .map(|(seq, rows)| document(seq as u128 + 1, rows))
            .collect()
    })
}

// Property: grouping joined rows by checkout identity

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn one_group_per_distinct_checkout(rows in rows_strategy()) {
        let mut distinct: Vec<Uuid> = rows.iter().map(|r| r.checkout.id).collect();
        distinct.sort();
        distinct.dedup();

        let groups = aggregate_item_rows(rows);
        prop_assert_eq!(groups.len(), distinct.len());
    }

    #[test]
    fn groups_follow_first_appearance_order(rows in rows_strategy()) {
        let mut expected: Vec<Uuid> = Vec::new();
        for row in &rows {
            if !expected.contains(&row.checkout.id) {
                expected.push(row.checkout.id);
            }
        }

        let groups = aggregate_item_rows(rows);
        let actual: Vec<Uuid> = groups.iter().map(|g| g.checkout.id).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn items_keep_their_relative_order_within_groups(rows in rows_strategy()) {
        let groups = aggregate_item_rows(rows.clone());

        for group in &groups {
            let expected: Vec<Uuid> = rows
                .iter()
                .filter(|r| r.checkout.id == group.checkout.id)
                .map(|r| r.item.id)
                .collect();
            let actual: Vec<Uuid> = group.items.iter().map(|e| e.item.id).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn aggregation_neither_loses_nor_invents_items(rows in rows_strategy()) {
        let mut expected: Vec<Uuid> = rows.iter().map(|r| r.item.id).collect();
        expected.sort();

        let groups = aggregate_item_rows(rows);
        let mut actual: Vec<Uuid> = groups
            .iter()
            .flat_map(|g| g.items.iter().map(|e| e.item.id))
            .collect();
        actual.sort();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn every_group_carries_at_least_one_item(rows in rows_strategy()) {
        for group in aggregate_item_rows(rows) {
            prop_assert!(!group.items.is_empty());
        }
    }
}

// Property: invoice rows are priced from the product snapshot at hand

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn invoice_rows_compute_line_totals(rows in rows_strategy()) {
        for group in aggregate_item_rows(rows) {
            let invoice = shape_invoice(&group);
            prop_assert_eq!(invoice.rows.len(), group.items.len());

            for (position, row) in invoice.rows.iter().enumerate() {
                prop_assert_eq!(row.index, position as u32 + 1);
                prop_assert_eq!(
                    row.line_total,
                    row.unit_price * Decimal::from(row.quantity)
                );

                match &group.items[position].product {
                    Some(product) => prop_assert_eq!(row.unit_price, product.price),
                    None => {
                        prop_assert_eq!(row.unit_price, Decimal::ZERO);
                        prop_assert_eq!(row.product_name.as_str(), "Unknown product");
                    }
                }
            }

            // The summary total comes from the checkout, not the rows
            prop_assert_eq!(invoice.total, group.checkout.total);
        }
    }
}

// Property: greedy page packing

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn pages_preserve_document_order(documents in documents_strategy()) {
        let expected: Vec<Uuid> = documents.iter().map(|d| d.checkout_id).collect();

        let pages = paginate_invoices(documents);
        let actual: Vec<Uuid> = pages
            .iter()
            .flat_map(|p| p.invoices.iter().map(|d| d.checkout_id))
            .collect();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn page_numbers_are_sequential_and_pages_nonempty(documents in documents_strategy()) {
        let pages = paginate_invoices(documents);
        for (position, page) in pages.iter().enumerate() {
            prop_assert_eq!(page.number, position as u32 + 1);
            prop_assert!(!page.invoices.is_empty());
        }
    }

    #[test]
    fn multi_block_pages_respect_the_height_budget(documents in documents_strategy()) {
        let pages = paginate_invoices(documents);
        for page in pages {
            // A single oversized block may exceed the budget on a page of
            // its own; any page holding several blocks must fit.
            if page.invoices.len() > 1 {
                let used: u32 = page.invoices.iter().map(block_height).sum();
                prop_assert!(
                    used <= PAGE_BODY_HEIGHT,
                    "page height {} exceeds budget", used
                );
            }
        }
    }
}

// Property: status transition table

proptest! {
    #[test]
    fn setting_the_current_status_is_always_allowed(status in status_strategy()) {
        prop_assert!(is_valid_transition(status, status));
    }

    #[test]
    fn canceled_accepts_no_other_status(target in status_strategy()) {
        prop_assert_eq!(
            is_valid_transition(CheckoutStatus::Canceled, target),
            target == CheckoutStatus::Canceled
        );
    }

    #[test]
    fn canceled_remains_terminal_under_any_sequence(
        targets in prop::collection::vec(status_strategy(), 0..12)
    ) {
        let mut status = CheckoutStatus::Pending;
        let mut canceled_seen = false;

        for target in targets {
            if is_valid_transition(status, target) {
                status = target;
            }
            if canceled_seen {
                prop_assert_eq!(status, CheckoutStatus::Canceled);
            }
            if status == CheckoutStatus::Canceled {
                canceled_seen = true;
            }
        }
    }
}

// Helper constructors (mirror the shapes the services read from the database)

fn checkout_model(seq: u8) -> checkout::Model {
    checkout::Model {
        id: Uuid::from_u128(seq as u128 + 1),
        first_name: "Amina".to_string(),
        last_name: "Haddad".to_string(),
        address: "12 Rue des Oliviers".to_string(),
        phone: "+21655501234".to_string(),
        city: "Tunis".to_string(),
        region: "Tunis".to_string(),
        subtotal: Decimal::new(seq as i64 * 100, 2),
        total: Decimal::new(seq as i64 * 100 + 700, 2),
        delivery_id: None,
        status: CheckoutStatus::Pending,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn product_model(seq: u8) -> product::Model {
    product::Model {
        id: Uuid::from_u128(1000 + seq as u128),
        name: format!("Product {}", seq),
        price: Decimal::new(seq as i64 * 250 + 50, 2),
        image_url: None,
        category_id: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn item_row(item_seq: u128, checkout_seq: u8, product_seq: u8, quantity: i32) -> ItemRow {
    let product = (product_seq > 0).then(|| product_model(product_seq));
    ItemRow {
        item: checkout_item::Model {
            id: Uuid::from_u128(item_seq),
            checkout_id: Uuid::from_u128(checkout_seq as u128 + 1),
            product_id: Uuid::from_u128(1000 + product_seq as u128),
            size: None,
            quantity,
            created_at: Utc::now(),
        },
        checkout: checkout_model(checkout_seq),
        product,
    }
}

fn document(seq: u128, row_count: usize) -> InvoiceDocument {
    let rows = (0..row_count)
        .map(|i| InvoiceRow {
            index: i as u32 + 1,
            product_name: format!("Product {}", i),
            size: None,
            quantity: 1,
            unit_price: Decimal::ONE,
            line_total: Decimal::ONE,
        })
        .collect();

    InvoiceDocument {
        checkout_id: Uuid::from_u128(seq),
        customer_name: "Amina Haddad".to_string(),
        address: "12 Rue des Oliviers".to_string(),
        city: "Tunis".to_string(),
        region: "Tunis".to_string(),
        phone: "+21655501234".to_string(),
        created_at: Utc::now(),
        rows,
        total: Decimal::ONE,
    }
}
