use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use storefront_admin_api::aggregation::{aggregate_item_rows, ItemRow};
use storefront_admin_api::entities::checkout::CheckoutStatus;
use storefront_admin_api::entities::{checkout, checkout_item, product};
use storefront_admin_api::services::invoicing::{paginate_invoices, shape_invoice};
use uuid::Uuid;

fn checkout_model(seq: u64) -> checkout::Model {
    checkout::Model {
        id: Uuid::from_u128(seq as u128 + 1),
        first_name: "Amina".to_string(),
        last_name: "Haddad".to_string(),
        address: "12 Rue des Oliviers".to_string(),
        phone: "+21655501234".to_string(),
        city: "Tunis".to_string(),
        region: "Tunis".to_string(),
        subtotal: Decimal::new(100, 2),
        total: Decimal::new(800, 2),
        delivery_id: None,
        status: CheckoutStatus::Pending,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn item_row(item_seq: u64, checkout_seq: u64) -> ItemRow {
    let product_id = Uuid::from_u128(9000 + (item_seq % 50) as u128);
    ItemRow {
        item: checkout_item::Model {
            id: Uuid::from_u128(item_seq as u128),
            checkout_id: Uuid::from_u128(checkout_seq as u128 + 1),
            product_id,
            size: Some("M".to_string()),
            quantity: 2,
            created_at: Utc::now(),
        },
        checkout: checkout_model(checkout_seq),
        product: Some(product::Model {
            id: product_id,
            name: "Linen Shirt".to_string(),
            price: Decimal::new(1999, 2),
            image_url: None,
            category_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }),
    }
}

/// Rows spread round-robin over ten checkouts, the worst case for the
/// first-appearance index.
fn rows(count: u64) -> Vec<ItemRow> {
    (0..count).map(|i| item_row(i + 1, i % 10)).collect()
}

// Benchmark for grouping joined rows into per-checkout structures
fn aggregation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_item_rows");

    for size in [10u64, 100, 1000].iter() {
        let input = rows(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| aggregate_item_rows(black_box(input.clone())));
        });
    }

    group.finish();
}

// Benchmark for shaping one aggregated checkout into invoice data
fn invoice_shaping_benchmark(c: &mut Criterion) {
    let groups = aggregate_item_rows(rows(200));

    c.bench_function("shape_invoice_20_rows", |b| {
        b.iter(|| shape_invoice(black_box(&groups[0])));
    });
}

// Benchmark for packing invoice blocks into fixed-height pages
fn pagination_benchmark(c: &mut Criterion) {
    // 400 five-row invoices, the shape of a full export
    let export: Vec<ItemRow> = (0..2000).map(|i| item_row(i + 1, i % 400)).collect();
    let documents: Vec<_> = aggregate_item_rows(export).iter().map(shape_invoice).collect();

    c.bench_function("paginate_invoices", |b| {
        b.iter(|| paginate_invoices(black_box(documents.clone())));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets =
        aggregation_benchmark,
        invoice_shaping_benchmark,
        pagination_benchmark
}

criterion_main!(benches);
