use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use cashless_cart::{AddItem, Cart, CartCommand, CartId, UpdateQuantity};
use cashless_core::{AggregateId, Money};
use cashless_events::execute;
use cashless_merch::{ProductId, ProductSnapshot, Variant};

const SIZES: [&str; 5] = ["S", "M", "L", "XL", "XXL"];

fn snapshot(n: usize) -> ProductSnapshot {
    ProductSnapshot::new(
        ProductId::new(n.to_string()),
        format!("Item {n}"),
        Money::from_cents(999 + n as u64),
    )
}

fn filled_cart(distinct_lines: usize) -> Cart {
    let mut cart = Cart::empty(CartId::new(AggregateId::new()));
    for n in 0..distinct_lines {
        let cmd = CartCommand::AddItem(AddItem {
            cart_id: cart.id_typed(),
            product: snapshot(n / SIZES.len()),
            variant: Some(Variant::new(SIZES[n % SIZES.len()])),
            occurred_at: Utc::now(),
        });
        execute(&mut cart, &cmd).unwrap();
    }
    cart
}

/// Merge path: the (product, variant) scan is linear in the number of lines.
fn bench_add_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("cart_add_merge");
    for lines in [1usize, 10, 50, 200] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, &lines| {
            let mut cart = filled_cart(lines);
            let last = lines - 1;
            let cmd = CartCommand::AddItem(AddItem {
                cart_id: cart.id_typed(),
                product: snapshot(last / SIZES.len()),
                variant: Some(Variant::new(SIZES[last % SIZES.len()])),
                occurred_at: Utc::now(),
            });
            b.iter(|| execute(black_box(&mut cart), black_box(&cmd)).unwrap());
        });
    }
    group.finish();
}

fn bench_update_quantity(c: &mut Criterion) {
    let mut cart = filled_cart(50);
    let target = cart.lines()[49].id_typed();
    let cmd = CartCommand::UpdateQuantity(UpdateQuantity {
        cart_id: cart.id_typed(),
        line_item_id: target,
        quantity: 3,
        occurred_at: Utc::now(),
    });

    c.bench_function("cart_update_quantity_50_lines", |b| {
        b.iter(|| execute(black_box(&mut cart), black_box(&cmd)).unwrap())
    });
}

fn bench_totals(c: &mut Criterion) {
    let cart = filled_cart(200);
    c.bench_function("cart_totals_200_lines", |b| {
        b.iter(|| {
            let cart = black_box(&cart);
            (cart.total_item_count(), cart.total_price())
        })
    });
}

criterion_group!(benches, bench_add_merge, bench_update_quantity, bench_totals);
criterion_main!(benches);
