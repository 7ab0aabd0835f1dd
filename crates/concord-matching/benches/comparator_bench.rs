use concord_matching::{
    Body, ContentMatcherRegistry, DocPath, JsonContentMatcher, MatchingContext, MatchingRule, MatchingRuleCategory,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

fn create_order(id: usize, items: usize) -> Value {
    json!({
        "id": id,
        "customer": {"name": format!("customer-{id}"), "email": format!("c{id}@example.com")},
        "created": "2024-05-01T10:15:30Z",
        "items": (0..items)
            .map(|i| json!({"sku": format!("SKU-{i:05}"), "quantity": i % 7 + 1, "price": 9.99}))
            .collect::<Vec<_>>(),
    })
}

fn order_rules() -> MatchingRuleCategory {
    let mut rules = MatchingRuleCategory::body();
    rules.add_rule("$.id", MatchingRule::Integer).unwrap();
    rules.add_rule("$.customer.email", MatchingRule::regex(r"[^@]+@[^@]+").unwrap()).unwrap();
    rules.add_rule("$.created", MatchingRule::Timestamp(None)).unwrap();
    rules.add_rule("$.items", MatchingRule::min(1)).unwrap();
    rules.add_rule("$.items[*].sku", MatchingRule::regex(r"SKU-\d{5}").unwrap()).unwrap();
    rules.add_rule("$.items[*].quantity", MatchingRule::Integer).unwrap();
    rules
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    // Test with different list sizes
    for item_count in [1, 10, 100, 1000].iter() {
        let expected = create_order(1, 1);
        let actual = create_order(42, *item_count);

        let equality = MatchingContext::new(MatchingRuleCategory::body(), true);
        let with_rules = MatchingContext::new(order_rules(), true);

        group.throughput(Throughput::Elements(*item_count as u64));
        group.bench_with_input(BenchmarkId::new("no_rules", item_count), item_count, |b, _| {
            b.iter(|| {
                JsonContentMatcher::compare(
                    black_box(&DocPath::root()),
                    black_box(&expected),
                    black_box(&actual),
                    black_box(&equality),
                )
            });
        });

        group.bench_with_input(BenchmarkId::new("with_rules", item_count), item_count, |b, _| {
            b.iter(|| {
                JsonContentMatcher::compare(
                    black_box(&DocPath::root()),
                    black_box(&expected),
                    black_box(&actual),
                    black_box(&with_rules),
                )
            });
        });
    }

    group.finish();
}

fn bench_rule_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_lookup");

    // Test lookup cost as the rule set grows
    for rule_count in [10, 100, 500].iter() {
        let mut rules = MatchingRuleCategory::body();
        for i in 0..*rule_count {
            rules.add_rule(&format!("$.field{i}"), MatchingRule::Type).unwrap();
        }
        rules.add_rule("$.items[*].sku", MatchingRule::Type).unwrap();
        let context = MatchingContext::new(rules, true);
        let path = DocPath::root().join("items").join_index(3).join("sku");

        group.bench_with_input(BenchmarkId::new("select_best_matcher", rule_count), rule_count, |b, _| {
            b.iter(|| context.select_best_matcher(black_box(&path)));
        });
    }

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let registry = ContentMatcherRegistry::with_defaults();
    let context = MatchingContext::new(order_rules(), true);
    let expected = Body::json(&create_order(1, 1));
    let actual = Body::json(&create_order(7, 50));

    c.bench_function("registry_match_body", |b| {
        b.iter(|| registry.match_body(black_box(&expected), black_box(&actual), black_box(&context)));
    });
}

criterion_group!(benches, bench_compare, bench_rule_lookup, bench_registry);
criterion_main!(benches);
