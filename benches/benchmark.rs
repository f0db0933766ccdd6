// Matching and planning benchmarks
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use formfill::{
    plan_order, FieldDescriptor, FieldMapping, HashEmbedder, HashEmbedderLoader, HybridMatcher,
    LayoutSource, LexicalMatcher, MappingTable, MatcherConfig, Position, ProviderHandle,
    UserDataRecord,
};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

const LABELS: &[&str] = &[
    "Email Address",
    "Full name",
    "Phone number",
    "Street address",
    "Zip / postal code",
    "Company",
    "Date of birth",
    "Preferred contact time",
];

fn generate_record(size: usize) -> UserDataRecord {
    let mut rng = rand::rng();
    let mut record: UserDataRecord = [
        ("email", "jane@example.com"),
        ("full_name", "Jane Doe"),
        ("phone", "+1 555 0100"),
        ("address", "1 Main St"),
        ("zip_code", "10001"),
    ]
    .into_iter()
    .collect();
    while record.len() < size {
        let n: u32 = rng.random_range(0..1_000_000);
        record.insert(format!("custom_field_{}", n), format!("value {}", n));
    }
    record
}

fn generate_fields(count: usize) -> Vec<FieldDescriptor> {
    (0..count)
        .map(|i| {
            FieldDescriptor::new(format!("#field-{}", i), "text")
                .with_label(LABELS[i % LABELS.len()])
                .with_index(i)
        })
        .collect()
}

fn benchmark_lexical(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexical_match");
    let matcher = LexicalMatcher::new();
    let fields = generate_fields(LABELS.len());

    for size in [5, 50, 500].iter() {
        let record = generate_record(*size);
        group.bench_with_input(BenchmarkId::new("keys", size), size, |b, _| {
            b.iter(|| {
                for field in &fields {
                    black_box(matcher.match_field(black_box(field), &record));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_hybrid(c: &mut Criterion) {
    let mut group = c.benchmark_group("hybrid_match");
    let rt = tokio::runtime::Runtime::new().unwrap();

    let handle = Arc::new(ProviderHandle::new(Arc::new(HashEmbedderLoader::default())));
    let matcher = HybridMatcher::from_config(&MatcherConfig::default(), Some(handle));
    rt.block_on(matcher.warm_up());

    for count in [10, 100].iter() {
        let fields = generate_fields(*count);
        let record = generate_record(50);
        group.bench_with_input(BenchmarkId::new("fields", count), count, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(matcher.match_fields(&fields, &record).await) });
        });
    }

    group.finish();
}

fn benchmark_embedding(c: &mut Criterion) {
    let embedder = HashEmbedder::default();
    c.bench_function("hash_embed", |b| {
        b.iter(|| black_box(embedder.embed_text(black_box("zip / postal code"))));
    });
}

struct GridLayout(HashMap<String, Position>);

impl LayoutSource for GridLayout {
    fn position(&self, selector: &str) -> Option<Position> {
        self.0.get(selector).copied()
    }
}

fn benchmark_plan(c: &mut Criterion) {
    let mut rng = rand::rng();
    let mut mappings = MappingTable::new();
    let mut layout = HashMap::new();
    for field in generate_fields(1000) {
        let position = Position::new(rng.random_range(0.0..5000.0), rng.random_range(0.0..1200.0));
        layout.insert(field.selector.clone(), position);
        mappings.insert(
            field.selector.clone(),
            FieldMapping::manual(&field, "email", "jane@example.com"),
        );
    }
    let layout = GridLayout(layout);

    c.bench_function("plan_order_1000", |b| {
        b.iter(|| black_box(plan_order(&mappings, &layout, 50.0)));
    });
}

criterion_group!(
    benches,
    benchmark_lexical,
    benchmark_hybrid,
    benchmark_embedding,
    benchmark_plan
);
criterion_main!(benches);
