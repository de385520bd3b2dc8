use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde::{Deserialize, Serialize};
use serde_yamlet::{dump, from_str, load, parse, scan, to_string, DumpOptions, SharedValue, Value};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Clone)]
struct Service {
    name: String,
    image: String,
    ports: Vec<u16>,
    env: Vec<String>,
    replicas: Option<u32>,
}

fn alice() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product {}", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

fn services(size: u16) -> Vec<Service> {
    (0..size)
        .map(|i| Service {
            name: format!("svc-{}", i),
            image: format!("registry.local/app:{}.0", i),
            ports: vec![8000 + i, 9000 + i],
            env: vec!["MODE=prod".to_string(), format!("SHARD={}", i)],
            replicas: if i % 3 == 0 { None } else { Some(u32::from(i)) },
        })
        .collect()
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let user = alice();

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let yaml = "id: 123\nname: Alice\nemail: alice@example.com\nactive: true\n";

    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(yaml)))
    });
}

fn benchmark_serialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_array");

    for size in [10, 50, 100, 500].iter() {
        let items = products(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&items)))
        });
    }
    group.finish();
}

fn benchmark_deserialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_array");

    for size in [10, 50, 100, 500].iter() {
        let yaml = to_string(&products(*size)).unwrap();

        group.throughput(Throughput::Bytes(yaml.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &yaml, |b, yaml| {
            b.iter(|| from_str::<Vec<Product>>(black_box(yaml)))
        });
    }
    group.finish();
}

fn benchmark_pipeline_stages(c: &mut Criterion) {
    let yaml = to_string(&services(200)).unwrap();
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(yaml.len() as u64));

    group.bench_function("scan", |b| b.iter(|| scan(black_box(&yaml))));
    group.bench_function("parse", |b| b.iter(|| parse(black_box(&yaml))));
    group.bench_function("load", |b| b.iter(|| load(black_box(&yaml))));

    let value = load(&yaml).unwrap();
    let options = DumpOptions::new();
    group.bench_function("dump", |b| {
        b.iter(|| dump(black_box(&value), black_box(&options)))
    });

    group.finish();
}

fn benchmark_dump_styles(c: &mut Criterion) {
    let value = load(&to_string(&services(50)).unwrap()).unwrap();
    let mut group = c.benchmark_group("dump_styles");

    let styles = [
        ("block", DumpOptions::new()),
        ("flow", DumpOptions::new().with_default_flow_style(Some(true))),
        ("canonical", DumpOptions::canonical()),
    ];
    for (name, options) in styles.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), options, |b, options| {
            b.iter(|| dump(black_box(&value), options))
        });
    }
    group.finish();
}

fn benchmark_shared_values(c: &mut Criterion) {
    let base = "defaults: &defaults {retries: 3, timeout: 30}\n";
    let entries: String = (0..200)
        .map(|i| format!("job{}:\n  <<: *defaults\n  name: job{}\n", i, i))
        .collect();
    let yaml = format!("{}{}", base, entries);

    c.bench_function("load_merge_keys", |b| b.iter(|| load(black_box(&yaml))));

    let item = Value::Shared(SharedValue::new(Value::from(vec![1, 2, 3])));
    let value = Value::Sequence(vec![item; 200]);
    let options = DumpOptions::new();
    c.bench_function("dump_aliases", |b| {
        b.iter(|| dump(black_box(&value), &options))
    });
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let user = alice();

    let mut group = c.benchmark_group("comparison");

    group.bench_function("yaml_serialize", |b| {
        b.iter(|| serde_yamlet::to_string(black_box(&user)))
    });

    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&user)))
    });

    let yaml_str = serde_yamlet::to_string(&user).unwrap();
    let json_str = serde_json::to_string(&user).unwrap();

    group.bench_function("yaml_deserialize", |b| {
        b.iter(|| serde_yamlet::from_str::<User>(black_box(&yaml_str)))
    });

    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<User>(black_box(&json_str)))
    });

    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let user = alice();

    c.bench_function("roundtrip_simple", |b| {
        b.iter(|| {
            let serialized = to_string(black_box(&user)).unwrap();
            let _deserialized: User = from_str(black_box(&serialized)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_serialize_array,
    benchmark_deserialize_array,
    benchmark_pipeline_stages,
    benchmark_dump_styles,
    benchmark_shared_values,
    benchmark_comparison_with_json,
    benchmark_roundtrip
);
criterion_main!(benches);
