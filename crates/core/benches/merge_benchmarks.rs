use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use invsync_core::{CanonicalInventory, GroupEntry, VariableMap};

/// Inventory with `groups` groups of `hosts_per_group` hosts each, every host
/// carrying a small nested variable map.
fn build_inventory(groups: usize, hosts_per_group: usize, tag: &str) -> CanonicalInventory {
    let mut inv = CanonicalInventory::new();
    for g in 0..groups {
        let hosts: Vec<String> = (0..hosts_per_group)
            .map(|h| format!("host-{g}-{h}.example.com"))
            .collect();
        let vars = as_map(json!({"tier": tag, "limits": {"cpu": g, "mem": g * 2}}));
        for host in &hosts {
            inv.insert_host_vars(
                host.clone(),
                as_map(json!({"source": tag, "net": {"mtu": 1500, "vlan": g}})),
            );
        }
        inv.insert_group(
            format!("group_{g}"),
            GroupEntry::default().with_hosts(hosts).with_vars(vars),
        );
    }
    inv
}

fn as_map(value: Value) -> VariableMap {
    match value {
        Value::Object(map) => map,
        _ => VariableMap::new(),
    }
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_merge");

    for size in [10usize, 100, 1000].iter() {
        let base = build_inventory(*size, 5, "static");
        let overlay = build_inventory(*size, 5, "dynamic");
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("static_with_dynamic", size), size, |b, _| {
            b.iter(|| black_box(base.merge(&overlay)));
        });
        group.bench_with_input(BenchmarkId::new("identical_inputs", size), size, |b, _| {
            b.iter(|| black_box(base.merge(&base)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
