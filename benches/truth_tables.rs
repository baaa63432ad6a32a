//! Performance benchmarks for network computation
//!
//! Measures:
//! - Truth-table generation as the ancestor set of the deepest hypothesis grows
//! - Graph construction and reconcile from the JSON exchange format
//! - calc_prior over every hypothesis of a wide network
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use evidence_net::{
    codec::json::{Connection, EvidenceItem, HypothesisItem, NetworkData},
    engine::{calc_prior, tables_by_component, TableLimits},
    properties::{EdgeKey, Label, NodeId},
};
use std::hint::black_box;

fn id(raw: String) -> NodeId {
    NodeId::try_from(raw).unwrap()
}

// `width` evidence nodes feeding a chain of `depth` hypotheses; every evidence node connects to
// the first hypothesis, so the last hypothesis has width + depth - 1 ancestors.
fn chain_network(width: usize, depth: usize) -> NetworkData {
    let mut data = NetworkData::default();
    for i in 0..width {
        let e = id(format!("E{i}"));
        data.truth_probs.insert(e.clone(), Label::SCALE[i % 7]);
        data.evidence.push(EvidenceItem {
            id: e,
            text: String::new(),
        });
    }
    for j in 0..depth {
        let h = id(format!("H{j}"));
        data.priors.insert(h.clone(), Label::RealisticPossibility);
        data.hypotheses.push(HypothesisItem {
            id: h,
            text: String::new(),
            likelihood: None,
        });
    }
    let mut link = |source: String, target: String, strength: f64| {
        let conn = Connection {
            source: id(source),
            target: id(target),
        };
        data.edge_strengths.insert(EdgeKey::from(&conn), strength);
        data.connections.push(conn);
    };
    for i in 0..width {
        link(format!("E{i}"), "H0".to_string(), 1.0 + i as f64 * 0.5);
    }
    for j in 1..depth {
        link(format!("H{}", j - 1), format!("H{j}"), 3.0);
    }
    data
}

fn bench_truth_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("truth_tables");
    for inputs in [4usize, 8, 12, 16] {
        let (graph, store) = chain_network(inputs - 2, 3).into_parts().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(inputs), &inputs, |b, _| {
            b.iter(|| tables_by_component(black_box(&graph), black_box(&store), TableLimits::default()))
        });
    }
    group.finish();
}

fn bench_import(c: &mut Criterion) {
    let raw = chain_network(200, 50).to_json_string_pretty().unwrap();
    c.bench_function("import_and_reconcile", |b| {
        b.iter(|| {
            NetworkData::from_json_str(black_box(&raw))
                .unwrap()
                .into_parts()
                .unwrap()
        })
    });
}

fn bench_calc_prior(c: &mut Criterion) {
    let (graph, store) = chain_network(200, 50).into_parts().unwrap();
    let hypotheses = (0..50).map(|j| format!("H{j}")).collect::<Vec<_>>();
    c.bench_function("calc_prior_all_hypotheses", |b| {
        b.iter(|| {
            hypotheses
                .iter()
                .filter_map(|h| calc_prior(h, &graph, &store))
                .sum::<f64>()
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = bench_truth_tables, bench_import, bench_calc_prior
}

criterion_main!(benches);
