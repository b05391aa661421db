//! Criterion benchmarks for the suggestion path.
//!
//! Performance targets:
//! - Parse a short ingredient list: < 10us
//! - Evaluate against the built-in catalog: < 100us
//! - Full suggest (evaluate, render, record): < 200us

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use chefai::kitchen::{KnowledgeBase, parse_ingredients};
use chefai::suggestions::{ChefSession, Recommender, SkillState, TierPolicy};

const INPUTS: &[&str] = &[
    "garlic, chicken, onion",
    "Rice, eggs, scallions, soy sauce",
    "tomato, onion, garlic, basil, olive oil, pasta",
    "salmon, lemon, butter, dill, capers",
    "kale, quinoa, dragonfruit",
];

fn recommender() -> Recommender {
    Recommender::new(
        KnowledgeBase::builtin().expect("builtin knowledge base"),
        TierPolicy::default(),
    )
}

fn parse_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(INPUTS.len() as u64));
    group.bench_function("parse_ingredients", |b| {
        b.iter(|| {
            for input in INPUTS {
                let _ = black_box(parse_ingredients(black_box(input)));
            }
        });
    });
    group.finish();
}

fn evaluate_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let recommender = recommender();
    let state = SkillState::new();
    let sets: Vec<_> = INPUTS
        .iter()
        .map(|input| parse_ingredients(input).expect("valid input"))
        .collect();

    group.throughput(Throughput::Elements(sets.len() as u64));
    group.bench_function("builtin_catalog", |b| {
        b.iter(|| {
            for set in &sets {
                let _ = black_box(recommender.evaluate(black_box(set), &state));
            }
        });
    });
    group.finish();
}

fn session_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let recommender = Arc::new(recommender());

    group.bench_function("suggest_text", |b| {
        let mut session = ChefSession::new(Arc::clone(&recommender), 50);
        b.iter(|| black_box(session.suggest_text(black_box("garlic, chicken, onion"))));
    });

    group.bench_function("snapshot", |b| {
        let mut session = ChefSession::new(Arc::clone(&recommender), 50);
        for input in &INPUTS[..4] {
            session.suggest_text(input).expect("matching input");
        }
        b.iter(|| black_box(session.snapshot()));
    });
    group.finish();
}

criterion_group!(
    benches,
    parse_benchmarks,
    evaluate_benchmarks,
    session_benchmarks
);
criterion_main!(benches);
