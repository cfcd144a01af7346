//! Benchmarks for unification against the belief store.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use akh_bdi::belief::{EmptyViewGenerator, View};
use akh_bdi::pool::WorkerPool;
use akh_bdi::term::{Context, Literal, Term};
use akh_bdi::unify::{matcher, Unifier};

fn populated(facts: i64) -> View {
    let view = View::root();
    for i in 0..facts {
        let fact = Literal::new("sensor/reading", vec![Term::from(i), Term::from(i % 7)], false, false)
            .unwrap();
        view.add(&fact, Some(&EmptyViewGenerator)).unwrap();
    }
    view
}

fn bench_exact_match(c: &mut Criterion) {
    let query = Literal::new("f", vec![Term::var("X"), Term::from(2), Term::var("Y")], false, false)
        .unwrap();
    let fact = Literal::new("f", vec![Term::from(1), Term::from(2), Term::from("z")], false, false)
        .unwrap();

    c.bench_function("exact_match_3args", |bench| {
        bench.iter(|| black_box(matcher::exact(&query, &fact)))
    });
}

fn bench_structural_match(c: &mut Criterion) {
    let inner = Literal::new("g", vec![Term::var("Y"), Term::from(3)], false, false).unwrap();
    let query = Literal::new("f", vec![Term::var("X"), Term::from(inner)], false, false).unwrap();
    let fact_inner = Literal::new("g", vec![Term::from("a"), Term::from(3)], false, false).unwrap();
    let fact = Literal::new("f", vec![Term::from(1), Term::from(fact_inner)], false, false).unwrap();

    c.bench_function("structural_match_nested", |bench| {
        bench.iter(|| black_box(matcher::structural(&query, &fact)))
    });
}

fn bench_unify_store(c: &mut Criterion) {
    let beliefs = populated(1_000);
    let query = Literal::new("sensor/reading", vec![Term::var("N"), Term::from(6)], false, false)
        .unwrap();
    let context = Context::from_variables(&query.variables());
    let unifier = Unifier::default();

    c.bench_function("unify_1k_facts", |bench| {
        bench.iter(|| black_box(unifier.unify(&beliefs, &query, &context, None, false).unwrap()))
    });

    let pool = WorkerPool::new(4).unwrap();
    let parallel = Unifier::default().with_pool(&pool);
    c.bench_function("unify_1k_facts_parallel", |bench| {
        bench.iter(|| black_box(parallel.unify(&beliefs, &query, &context, None, true).unwrap()))
    });
}

criterion_group!(benches, bench_exact_match, bench_structural_match, bench_unify_store);
criterion_main!(benches);
