use criterion::{criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;
use std::hint::black_box;
use storyloom_backlog::{reorder_backlog, BacklogPlanner, RiceInput};
use storyloom_core::Epic;

fn bench_epic(scope_items: usize) -> Epic {
    let verbs = ["View", "Edit", "Integrate", "Redesign", "Export", "Fix"];
    let objects = ["metrics", "profile", "calendar", "billing", "reports", "uploads"];
    let scope: Vec<String> = (0..scope_items)
        .map(|i| format!("{} {} {}", verbs[i % verbs.len()], objects[i % objects.len()], i))
        .collect();
    Epic::new("Benchmark Planning Epic")
        .with_personas(["end_user", "admin", "power_user", "new_user", "auditor"])
        .with_scope(scope)
        .with_technical_requirements(["Metrics store", "Calendar sync worker", "Billing ledger"])
}

fn bench_planning(c: &mut Criterion) {
    let planner = BacklogPlanner::default();
    let epic = bench_epic(40);

    c.bench_function("backlog/plan_40x5", |b| {
        b.iter(|| {
            let backlog = planner.plan(black_box(&epic)).expect("plan backlog");
            black_box(backlog.total_points);
        });
    });

    let backlog = planner.plan(&epic).expect("plan backlog");
    let inputs: BTreeMap<String, RiceInput> = backlog
        .stories
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.clone(), RiceInput::new((i * 10) as f64, 2.0, 0.8, 1.0 + (i % 5) as f64)))
        .collect();

    c.bench_function("backlog/rice_reorder", |b| {
        b.iter(|| {
            let reordered = reorder_backlog(black_box(&backlog), black_box(&inputs)).expect("reorder");
            black_box(reordered.len());
        });
    });
}

criterion_group!(benches, bench_planning);
criterion_main!(benches);
