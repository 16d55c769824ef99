use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crewflow_core::algorithm::graph::{reduce_to_max_flow, FeasibilitySearch, ProbeStrategy};
use crewflow_core::scheduling::{CrewPlanner, Leg, NetworkBuilder, PlannerConfig, SearchStrategy};

/// Shuttle legs between three airports with a 40 minute block time
fn shuttle_day(leg_count: usize) -> Vec<Leg> {
    (0..leg_count)
        .map(|i| {
            let origin = (i % 3) as i64;
            let departure = (i as i64) * 13 % 600;
            Leg::new(origin, (origin + 1) % 3, departure, departure + 40)
        })
        .collect()
}

fn bench_feasibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("feasibility_search");
    for &size in &[16usize, 32, 64] {
        let legs = shuttle_day(size);
        let crew = NetworkBuilder::new().build(&legs).unwrap();
        let total = crew.total_demand();
        let network = reduce_to_max_flow(crew.graph).unwrap();

        for strategy in [ProbeStrategy::Binary, ProbeStrategy::Linear] {
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), size),
                &network,
                |b, network| {
                    b.iter(|| {
                        FeasibilitySearch::new(strategy)
                            .minimum_units(black_box(network), total)
                            .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_planner(c: &mut Criterion) {
    let mut group = c.benchmark_group("crew_planner");
    for &size in &[16usize, 64] {
        let legs = shuttle_day(size);
        for search in [SearchStrategy::Binary, SearchStrategy::CounterFlow] {
            let planner = CrewPlanner::new(PlannerConfig {
                search,
                ..PlannerConfig::default()
            })
            .unwrap();
            group.bench_with_input(BenchmarkId::new(search.to_string(), size), &legs, |b, legs| {
                b.iter(|| planner.plan(black_box(legs)).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_feasibility, bench_planner);
criterion_main!(benches);
