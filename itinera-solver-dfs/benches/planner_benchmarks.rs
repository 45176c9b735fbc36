//! Criterion benchmarks for the depth-first planner.
//!
//! Measures preference-mode planning time for a two-day trip as the number
//! of candidate attractions grows.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package itinera-solver-dfs
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use itinera_core::test_support::MemoryEnvironment;
use itinera_core::{Accommodation, ClockTime, Planner, PreferenceObjective, Query};
use itinera_solver_dfs::test_support::{
    HOTEL, START_CITY, TARGET_CITY, attraction, restaurant, scenario_query,
    structural_evaluator, train,
};
use itinera_solver_dfs::{DfsPlanner, DfsPlannerConfig, RuleHeuristic};

/// Candidate attraction counts to benchmark.
const PROBLEM_SIZES: &[usize] = &[4, 8, 16];

/// Candidates expanded per search node.
const SEARCH_WIDTH: usize = 3;

fn environment(size: usize) -> MemoryEnvironment {
    let base = MemoryEnvironment::default()
        .with_intercity(
            START_CITY,
            TARGET_CITY,
            train("G7001", true, ClockTime::hm(8, 0), ClockTime::hm(9, 0), 100),
        )
        .with_intercity(
            TARGET_CITY,
            START_CITY,
            train("G7020", false, ClockTime::hm(19, 0), ClockTime::hm(20, 0), 100),
        )
        .with_accommodation(
            TARGET_CITY,
            Accommodation {
                name: HOTEL.to_owned(),
                price: 300,
                beds_per_room: 2,
                location: None,
            },
        )
        .with_restaurant(
            TARGET_CITY,
            restaurant(
                "Canal Kitchen",
                "jiangsu",
                60,
                ClockTime::hm(10, 30),
                ClockTime::hm(21, 0),
            ),
        );
    let prices = [0_u32, 15, 30, 45, 60].into_iter().cycle();
    let minutes = [60_u32, 90, 120].into_iter().cycle();
    prices
        .zip(minutes)
        .take(size)
        .enumerate()
        .fold(base, |env, (index, (price, visit))| {
            env.with_attraction(
                TARGET_CITY,
                attraction(&format!("Sight {index}"), "garden", price, visit),
            )
        })
}

#[expect(clippy::expect_used, reason = "benchmark objective literal is valid")]
fn query() -> Query {
    let objective: PreferenceObjective = "maximize attraction_count"
        .parse()
        .expect("objective should parse");
    scenario_query("bench", 2, 2).with_preference(objective)
}

fn bench_plan_times(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_time");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let query = query();
    for &size in PROBLEM_SIZES {
        let evaluator = structural_evaluator().with_preference(|_, plan| {
            let count = plan
                .activities()
                .filter(|activity| activity.kind.tag() == "attraction")
                .count();
            u32::try_from(count).ok().map(f64::from)
        });
        let config = DfsPlannerConfig::default()
            .with_preference_search(true)
            .with_search_width(Some(SEARCH_WIDTH));
        let mut planner =
            DfsPlanner::with_config(environment(size), evaluator, RuleHeuristic::default(), config);

        group.throughput(Throughput::Elements(u64::try_from(size).unwrap_or(u64::MAX)));
        group.bench_with_input(BenchmarkId::new("attractions", size), &size, |b, _| {
            b.iter(|| planner.plan(&query));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_plan_times);
criterion_main!(benches);
