//! Constraint-aware re-ranking of heuristic candidate orders.
//!
//! Each candidate is spliced into a small probe itinerary and scored by the
//! number of logical constraints the probe satisfies. Candidates are then
//! bucketed by that count, best first, keeping the heuristic's order within
//! each bucket.

use std::cmp::Reverse;

use itinera_core::{
    Accommodation, Activity, ConstraintEvaluator, IntercityTransport, Itinerary, Query,
};

use crate::{DfsPlannerConfig, schedule_accommodation};

/// Drop out-of-range and repeated indices from a heuristic ranking.
///
/// # Examples
/// ```
/// use itinera_solver_dfs::sanitize_ranking;
///
/// assert_eq!(sanitize_ranking(vec![2, 7, 0, 2, 1], 3), vec![2, 0, 1]);
/// ```
#[must_use]
pub fn sanitize_ranking(ranking: Vec<usize>, len: usize) -> Vec<usize> {
    let mut seen = vec![false; len];
    ranking
        .into_iter()
        .filter(|index| {
            seen.get_mut(*index)
                .is_some_and(|slot| !std::mem::replace(slot, true))
        })
        .collect()
}

/// Stable-sort `ranking` by descending `passes`, indexed by candidate.
///
/// Candidates without a recorded count score zero. When nothing passes at
/// all the ranking is returned unchanged.
///
/// # Examples
/// ```
/// use itinera_solver_dfs::bucket_by_passes;
///
/// assert_eq!(bucket_by_passes(&[0, 1, 2, 3], &[0, 2, 1, 2]), vec![1, 3, 2, 0]);
/// assert_eq!(bucket_by_passes(&[2, 0, 1], &[0, 0, 0]), vec![2, 0, 1]);
/// ```
#[must_use]
pub fn bucket_by_passes(ranking: &[usize], passes: &[usize]) -> Vec<usize> {
    let score = |index: usize| passes.get(index).copied().unwrap_or_default();
    let mut order = ranking.to_vec();
    if ranking.iter().all(|index| score(*index) == 0) {
        return order;
    }
    order.sort_by_key(|index| Reverse(score(*index)));
    order
}

/// Logical passes for each probe; empty when the query has no logical
/// constraints, which leaves rankings untouched.
pub(crate) fn probe_passes<V, I>(evaluator: &V, query: &Query, probes: I) -> Vec<usize>
where
    V: ConstraintEvaluator + ?Sized,
    I: IntoIterator<Item = Option<Itinerary>>,
{
    if query.logical_constraints.is_empty() {
        return Vec::new();
    }
    probes
        .into_iter()
        .map(|probe| probe.map_or(0, |plan| evaluator.logical_passes(query, &plan)))
        .collect()
}

/// Sanitize a heuristic `ranking` over `len` candidates and bucket it by the
/// logical passes of each candidate's probe.
pub(crate) fn rerank<V, I>(
    ranking: Vec<usize>,
    len: usize,
    evaluator: &V,
    query: &Query,
    probes: I,
) -> Vec<usize>
where
    V: ConstraintEvaluator + ?Sized,
    I: IntoIterator<Item = Option<Itinerary>>,
{
    let base = sanitize_ranking(ranking, len);
    bucket_by_passes(&base, &probe_passes(evaluator, query, probes))
}

fn empty_probe(query: &Query, days: u32) -> Itinerary {
    Itinerary::new(query.people, &*query.start_city, &*query.target_city, days)
}

/// A one-day plan holding only the outbound journey.
pub(crate) fn go_probe(query: &Query, go: &IntercityTransport) -> Itinerary {
    let mut probe = empty_probe(query, 1);
    if let Some(day) = probe.days.first_mut() {
        day.activities.push(Activity::intercity(go, query.people));
    }
    probe
}

/// The whole trip with only its two journeys.
pub(crate) fn back_probe(
    query: &Query,
    go: &IntercityTransport,
    back: &IntercityTransport,
) -> Itinerary {
    let mut probe = empty_probe(query, query.days.max(1));
    if let Some(day) = probe.days.first_mut() {
        day.activities.push(Activity::intercity(go, query.people));
    }
    if let Some(day) = probe.days.last_mut() {
        day.activities.push(Activity::intercity(back, query.people));
    }
    probe
}

/// Every night of the trip spent at `hotel`.
pub(crate) fn hotel_probe(
    query: &Query,
    config: &DfsPlannerConfig,
    hotel: &Accommodation,
    rooms: u32,
) -> Itinerary {
    let mut probe = empty_probe(query, query.days.saturating_sub(1));
    for day in &mut probe.days {
        day.activities.push(schedule_accommodation(
            hotel,
            config.hotel_probe_arrival,
            rooms,
            Vec::new(),
        ));
    }
    probe
}

/// `plan` with `activity` appended to the day at `day_index`.
pub(crate) fn extend_probe(plan: &Itinerary, day_index: usize, activity: Activity) -> Itinerary {
    let mut probe = plan.clone();
    if let Some(day) = probe.days.get_mut(day_index) {
        day.activities.push(activity);
    }
    probe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleHeuristic, SearchHeuristic};
    use itinera_core::test_support::FnEvaluator;
    use itinera_core::{ActivityKind, ClockTime, IntercityMode};
    use rstest::rstest;

    fn journey(id: &str, cost: u32) -> IntercityTransport {
        IntercityTransport {
            id: id.to_owned(),
            mode: IntercityMode::Train,
            from: "Shanghai Station".to_owned(),
            to: "Suzhou Station".to_owned(),
            depart: ClockTime::hm(8, 0),
            arrive: ClockTime::hm(9, 0),
            cost,
        }
    }

    fn cheap_journeys() -> FnEvaluator {
        FnEvaluator::new(
            |_, _| true,
            |query, plan| {
                query
                    .logical_constraints
                    .iter()
                    .map(|_| plan.intercity_cost() <= 200)
                    .collect()
            },
        )
    }

    #[rstest]
    #[case(vec![], 3, vec![])]
    #[case(vec![0, 0, 0], 1, vec![0])]
    #[case(vec![4, 3], 3, vec![])]
    fn sanitizes(#[case] ranking: Vec<usize>, #[case] len: usize, #[case] expected: Vec<usize>) {
        assert_eq!(sanitize_ranking(ranking, len), expected);
    }

    #[rstest]
    fn buckets_are_stable() {
        let ranking = [3, 1, 0, 2];
        let passes = [1, 0, 1];
        assert_eq!(bucket_by_passes(&ranking, &passes), vec![0, 2, 3, 1]);
    }

    #[rstest]
    fn probes_are_skipped_without_constraints() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 1);
        let probes = [Some(go_probe(&query, &journey("G1", 50)))];
        assert!(probe_passes(&cheap_journeys(), &query, probes).is_empty());
    }

    #[rstest]
    fn failed_probes_score_zero() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 1).with_constraint("cheap");
        let probes = [
            Some(go_probe(&query, &journey("G1", 300))),
            None,
            Some(go_probe(&query, &journey("G2", 50))),
        ];
        assert_eq!(probe_passes(&cheap_journeys(), &query, probes), vec![0, 0, 1]);
    }

    #[rstest]
    fn reranking_twice_gives_the_same_order() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 1).with_constraint("cheap");
        let candidates = [
            journey("G1", 120),
            journey("G2", 40),
            journey("G3", 90),
            journey("G4", 300),
            journey("G5", 60),
        ];
        let evaluator = cheap_journeys();
        let run = || {
            let ranking = RuleHeuristic::default().rank_go(&query, &candidates);
            let probes = candidates.iter().map(|go| Some(go_probe(&query, go)));
            rerank(ranking, candidates.len(), &evaluator, &query, probes)
        };
        let first = run();
        assert_eq!(first, run());
        assert_eq!(first.last(), Some(&3));
    }

    #[rstest]
    fn back_probe_spans_the_trip() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 3);
        let probe = back_probe(&query, &journey("G1", 50), &journey("G2", 60));
        assert_eq!(probe.days.len(), 3);
        assert_eq!(probe.intercity_cost(), 220);
        assert!(probe.days.get(1).is_some_and(|day| day.activities.is_empty()));
    }

    #[rstest]
    #[expect(clippy::expect_used, reason = "fixture data is valid")]
    fn hotel_probe_books_every_night() {
        let query = Query::new("q", "Shanghai", "Suzhou", 3, 3);
        let hotel = Accommodation::new("Pingjiang Lodge", 200, 2).expect("valid hotel");
        let probe = hotel_probe(&query, &DfsPlannerConfig::default(), &hotel, 2);
        assert_eq!(probe.days.len(), 2);
        assert_eq!(probe.accommodation_cost(), 800);
        assert!(probe.activities().all(|activity| matches!(
            activity.kind,
            ActivityKind::Accommodation { rooms: 2, .. }
        )));
    }
}
