//! Candidate ordering and search-step decisions.
//!
//! A [`SearchHeuristic`] answers the soft questions of the search: which
//! transport, hotel, restaurant or attraction to try first, what to do next
//! and for how long. Its answers only change the order in which the
//! planner explores; hard constraints are enforced elsewhere, so a poor
//! heuristic costs time, never correctness.

mod llm;

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use itinera_core::{
    Accommodation, Attraction, ClockTime, InnercityMode, IntercityTransport, Itinerary, MealKind,
    Query, Restaurant,
};
use thiserror::Error;

use crate::VisitedStacks;

pub use llm::LlmHeuristic;

/// Kind of activity the search may schedule next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextKind {
    /// Visit an attraction.
    Attraction,
    /// Have lunch.
    Lunch,
    /// Have dinner.
    Dinner,
    /// Check in to the hotel and end the day.
    Hotel,
    /// Take the return journey.
    Back,
}

impl NextKind {
    /// Every kind, in the order the planner lists legal options.
    pub const ALL: [Self; 5] = [
        Self::Attraction,
        Self::Lunch,
        Self::Dinner,
        Self::Hotel,
        Self::Back,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attraction => "attraction",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Hotel => "hotel",
            Self::Back => "back",
        }
    }

    /// The meal this kind schedules, if any.
    #[must_use]
    pub const fn meal(self) -> Option<MealKind> {
        match self {
            Self::Lunch => Some(MealKind::Lunch),
            Self::Dinner => Some(MealKind::Dinner),
            _ => None,
        }
    }
}

impl fmt::Display for NextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`NextKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown activity kind {input:?}")]
pub struct UnknownNextKind {
    input: String,
}

impl FromStr for NextKind {
    type Err = UnknownNextKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalised)
            .ok_or_else(|| UnknownNextKind {
                input: s.to_owned(),
            })
    }
}

/// Snapshot of the search handed to per-node heuristic calls.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'a> {
    /// Query being planned.
    pub query: &'a Query,
    /// Partial itinerary, including the day in progress.
    pub plan: &'a Itinerary,
    /// Zero-based index of the day in progress.
    pub day_index: usize,
    /// Current time.
    pub time: ClockTime,
    /// Current position.
    pub position: &'a str,
    /// Restaurants and attractions already scheduled.
    pub visited: &'a VisitedStacks,
}

/// Room requirement derived from a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoomRequest {
    /// Rooms to book, when the query fixes it.
    pub count: Option<u32>,
    /// Beds per room, when the query fixes it.
    pub room_type: Option<u8>,
}

/// Soft decisions made during the search.
///
/// Ranking methods return indices into `candidates`; the planner drops
/// out-of-range and repeated indices, so an implementation may also filter
/// candidates out by omitting them.
pub trait SearchHeuristic {
    /// Called once at the start of every planning call.
    fn begin(&mut self, query: &Query) {
        let _ = query;
    }

    /// Order outbound journeys.
    fn rank_go(&mut self, query: &Query, candidates: &[IntercityTransport]) -> Vec<usize>;

    /// Order return journeys to pair with `go`.
    fn rank_back(
        &mut self,
        query: &Query,
        candidates: &[IntercityTransport],
        go: &IntercityTransport,
    ) -> Vec<usize>;

    /// Order hotels.
    fn rank_hotels(&mut self, query: &Query, candidates: &[Accommodation]) -> Vec<usize>;

    /// Order restaurants for `meal`.
    fn rank_restaurants(
        &mut self,
        context: &SearchContext<'_>,
        meal: MealKind,
        candidates: &[Restaurant],
    ) -> Vec<usize>;

    /// Order attractions.
    fn rank_attractions(
        &mut self,
        context: &SearchContext<'_>,
        candidates: &[Attraction],
    ) -> Vec<usize>;

    /// Innercity modes to try, most preferred first.
    fn innercity_modes(&mut self, query: &Query) -> Vec<InnercityMode>;

    /// Rooms the party needs.
    fn decide_rooms(&mut self, query: &Query) -> RoomRequest;

    /// Spending limit for the trip.
    fn budget(&mut self, query: &Query) -> Option<u32>;

    /// Choose the next kind from the non-empty `legal` set. Answers outside
    /// `legal` are replaced by its first element.
    fn next_kind(&mut self, context: &SearchContext<'_>, legal: &[NextKind]) -> NextKind;

    /// Minutes to spend at `attraction` when starting at `start`.
    fn visit_minutes(
        &mut self,
        context: &SearchContext<'_>,
        attraction: &Attraction,
        start: ClockTime,
    ) -> u32;

    /// Language-model time spent so far, charged to the search budget.
    fn inference_time(&self) -> Duration {
        Duration::ZERO
    }
}

/// Deterministic heuristic built from simple rules.
///
/// Cheapest first everywhere, lunch around midday, dinner in the evening,
/// sightseeing otherwise.
///
/// # Examples
/// ```
/// use itinera_core::{ClockTime, IntercityMode, IntercityTransport, Query};
/// use itinera_solver_dfs::{RuleHeuristic, SearchHeuristic};
///
/// let train = |id: &str, cost| IntercityTransport {
///     id: id.into(),
///     mode: IntercityMode::Train,
///     from: "A station".into(),
///     to: "B station".into(),
///     depart: ClockTime::hm(8, 0),
///     arrive: ClockTime::hm(10, 0),
///     cost,
/// };
/// let query = Query::new("q", "A", "B", 1, 1);
/// let order = RuleHeuristic::default().rank_go(&query, &[train("G1", 300), train("G2", 120)]);
/// assert_eq!(order, vec![1, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHeuristic {
    fallback_visit_minutes: u32,
    lunch_from: ClockTime,
    lunch_until: ClockTime,
    dinner_from: ClockTime,
    dinner_until: ClockTime,
    sightseeing_until: ClockTime,
}

impl Default for RuleHeuristic {
    fn default() -> Self {
        Self {
            fallback_visit_minutes: 90,
            lunch_from: ClockTime::hm(10, 0),
            lunch_until: ClockTime::hm(13, 0),
            dinner_from: ClockTime::hm(16, 30),
            dinner_until: ClockTime::hm(20, 0),
            sightseeing_until: ClockTime::hm(21, 0),
        }
    }
}

impl RuleHeuristic {
    /// Visit length for attractions without a recommendation.
    #[must_use]
    pub const fn with_visit_minutes(mut self, minutes: u32) -> Self {
        self.fallback_visit_minutes = minutes;
        self
    }

    fn in_window(time: ClockTime, from: ClockTime, until: ClockTime) -> bool {
        from <= time && time < until
    }
}

fn sorted_indices<T, K: Ord>(candidates: &[T], key: impl Fn(&T) -> K) -> Vec<usize> {
    let mut order: Vec<(K, usize)> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| (key(candidate), index))
        .collect();
    order.sort();
    order.into_iter().map(|(_, index)| index).collect()
}

impl SearchHeuristic for RuleHeuristic {
    fn rank_go(&mut self, _query: &Query, candidates: &[IntercityTransport]) -> Vec<usize> {
        sorted_indices(candidates, |transport| (transport.cost, transport.arrive))
    }

    fn rank_back(
        &mut self,
        _query: &Query,
        candidates: &[IntercityTransport],
        _go: &IntercityTransport,
    ) -> Vec<usize> {
        sorted_indices(candidates, |transport| {
            (transport.cost, Reverse(transport.depart))
        })
    }

    fn rank_hotels(&mut self, query: &Query, candidates: &[Accommodation]) -> Vec<usize> {
        sorted_indices(candidates, |hotel| (hotel.price, hotel.name.clone()))
            .into_iter()
            .filter(|index| {
                query.room_type.is_none_or(|beds| {
                    candidates
                        .get(*index)
                        .is_some_and(|hotel| hotel.beds_per_room == beds)
                })
            })
            .collect()
    }

    fn rank_restaurants(
        &mut self,
        _context: &SearchContext<'_>,
        _meal: MealKind,
        candidates: &[Restaurant],
    ) -> Vec<usize> {
        sorted_indices(candidates, |restaurant| {
            (restaurant.price, restaurant.name.clone())
        })
    }

    fn rank_attractions(
        &mut self,
        _context: &SearchContext<'_>,
        candidates: &[Attraction],
    ) -> Vec<usize> {
        sorted_indices(candidates, |attraction| {
            (attraction.price, attraction.name.clone())
        })
    }

    fn innercity_modes(&mut self, query: &Query) -> Vec<InnercityMode> {
        if query.innercity_preference.is_empty() {
            InnercityMode::DEFAULT_ORDER.to_vec()
        } else {
            query.innercity_preference.clone()
        }
    }

    fn decide_rooms(&mut self, query: &Query) -> RoomRequest {
        RoomRequest {
            count: query.room_count,
            room_type: query.room_type,
        }
    }

    fn budget(&mut self, query: &Query) -> Option<u32> {
        query.budget
    }

    fn next_kind(&mut self, context: &SearchContext<'_>, legal: &[NextKind]) -> NextKind {
        let time = context.time;
        let allowed = |kind: NextKind| legal.contains(&kind);
        let choice = if allowed(NextKind::Lunch)
            && Self::in_window(time, self.lunch_from, self.lunch_until)
        {
            NextKind::Lunch
        } else if allowed(NextKind::Dinner)
            && Self::in_window(time, self.dinner_from, self.dinner_until)
        {
            NextKind::Dinner
        } else if allowed(NextKind::Attraction) && time < self.sightseeing_until {
            NextKind::Attraction
        } else {
            [NextKind::Hotel, NextKind::Back]
                .into_iter()
                .find(|kind| allowed(*kind))
                .or_else(|| legal.first().copied())
                .unwrap_or(NextKind::Attraction)
        };
        log::debug!("rule heuristic chose {choice} at {time}");
        choice
    }

    fn visit_minutes(
        &mut self,
        _context: &SearchContext<'_>,
        attraction: &Attraction,
        _start: ClockTime,
    ) -> u32 {
        if attraction.recommended_visit_minutes == 0 {
            self.fallback_visit_minutes
        } else {
            attraction.recommended_visit_minutes
        }
    }
}
