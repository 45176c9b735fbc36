//! One planning episode: the outer enumeration and the day-by-day search.
//!
//! Every recursive step returns `Ok(true)` once a plan has been accepted and
//! leaves the partial itinerary and visited stacks exactly as it found them
//! otherwise. Search-fatal conditions propagate as [`SearchAbort`].

use std::time::Duration;

use itinera_core::{
    Accommodation, Activity, ClockTime, ConstraintEvaluator, DayPlan, InnercityMode,
    IntercityTransport, Itinerary, MealKind, PreferenceObjective, Query, RouteRequest,
    TravelEnvironment,
};

use super::PoiMemory;
use crate::rerank::{self, bucket_by_passes, sanitize_ranking};
use crate::transfer::{self, Transfer};
use crate::{
    BestEffortTracker, DfsPlannerConfig, NextKind, RoomRequest, SearchAbort, SearchContext,
    SearchDeadline, SearchHeuristic, VisitedStacks, attraction_start, schedule_accommodation,
    schedule_attraction, schedule_breakfast, schedule_restaurant,
};

/// Counters reported in the response diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct SearchStats {
    pub(super) nodes: u64,
    pub(super) validations: u64,
}

/// Journeys and hotel fixed for one run of the depth-first search.
#[derive(Debug, Clone, Copy)]
struct Choice<'a> {
    go: &'a IntercityTransport,
    back: &'a IntercityTransport,
    hotel: Option<(&'a Accommodation, u32)>,
    fixed_cost: u32,
}

type Step = Result<bool, SearchAbort>;

pub(super) struct Search<'a, E, V, H> {
    environment: &'a E,
    evaluator: &'a V,
    heuristic: &'a mut H,
    config: &'a DfsPlannerConfig,
    query: &'a Query,
    memory: &'a PoiMemory,
    modes: Vec<InnercityMode>,
    budget: Option<u32>,
    rooms: RoomRequest,
    preference: Option<&'a PreferenceObjective>,
    deadline: SearchDeadline,
    charged_before: Duration,
    plan: Itinerary,
    visited: VisitedStacks,
    tracker: BestEffortTracker,
    stats: SearchStats,
}

impl<'a, E, V, H> Search<'a, E, V, H>
where
    E: TravelEnvironment,
    V: ConstraintEvaluator,
    H: SearchHeuristic,
{
    pub(super) fn new(
        environment: &'a E,
        evaluator: &'a V,
        heuristic: &'a mut H,
        config: &'a DfsPlannerConfig,
        query: &'a Query,
        memory: &'a PoiMemory,
        charged_before: Duration,
    ) -> Self {
        let mut modes: Vec<InnercityMode> = Vec::new();
        for mode in heuristic.innercity_modes(query) {
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
        if modes.is_empty() {
            modes = InnercityMode::DEFAULT_ORDER.to_vec();
        }
        let budget = heuristic.budget(query);
        let rooms = heuristic.decide_rooms(query);
        let preference = query
            .preference
            .as_ref()
            .filter(|_| config.preference_search);
        Self {
            environment,
            evaluator,
            heuristic,
            config,
            query,
            memory,
            modes,
            budget,
            rooms,
            preference,
            deadline: SearchDeadline::start(config.time_budget),
            charged_before,
            plan: Itinerary::default(),
            visited: VisitedStacks::default(),
            tracker: BestEffortTracker::new(preference.map(|objective| objective.direction)),
            stats: SearchStats::default(),
        }
    }

    /// Budget the search enforces.
    pub(super) const fn budget(&self) -> Option<u32> {
        self.budget
    }

    /// Tracker and counters once the search is over.
    pub(super) fn finish(self) -> (BestEffortTracker, SearchStats) {
        (self.tracker, self.stats)
    }

    /// Whether every push made by the search has been undone.
    #[cfg(test)]
    pub(super) fn is_unwound(&self) -> bool {
        self.plan.days.is_empty() && self.visited.is_empty()
    }

    /// Enumerate journey and hotel combinations until one yields an
    /// accepted plan.
    pub(super) fn run(&mut self) -> Result<Option<Itinerary>, SearchAbort> {
        let memory = self.memory;
        let go_order = self.rank_go();
        let hotel_order = self.rank_hotels();
        for go in go_order.iter().filter_map(|index| memory.go.get(*index)) {
            let back_order = self.rank_back(go);
            for back in back_order.iter().filter_map(|index| memory.back.get(*index)) {
                self.offer_journeys(go, back);
                if self.query.days > 1 {
                    for hotel in hotel_order
                        .iter()
                        .filter_map(|index| memory.accommodations.get(*index))
                    {
                        let Some(choice) = self.hotel_choice(go, back, hotel) else {
                            continue;
                        };
                        if let Some(plan) = self.attempt(choice)? {
                            return Ok(Some(plan));
                        }
                    }
                } else if let Some(choice) = self.day_trip_choice(go, back)
                    && let Some(plan) = self.attempt(choice)?
                {
                    return Ok(Some(plan));
                }
            }
        }
        Ok(None)
    }

    /// Offer the journeys alone as a fallback when their fare already
    /// exceeds the budget.
    fn offer_journeys(&mut self, go: &IntercityTransport, back: &IntercityTransport) {
        let ordered = self.query.days > 1 || back.depart > go.arrive;
        let unaffordable = self
            .budget
            .is_some_and(|budget| self.journey_cost(go, back) > budget);
        if ordered && unaffordable {
            self.tracker
                .offer_schema(&rerank::back_probe(self.query, go, back));
        }
    }

    fn rank_go(&mut self) -> Vec<usize> {
        let memory = self.memory;
        let ranking = self.heuristic.rank_go(self.query, &memory.go);
        let probes = memory
            .go
            .iter()
            .map(|go| Some(rerank::go_probe(self.query, go)));
        rerank::rerank(ranking, memory.go.len(), self.evaluator, self.query, probes)
    }

    fn rank_back(&mut self, go: &IntercityTransport) -> Vec<usize> {
        let memory = self.memory;
        let ranking = self.heuristic.rank_back(self.query, &memory.back, go);
        let probes = memory
            .back
            .iter()
            .map(|back| Some(rerank::back_probe(self.query, go, back)));
        rerank::rerank(ranking, memory.back.len(), self.evaluator, self.query, probes)
    }

    fn rank_hotels(&mut self) -> Vec<usize> {
        let memory = self.memory;
        let ranking = self.heuristic.rank_hotels(self.query, &memory.accommodations);
        let probes = memory.accommodations.iter().map(|hotel| {
            let rooms = self.rooms_at(hotel);
            Some(rerank::hotel_probe(self.query, self.config, hotel, rooms))
        });
        rerank::rerank(
            ranking,
            memory.accommodations.len(),
            self.evaluator,
            self.query,
            probes,
        )
    }

    fn rooms_at(&self, hotel: &Accommodation) -> u32 {
        self.rooms
            .count
            .unwrap_or_else(|| hotel.rooms_for(self.query.people))
    }

    const fn journey_cost(&self, go: &IntercityTransport, back: &IntercityTransport) -> u32 {
        go.cost
            .saturating_add(back.cost)
            .saturating_mul(self.query.people)
    }

    /// Fix a hotel for a multi-day trip, or `None` if it cannot host the
    /// party or leaves too little of the budget for daily spending.
    fn hotel_choice(
        &self,
        go: &'a IntercityTransport,
        back: &'a IntercityTransport,
        hotel: &'a Accommodation,
    ) -> Option<Choice<'a>> {
        let people = self.query.people;
        if self
            .rooms
            .room_type
            .is_some_and(|beds| beds != hotel.beds_per_room)
        {
            return None;
        }
        let rooms = self.rooms_at(hotel);
        if self.rooms.count.is_none() || self.rooms.room_type.is_none() {
            let beds = u32::from(hotel.beds_per_room);
            let capacity = beds.saturating_mul(rooms);
            if capacity < people || capacity >= people.saturating_add(beds) {
                return None;
            }
        }
        let nights = self.query.days.saturating_sub(1);
        let fixed_cost = self.journey_cost(go, back).saturating_add(
            hotel
                .price
                .saturating_mul(rooms)
                .saturating_mul(nights),
        );
        if let Some(budget) = self.budget {
            let reserve = self
                .config
                .daily_reserve_per_person
                .saturating_mul(people)
                .saturating_mul(nights);
            if budget <= fixed_cost.saturating_add(reserve) {
                log::debug!("skipping {}: leaves no daily reserve", hotel.name);
                return None;
            }
        }
        Some(Choice {
            go,
            back,
            hotel: Some((hotel, rooms)),
            fixed_cost,
        })
    }

    fn day_trip_choice(
        &self,
        go: &'a IntercityTransport,
        back: &'a IntercityTransport,
    ) -> Option<Choice<'a>> {
        (back.depart > go.arrive).then(|| Choice {
            go,
            back,
            hotel: None,
            fixed_cost: self.journey_cost(go, back),
        })
    }

    fn attempt(&mut self, choice: Choice<'a>) -> Result<Option<Itinerary>, SearchAbort> {
        log::debug!(
            "trying {} out, {} back, hotel {}",
            choice.go.id,
            choice.back.id,
            choice.hotel.map_or("none", |(hotel, _)| hotel.name.as_str())
        );
        self.plan = Itinerary::new(
            self.query.people,
            self.query.start_city.as_str(),
            self.query.target_city.as_str(),
            0,
        );
        self.visited.clear();
        if self.search_go(choice)? {
            return Ok(Some(std::mem::take(&mut self.plan)));
        }
        Ok(None)
    }

    fn enter(&mut self) -> Result<(), SearchAbort> {
        self.stats.nodes = self.stats.nodes.saturating_add(1);
        let charged = self
            .heuristic
            .inference_time()
            .saturating_sub(self.charged_before);
        self.deadline.check(charged)
    }

    fn over_budget(&self, choice: Choice<'a>) -> bool {
        self.budget.is_some_and(|budget| {
            self.plan.daily_spend().saturating_add(choice.fixed_cost) > budget
        })
    }

    fn is_last_day(&self, day_index: usize) -> bool {
        day_index.saturating_add(1) >= usize::try_from(self.query.days).unwrap_or(usize::MAX)
    }

    fn push(&mut self, activity: Activity) {
        if let Some(day) = self.plan.days.last_mut() {
            day.activities.push(activity);
        }
    }

    fn pop(&mut self) {
        if let Some(day) = self.plan.days.last_mut() {
            day.activities.pop();
        }
    }

    fn open_day(&mut self, day_index: usize) {
        let day = u32::try_from(day_index.saturating_add(1)).unwrap_or(u32::MAX);
        self.plan.days.push(DayPlan::new(day));
    }

    fn route(
        &self,
        from: &str,
        to: &str,
        start: ClockTime,
        mode: InnercityMode,
    ) -> Result<Option<Transfer>, SearchAbort> {
        let request = RouteRequest {
            city: &self.query.target_city,
            from,
            to,
            start,
            mode,
        };
        Ok(transfer::route(self.environment, &request, self.query.people)?)
    }

    /// Modes worth trying between two positions; one suffices when staying put.
    fn modes_between(&self, from: &str, to: &str) -> Vec<InnercityMode> {
        if from == to {
            self.modes.iter().take(1).copied().collect()
        } else {
            self.modes.clone()
        }
    }

    /// Whether the best-ranked mode arrives strictly before `deadline`.
    fn reachable_before(
        &self,
        from: &str,
        to: &str,
        start: ClockTime,
        deadline: ClockTime,
    ) -> Result<bool, SearchAbort> {
        let Some(mode) = self.modes.first().copied() else {
            return Ok(false);
        };
        Ok(self
            .route(from, to, start, mode)?
            .is_some_and(|transfer| transfer.arrival < deadline))
    }

    /// Whether the day can no longer end properly from here.
    fn too_late(
        &self,
        choice: Choice<'a>,
        day_index: usize,
        time: ClockTime,
        position: &str,
    ) -> Step {
        if time >= self.config.day_cutoff {
            return Ok(true);
        }
        if self.is_last_day(day_index) {
            let back = choice.back;
            return Ok(!self.reachable_before(position, &back.from, time, back.depart)?);
        }
        let Some((hotel, _)) = choice.hotel else {
            return Ok(false);
        };
        Ok(!self.reachable_before(position, &hotel.name, time, ClockTime::END_OF_DAY)?)
    }

    fn search_go(&mut self, choice: Choice<'a>) -> Step {
        self.enter()?;
        if self.over_budget(choice) {
            log::debug!("{} and {} exceed the budget", choice.go.id, choice.back.id);
            return Ok(false);
        }
        self.open_day(0);
        self.push(Activity::intercity(choice.go, self.query.people));
        if self.search_step(choice, 0, choice.go.arrive, &choice.go.to)? {
            return Ok(true);
        }
        self.plan.days.pop();
        Ok(false)
    }

    /// Start day `day_index` with breakfast at `hotel`.
    fn search_morning(&mut self, choice: Choice<'a>, day_index: usize, hotel: &'a str) -> Step {
        self.enter()?;
        if self.too_late(choice, day_index, ClockTime::MIDNIGHT, hotel)? || self.over_budget(choice)
        {
            return Ok(false);
        }
        self.open_day(day_index);
        let breakfast = schedule_breakfast(self.config, hotel);
        let after_breakfast = breakfast.end_time;
        self.push(breakfast);
        if self.search_step(choice, day_index, after_breakfast, hotel)? {
            return Ok(true);
        }
        self.pop();
        if self.is_last_day(day_index) && self.try_back(choice, ClockTime::MIDNIGHT, hotel)? {
            return Ok(true);
        }
        self.plan.days.pop();
        Ok(false)
    }

    fn legal_kinds(&self, choice: Choice<'a>, day_index: usize) -> Vec<NextKind> {
        let today = self.plan.days.last();
        let had = |tag: &str| today.is_some_and(|day| day.has_activity(tag));
        let last_day = self.is_last_day(day_index);
        NextKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                NextKind::Attraction => true,
                NextKind::Lunch => !had(MealKind::Lunch.as_str()),
                NextKind::Dinner => !had(MealKind::Dinner.as_str()),
                NextKind::Hotel => choice.hotel.is_some() && !last_day,
                NextKind::Back => last_day,
            })
            .collect()
    }

    fn choose_kind(
        &mut self,
        day_index: usize,
        time: ClockTime,
        position: &str,
        legal: &[NextKind],
    ) -> NextKind {
        let context = SearchContext {
            query: self.query,
            plan: &self.plan,
            day_index,
            time,
            position,
            visited: &self.visited,
        };
        let kind = self.heuristic.next_kind(&context, legal);
        if legal.contains(&kind) {
            kind
        } else {
            legal.first().copied().unwrap_or(kind)
        }
    }

    /// Extend the day in progress from `position` at `time`.
    fn search_step(
        &mut self,
        choice: Choice<'a>,
        day_index: usize,
        time: ClockTime,
        position: &'a str,
    ) -> Step {
        self.enter()?;
        if self.too_late(choice, day_index, time, position)? || self.over_budget(choice) {
            return Ok(false);
        }
        let mut legal = self.legal_kinds(choice, day_index);
        let mut day_closed = false;
        while !legal.is_empty() {
            let kind = self.choose_kind(day_index, time, position, &legal);
            let found = match (kind, kind.meal()) {
                (NextKind::Back | NextKind::Hotel, _) => {
                    !day_closed && self.close_day(choice, day_index, time, position)?
                }
                (_, Some(meal)) => {
                    self.try_meal(choice, day_index, time, position, meal)?
                        || (!day_closed && self.close_day(choice, day_index, time, position)?)
                }
                _ => {
                    self.try_attractions(choice, day_index, time, position)?
                        || (!day_closed && self.close_day(choice, day_index, time, position)?)
                }
            };
            if found {
                return Ok(true);
            }
            if kind == NextKind::Back {
                return Ok(false);
            }
            day_closed = true;
            legal.retain(|legal_kind| *legal_kind != kind);
        }
        Ok(false)
    }

    /// End the day: go home on the last day, otherwise back to the hotel.
    fn close_day(
        &mut self,
        choice: Choice<'a>,
        day_index: usize,
        time: ClockTime,
        position: &'a str,
    ) -> Step {
        if self.is_last_day(day_index) {
            self.try_back(choice, time, position)
        } else {
            self.try_hotel(choice, day_index, time, position)
        }
    }

    fn try_back(&mut self, choice: Choice<'a>, time: ClockTime, position: &str) -> Step {
        let back = choice.back;
        for mode in self.modes_between(position, &back.from) {
            let Some(transfer) = self.route(position, &back.from, time, mode)? else {
                continue;
            };
            if transfer.arrival > back.depart {
                continue;
            }
            self.push(
                Activity::intercity(back, self.query.people)
                    .with_transports(transfer.legs),
            );
            if self.validate() {
                return Ok(true);
            }
            self.pop();
        }
        Ok(false)
    }

    fn try_hotel(
        &mut self,
        choice: Choice<'a>,
        day_index: usize,
        time: ClockTime,
        position: &str,
    ) -> Step {
        let Some((hotel, rooms)) = choice.hotel else {
            return Ok(false);
        };
        for mode in self.modes_between(position, &hotel.name) {
            let Some(transfer) = self.route(position, &hotel.name, time, mode)? else {
                continue;
            };
            self.push(schedule_accommodation(
                hotel,
                transfer.arrival,
                rooms,
                transfer.legs,
            ));
            if self.search_morning(choice, day_index.saturating_add(1), &hotel.name)? {
                return Ok(true);
            }
            self.pop();
        }
        Ok(false)
    }

    /// Ranked candidate indices, re-ranked by logical probes and capped at
    /// the search width once visited candidates are skipped.
    fn shortlist(
        &self,
        ranking: Vec<usize>,
        len: usize,
        passes: &[usize],
        visited: impl Fn(usize) -> bool,
    ) -> Vec<usize> {
        let base = sanitize_ranking(ranking, len);
        bucket_by_passes(&base, passes)
            .into_iter()
            .filter(|index| !visited(*index))
            .take(self.config.search_width.unwrap_or(usize::MAX))
            .collect()
    }

    fn restaurant_passes(
        &self,
        day_index: usize,
        time: ClockTime,
        position: &str,
        meal: MealKind,
    ) -> Result<Vec<usize>, SearchAbort> {
        if self.query.logical_constraints.is_empty() {
            return Ok(Vec::new());
        }
        let mut probes = Vec::with_capacity(self.memory.restaurants.len());
        for restaurant in &self.memory.restaurants {
            let probe = self
                .route(position, &restaurant.name, time, InnercityMode::Taxi)?
                .and_then(|transfer| {
                    schedule_restaurant(
                        self.config,
                        restaurant,
                        meal,
                        transfer.arrival,
                        self.query.people,
                        transfer.legs,
                    )
                    .ok()
                })
                .map(|activity| rerank::extend_probe(&self.plan, day_index, activity));
            probes.push(probe);
        }
        Ok(rerank::probe_passes(self.evaluator, self.query, probes))
    }

    fn attraction_passes(
        &self,
        day_index: usize,
        time: ClockTime,
        position: &str,
    ) -> Result<Vec<usize>, SearchAbort> {
        if self.query.logical_constraints.is_empty() {
            return Ok(Vec::new());
        }
        let mut probes = Vec::with_capacity(self.memory.attractions.len());
        for attraction in &self.memory.attractions {
            let probe = self
                .route(position, &attraction.name, time, InnercityMode::Taxi)?
                .and_then(|transfer| {
                    let start = attraction_start(self.config, attraction, transfer.arrival).ok()?;
                    schedule_attraction(
                        attraction,
                        start,
                        self.config.default_visit_minutes,
                        self.query.people,
                        transfer.legs,
                    )
                    .ok()
                })
                .map(|activity| rerank::extend_probe(&self.plan, day_index, activity));
            probes.push(probe);
        }
        Ok(rerank::probe_passes(self.evaluator, self.query, probes))
    }

    fn try_meal(
        &mut self,
        choice: Choice<'a>,
        day_index: usize,
        time: ClockTime,
        position: &'a str,
        meal: MealKind,
    ) -> Step {
        let memory = self.memory;
        let ranking = {
            let context = SearchContext {
                query: self.query,
                plan: &self.plan,
                day_index,
                time,
                position,
                visited: &self.visited,
            };
            self.heuristic
                .rank_restaurants(&context, meal, &memory.restaurants)
        };
        let passes = self.restaurant_passes(day_index, time, position, meal)?;
        let shortlist = self.shortlist(ranking, memory.restaurants.len(), &passes, |index| {
            self.visited.has_restaurant(index)
        });
        for index in shortlist {
            let Some(restaurant) = memory.restaurants.get(index) else {
                continue;
            };
            for mode in self.modes_between(position, &restaurant.name) {
                let Some(transfer) = self.route(position, &restaurant.name, time, mode)? else {
                    continue;
                };
                let activity = match schedule_restaurant(
                    self.config,
                    restaurant,
                    meal,
                    transfer.arrival,
                    self.query.people,
                    transfer.legs,
                ) {
                    Ok(activity) => activity,
                    Err(reason) => {
                        log::trace!("{} by {mode}: {reason}", meal.as_str());
                        continue;
                    }
                };
                let finished = activity.end_time;
                self.push(activity);
                self.visited
                    .push_restaurant(index, restaurant.cuisine.as_str());
                if self.search_step(choice, day_index, finished, &restaurant.name)? {
                    return Ok(true);
                }
                self.visited.pop_restaurant();
                self.pop();
            }
        }
        Ok(false)
    }

    fn try_attractions(
        &mut self,
        choice: Choice<'a>,
        day_index: usize,
        time: ClockTime,
        position: &'a str,
    ) -> Step {
        let memory = self.memory;
        let ranking = {
            let context = SearchContext {
                query: self.query,
                plan: &self.plan,
                day_index,
                time,
                position,
                visited: &self.visited,
            };
            self.heuristic
                .rank_attractions(&context, &memory.attractions)
        };
        let passes = self.attraction_passes(day_index, time, position)?;
        let shortlist = self.shortlist(ranking, memory.attractions.len(), &passes, |index| {
            self.visited.has_attraction(index)
        });
        for index in shortlist {
            let Some(attraction) = memory.attractions.get(index) else {
                continue;
            };
            for mode in self.modes_between(position, &attraction.name) {
                let Some(transfer) = self.route(position, &attraction.name, time, mode)? else {
                    continue;
                };
                let start = match attraction_start(self.config, attraction, transfer.arrival) {
                    Ok(start) => start,
                    Err(reason) => {
                        log::trace!("attraction by {mode}: {reason}");
                        continue;
                    }
                };
                let minutes = {
                    let context = SearchContext {
                        query: self.query,
                        plan: &self.plan,
                        day_index,
                        time: start,
                        position,
                        visited: &self.visited,
                    };
                    self.heuristic.visit_minutes(&context, attraction, start)
                };
                let Ok(activity) = schedule_attraction(
                    attraction,
                    start,
                    minutes,
                    self.query.people,
                    transfer.legs,
                ) else {
                    continue;
                };
                let finished = activity.end_time;
                self.push(activity);
                self.visited.push_attraction(
                    index,
                    attraction.spot_type.as_str(),
                    attraction.name.as_str(),
                );
                if self.search_step(choice, day_index, finished, &attraction.name)? {
                    return Ok(true);
                }
                self.visited.pop_attraction();
                self.pop();
            }
        }
        Ok(false)
    }

    /// Judge the complete itinerary, feeding the best-effort tracker.
    ///
    /// Returns whether the search should stop with this plan; in preference
    /// mode it never does.
    fn validate(&mut self) -> bool {
        self.stats.validations = self.stats.validations.saturating_add(1);
        let plan = &self.plan;
        self.tracker.record_schema(plan);
        let commonsense = self.evaluator.commonsense(self.query, plan);
        let logical = self.evaluator.logical(self.query, plan);
        let passes = logical.iter().filter(|passed| **passed).count();
        if commonsense {
            self.tracker.record_commonsense(plan, passes);
        }
        let within_budget = self
            .budget
            .is_none_or(|budget| plan.total_cost() <= budget);
        let valid = commonsense && passes == logical.len() && within_budget;
        log::trace!(
            "validated plan: commonsense {commonsense}, {passes}/{} logical, cost {}",
            logical.len(),
            plan.total_cost()
        );
        if !valid {
            return false;
        }
        self.tracker.record_logical(plan);
        let Some(objective) = self.preference else {
            return true;
        };
        if let Some(value) = self.evaluator.preference(objective, plan) {
            self.tracker.record_preference(plan, value);
        }
        false
    }
}
