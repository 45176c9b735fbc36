//! In-memory collaborators used by unit and behaviour tests.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

use crate::{
    Accommodation, Attraction, ChatMessage, ClockTime, CompletionClient, CompletionError,
    CompletionOptions, ConstraintEvaluator, EnvironmentError, InnercityMode, InnercitySegment,
    IntercityTransport, Itinerary, PreferenceObjective, Query, Restaurant, RouteRequest, Rows,
    SelectRequest, TravelEnvironment,
};

/// Duration and unit price of one innercity leg in a [`MemoryEnvironment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegModel {
    /// Minutes the leg takes.
    pub minutes: u32,
    /// Unit price of the leg.
    pub price: u32,
}

/// In-memory `TravelEnvironment` with fixed innercity leg times.
///
/// Every pair of distinct positions is the same distance apart. Walking and
/// taxis are a single leg; the metro is an access walk, a ride, and an egress
/// walk.
#[derive(Debug, Clone)]
pub struct MemoryEnvironment {
    page_size: usize,
    cities: BTreeSet<String>,
    accommodations: BTreeMap<String, Vec<Accommodation>>,
    attractions: BTreeMap<String, Vec<Attraction>>,
    restaurants: BTreeMap<String, Vec<Restaurant>>,
    intercity: Vec<(String, String, IntercityTransport)>,
    legs: BTreeMap<InnercityMode, LegModel>,
    metro_access_minutes: u32,
    cursor: Option<(Rows, usize)>,
}

impl Default for MemoryEnvironment {
    fn default() -> Self {
        let legs = [
            (InnercityMode::Walk, LegModel { minutes: 30, price: 0 }),
            (InnercityMode::Taxi, LegModel { minutes: 10, price: 20 }),
            (InnercityMode::Metro, LegModel { minutes: 10, price: 4 }),
        ];
        Self {
            page_size: 10,
            cities: BTreeSet::new(),
            accommodations: BTreeMap::new(),
            attractions: BTreeMap::new(),
            restaurants: BTreeMap::new(),
            intercity: Vec::new(),
            legs: legs.into_iter().collect(),
            metro_access_minutes: 5,
            cursor: None,
        }
    }
}

impl MemoryEnvironment {
    /// Rows returned per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Declare a supported city with no data.
    #[must_use]
    pub fn with_city(mut self, city: &str) -> Self {
        self.cities.insert(city.to_owned());
        self
    }

    /// Add a hotel.
    #[must_use]
    pub fn with_accommodation(mut self, city: &str, hotel: Accommodation) -> Self {
        self.cities.insert(city.to_owned());
        self.accommodations
            .entry(city.to_owned())
            .or_default()
            .push(hotel);
        self
    }

    /// Add an attraction.
    #[must_use]
    pub fn with_attraction(mut self, city: &str, attraction: Attraction) -> Self {
        self.cities.insert(city.to_owned());
        self.attractions
            .entry(city.to_owned())
            .or_default()
            .push(attraction);
        self
    }

    /// Add a restaurant.
    #[must_use]
    pub fn with_restaurant(mut self, city: &str, restaurant: Restaurant) -> Self {
        self.cities.insert(city.to_owned());
        self.restaurants
            .entry(city.to_owned())
            .or_default()
            .push(restaurant);
        self
    }

    /// Add a scheduled service from `from_city` to `to_city`.
    #[must_use]
    pub fn with_intercity(
        mut self,
        from_city: &str,
        to_city: &str,
        transport: IntercityTransport,
    ) -> Self {
        self.cities.insert(from_city.to_owned());
        self.cities.insert(to_city.to_owned());
        self.intercity
            .push((from_city.to_owned(), to_city.to_owned(), transport));
        self
    }

    /// Override the leg model for `mode`.
    #[must_use]
    pub fn with_leg(mut self, mode: InnercityMode, minutes: u32, price: u32) -> Self {
        self.legs.insert(mode, LegModel { minutes, price });
        self
    }

    /// Remove `mode`; routes with it fail with [`EnvironmentError::NoRoute`].
    #[must_use]
    pub fn without_mode(mut self, mode: InnercityMode) -> Self {
        self.legs.remove(&mode);
        self
    }

    fn table(&self, request: &SelectRequest) -> Result<Rows, EnvironmentError> {
        let city_rows = |city: &String| {
            if self.cities.contains(city) {
                Ok(())
            } else {
                Err(EnvironmentError::UnsupportedCity { city: city.clone() })
            }
        };
        Ok(match request {
            SelectRequest::Accommodations { city } => {
                city_rows(city)?;
                Rows::Accommodations(self.accommodations.get(city).cloned().unwrap_or_default())
            }
            SelectRequest::Attractions { city } => {
                city_rows(city)?;
                Rows::Attractions(self.attractions.get(city).cloned().unwrap_or_default())
            }
            SelectRequest::Restaurants { city } => {
                city_rows(city)?;
                Rows::Restaurants(self.restaurants.get(city).cloned().unwrap_or_default())
            }
            SelectRequest::Intercity {
                from_city,
                to_city,
                mode,
            } => Rows::Intercity(
                self.intercity
                    .iter()
                    .filter(|(from, to, transport)| {
                        from == from_city && to == to_city && transport.mode == *mode
                    })
                    .map(|(_, _, transport)| transport.clone())
                    .collect(),
            ),
        })
    }

    fn page(rows: &Rows, offset: usize, size: usize) -> Rows {
        fn slice<T: Clone>(items: &[T], offset: usize, size: usize) -> Vec<T> {
            items.iter().skip(offset).take(size).cloned().collect()
        }
        match rows {
            Rows::Accommodations(items) => Rows::Accommodations(slice(items, offset, size)),
            Rows::Attractions(items) => Rows::Attractions(slice(items, offset, size)),
            Rows::Restaurants(items) => Rows::Restaurants(slice(items, offset, size)),
            Rows::Intercity(items) => Rows::Intercity(slice(items, offset, size)),
        }
    }

    fn leg(
        &self,
        request: &RouteRequest<'_>,
        mode: InnercityMode,
        from: &str,
        to: &str,
        start: ClockTime,
        minutes: u32,
    ) -> Result<InnercitySegment, EnvironmentError> {
        let model = self
            .legs
            .get(&mode)
            .ok_or_else(|| EnvironmentError::NoRoute {
                from: request.from.to_owned(),
                to: request.to.to_owned(),
                mode: request.mode,
            })?;
        Ok(InnercitySegment {
            mode,
            start: from.to_owned(),
            end: to.to_owned(),
            start_time: start,
            end_time: start.add_minutes(minutes),
            price: model.price,
            cost: model.price,
            tickets: None,
            cars: None,
        })
    }
}

impl TravelEnvironment for MemoryEnvironment {
    fn select(&mut self, request: &SelectRequest) -> Result<Rows, EnvironmentError> {
        let rows = self.table(request)?;
        let first = Self::page(&rows, 0, self.page_size);
        self.cursor = Some((rows, self.page_size));
        Ok(first)
    }

    fn next_page(&mut self) -> Result<Rows, EnvironmentError> {
        let (rows, offset) = self
            .cursor
            .as_mut()
            .ok_or(EnvironmentError::NoActiveSelection)?;
        let page = Self::page(rows, *offset, self.page_size);
        *offset = offset.saturating_add(self.page_size);
        Ok(page)
    }

    fn innercity_route(
        &self,
        request: &RouteRequest<'_>,
    ) -> Result<Vec<InnercitySegment>, EnvironmentError> {
        if request.from == request.to {
            return Ok(Vec::new());
        }
        let minutes = self
            .legs
            .get(&request.mode)
            .map(|model| model.minutes)
            .unwrap_or_default();
        match request.mode {
            InnercityMode::Metro => {
                let station_in = format!("{} metro", request.from);
                let station_out = format!("{} metro", request.to);
                let access = self.metro_access_minutes;
                let walk_in = self.leg(
                    request,
                    InnercityMode::Walk,
                    request.from,
                    &station_in,
                    request.start,
                    access,
                )?;
                let ride = self.leg(
                    request,
                    InnercityMode::Metro,
                    &station_in,
                    &station_out,
                    walk_in.end_time,
                    minutes,
                )?;
                let walk_out = self.leg(
                    request,
                    InnercityMode::Walk,
                    &station_out,
                    request.to,
                    ride.end_time,
                    access,
                )?;
                Ok(vec![walk_in, ride, walk_out])
            }
            mode => Ok(vec![self.leg(
                request,
                mode,
                request.from,
                request.to,
                request.start,
                minutes,
            )?]),
        }
    }

    fn supports_city(&self, city: &str) -> bool {
        self.cities.contains(city)
    }
}

type Check<T> = Box<dyn Fn(&Query, &Itinerary) -> T + Send + Sync>;
type Score = Box<dyn Fn(&PreferenceObjective, &Itinerary) -> Option<f64> + Send + Sync>;

/// `ConstraintEvaluator` backed by closures.
pub struct FnEvaluator {
    commonsense: Check<bool>,
    logical: Check<Vec<bool>>,
    preference: Score,
}

impl FnEvaluator {
    /// Build from commonsense and logical checks; preferences are `None`.
    pub fn new(
        commonsense: impl Fn(&Query, &Itinerary) -> bool + Send + Sync + 'static,
        logical: impl Fn(&Query, &Itinerary) -> Vec<bool> + Send + Sync + 'static,
    ) -> Self {
        Self {
            commonsense: Box::new(commonsense),
            logical: Box::new(logical),
            preference: Box::new(|_, _| None),
        }
    }

    /// Accept every plan and pass every logical constraint.
    pub fn accept_all() -> Self {
        Self::new(
            |_, _| true,
            |query, _| vec![true; query.logical_constraints.len()],
        )
    }

    /// Reject every plan.
    pub fn reject_all() -> Self {
        Self::new(
            |_, _| false,
            |query, _| vec![false; query.logical_constraints.len()],
        )
    }

    /// Score preferences with `preference`.
    #[must_use]
    pub fn with_preference(
        mut self,
        preference: impl Fn(&PreferenceObjective, &Itinerary) -> Option<f64> + Send + Sync + 'static,
    ) -> Self {
        self.preference = Box::new(preference);
        self
    }
}

impl std::fmt::Debug for FnEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEvaluator").finish_non_exhaustive()
    }
}

impl ConstraintEvaluator for FnEvaluator {
    fn commonsense(&self, query: &Query, plan: &Itinerary) -> bool {
        (self.commonsense)(query, plan)
    }

    fn logical(&self, query: &Query, plan: &Itinerary) -> Vec<bool> {
        (self.logical)(query, plan)
    }

    fn preference(&self, objective: &PreferenceObjective, plan: &Itinerary) -> Option<f64> {
        (self.preference)(objective, plan)
    }
}

/// `CompletionClient` replaying canned answers in order.
///
/// Requests made after the script runs out fail with
/// [`CompletionError::EmptyResponse`]. Every request is recorded.
#[derive(Debug, Default)]
pub struct ScriptedCompletionClient {
    answers: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletionClient {
    /// Replay `answers`.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Conversations received so far.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl CompletionClient for ScriptedCompletionClient {
    fn name(&self) -> &str {
        "scripted"
    }

    fn issue_completion(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, CompletionError> {
        options.validate()?;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .map(|answer| answer.trim().to_owned())
            .ok_or(CompletionError::EmptyResponse)
    }
}
