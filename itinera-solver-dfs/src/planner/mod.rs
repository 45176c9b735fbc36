//! `DfsPlanner`: the depth-first implementation of [`Planner`].
//!
//! A planning call validates the query, loads every candidate the search may
//! need from the environment, then enumerates outbound journey, return
//! journey and hotel combinations. Each combination seeds a depth-first
//! search over the trip's days, see `search.rs`.

mod search;

use std::time::{Duration, Instant};

use itinera_core::{
    Accommodation, Attraction, ConstraintEvaluator, Diagnostics, EnvironmentError,
    IntercityMode, IntercityTransport, Itinerary, PlanResponse, PlanTier, Planner, Query,
    QueryValidationError, Restaurant, SelectRequest, TravelEnvironment, collect_all,
};
use thiserror::Error;

use crate::{BestEffort, DfsPlannerConfig, RuleHeuristic, SearchAbort, SearchHeuristic};

use search::{Search, SearchStats};

/// Reasons a query is answered without searching.
#[derive(Debug, Error)]
enum Rejection {
    #[error(transparent)]
    Invalid(#[from] QueryValidationError),
    #[error("no data for city {0:?}")]
    UnsupportedCity(String),
    #[error("preference search needs a preference objective")]
    MissingPreference,
    #[error("failed to load candidates: {0}")]
    Environment(#[from] EnvironmentError),
}

/// Candidates loaded once per planning call.
#[derive(Debug, Default)]
struct PoiMemory {
    accommodations: Vec<Accommodation>,
    attractions: Vec<Attraction>,
    restaurants: Vec<Restaurant>,
    go: Vec<IntercityTransport>,
    back: Vec<IntercityTransport>,
}

impl PoiMemory {
    fn load<E>(environment: &mut E, query: &Query) -> Result<Self, EnvironmentError>
    where
        E: TravelEnvironment + ?Sized,
    {
        let city = &query.target_city;
        let accommodations = collect_all(
            environment,
            &SelectRequest::Accommodations { city: city.clone() },
        )?
        .into_accommodations()?;
        let attractions =
            collect_all(environment, &SelectRequest::Attractions { city: city.clone() })?
                .into_attractions()?;
        let restaurants =
            collect_all(environment, &SelectRequest::Restaurants { city: city.clone() })?
                .into_restaurants()?;
        let go = Self::journeys(environment, &query.start_city, &query.target_city)?;
        let back = Self::journeys(environment, &query.target_city, &query.start_city)?;
        log::debug!(
            "loaded {} hotels, {} attractions, {} restaurants, {} outbound and {} return journeys",
            accommodations.len(),
            attractions.len(),
            restaurants.len(),
            go.len(),
            back.len()
        );
        Ok(Self {
            accommodations,
            attractions,
            restaurants,
            go,
            back,
        })
    }

    fn journeys<E>(
        environment: &mut E,
        from_city: &str,
        to_city: &str,
    ) -> Result<Vec<IntercityTransport>, EnvironmentError>
    where
        E: TravelEnvironment + ?Sized,
    {
        let mut journeys = Vec::new();
        for mode in IntercityMode::ALL {
            let request = SelectRequest::Intercity {
                from_city: from_city.to_owned(),
                to_city: to_city.to_owned(),
                mode,
            };
            journeys.extend(collect_all(environment, &request)?.into_intercity()?);
        }
        Ok(journeys)
    }
}

/// Depth-first itinerary planner.
///
/// Generic over the collaborators it consults: a data environment, a
/// constraint evaluator and a search heuristic.
///
/// # Examples
/// ```
/// use itinera_core::{Planner, PlanTier, Query};
/// use itinera_solver_dfs::test_support::{single_day_environment, structural_evaluator};
/// use itinera_solver_dfs::{DfsPlanner, RuleHeuristic};
///
/// let mut planner = DfsPlanner::new(
///     single_day_environment(),
///     structural_evaluator(),
///     RuleHeuristic::default(),
/// );
/// let response = planner.plan(&Query::new("demo", "Shanghai", "Suzhou", 2, 1));
/// assert!(response.success);
/// assert_eq!(response.tier, PlanTier::LogicalValid);
/// ```
pub struct DfsPlanner<E, V, H = RuleHeuristic>
where
    E: TravelEnvironment,
    V: ConstraintEvaluator,
    H: SearchHeuristic,
{
    environment: E,
    evaluator: V,
    heuristic: H,
    config: DfsPlannerConfig,
}

impl<E, V, H> DfsPlanner<E, V, H>
where
    E: TravelEnvironment,
    V: ConstraintEvaluator,
    H: SearchHeuristic,
{
    /// Construct a planner using default configuration.
    pub fn new(environment: E, evaluator: V, heuristic: H) -> Self {
        Self::with_config(environment, evaluator, heuristic, DfsPlannerConfig::default())
    }

    /// Construct a planner with explicit configuration.
    pub const fn with_config(
        environment: E,
        evaluator: V,
        heuristic: H,
        config: DfsPlannerConfig,
    ) -> Self {
        Self {
            environment,
            evaluator,
            heuristic,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DfsPlannerConfig {
        &self.config
    }

    /// The data environment.
    #[must_use]
    pub const fn environment(&self) -> &E {
        &self.environment
    }

    /// The search heuristic.
    #[must_use]
    pub const fn heuristic(&self) -> &H {
        &self.heuristic
    }

    fn search(
        &mut self,
        query: &Query,
        memory: &PoiMemory,
        charged_before: Duration,
    ) -> (PlanResponse, SearchStats) {
        let mut search = Search::new(
            &self.environment,
            &self.evaluator,
            &mut self.heuristic,
            &self.config,
            query,
            memory,
            charged_before,
        );
        let outcome = search.run();
        let budget = search.budget();
        let (tracker, stats) = search.finish();
        (compose(outcome, tracker.into_best(), budget), stats)
    }

    fn prepare(&mut self, query: &Query) -> Result<PoiMemory, Rejection> {
        query.validate()?;
        for city in [&query.start_city, &query.target_city] {
            if !self.environment.supports_city(city) {
                return Err(Rejection::UnsupportedCity(city.clone()));
            }
        }
        if self.config.preference_search && query.preference.is_none() {
            return Err(Rejection::MissingPreference);
        }
        Ok(PoiMemory::load(&mut self.environment, query)?)
    }
}

impl<E, V, H> Planner for DfsPlanner<E, V, H>
where
    E: TravelEnvironment,
    V: ConstraintEvaluator,
    H: SearchHeuristic,
{
    fn plan(&mut self, query: &Query) -> PlanResponse {
        let started = Instant::now();
        let charged_before = self.heuristic.inference_time();
        self.heuristic.begin(query);
        log::info!(
            "planning {}: {} -> {}, {} people, {} days",
            query.uid,
            query.start_city,
            query.target_city,
            query.people,
            query.days
        );

        let (response, stats) = self.prepare(query).map_or_else(
            |rejection| {
                log::warn!("{}: {rejection}", query.uid);
                (PlanResponse::empty(), SearchStats::default())
            },
            |memory| self.search(query, &memory, charged_before),
        );

        let diagnostics = Diagnostics {
            search_time: started.elapsed(),
            llm_inference_time: self
                .heuristic
                .inference_time()
                .saturating_sub(charged_before),
            nodes_expanded: stats.nodes,
            validations: stats.validations,
        };
        log::info!(
            "{}: {:?} after {} nodes and {} validations in {:.3}s",
            query.uid,
            response.tier,
            diagnostics.nodes_expanded,
            diagnostics.validations,
            diagnostics.search_time.as_secs_f64()
        );
        response.with_diagnostics(diagnostics)
    }
}

/// Turn a search outcome into a response, falling back to the best-effort
/// itinerary when no plan was accepted.
fn compose(
    outcome: Result<Option<Itinerary>, SearchAbort>,
    best: Option<BestEffort>,
    budget: Option<u32>,
) -> PlanResponse {
    let time_out_flag = matches!(outcome, Err(SearchAbort::TimedOut { .. }));
    match outcome {
        Ok(Some(itinerary)) => {
            return PlanResponse {
                itinerary,
                success: true,
                tier: PlanTier::LogicalValid,
                ..PlanResponse::default()
            };
        }
        Ok(None) => {}
        Err(SearchAbort::TimedOut { elapsed }) => {
            log::warn!("search timed out after {:.3}s", elapsed.as_secs_f64());
        }
        Err(SearchAbort::Environment(error)) => {
            log::warn!("search abandoned: {error}");
        }
    }
    let Some(best) = best else {
        return PlanResponse {
            time_out_flag,
            ..PlanResponse::empty()
        };
    };
    let budget_exceeded = budget.is_some_and(|limit| best.itinerary.total_cost() > limit);
    PlanResponse {
        success: best.tier == PlanTier::LogicalValid,
        tier: best.tier,
        itinerary: best.itinerary,
        time_out_flag,
        preference_value: best.preference_value,
        budget_exceeded,
        ..PlanResponse::default()
    }
}
