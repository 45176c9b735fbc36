//! Language-model guided heuristic.

use std::time::{Duration, Instant};

use itinera_core::{
    Accommodation, Attraction, ChatMessage, ClockTime, CompletionClient, CompletionOptions,
    InnercityMode, IntercityTransport, MealKind, Query, Restaurant,
};

use super::{NextKind, RoomRequest, RuleHeuristic, SearchContext, SearchHeuristic};

const SYSTEM_PROMPT: &str = "You are a travel planner building a day-by-day itinerary. \
Answer with exactly what is asked and nothing else.";

/// Heuristic that asks a language model for the next activity, the visit
/// length and the preferred attractions and restaurants.
///
/// Every question falls back to a [`RuleHeuristic`] when the model fails or
/// answers outside the options. Time spent waiting on the model is
/// accumulated and reported through
/// [`SearchHeuristic::inference_time`], which the planner adds to its
/// budget.
#[derive(Debug)]
pub struct LlmHeuristic<C> {
    client: C,
    fallback: RuleHeuristic,
    inference: Duration,
    attraction_preference: Option<Vec<String>>,
    restaurant_preference: Option<Vec<String>>,
}

impl<C: CompletionClient> LlmHeuristic<C> {
    /// Guide the search with `client`, falling back to the default rules.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self::with_fallback(client, RuleHeuristic::default())
    }

    /// Guide the search with `client`, falling back to `fallback`.
    #[must_use]
    pub const fn with_fallback(client: C, fallback: RuleHeuristic) -> Self {
        Self {
            client,
            fallback,
            inference: Duration::ZERO,
            attraction_preference: None,
            restaurant_preference: None,
        }
    }

    /// The wrapped client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    fn ask(&mut self, question: String) -> Option<String> {
        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(question)];
        let started = Instant::now();
        let answer = self
            .client
            .issue_completion(&messages, CompletionOptions::ONE_LINE);
        self.inference = self.inference.saturating_add(started.elapsed());
        match answer {
            Ok(text) => Some(text),
            Err(error) => {
                log::warn!("{} completion failed: {error}", self.client.name());
                None
            }
        }
    }

    fn preferred_names<'n>(
        &mut self,
        query: &Query,
        what: &str,
        names: impl Iterator<Item = &'n str>,
    ) -> Vec<String> {
        let listing = names.collect::<Vec<_>>().join("; ");
        let question = format!(
            "A party of {} is spending {} day(s) in {}. From these {what}: {listing}\n\
             List the ones they would enjoy most, best first, separated by semicolons.",
            query.people, query.days, query.target_city
        );
        self.ask(question)
            .map(|answer| {
                answer
                    .split(';')
                    .map(|name| name.trim().to_owned())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Move the candidates named in `preferred` to the front of `base`, in the
/// order they were named.
fn promote_named(
    base: Vec<usize>,
    preferred: &[String],
    name_of: impl Fn(usize) -> Option<String>,
) -> Vec<usize> {
    let mut promoted: Vec<usize> = Vec::with_capacity(base.len());
    for wanted in preferred {
        let found = base
            .iter()
            .copied()
            .find(|index| name_of(*index).as_deref() == Some(wanted.as_str()));
        if let Some(index) = found.filter(|index| !promoted.contains(index)) {
            promoted.push(index);
        }
    }
    let rest: Vec<usize> = base
        .into_iter()
        .filter(|index| !promoted.contains(index))
        .collect();
    promoted.extend(rest);
    promoted
}

fn describe_day(context: &SearchContext<'_>) -> String {
    let mut summary = String::new();
    if let Some(day) = context.plan.days.get(context.day_index) {
        for activity in &day.activities {
            summary.push_str(&format!(
                "{}-{} {} at {}\n",
                activity.start_time,
                activity.end_time,
                activity.kind.tag(),
                activity.position
            ));
        }
    }
    summary
}

impl<C: CompletionClient> SearchHeuristic for LlmHeuristic<C> {
    fn begin(&mut self, query: &Query) {
        self.attraction_preference = None;
        self.restaurant_preference = None;
        self.fallback.begin(query);
    }

    fn rank_go(&mut self, query: &Query, candidates: &[IntercityTransport]) -> Vec<usize> {
        self.fallback.rank_go(query, candidates)
    }

    fn rank_back(
        &mut self,
        query: &Query,
        candidates: &[IntercityTransport],
        go: &IntercityTransport,
    ) -> Vec<usize> {
        self.fallback.rank_back(query, candidates, go)
    }

    fn rank_hotels(&mut self, query: &Query, candidates: &[Accommodation]) -> Vec<usize> {
        self.fallback.rank_hotels(query, candidates)
    }

    fn rank_restaurants(
        &mut self,
        context: &SearchContext<'_>,
        meal: MealKind,
        candidates: &[Restaurant],
    ) -> Vec<usize> {
        let base = self.fallback.rank_restaurants(context, meal, candidates);
        if self.restaurant_preference.is_none() {
            let names = self.preferred_names(
                context.query,
                "restaurants",
                base.iter()
                    .filter_map(|index| candidates.get(*index))
                    .map(|restaurant| restaurant.name.as_str()),
            );
            self.restaurant_preference = Some(names);
        }
        let preferred = self.restaurant_preference.clone().unwrap_or_default();
        promote_named(base, &preferred, |index| {
            candidates.get(index).map(|restaurant| restaurant.name.clone())
        })
    }

    fn rank_attractions(
        &mut self,
        context: &SearchContext<'_>,
        candidates: &[Attraction],
    ) -> Vec<usize> {
        let base = self.fallback.rank_attractions(context, candidates);
        if self.attraction_preference.is_none() {
            let names = self.preferred_names(
                context.query,
                "attractions",
                base.iter()
                    .filter_map(|index| candidates.get(*index))
                    .map(|attraction| attraction.name.as_str()),
            );
            self.attraction_preference = Some(names);
        }
        let preferred = self.attraction_preference.clone().unwrap_or_default();
        promote_named(base, &preferred, |index| {
            candidates.get(index).map(|attraction| attraction.name.clone())
        })
    }

    fn innercity_modes(&mut self, query: &Query) -> Vec<InnercityMode> {
        self.fallback.innercity_modes(query)
    }

    fn decide_rooms(&mut self, query: &Query) -> RoomRequest {
        self.fallback.decide_rooms(query)
    }

    fn budget(&mut self, query: &Query) -> Option<u32> {
        self.fallback.budget(query)
    }

    fn next_kind(&mut self, context: &SearchContext<'_>, legal: &[NextKind]) -> NextKind {
        let options = legal
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let question = format!(
            "Day {} so far:\n{}It is {} and the party is at {}. \
             What should they do next? Options: {options}. Answer with one option.",
            context.day_index.saturating_add(1),
            describe_day(context),
            context.time,
            context.position
        );
        let answer = self
            .ask(question)
            .and_then(|text| text.parse::<NextKind>().ok())
            .filter(|kind| legal.contains(kind));
        answer.unwrap_or_else(|| self.fallback.next_kind(context, legal))
    }

    fn visit_minutes(
        &mut self,
        context: &SearchContext<'_>,
        attraction: &Attraction,
        start: ClockTime,
    ) -> u32 {
        let question = format!(
            "The party arrives at {} ({}) at {start}; it closes at {} and visitors \
             usually stay {} minutes. How many minutes should they stay? Answer with a number.",
            attraction.name,
            attraction.spot_type,
            attraction.close,
            attraction.recommended_visit_minutes
        );
        self.ask(question)
            .and_then(|text| {
                text.trim()
                    .trim_end_matches(|c: char| !c.is_ascii_digit())
                    .parse::<u32>()
                    .ok()
            })
            .filter(|minutes| *minutes > 0)
            .unwrap_or_else(|| self.fallback.visit_minutes(context, attraction, start))
    }

    fn inference_time(&self) -> Duration {
        self.inference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_core::Itinerary;
    use itinera_core::test_support::ScriptedCompletionClient;
    use rstest::rstest;

    use crate::VisitedStacks;

    fn garden(name: &str, price: u32) -> Attraction {
        #[expect(clippy::expect_used, reason = "fixture data is valid")]
        let attraction = Attraction::new(
            name,
            "garden",
            price,
            ClockTime::hm(8, 0),
            ClockTime::hm(17, 0),
            60,
        )
        .expect("valid attraction");
        attraction
    }

    fn with_context<T>(time: ClockTime, run: impl FnOnce(&SearchContext<'_>) -> T) -> T {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 1);
        let plan = Itinerary::new(2, "Shanghai", "Suzhou", 1);
        let visited = VisitedStacks::default();
        run(&SearchContext {
            query: &query,
            plan: &plan,
            day_index: 0,
            time,
            position: "Suzhou Station",
            visited: &visited,
        })
    }

    #[rstest]
    fn follows_legal_answers() {
        let mut heuristic = LlmHeuristic::new(ScriptedCompletionClient::new(["dinner"]));
        let choice = with_context(ClockTime::hm(10, 0), |context| {
            heuristic.next_kind(context, &[NextKind::Attraction, NextKind::Dinner])
        });
        assert_eq!(choice, NextKind::Dinner);
        assert_eq!(heuristic.client().requests().len(), 1);
    }

    #[rstest]
    #[case("hotel")]
    #[case("a nap")]
    fn falls_back_on_unusable_answers(#[case] answer: &str) {
        let mut heuristic = LlmHeuristic::new(ScriptedCompletionClient::new([answer]));
        let choice = with_context(ClockTime::hm(10, 0), |context| {
            heuristic.next_kind(context, &[NextKind::Attraction, NextKind::Lunch])
        });
        assert_eq!(choice, NextKind::Lunch);
    }

    #[rstest]
    fn parses_visit_minutes() {
        let mut heuristic =
            LlmHeuristic::new(ScriptedCompletionClient::new(["120 minutes", "zero"]));
        let attraction = garden("Lingering Garden", 40);
        let (first, second) = with_context(ClockTime::hm(9, 0), |context| {
            (
                heuristic.visit_minutes(context, &attraction, ClockTime::hm(9, 0)),
                heuristic.visit_minutes(context, &attraction, ClockTime::hm(9, 0)),
            )
        });
        assert_eq!((first, second), (120, 60));
    }

    #[rstest]
    fn promotes_named_attractions_once_per_query() {
        let mut heuristic = LlmHeuristic::new(ScriptedCompletionClient::new([
            "Tiger Hill; Nowhere",
        ]));
        let candidates = [garden("Lion Grove", 10), garden("Tiger Hill", 50), garden("Net Master", 30)];
        let (first, second) = with_context(ClockTime::hm(9, 0), |context| {
            (
                heuristic.rank_attractions(context, &candidates),
                heuristic.rank_attractions(context, &candidates),
            )
        });
        assert_eq!(first, vec![1, 0, 2]);
        assert_eq!(second, first);
        assert_eq!(heuristic.client().requests().len(), 1);
    }

    #[rstest]
    fn charges_inference_time_even_on_failure() {
        let mut heuristic = LlmHeuristic::new(ScriptedCompletionClient::default());
        let choice = with_context(ClockTime::hm(18, 0), |context| {
            heuristic.next_kind(context, &[NextKind::Attraction, NextKind::Dinner])
        });
        assert_eq!(choice, NextKind::Dinner);
        assert!(heuristic.inference_time() <= Duration::from_secs(1));
    }
}
