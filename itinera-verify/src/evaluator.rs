//! `SymbolicEvaluator`: the expression-backed [`ConstraintEvaluator`].

use itinera_core::{ConstraintEvaluator, Itinerary, PreferenceObjective, Query};

use crate::{Concepts, Expression, ExpressionError, Value, Violation, check_rule};

/// Judges itineraries with the commonsense rules and the expression
/// language.
///
/// Logical constraints are boolean expressions over [`Concepts`]; a
/// constraint that fails to parse or evaluate counts as failed. Preference
/// objectives evaluate their code to a number.
///
/// # Examples
/// ```
/// use itinera_core::{ConstraintEvaluator, Itinerary, Query};
/// use itinera_verify::SymbolicEvaluator;
///
/// let query = Query::new("q", "Shanghai", "Suzhou", 2, 1)
///     .with_constraint("total_cost <= 500")
///     .with_constraint("'museum' in attraction_types");
/// let plan = Itinerary::new(2, "Shanghai", "Suzhou", 1);
/// assert_eq!(SymbolicEvaluator::default().logical(&query, &plan), vec![true, false]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SymbolicEvaluator {
    constants: Concepts,
}

impl SymbolicEvaluator {
    /// Define a named constant for expressions, such as a per-query limit.
    /// Constants replace extracted concepts of the same name.
    #[must_use]
    pub fn with_constant(mut self, name: impl Into<String>, value: Value) -> Self {
        self.constants.insert(name, value);
        self
    }

    /// The concepts expressions see for `plan`.
    #[must_use]
    pub fn concepts(&self, plan: &Itinerary) -> Concepts {
        self.constants
            .iter()
            .fold(Concepts::extract(plan), |concepts, (name, value)| {
                concepts.with(name, value.clone())
            })
    }

    /// Every commonsense violation in `plan` among the rules `query` enables,
    /// at most one per rule.
    #[must_use]
    pub fn violations(&self, query: &Query, plan: &Itinerary) -> Vec<Violation> {
        query
            .commonsense
            .iter()
            .filter_map(|rule| check_rule(rule, query, plan).err())
            .collect()
    }

    /// Evaluate one expression against `plan`.
    ///
    /// # Errors
    /// Propagates [`ExpressionError`] from parsing and evaluation.
    pub fn evaluate(
        &self,
        expression: &str,
        plan: &Itinerary,
    ) -> Result<Value, ExpressionError> {
        Expression::parse(expression)?.evaluate(&self.concepts(plan))
    }
}

impl ConstraintEvaluator for SymbolicEvaluator {
    fn commonsense(&self, query: &Query, plan: &Itinerary) -> bool {
        query.commonsense.iter().all(|rule| {
            check_rule(rule, query, plan)
                .inspect_err(|violation| log::debug!("{}: {violation}", query.uid))
                .is_ok()
        })
    }

    fn logical(&self, query: &Query, plan: &Itinerary) -> Vec<bool> {
        if query.logical_constraints.is_empty() {
            return Vec::new();
        }
        let concepts = self.concepts(plan);
        query
            .logical_constraints
            .iter()
            .map(|source| {
                Expression::parse(source)
                    .and_then(|expression| expression.holds(&concepts))
                    .unwrap_or_else(|error| {
                        log::debug!("{}: constraint {source:?} failed: {error}", query.uid);
                        false
                    })
            })
            .collect()
    }

    fn preference(&self, objective: &PreferenceObjective, plan: &Itinerary) -> Option<f64> {
        Expression::parse(&objective.code)
            .and_then(|expression| expression.measure(&self.concepts(plan)))
            .inspect_err(|error| {
                log::debug!("preference {} not computable: {error}", objective.concept);
            })
            .ok()
    }
}
