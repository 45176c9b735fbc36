//! Unit coverage for the symbolic evaluator.

use itinera_core::{
    CommonsenseRule, CommonsenseRules, ConstraintEvaluator, PreferenceObjective, Query,
};
use rstest::{fixture, rstest};

use crate::test_support::{day_trip, weekend_trip};
use crate::{SymbolicEvaluator, Value};

#[fixture]
fn evaluator() -> SymbolicEvaluator {
    SymbolicEvaluator::default()
}

fn query(people: u32, days: u32) -> Query {
    Query::new("unit", "Shanghai", "Suzhou", people, days)
}

#[rstest]
fn accepts_well_formed_trips(evaluator: SymbolicEvaluator) {
    assert!(evaluator.commonsense(&query(2, 1), &day_trip(2)));
    assert!(evaluator.commonsense(&query(3, 2), &weekend_trip(3)));
    assert!(evaluator.violations(&query(3, 2), &weekend_trip(3)).is_empty());
}

#[rstest]
fn reports_one_violation_per_broken_rule(evaluator: SymbolicEvaluator) {
    let violations = evaluator.violations(&query(3, 2), &day_trip(2));
    let rules: Vec<CommonsenseRule> = violations.iter().map(|violation| violation.rule).collect();
    assert_eq!(
        rules,
        vec![CommonsenseRule::DayCount, CommonsenseRule::PartyCounts]
    );
}

#[rstest]
fn disabled_rules_are_not_checked(evaluator: SymbolicEvaluator) {
    let mut lenient = query(3, 2);
    lenient.commonsense = CommonsenseRule::ALL
        .into_iter()
        .filter(|rule| !matches!(rule, CommonsenseRule::DayCount | CommonsenseRule::PartyCounts))
        .collect::<CommonsenseRules>();
    assert!(evaluator.commonsense(&lenient, &day_trip(2)));
}

#[rstest]
fn evaluates_each_logical_constraint(evaluator: SymbolicEvaluator) {
    let constrained = query(2, 1)
        .with_constraint("total_cost <= 800")
        .with_constraint("'garden' in attraction_types")
        .with_constraint("{'jiangsu'} == food_types and restaurant_count == 1")
        .with_constraint("innercity_transport <= {'metro'}");
    assert_eq!(
        evaluator.logical(&constrained, &day_trip(2)),
        vec![true, true, true, false]
    );
    assert_eq!(evaluator.logical_passes(&constrained, &day_trip(2)), 3);
}

#[rstest]
#[case("total_cost <=")]
#[case("unknown_concept > 1")]
#[case("total_cost + 1")]
fn unusable_constraints_count_as_failed(evaluator: SymbolicEvaluator, #[case] source: &str) {
    let constrained = query(2, 1).with_constraint(source);
    assert_eq!(evaluator.logical(&constrained, &day_trip(2)), vec![false]);
}

#[rstest]
fn constants_are_visible_to_expressions() {
    let evaluator = SymbolicEvaluator::default()
        .with_constant("budget", Value::from(700_u32))
        .with_constant("days", Value::from(5_u32));
    let constrained = query(2, 1)
        .with_constraint("total_cost <= budget")
        .with_constraint("days == 5");
    assert_eq!(
        evaluator.logical(&constrained, &day_trip(2)),
        vec![true, true]
    );
}

#[rstest]
#[case("maximize attraction_count", Some(2.0))]
#[case("minimize total_cost", Some(900.0))]
#[case("minimize cost_per_head\ntotal_cost / people_number", Some(450.0))]
#[case("maximize variety\nattraction_types", None)]
#[case("maximize nothing\nmissing_concept", None)]
fn preferences_evaluate_objective_code(
    evaluator: SymbolicEvaluator,
    #[case] objective: &str,
    #[case] expected: Option<f64>,
) {
    let objective: PreferenceObjective = objective.parse().expect("valid objective");
    assert_eq!(evaluator.preference(&objective, &weekend_trip(2)), expected);
}
