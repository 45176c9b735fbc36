//! Behavioural tests for the paginated `TravelEnvironment` protocol.

use std::cell::RefCell;

use itinera_core::test_support::MemoryEnvironment;
use itinera_core::{
    Attraction, ClockTime, EnvironmentError, InnercityMode, InnercitySegment, RouteRequest, Rows,
    SelectRequest, TravelEnvironment, collect_all,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const CITY: &str = "Suzhou";

#[fixture]
fn environment() -> RefCell<MemoryEnvironment> {
    RefCell::new(MemoryEnvironment::default())
}

#[fixture]
fn rows() -> RefCell<Option<Result<Rows, EnvironmentError>>> {
    RefCell::new(None)
}

#[fixture]
fn route() -> RefCell<Vec<InnercitySegment>> {
    RefCell::new(Vec::new())
}

#[expect(clippy::expect_used, reason = "fixture data is valid")]
fn attraction(index: usize) -> Attraction {
    Attraction::new(
        format!("Garden {index}"),
        "garden",
        20,
        ClockTime::from_hm(8, 0).expect("valid time"),
        ClockTime::from_hm(17, 0).expect("valid time"),
        90,
    )
    .expect("valid attraction")
}

#[given("an environment with 5 attractions in Suzhou and a page size of 2")]
fn given_environment(#[from(environment)] environment: &RefCell<MemoryEnvironment>) {
    let env = (0..5).fold(MemoryEnvironment::default().with_page_size(2), |env, index| {
        env.with_attraction(CITY, attraction(index))
    });
    *environment.borrow_mut() = env;
}

#[when("I collect all attractions in Suzhou")]
fn when_collect(
    #[from(environment)] environment: &RefCell<MemoryEnvironment>,
    #[from(rows)] rows: &RefCell<Option<Result<Rows, EnvironmentError>>>,
) {
    let request = SelectRequest::Attractions { city: CITY.into() };
    *rows.borrow_mut() = Some(collect_all(&mut *environment.borrow_mut(), &request));
}

#[when("I request the next page without selecting")]
fn when_next_page(
    #[from(environment)] environment: &RefCell<MemoryEnvironment>,
    #[from(rows)] rows: &RefCell<Option<Result<Rows, EnvironmentError>>>,
) {
    *rows.borrow_mut() = Some(environment.borrow_mut().next_page());
}

#[when("I route 6 travellers by taxi between two attractions")]
fn when_route(
    #[from(environment)] environment: &RefCell<MemoryEnvironment>,
    #[from(route)] route: &RefCell<Vec<InnercitySegment>>,
) {
    #[expect(clippy::expect_used, reason = "test asserts a route exists")]
    let legs = environment
        .borrow()
        .innercity_route(&RouteRequest {
            city: CITY,
            from: "Garden 0",
            to: "Garden 1",
            start: ClockTime::from_hm(9, 0).expect("valid time"),
            mode: InnercityMode::Taxi,
        })
        .expect("taxi route");
    *route.borrow_mut() = legs.into_iter().map(|leg| leg.for_party(6)).collect();
}

#[then("5 attractions are returned in insertion order")]
fn then_all_rows(#[from(rows)] rows: &RefCell<Option<Result<Rows, EnvironmentError>>>) {
    #[expect(clippy::expect_used, reason = "test asserts collection succeeded")]
    let attractions = rows
        .borrow_mut()
        .take()
        .expect("collection ran")
        .expect("collection succeeded")
        .into_attractions()
        .expect("attraction rows");
    let names: Vec<_> = attractions.iter().map(|row| row.name.clone()).collect();
    let expected: Vec<_> = (0..5).map(|index| format!("Garden {index}")).collect();
    assert_eq!(names, expected);
}

#[then("a missing selection error is returned")]
fn then_no_selection(#[from(rows)] rows: &RefCell<Option<Result<Rows, EnvironmentError>>>) {
    assert!(matches!(
        rows.borrow().as_ref(),
        Some(Err(EnvironmentError::NoActiveSelection))
    ));
}

#[then("the route needs 2 cars")]
fn then_cars(#[from(route)] route: &RefCell<Vec<InnercitySegment>>) {
    let legs = route.borrow();
    assert_eq!(legs.len(), 1);
    assert_eq!(legs.first().and_then(|leg| leg.cars), Some(2));
    assert_eq!(legs.first().map(|leg| leg.cost), Some(40));
}

#[scenario(path = "tests/features/travel_environment.feature", index = 0)]
fn collects_every_page(
    environment: RefCell<MemoryEnvironment>,
    rows: RefCell<Option<Result<Rows, EnvironmentError>>>,
) {
    let _ = (environment, rows);
}

#[scenario(path = "tests/features/travel_environment.feature", index = 1)]
fn paging_requires_selection(
    environment: RefCell<MemoryEnvironment>,
    rows: RefCell<Option<Result<Rows, EnvironmentError>>>,
) {
    let _ = (environment, rows);
}

#[scenario(path = "tests/features/travel_environment.feature", index = 2)]
fn prices_taxi_for_party(
    environment: RefCell<MemoryEnvironment>,
    route: RefCell<Vec<InnercitySegment>>,
) {
    let _ = (environment, route);
}
