//! Distance-based innercity routing.
//!
//! [`DistanceRouter`] prices and times a transfer from the great-circle
//! distance between two positions. Each [`InnercityMode`] has a
//! [`ModeProfile`] giving its speed and fare; metro journeys are three legs
//! (walk to the station, ride, walk from the station) and the other modes a
//! single leg. Segments carry unit prices; the planner scales them to the
//! party size.
//!
//! # Example
//!
//! ```
//! use geo::Coord;
//! use itinera_core::{ClockTime, InnercityMode, RouteRequest};
//! use itinera_data::routing::DistanceRouter;
//!
//! let router = DistanceRouter::default();
//! let request = RouteRequest {
//!     city: "Suzhou",
//!     from: "Suzhou Station",
//!     to: "Lion Grove",
//!     start: ClockTime::hm(10, 0),
//!     mode: InnercityMode::Taxi,
//! };
//! let legs = router.route(
//!     &request,
//!     Coord { x: 120.610, y: 31.330 },
//!     Coord { x: 120.627, y: 31.322 },
//! );
//! assert_eq!(legs.len(), 1);
//! assert!(legs[0].end_time > legs[0].start_time);
//! ```

use geo::{Coord, Distance, Haversine, Point};
use itinera_core::{ClockTime, InnercityMode, InnercitySegment, RouteRequest};

/// Speed and fare of one innercity mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    /// Travel speed in metres per minute.
    pub metres_per_minute: f64,
    /// Flat fare charged per ticket or car.
    pub base_fare: u32,
    /// Fare added per kilometre travelled.
    pub fare_per_km: f64,
}

impl ModeProfile {
    /// A mode moving at `metres_per_minute` with the given fares.
    #[must_use]
    pub const fn new(metres_per_minute: f64, base_fare: u32, fare_per_km: f64) -> Self {
        Self {
            metres_per_minute,
            base_fare,
            fare_per_km,
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "travel time is derived from a metric distance"
    )]
    fn minutes(&self, metres: f64) -> u32 {
        if self.metres_per_minute <= 0.0 {
            return 0;
        }
        ceil_u32(metres / self.metres_per_minute).max(1)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "fares are derived from a metric distance"
    )]
    fn fare(&self, metres: f64) -> u32 {
        self.base_fare
            .saturating_add(ceil_u32(metres / 1_000.0 * self.fare_per_km))
    }
}

/// Tunables of [`DistanceRouter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceRouterConfig {
    /// Walking profile; walking is free.
    pub walk: ModeProfile,
    /// Taxi profile; fares are per car.
    pub taxi: ModeProfile,
    /// Metro profile; fares are per ticket.
    pub metro: ModeProfile,
    /// Minutes to walk between a position and its nearest metro station.
    pub metro_access_minutes: u32,
}

impl Default for DistanceRouterConfig {
    fn default() -> Self {
        Self {
            walk: ModeProfile::new(80.0, 0, 0.0),
            taxi: ModeProfile::new(500.0, 11, 2.5),
            metro: ModeProfile::new(600.0, 2, 0.4),
            metro_access_minutes: 5,
        }
    }
}

impl DistanceRouterConfig {
    /// Replace the profile used for `mode`.
    #[must_use]
    pub const fn with_profile(mut self, mode: InnercityMode, profile: ModeProfile) -> Self {
        match mode {
            InnercityMode::Walk => self.walk = profile,
            InnercityMode::Taxi => self.taxi = profile,
            InnercityMode::Metro => self.metro = profile,
        }
        self
    }

    /// Set the station access time for metro journeys.
    #[must_use]
    pub const fn with_metro_access_minutes(mut self, minutes: u32) -> Self {
        self.metro_access_minutes = minutes;
        self
    }

    const fn profile(&self, mode: InnercityMode) -> &ModeProfile {
        match mode {
            InnercityMode::Walk => &self.walk,
            InnercityMode::Taxi => &self.taxi,
            InnercityMode::Metro => &self.metro,
        }
    }
}

/// Routes transfers by great-circle distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceRouter {
    config: DistanceRouterConfig,
}

impl DistanceRouter {
    /// A router with explicit tunables.
    #[must_use]
    pub const fn with_config(config: DistanceRouterConfig) -> Self {
        Self { config }
    }

    /// The router's tunables.
    #[must_use]
    pub const fn config(&self) -> &DistanceRouterConfig {
        &self.config
    }

    /// Straight-line distance in metres between two WGS84 positions.
    #[must_use]
    pub fn distance_metres(from: Coord<f64>, to: Coord<f64>) -> f64 {
        Haversine.distance(Point::from(from), Point::from(to))
    }

    /// Legs of the transfer described by `request` between the positions at
    /// `from` and `to`. Transfers between identical names have no legs.
    #[must_use]
    pub fn route(
        &self,
        request: &RouteRequest<'_>,
        from: Coord<f64>,
        to: Coord<f64>,
    ) -> Vec<InnercitySegment> {
        if request.from == request.to {
            return Vec::new();
        }
        let metres = Self::distance_metres(from, to);
        match request.mode {
            InnercityMode::Metro => self.metro_legs(request, metres),
            mode => vec![self.leg(
                mode,
                request.from,
                request.to,
                request.start,
                metres,
            )],
        }
    }

    fn metro_legs(&self, request: &RouteRequest<'_>, metres: f64) -> Vec<InnercitySegment> {
        let station_in = format!("{} metro", request.from);
        let station_out = format!("{} metro", request.to);
        let access = self.config.metro_access_minutes;
        let walk_in = walking(request.from, &station_in, request.start, access);
        let ride = self.leg(
            InnercityMode::Metro,
            &station_in,
            &station_out,
            walk_in.end_time,
            metres,
        );
        let walk_out = walking(&station_out, request.to, ride.end_time, access);
        vec![walk_in, ride, walk_out]
    }

    fn leg(
        &self,
        mode: InnercityMode,
        from: &str,
        to: &str,
        start: ClockTime,
        metres: f64,
    ) -> InnercitySegment {
        let profile = self.config.profile(mode);
        let price = profile.fare(metres);
        InnercitySegment {
            mode,
            start: from.to_owned(),
            end: to.to_owned(),
            start_time: start,
            end_time: start.add_minutes(profile.minutes(metres)),
            price,
            cost: price,
            tickets: None,
            cars: None,
        }
    }
}

fn walking(from: &str, to: &str, start: ClockTime, minutes: u32) -> InnercitySegment {
    InnercitySegment {
        mode: InnercityMode::Walk,
        start: from.to_owned(),
        end: to.to_owned(),
        start_time: start,
        end_time: start.add_minutes(minutes),
        price: 0,
        cost: 0,
        tickets: None,
        cars: None,
    }
}

/// Round a non-negative quantity up to a whole number, saturating at
/// `u32::MAX`. Non-finite and negative inputs give zero.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is finite, non-negative and clamped to the u32 range"
)]
fn ceil_u32(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.ceil().min(f64::from(u32::MAX)) as u32
}
