//! Intercity timetables and innercity transfer segments.

use std::fmt;
use std::str::FromStr;

use crate::ClockTime;

/// Mode of an intercity journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum IntercityMode {
    /// Scheduled train.
    Train,
    /// Scheduled flight.
    Airplane,
}

impl IntercityMode {
    /// Every intercity mode, in the order the planner queries them.
    pub const ALL: [Self; 2] = [Self::Train, Self::Airplane];

    /// Lowercase name used in queries and constraint expressions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Airplane => "airplane",
        }
    }
}

impl fmt::Display for IntercityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntercityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "airplane" | "flight" => Ok(Self::Airplane),
            _ => Err(format!("unknown intercity mode '{s}'")),
        }
    }
}

/// One scheduled train or flight between two cities.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntercityTransport {
    /// Train number or flight code.
    pub id: String,
    /// Train or airplane.
    pub mode: IntercityMode,
    /// Departure station or airport.
    pub from: String,
    /// Arrival station or airport.
    pub to: String,
    /// Scheduled departure.
    pub depart: ClockTime,
    /// Scheduled arrival.
    pub arrive: ClockTime,
    /// Price of one ticket.
    pub cost: u32,
}

/// Mode of an innercity transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum InnercityMode {
    /// On foot.
    Walk,
    /// Taxi, four passengers per car.
    Taxi,
    /// Metro, one ticket per passenger.
    Metro,
}

impl InnercityMode {
    /// Passengers carried by one taxi.
    pub const TAXI_SEATS: u32 = 4;

    /// Default preference order when a query expresses none.
    pub const DEFAULT_ORDER: [Self; 3] = [Self::Metro, Self::Taxi, Self::Walk];

    /// Lowercase name used in queries and constraint expressions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Taxi => "taxi",
            Self::Metro => "metro",
        }
    }
}

impl fmt::Display for InnercityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InnercityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "walk" => Ok(Self::Walk),
            "taxi" => Ok(Self::Taxi),
            "metro" | "subway" => Ok(Self::Metro),
            _ => Err(format!("unknown innercity mode '{s}'")),
        }
    }
}

/// One leg of an innercity transfer.
///
/// Environments report `price` per unit (per ticket, per car, zero for
/// walking); [`InnercitySegment::for_party`] derives the party cost.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InnercitySegment {
    /// Mode of this leg.
    pub mode: InnercityMode,
    /// Where the leg starts.
    pub start: String,
    /// Where the leg ends.
    pub end: String,
    /// Departure time.
    pub start_time: ClockTime,
    /// Arrival time.
    pub end_time: ClockTime,
    /// Unit price.
    pub price: u32,
    /// Cost for the whole party.
    pub cost: u32,
    /// Metro tickets bought.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub tickets: Option<u32>,
    /// Taxis hired.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub cars: Option<u32>,
}

impl InnercitySegment {
    /// Price the leg for a party of `people`.
    ///
    /// # Examples
    /// ```
    /// use itinera_core::{ClockTime, InnercityMode, InnercitySegment};
    ///
    /// let leg = InnercitySegment {
    ///     mode: InnercityMode::Taxi,
    ///     start: "Station".into(),
    ///     end: "Museum".into(),
    ///     start_time: ClockTime::from_hm(10, 0).unwrap(),
    ///     end_time: ClockTime::from_hm(10, 20).unwrap(),
    ///     price: 30,
    ///     cost: 30,
    ///     tickets: None,
    ///     cars: None,
    /// }
    /// .for_party(5);
    /// assert_eq!(leg.cars, Some(2));
    /// assert_eq!(leg.cost, 60);
    /// ```
    #[must_use]
    pub fn for_party(mut self, people: u32) -> Self {
        let people = people.max(1);
        match self.mode {
            InnercityMode::Walk => {
                self.cost = 0;
            }
            InnercityMode::Taxi => {
                let cars = people.div_ceil(Self::taxi_seats());
                self.cars = Some(cars);
                self.cost = self.price.saturating_mul(cars);
            }
            InnercityMode::Metro => {
                self.tickets = Some(people);
                self.cost = self.price.saturating_mul(people);
            }
        }
        self
    }

    const fn taxi_seats() -> u32 {
        InnercityMode::TAXI_SEATS
    }
}
