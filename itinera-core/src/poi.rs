//! Points of interest offered by a destination city.
//!
//! Records are immutable snapshots owned by the data access environment. The
//! planner caches one copy of each table per search episode.
//!
//! Prices are whole currency units. Coordinates are optional WGS84 positions
//! with `x = longitude` and `y = latitude`; they are only consulted by
//! innercity routers.

use geo::Coord;
use thiserror::Error;

use crate::ClockTime;

/// Errors returned by the validating POI constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoiError {
    /// The record had no name.
    #[error("point of interest must have a name")]
    EmptyName,
    /// Closing time preceded opening time.
    #[error("{name} closes at {close} before opening at {open}")]
    ClosesBeforeOpening {
        /// Name of the rejected record.
        name: String,
        /// Opening time.
        open: ClockTime,
        /// Closing time.
        close: ClockTime,
    },
    /// A hotel offered rooms without beds.
    #[error("{name} offers rooms without beds")]
    NoBeds {
        /// Name of the rejected record.
        name: String,
    },
}

fn check_name(name: &str) -> Result<(), PoiError> {
    if name.trim().is_empty() {
        return Err(PoiError::EmptyName);
    }
    Ok(())
}

fn check_hours(name: &str, open: ClockTime, close: ClockTime) -> Result<(), PoiError> {
    if close < open {
        return Err(PoiError::ClosesBeforeOpening {
            name: name.to_owned(),
            open,
            close,
        });
    }
    Ok(())
}

/// A hotel offering rooms of a single type.
///
/// # Examples
/// ```
/// use itinera_core::Accommodation;
///
/// let hotel = Accommodation::new("Harbour Inn", 300, 2).unwrap();
/// assert_eq!(hotel.rooms_for(3), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accommodation {
    /// Hotel name, unique within a city.
    pub name: String,
    /// Price per room per night.
    pub price: u32,
    /// Beds per room.
    pub beds_per_room: u8,
    /// Optional position.
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<Coord<f64>>,
}

impl Accommodation {
    /// Validate and construct an [`Accommodation`].
    pub fn new(name: impl Into<String>, price: u32, beds_per_room: u8) -> Result<Self, PoiError> {
        let name = name.into();
        check_name(&name)?;
        if beds_per_room == 0 {
            return Err(PoiError::NoBeds { name });
        }
        Ok(Self {
            name,
            price,
            beds_per_room,
            location: None,
        })
    }

    /// Attach a position.
    #[must_use]
    pub fn at(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }

    /// Number of rooms needed to sleep `people`, at least one.
    pub fn rooms_for(&self, people: u32) -> u32 {
        let beds = u32::from(self.beds_per_room.max(1));
        people.max(1).div_ceil(beds)
    }
}

/// A sight with opening hours and a recommended visit length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attraction {
    /// Attraction name, unique within a city.
    pub name: String,
    /// Category such as `museum` or `park`.
    pub spot_type: String,
    /// Ticket price per person.
    pub price: u32,
    /// Opening time.
    pub open: ClockTime,
    /// Closing time.
    pub close: ClockTime,
    /// Recommended minimum visit length in minutes.
    pub recommended_visit_minutes: u32,
    /// Optional position.
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<Coord<f64>>,
}

impl Attraction {
    /// Validate and construct an [`Attraction`].
    pub fn new(
        name: impl Into<String>,
        spot_type: impl Into<String>,
        price: u32,
        open: ClockTime,
        close: ClockTime,
        recommended_visit_minutes: u32,
    ) -> Result<Self, PoiError> {
        let name = name.into();
        check_name(&name)?;
        check_hours(&name, open, close)?;
        Ok(Self {
            name,
            spot_type: spot_type.into(),
            price,
            open,
            close,
            recommended_visit_minutes,
            location: None,
        })
    }

    /// Attach a position.
    #[must_use]
    pub fn at(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }
}

/// A restaurant with opening hours and a per-person price.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Restaurant {
    /// Restaurant name, unique within a city.
    pub name: String,
    /// Cuisine served.
    pub cuisine: String,
    /// Average price per person.
    pub price: u32,
    /// Opening time.
    pub open: ClockTime,
    /// Closing time.
    pub close: ClockTime,
    /// Optional position.
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<Coord<f64>>,
}

impl Restaurant {
    /// Validate and construct a [`Restaurant`].
    pub fn new(
        name: impl Into<String>,
        cuisine: impl Into<String>,
        price: u32,
        open: ClockTime,
        close: ClockTime,
    ) -> Result<Self, PoiError> {
        let name = name.into();
        check_name(&name)?;
        check_hours(&name, open, close)?;
        Ok(Self {
            name,
            cuisine: cuisine.into(),
            price,
            open,
            close,
            location: None,
        })
    }

    /// Attach a position.
    #[must_use]
    pub fn at(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }
}
