//! Scheduled units of an itinerary.
//!
//! An [`Activity`] is a tagged record: the [`ActivityKind`] carries the
//! fields that only make sense for one kind (rooms for a hotel stay, cuisine
//! for a meal), while the shared timing and cost fields live on the activity
//! itself.

use thiserror::Error;

use crate::{ClockTime, InnercitySegment, IntercityMode, IntercityTransport};

/// Errors returned by [`Activity::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivityError {
    /// The activity would end before it starts.
    #[error("activity at {position} ends at {end} before starting at {start}")]
    EndsBeforeStart {
        /// Where the activity takes place.
        position: String,
        /// Proposed start.
        start: ClockTime,
        /// Proposed end.
        end: ClockTime,
    },
}

/// Meal slot within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MealKind {
    /// Taken at the hotel at the start of a day.
    Breakfast,
    /// Midday meal.
    Lunch,
    /// Evening meal.
    Dinner,
}

impl MealKind {
    /// Lowercase name used in itineraries.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }
}

/// Kind-specific payload of an [`Activity`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "lowercase")
)]
pub enum ActivityKind {
    /// A train journey.
    Train {
        /// Train number.
        id: String,
        /// Departure station.
        from: String,
        /// Tickets bought.
        tickets: u32,
    },
    /// A flight.
    Airplane {
        /// Flight code.
        id: String,
        /// Departure airport.
        from: String,
        /// Tickets bought.
        tickets: u32,
    },
    /// An overnight hotel stay.
    Accommodation {
        /// Beds per room.
        room_type: u8,
        /// Rooms booked.
        rooms: u32,
    },
    /// Breakfast at the hotel.
    Breakfast,
    /// Lunch at a restaurant.
    Lunch {
        /// Cuisine served.
        cuisine: String,
    },
    /// Dinner at a restaurant.
    Dinner {
        /// Cuisine served.
        cuisine: String,
    },
    /// A visit to an attraction.
    Attraction {
        /// Attraction category.
        spot_type: String,
        /// Tickets bought.
        tickets: u32,
    },
}

impl ActivityKind {
    /// Lowercase tag used in itineraries and constraint expressions.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Train { .. } => "train",
            Self::Airplane { .. } => "airplane",
            Self::Accommodation { .. } => "accommodation",
            Self::Breakfast => "breakfast",
            Self::Lunch { .. } => "lunch",
            Self::Dinner { .. } => "dinner",
            Self::Attraction { .. } => "attraction",
        }
    }

    /// Build the kind for a meal.
    ///
    /// Breakfast carries no cuisine; `cuisine` is ignored for it.
    pub fn meal(meal: MealKind, cuisine: impl Into<String>) -> Self {
        match meal {
            MealKind::Breakfast => Self::Breakfast,
            MealKind::Lunch => Self::Lunch {
                cuisine: cuisine.into(),
            },
            MealKind::Dinner => Self::Dinner {
                cuisine: cuisine.into(),
            },
        }
    }

    /// The meal slot, if this is a meal.
    pub const fn meal_kind(&self) -> Option<MealKind> {
        match self {
            Self::Breakfast => Some(MealKind::Breakfast),
            Self::Lunch { .. } => Some(MealKind::Lunch),
            Self::Dinner { .. } => Some(MealKind::Dinner),
            _ => None,
        }
    }

    /// Whether this is a train or flight.
    pub const fn is_intercity(&self) -> bool {
        matches!(self, Self::Train { .. } | Self::Airplane { .. })
    }

    /// Whether the activity counts towards the running meal and attraction
    /// spend that budget pruning tracks.
    pub const fn is_daily_spend(&self) -> bool {
        matches!(
            self,
            Self::Breakfast | Self::Lunch { .. } | Self::Dinner { .. } | Self::Attraction { .. }
        )
    }
}

/// One scheduled unit within a day.
///
/// For journeys `position` is the arrival station and the departure station
/// is carried by the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Activity {
    /// Kind-specific fields, serialised inline under a `type` tag.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: ActivityKind,
    /// Where the activity takes place.
    pub position: String,
    /// Start time.
    pub start_time: ClockTime,
    /// End time.
    pub end_time: ClockTime,
    /// Unit price.
    pub price: u32,
    /// Total cost for the party.
    pub cost: u32,
    /// Innercity legs taken to reach the activity.
    #[cfg_attr(feature = "serde", serde(default))]
    pub transports: Vec<InnercitySegment>,
}

impl Activity {
    /// Validate and construct an [`Activity`] without connecting transfers.
    pub fn new(
        kind: ActivityKind,
        position: impl Into<String>,
        start_time: ClockTime,
        end_time: ClockTime,
        price: u32,
        cost: u32,
    ) -> Result<Self, ActivityError> {
        let position = position.into();
        if end_time < start_time {
            return Err(ActivityError::EndsBeforeStart {
                position,
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            kind,
            position,
            start_time,
            end_time,
            price,
            cost,
            transports: Vec::new(),
        })
    }

    /// Book an intercity journey for `tickets` travellers.
    ///
    /// Overnight services that arrive "before" they depart are accepted as
    /// scheduled; their timing is the timetable's business.
    pub fn intercity(transport: &IntercityTransport, tickets: u32) -> Self {
        let kind = match transport.mode {
            IntercityMode::Train => ActivityKind::Train {
                id: transport.id.clone(),
                from: transport.from.clone(),
                tickets,
            },
            IntercityMode::Airplane => ActivityKind::Airplane {
                id: transport.id.clone(),
                from: transport.from.clone(),
                tickets,
            },
        };
        Self {
            kind,
            position: transport.to.clone(),
            start_time: transport.depart,
            end_time: transport.arrive,
            price: transport.cost,
            cost: transport.cost.saturating_mul(tickets),
            transports: Vec::new(),
        }
    }

    /// Attach the innercity legs used to reach this activity.
    #[must_use]
    pub fn with_transports(mut self, transports: Vec<InnercitySegment>) -> Self {
        self.transports = transports;
        self
    }

    /// Cost of the connecting innercity legs.
    pub fn transport_cost(&self) -> u32 {
        self.transports
            .iter()
            .fold(0_u32, |sum, leg| sum.saturating_add(leg.cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn time(text: &str) -> ClockTime {
        text.parse().expect("valid clock time")
    }

    #[rstest]
    fn rejects_inverted_times() {
        let err = Activity::new(
            ActivityKind::Breakfast,
            "Inn",
            time("09:00"),
            time("08:00"),
            0,
            0,
        )
        .expect_err("inverted times");
        assert!(matches!(err, ActivityError::EndsBeforeStart { .. }));
    }

    #[rstest]
    fn books_intercity_for_party() {
        let train = IntercityTransport {
            id: "G1".into(),
            mode: IntercityMode::Train,
            from: "A Station".into(),
            to: "B Station".into(),
            depart: time("08:00"),
            arrive: time("10:00"),
            cost: 120,
        };
        let activity = Activity::intercity(&train, 3);
        assert_eq!(activity.cost, 360);
        assert_eq!(activity.position, "B Station");
        assert_eq!(activity.kind.tag(), "train");
        assert!(activity.kind.is_intercity());
        assert!(!activity.kind.is_daily_spend());
    }

    #[rstest]
    #[case(MealKind::Breakfast, "breakfast")]
    #[case(MealKind::Lunch, "lunch")]
    #[case(MealKind::Dinner, "dinner")]
    fn meal_kinds_round_trip_through_tags(#[case] meal: MealKind, #[case] tag: &str) {
        let kind = ActivityKind::meal(meal, "noodles");
        assert_eq!(kind.tag(), tag);
        assert_eq!(kind.meal_kind(), Some(meal));
        assert_eq!(meal.as_str(), tag);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serialises_type_tag_inline() {
        let activity = Activity::new(
            ActivityKind::Lunch {
                cuisine: "dumplings".into(),
            },
            "Jade Garden",
            time("11:00"),
            time("12:00"),
            40,
            80,
        )
        .expect("valid activity");
        let json = serde_json::to_value(&activity).expect("serialise activity");
        assert_eq!(json["type"], "lunch");
        assert_eq!(json["cuisine"], "dumplings");
        assert_eq!(json["start_time"], "11:00");
        let back: Activity = serde_json::from_value(json).expect("deserialise activity");
        assert_eq!(back, activity);
    }
}
