//! Symbolic travel queries.
//!
//! A [`Query`] is produced once per benchmark instance, usually by a
//! translator, and is read-only for the rest of the planning episode.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::InnercityMode;

/// Errors raised by [`Query::validate`] and [`PreferenceObjective::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryValidationError {
    /// A city name was blank.
    #[error("query {uid} has an empty {field}")]
    EmptyCity {
        /// Query identifier.
        uid: String,
        /// `start_city` or `target_city`.
        field: &'static str,
    },
    /// The party had no members.
    #[error("query {uid} has no travellers")]
    NoPeople {
        /// Query identifier.
        uid: String,
    },
    /// The trip lasted zero days.
    #[error("query {uid} has no days")]
    NoDays {
        /// Query identifier.
        uid: String,
    },
    /// A requested room type had no beds.
    #[error("query {uid} requests rooms without beds")]
    NoBeds {
        /// Query identifier.
        uid: String,
    },
    /// The preference header was not `<direction> <concept>`.
    #[error("malformed preference objective {header:?}")]
    MalformedPreference {
        /// First line of the objective.
        header: String,
    },
    /// The direction was neither `maximize` nor `minimize`.
    #[error("preference direction must be maximize or minimize, got {direction:?}")]
    UnknownDirection {
        /// Rejected direction.
        direction: String,
    },
}

/// Structural sanity rules applied to every candidate itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CommonsenseRule {
    /// One day plan per trip day, numbered from one.
    DayCount,
    /// The trip opens with a journey out and closes with a journey home.
    IntercityEndpoints,
    /// Activities start before they end and never overlap.
    TimeOrder,
    /// Innercity legs arrive before the activity they lead to starts.
    TransferTiming,
    /// Each meal slot appears at most once per day.
    MealsOncePerDay,
    /// No restaurant or attraction is visited twice.
    DistinctVisits,
    /// Every night but the last ends at a hotel.
    NightlyAccommodation,
    /// Booked rooms sleep the whole party.
    RoomCapacity,
    /// Ticket and car counts cover the party.
    PartyCounts,
}

impl CommonsenseRule {
    /// Every rule, in evaluation order.
    pub const ALL: [Self; 9] = [
        Self::DayCount,
        Self::IntercityEndpoints,
        Self::TimeOrder,
        Self::TransferTiming,
        Self::MealsOncePerDay,
        Self::DistinctVisits,
        Self::NightlyAccommodation,
        Self::RoomCapacity,
        Self::PartyCounts,
    ];
}

/// The set of commonsense rules a query enables; all of them by default.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct CommonsenseRules(BTreeSet<CommonsenseRule>);

impl CommonsenseRules {
    /// An empty rule set.
    pub const fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Whether `rule` is enabled.
    pub fn contains(&self, rule: CommonsenseRule) -> bool {
        self.0.contains(&rule)
    }

    /// Iterate over enabled rules.
    pub fn iter(&self) -> impl Iterator<Item = CommonsenseRule> + '_ {
        self.0.iter().copied()
    }
}

impl Default for CommonsenseRules {
    fn default() -> Self {
        Self(CommonsenseRule::ALL.into_iter().collect())
    }
}

impl FromIterator<CommonsenseRule> for CommonsenseRules {
    fn from_iter<I: IntoIterator<Item = CommonsenseRule>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whether a preference concept should grow or shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PreferenceDirection {
    /// Larger is better.
    Maximize,
    /// Smaller is better.
    Minimize,
}

impl PreferenceDirection {
    /// Whether `candidate` strictly improves on `incumbent`.
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Maximize => candidate > incumbent,
            Self::Minimize => candidate < incumbent,
        }
    }
}

impl fmt::Display for PreferenceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Maximize => "maximize",
            Self::Minimize => "minimize",
        })
    }
}

impl FromStr for PreferenceDirection {
    type Err = QueryValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maximize" => Ok(Self::Maximize),
            "minimize" => Ok(Self::Minimize),
            other => Err(QueryValidationError::UnknownDirection {
                direction: other.to_owned(),
            }),
        }
    }
}

/// A soft objective ranking otherwise valid itineraries.
///
/// The textual form is a header line `<direction> <concept>` followed by the
/// evaluator code computing the concept.
///
/// # Examples
/// ```
/// use itinera_core::{PreferenceDirection, PreferenceObjective};
///
/// let objective: PreferenceObjective = "maximize attraction_count\nattraction_count"
///     .parse()
///     .unwrap();
/// assert_eq!(objective.direction, PreferenceDirection::Maximize);
/// assert_eq!(objective.concept, "attraction_count");
/// assert_eq!(objective.code, "attraction_count");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreferenceObjective {
    /// Optimisation direction.
    pub direction: PreferenceDirection,
    /// Name of the optimised concept.
    pub concept: String,
    /// Evaluator code computing the concept.
    pub code: String,
}

impl FromStr for PreferenceObjective {
    type Err = QueryValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (header, code) = s.split_once('\n').unwrap_or((s, ""));
        let mut words = header.split_whitespace();
        let (Some(direction), Some(concept), None) = (words.next(), words.next(), words.next())
        else {
            return Err(QueryValidationError::MalformedPreference {
                header: header.to_owned(),
            });
        };
        let code = if code.trim().is_empty() {
            concept.to_owned()
        } else {
            code.trim().to_owned()
        };
        Ok(Self {
            direction: direction.parse()?,
            concept: concept.to_owned(),
            code,
        })
    }
}

/// A symbolic trip request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Query {
    /// Benchmark identifier.
    pub uid: String,
    /// Departure city.
    pub start_city: String,
    /// Destination city.
    pub target_city: String,
    /// Party size.
    #[cfg_attr(feature = "serde", serde(rename = "people_number"))]
    pub people: u32,
    /// Trip length in days.
    pub days: u32,
    /// Upper bound on total cost.
    #[cfg_attr(feature = "serde", serde(default))]
    pub budget: Option<u32>,
    /// Required beds per room.
    #[cfg_attr(feature = "serde", serde(default))]
    pub room_type: Option<u8>,
    /// Required number of rooms.
    #[cfg_attr(feature = "serde", serde(default))]
    pub room_count: Option<u32>,
    /// Preferred innercity modes, best first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub innercity_preference: Vec<InnercityMode>,
    /// Enabled commonsense rules.
    #[cfg_attr(feature = "serde", serde(default))]
    pub commonsense: CommonsenseRules,
    /// Logical constraint expressions every accepted plan must satisfy.
    #[cfg_attr(feature = "serde", serde(default, alias = "hard_logic"))]
    pub logical_constraints: Vec<String>,
    /// Optional soft objective.
    #[cfg_attr(feature = "serde", serde(default))]
    pub preference: Option<PreferenceObjective>,
}

impl Query {
    /// A query with no budget, room requests, constraints or preference.
    pub fn new(
        uid: impl Into<String>,
        start_city: impl Into<String>,
        target_city: impl Into<String>,
        people: u32,
        days: u32,
    ) -> Self {
        Self {
            uid: uid.into(),
            start_city: start_city.into(),
            target_city: target_city.into(),
            people,
            days,
            budget: None,
            room_type: None,
            room_count: None,
            innercity_preference: Vec::new(),
            commonsense: CommonsenseRules::default(),
            logical_constraints: Vec::new(),
            preference: None,
        }
    }

    /// Set the budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: u32) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Request a room type and optionally a room count.
    #[must_use]
    pub const fn with_rooms(mut self, room_type: Option<u8>, room_count: Option<u32>) -> Self {
        self.room_type = room_type;
        self.room_count = room_count;
        self
    }

    /// Append a logical constraint.
    #[must_use]
    pub fn with_constraint(mut self, expression: impl Into<String>) -> Self {
        self.logical_constraints.push(expression.into());
        self
    }

    /// Set the preference objective.
    #[must_use]
    pub fn with_preference(mut self, objective: PreferenceObjective) -> Self {
        self.preference = Some(objective);
        self
    }

    /// Set the innercity mode preference.
    #[must_use]
    pub fn with_innercity_preference(mut self, modes: Vec<InnercityMode>) -> Self {
        self.innercity_preference = modes;
        self
    }

    /// Check structural requirements before planning.
    pub fn validate(&self) -> Result<(), QueryValidationError> {
        for (field, city) in [
            ("start_city", &self.start_city),
            ("target_city", &self.target_city),
        ] {
            if city.trim().is_empty() {
                return Err(QueryValidationError::EmptyCity {
                    uid: self.uid.clone(),
                    field,
                });
            }
        }
        if self.people == 0 {
            return Err(QueryValidationError::NoPeople {
                uid: self.uid.clone(),
            });
        }
        if self.days == 0 {
            return Err(QueryValidationError::NoDays {
                uid: self.uid.clone(),
            });
        }
        if self.room_type == Some(0) {
            return Err(QueryValidationError::NoBeds {
                uid: self.uid.clone(),
            });
        }
        Ok(())
    }
}
