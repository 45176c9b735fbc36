//! Data access environment for POIs and transport.
//!
//! The planner treats the environment as an opaque service with a
//! call-and-paginate protocol: a select returns the first page of rows and
//! [`TravelEnvironment::next_page`] returns following pages until an empty
//! one signals the end. [`collect_all`] drains a selection into one table.

mod error;

pub use error::EnvironmentError;

use crate::{
    Accommodation, Attraction, ClockTime, InnercityMode, InnercitySegment, IntercityMode,
    IntercityTransport, Restaurant,
};

/// A table query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectRequest {
    /// Hotels in a city.
    Accommodations {
        /// City to search.
        city: String,
    },
    /// Attractions in a city.
    Attractions {
        /// City to search.
        city: String,
    },
    /// Restaurants in a city.
    Restaurants {
        /// City to search.
        city: String,
    },
    /// Scheduled services between two cities.
    Intercity {
        /// Origin city.
        from_city: String,
        /// Destination city.
        to_city: String,
        /// Train or airplane.
        mode: IntercityMode,
    },
}

impl SelectRequest {
    /// Name of the table the request reads.
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Accommodations { .. } => Rows::ACCOMMODATIONS,
            Self::Attractions { .. } => Rows::ATTRACTIONS,
            Self::Restaurants { .. } => Rows::RESTAURANTS,
            Self::Intercity { .. } => Rows::INTERCITY,
        }
    }
}

/// One page of rows from a single table.
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    /// Hotel rows.
    Accommodations(Vec<Accommodation>),
    /// Attraction rows.
    Attractions(Vec<Attraction>),
    /// Restaurant rows.
    Restaurants(Vec<Restaurant>),
    /// Timetable rows.
    Intercity(Vec<IntercityTransport>),
}

impl Rows {
    const ACCOMMODATIONS: &'static str = "accommodation";
    const ATTRACTIONS: &'static str = "attraction";
    const RESTAURANTS: &'static str = "restaurant";
    const INTERCITY: &'static str = "intercity";

    /// An empty page of the table `request` reads.
    pub const fn empty_for(request: &SelectRequest) -> Self {
        match request {
            SelectRequest::Accommodations { .. } => Self::Accommodations(Vec::new()),
            SelectRequest::Attractions { .. } => Self::Attractions(Vec::new()),
            SelectRequest::Restaurants { .. } => Self::Restaurants(Vec::new()),
            SelectRequest::Intercity { .. } => Self::Intercity(Vec::new()),
        }
    }

    /// Name of the table the rows came from.
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Accommodations(_) => Self::ACCOMMODATIONS,
            Self::Attractions(_) => Self::ATTRACTIONS,
            Self::Restaurants(_) => Self::RESTAURANTS,
            Self::Intercity(_) => Self::INTERCITY,
        }
    }

    /// Number of rows on the page.
    pub fn len(&self) -> usize {
        match self {
            Self::Accommodations(rows) => rows.len(),
            Self::Attractions(rows) => rows.len(),
            Self::Restaurants(rows) => rows.len(),
            Self::Intercity(rows) => rows.len(),
        }
    }

    /// Whether the page is empty, which ends pagination.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `page` to these rows; both must come from the same table.
    pub fn append(&mut self, page: Self) -> Result<(), EnvironmentError> {
        match (self, page) {
            (Self::Accommodations(rows), Self::Accommodations(more)) => rows.extend(more),
            (Self::Attractions(rows), Self::Attractions(more)) => rows.extend(more),
            (Self::Restaurants(rows), Self::Restaurants(more)) => rows.extend(more),
            (Self::Intercity(rows), Self::Intercity(more)) => rows.extend(more),
            (this, other) => {
                return Err(EnvironmentError::UnexpectedRows {
                    expected: this.table(),
                    found: other.table(),
                });
            }
        }
        Ok(())
    }

    /// Unwrap hotel rows.
    pub fn into_accommodations(self) -> Result<Vec<Accommodation>, EnvironmentError> {
        match self {
            Self::Accommodations(rows) => Ok(rows),
            other => Err(other.mismatch(Self::ACCOMMODATIONS)),
        }
    }

    /// Unwrap attraction rows.
    pub fn into_attractions(self) -> Result<Vec<Attraction>, EnvironmentError> {
        match self {
            Self::Attractions(rows) => Ok(rows),
            other => Err(other.mismatch(Self::ATTRACTIONS)),
        }
    }

    /// Unwrap restaurant rows.
    pub fn into_restaurants(self) -> Result<Vec<Restaurant>, EnvironmentError> {
        match self {
            Self::Restaurants(rows) => Ok(rows),
            other => Err(other.mismatch(Self::RESTAURANTS)),
        }
    }

    /// Unwrap timetable rows.
    pub fn into_intercity(self) -> Result<Vec<IntercityTransport>, EnvironmentError> {
        match self {
            Self::Intercity(rows) => Ok(rows),
            other => Err(other.mismatch(Self::INTERCITY)),
        }
    }

    const fn mismatch(&self, expected: &'static str) -> EnvironmentError {
        EnvironmentError::UnexpectedRows {
            expected,
            found: self.table(),
        }
    }
}

/// An innercity routing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequest<'a> {
    /// City the route lies in.
    pub city: &'a str,
    /// Origin position.
    pub from: &'a str,
    /// Destination position.
    pub to: &'a str,
    /// Departure time.
    pub start: ClockTime,
    /// Mode of travel.
    pub mode: InnercityMode,
}

/// Paginated access to POI tables, timetables and innercity routes.
///
/// Implementations keep the cursor of the most recent select, so selects and
/// pages take `&mut self`. Routing is stateless.
pub trait TravelEnvironment {
    /// Start a selection and return its first page.
    fn select(&mut self, request: &SelectRequest) -> Result<Rows, EnvironmentError>;

    /// Return the next page of the most recent selection, or an empty page
    /// once it is exhausted.
    fn next_page(&mut self) -> Result<Rows, EnvironmentError>;

    /// Route between two positions.
    ///
    /// Segments carry unit prices; the metro variant is three legs (walk,
    /// metro, walk) and the others a single leg.
    fn innercity_route(
        &self,
        request: &RouteRequest<'_>,
    ) -> Result<Vec<InnercitySegment>, EnvironmentError>;

    /// Whether the environment holds data for `city`.
    fn supports_city(&self, city: &str) -> bool;
}

/// Run `request` and page until an empty page, returning every row.
///
/// Fails with [`EnvironmentError::UnexpectedRows`] if the environment answers
/// from a different table.
pub fn collect_all<E>(env: &mut E, request: &SelectRequest) -> Result<Rows, EnvironmentError>
where
    E: TravelEnvironment + ?Sized,
{
    let mut rows = env.select(request)?;
    if rows.table() != request.table() {
        return Err(EnvironmentError::UnexpectedRows {
            expected: request.table(),
            found: rows.table(),
        });
    }
    loop {
        let page = env.next_page()?;
        if page.is_empty() {
            break;
        }
        rows.append(page)?;
    }
    Ok(rows)
}
