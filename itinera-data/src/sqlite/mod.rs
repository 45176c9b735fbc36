//! SQLite-backed [`TravelEnvironment`].
//!
//! [`SqliteEnvironment`] serves POI tables and intercity timetables from a
//! database created by [`initialise_schema`] and filled through
//! [`SqliteEnvironment::import`]. Selections page through the table with
//! `LIMIT`/`OFFSET`; rows come back in insertion order (timetables by
//! departure). Innercity routes are priced by a [`DistanceRouter`] from the
//! stored coordinates of stations and POIs.
//!
//! # Example
//!
//! ```
//! use itinera_core::{SelectRequest, TravelEnvironment, collect_all};
//! use itinera_data::sqlite::{CityRecords, Dataset, SqliteEnvironment};
//!
//! let mut env = SqliteEnvironment::open_in_memory()?;
//! env.import(&Dataset {
//!     cities: vec![CityRecords {
//!         name: "Suzhou".into(),
//!         ..CityRecords::default()
//!     }],
//!     intercity: Vec::new(),
//! })?;
//! assert!(env.supports_city("Suzhou"));
//! let hotels = collect_all(&mut env, &SelectRequest::Accommodations { city: "Suzhou".into() })?;
//! assert!(hotels.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]

mod dataset;
mod error;
mod schema;


use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use itinera_core::{
    Accommodation, Attraction, ClockTime, EnvironmentError, IntercityMode, IntercityTransport,
    InnercitySegment, Restaurant, RouteRequest, Rows, SelectRequest, TravelEnvironment,
};
use rusqlite::{Connection, OptionalExtension, Row};

pub use dataset::{CityRecords, Dataset, ImportSummary, Station, TimetableRoute};
pub use error::SqliteEnvironmentError;
pub use schema::{SCHEMA_VERSION, initialise_schema};

use crate::routing::DistanceRouter;

/// Rows returned per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A [`TravelEnvironment`] over an SQLite database.
#[derive(Debug)]
pub struct SqliteEnvironment {
    connection: Connection,
    page_size: usize,
    router: DistanceRouter,
    cursor: Option<Cursor>,
}

#[derive(Debug)]
struct Cursor {
    request: SelectRequest,
    offset: usize,
}

impl SqliteEnvironment {
    /// Open (creating if needed) the database at `path` and initialise its
    /// schema. Missing parent directories are created.
    ///
    /// # Errors
    /// Fails when the directory or database cannot be created, or the schema
    /// is incompatible.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteEnvironmentError> {
        itinera_fs::ensure_parent_dir(path).map_err(|source| {
            SqliteEnvironmentError::CreateDirectory {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let connection = Connection::open(path.as_std_path()).map_err(|source| {
            SqliteEnvironmentError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_connection(connection)
    }

    /// A fresh in-memory database.
    ///
    /// # Errors
    /// Fails when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqliteEnvironmentError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteEnvironmentError::Open {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_connection(connection)
    }

    /// Wrap an existing connection, initialising the schema.
    ///
    /// # Errors
    /// Propagates [`initialise_schema`] failures.
    pub fn from_connection(mut connection: Connection) -> Result<Self, SqliteEnvironmentError> {
        initialise_schema(&mut connection)?;
        Ok(Self {
            connection,
            page_size: DEFAULT_PAGE_SIZE,
            router: DistanceRouter::default(),
            cursor: None,
        })
    }

    /// Rows returned per page; zero is raised to one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Route transfers with `router`.
    #[must_use]
    pub const fn with_router(mut self, router: DistanceRouter) -> Self {
        self.router = router;
        self
    }

    /// Names of the cities the database holds, sorted.
    ///
    /// # Errors
    /// Returns [`SqliteEnvironmentError::Sqlite`] when the query fails.
    pub fn cities(&self) -> Result<Vec<String>, SqliteEnvironmentError> {
        let sqlite = |source| SqliteEnvironmentError::Sqlite {
            operation: "list cities",
            source,
        };
        let mut statement = self
            .connection
            .prepare_cached("SELECT name FROM cities ORDER BY name")
            .map_err(sqlite)?;
        let names = statement
            .query_map([], |row| row.get(0))
            .map_err(sqlite)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(sqlite)?;
        Ok(names)
    }

    fn knows_city(&self, city: &str) -> Result<bool, SqliteEnvironmentError> {
        self.connection
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM cities WHERE name = ?1)",
                [city],
                |row| row.get(0),
            )
            .map_err(|source| SqliteEnvironmentError::Sqlite {
                operation: "look up city",
                source,
            })
    }

    fn require_city(&self, city: &str) -> Result<(), EnvironmentError> {
        if self.knows_city(city)? {
            Ok(())
        } else {
            Err(EnvironmentError::UnsupportedCity {
                city: city.to_owned(),
            })
        }
    }

    fn page(&self, request: &SelectRequest, offset: usize) -> Result<Rows, SqliteEnvironmentError> {
        let limit = self.page_size;
        Ok(match request {
            SelectRequest::Accommodations { city } => {
                Rows::Accommodations(self.accommodations(city, limit, offset)?)
            }
            SelectRequest::Attractions { city } => {
                Rows::Attractions(self.attractions(city, limit, offset)?)
            }
            SelectRequest::Restaurants { city } => {
                Rows::Restaurants(self.restaurants(city, limit, offset)?)
            }
            SelectRequest::Intercity {
                from_city,
                to_city,
                mode,
            } => Rows::Intercity(self.intercity(from_city, to_city, *mode, limit, offset)?),
        })
    }

    /// Run a paged query and map each row with `read`.
    fn fetch<T>(
        &self,
        operation: &'static str,
        sql: &str,
        params: impl rusqlite::Params,
        read: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, SqliteEnvironmentError> {
        let sqlite = |source| SqliteEnvironmentError::Sqlite { operation, source };
        let mut statement = self.connection.prepare_cached(sql).map_err(sqlite)?;
        let rows = statement
            .query_map(params, read)
            .map_err(sqlite)?
            .collect::<Result<Vec<T>, _>>()
            .map_err(sqlite)?;
        Ok(rows)
    }

    fn accommodations(
        &self,
        city: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Accommodation>, SqliteEnvironmentError> {
        let raw = self.fetch(
            "select accommodations",
            "SELECT name, price, beds_per_room, lon, lat FROM accommodations
             WHERE city = ?1 ORDER BY rowid LIMIT ?2 OFFSET ?3",
            (city, limit, offset),
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, u8>(2)?,
                    coordinate(row, 3)?,
                ))
            },
        )?;
        raw.into_iter()
            .map(|(name, price, beds, location)| {
                let mut hotel = Accommodation::new(name, price, beds).map_err(|source| {
                    SqliteEnvironmentError::InvalidRow {
                        table: "accommodations",
                        source,
                    }
                })?;
                hotel.location = location;
                Ok(hotel)
            })
            .collect()
    }

    fn attractions(
        &self,
        city: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Attraction>, SqliteEnvironmentError> {
        let raw = self.fetch(
            "select attractions",
            "SELECT name, spot_type, price, open, close, visit_minutes, lon, lat
             FROM attractions WHERE city = ?1 ORDER BY rowid LIMIT ?2 OFFSET ?3",
            (city, limit, offset),
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, u32>(5)?,
                    coordinate(row, 6)?,
                ))
            },
        )?;
        raw.into_iter()
            .map(|(name, spot_type, price, open, close, minutes, location)| {
                let open = clock("attractions", &name, &open)?;
                let close = clock("attractions", &name, &close)?;
                let mut spot = Attraction::new(name, spot_type, price, open, close, minutes)
                    .map_err(|source| SqliteEnvironmentError::InvalidRow {
                        table: "attractions",
                        source,
                    })?;
                spot.location = location;
                Ok(spot)
            })
            .collect()
    }

    fn restaurants(
        &self,
        city: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Restaurant>, SqliteEnvironmentError> {
        let raw = self.fetch(
            "select restaurants",
            "SELECT name, cuisine, price, open, close, lon, lat
             FROM restaurants WHERE city = ?1 ORDER BY rowid LIMIT ?2 OFFSET ?3",
            (city, limit, offset),
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    coordinate(row, 5)?,
                ))
            },
        )?;
        raw.into_iter()
            .map(|(name, cuisine, price, open, close, location)| {
                let open = clock("restaurants", &name, &open)?;
                let close = clock("restaurants", &name, &close)?;
                let mut diner = Restaurant::new(name, cuisine, price, open, close).map_err(
                    |source| SqliteEnvironmentError::InvalidRow {
                        table: "restaurants",
                        source,
                    },
                )?;
                diner.location = location;
                Ok(diner)
            })
            .collect()
    }

    fn intercity(
        &self,
        from_city: &str,
        to_city: &str,
        mode: IntercityMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<IntercityTransport>, SqliteEnvironmentError> {
        let raw = self.fetch(
            "select intercity",
            "SELECT id, mode, from_station, to_station, depart, arrive, cost FROM intercity
             WHERE from_city = ?1 AND to_city = ?2 AND mode = ?3
             ORDER BY depart, id LIMIT ?4 OFFSET ?5",
            (from_city, to_city, mode.as_str(), limit, offset),
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, u32>(6)?,
                ))
            },
        )?;
        raw.into_iter()
            .map(|(id, stored_mode, from, to, depart, arrive, cost)| {
                let depart = clock("intercity", &id, &depart)?;
                let arrive = clock("intercity", &id, &arrive)?;
                let mode: IntercityMode = stored_mode
                    .parse()
                    .map_err(|_| SqliteEnvironmentError::UnknownMode {
                        id: id.clone(),
                        mode: stored_mode.clone(),
                    })?;
                Ok(IntercityTransport {
                    id,
                    mode,
                    from,
                    to,
                    depart,
                    arrive,
                    cost,
                })
            })
            .collect()
    }

    /// Stored position of `name` in `city`; stations win over POIs of the
    /// same name.
    fn locate(&self, city: &str, name: &str) -> Result<Option<Coord<f64>>, SqliteEnvironmentError> {
        self.connection
            .query_row(
                "SELECT lon, lat FROM (
                    SELECT lon, lat, 0 AS rank FROM stations WHERE city = ?1 AND name = ?2
                    UNION ALL
                    SELECT lon, lat, 1 FROM accommodations WHERE city = ?1 AND name = ?2
                    UNION ALL
                    SELECT lon, lat, 2 FROM attractions WHERE city = ?1 AND name = ?2
                    UNION ALL
                    SELECT lon, lat, 3 FROM restaurants WHERE city = ?1 AND name = ?2
                 )
                 WHERE lon IS NOT NULL AND lat IS NOT NULL
                 ORDER BY rank LIMIT 1",
                [city, name],
                |row| Ok(Coord {
                    x: row.get(0)?,
                    y: row.get(1)?,
                }),
            )
            .optional()
            .map_err(|source| SqliteEnvironmentError::Sqlite {
                operation: "locate position",
                source,
            })
    }
}

fn coordinate(row: &Row<'_>, lon_index: usize) -> rusqlite::Result<Option<Coord<f64>>> {
    let lon: Option<f64> = row.get(lon_index)?;
    let lat: Option<f64> = row.get(lon_index.saturating_add(1))?;
    Ok(lon.zip(lat).map(|(x, y)| Coord { x, y }))
}

fn clock(table: &'static str, name: &str, text: &str) -> Result<ClockTime, SqliteEnvironmentError> {
    text.parse()
        .map_err(|source| SqliteEnvironmentError::InvalidTime {
            table,
            name: name.to_owned(),
            source,
        })
}

impl TravelEnvironment for SqliteEnvironment {
    fn select(&mut self, request: &SelectRequest) -> Result<Rows, EnvironmentError> {
        match request {
            SelectRequest::Accommodations { city }
            | SelectRequest::Attractions { city }
            | SelectRequest::Restaurants { city } => self.require_city(city)?,
            SelectRequest::Intercity { .. } => {}
        }
        let first = self.page(request, 0)?;
        log::debug!(
            "select {} returned {} rows on the first page",
            request.table(),
            first.len()
        );
        self.cursor = Some(Cursor {
            request: request.clone(),
            offset: first.len(),
        });
        Ok(first)
    }

    fn next_page(&mut self) -> Result<Rows, EnvironmentError> {
        let cursor = self
            .cursor
            .as_ref()
            .ok_or(EnvironmentError::NoActiveSelection)?;
        let page = self.page(&cursor.request, cursor.offset)?;
        if let Some(active) = self.cursor.as_mut() {
            active.offset = active.offset.saturating_add(page.len());
        }
        Ok(page)
    }

    fn innercity_route(
        &self,
        request: &RouteRequest<'_>,
    ) -> Result<Vec<InnercitySegment>, EnvironmentError> {
        if request.from == request.to {
            return Ok(Vec::new());
        }
        let no_route = || EnvironmentError::NoRoute {
            from: request.from.to_owned(),
            to: request.to.to_owned(),
            mode: request.mode,
        };
        let from = self.locate(request.city, request.from)?.ok_or_else(no_route)?;
        let to = self.locate(request.city, request.to)?.ok_or_else(no_route)?;
        Ok(self.router.route(request, from, to))
    }

    fn supports_city(&self, city: &str) -> bool {
        self.knows_city(city).unwrap_or_else(|error| {
            log::warn!("could not check city {city:?}: {error}");
            false
        })
    }
}
