//! Bulk import of city data into the environment database.

use geo::Coord;
use itinera_core::{Accommodation, Attraction, IntercityTransport, Restaurant};
use rusqlite::{Error as SqliteError, Transaction};
use serde::{Deserialize, Serialize};

use super::{SqliteEnvironment, SqliteEnvironmentError};

/// A named place used only as a routing anchor, such as a railway station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Name used as an activity or transfer position.
    pub name: String,
    /// WGS84 position, `x = longitude`.
    pub location: Coord<f64>,
}

/// Every table row for one city.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityRecords {
    /// City name.
    pub name: String,
    /// Stations and airports.
    #[serde(default)]
    pub stations: Vec<Station>,
    /// Hotels.
    #[serde(default)]
    pub accommodations: Vec<Accommodation>,
    /// Attractions.
    #[serde(default)]
    pub attractions: Vec<Attraction>,
    /// Restaurants.
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
}

/// Scheduled services from one city to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableRoute {
    /// Origin city.
    pub from_city: String,
    /// Destination city.
    pub to_city: String,
    /// Services on the route.
    pub services: Vec<IntercityTransport>,
}

/// A complete environment snapshot, as stored in JSON dataset files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Per-city POI tables.
    #[serde(default)]
    pub cities: Vec<CityRecords>,
    /// Intercity timetables.
    #[serde(default)]
    pub intercity: Vec<TimetableRoute>,
}

/// Rows written by [`SqliteEnvironment::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Cities touched.
    pub cities: usize,
    /// Station rows.
    pub stations: usize,
    /// Hotel rows.
    pub accommodations: usize,
    /// Attraction rows.
    pub attractions: usize,
    /// Restaurant rows.
    pub restaurants: usize,
    /// Timetable rows.
    pub services: usize,
}

impl SqliteEnvironment {
    /// Write `dataset` in one transaction. Rows are keyed by city and name
    /// (services by identifier and route), so importing a row again replaces
    /// it. Any active selection is discarded.
    ///
    /// # Errors
    /// Returns [`SqliteEnvironmentError::Sqlite`] when a write fails; the
    /// transaction is rolled back.
    pub fn import(&mut self, dataset: &Dataset) -> Result<ImportSummary, SqliteEnvironmentError> {
        self.cursor = None;
        let transaction =
            self.connection
                .transaction()
                .map_err(|source| SqliteEnvironmentError::Sqlite {
                    operation: "begin import transaction",
                    source,
                })?;
        let mut summary = ImportSummary::default();
        for city in &dataset.cities {
            import_city(&transaction, city, &mut summary)?;
        }
        for route in &dataset.intercity {
            import_route(&transaction, route, &mut summary)?;
        }
        transaction
            .commit()
            .map_err(|source| SqliteEnvironmentError::Sqlite {
                operation: "commit import transaction",
                source,
            })?;
        log::info!(
            "imported {} cities and {} timetable rows",
            summary.cities,
            summary.services
        );
        Ok(summary)
    }
}

fn insert_city(transaction: &Transaction<'_>, city: &str) -> Result<(), SqliteEnvironmentError> {
    transaction
        .prepare_cached("INSERT OR IGNORE INTO cities (name) VALUES (?1)")
        .and_then(|mut statement| statement.execute([city]))
        .map(|_| ())
        .map_err(|source| SqliteEnvironmentError::Sqlite {
            operation: "insert city",
            source,
        })
}

fn lon_lat(location: Option<Coord<f64>>) -> (Option<f64>, Option<f64>) {
    location.map_or((None, None), |coord| (Some(coord.x), Some(coord.y)))
}

fn import_city(
    transaction: &Transaction<'_>,
    city: &CityRecords,
    summary: &mut ImportSummary,
) -> Result<(), SqliteEnvironmentError> {
    let name = city.name.as_str();
    insert_city(transaction, name)?;
    summary.cities += 1;

    let write = |operation: &'static str| {
        move |source: SqliteError| SqliteEnvironmentError::Sqlite { operation, source }
    };

    let mut stations = transaction
        .prepare_cached(
            "INSERT OR REPLACE INTO stations (city, name, lon, lat) VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(write("prepare station insert"))?;
    for station in &city.stations {
        stations
            .execute((name, &station.name, station.location.x, station.location.y))
            .map_err(write("insert station"))?;
        summary.stations += 1;
    }

    let mut hotels = transaction
        .prepare_cached(
            "INSERT OR REPLACE INTO accommodations (city, name, price, beds_per_room, lon, lat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(write("prepare accommodation insert"))?;
    for hotel in &city.accommodations {
        let (lon, lat) = lon_lat(hotel.location);
        hotels
            .execute((name, &hotel.name, hotel.price, hotel.beds_per_room, lon, lat))
            .map_err(write("insert accommodation"))?;
        summary.accommodations += 1;
    }

    let mut attractions = transaction
        .prepare_cached(
            "INSERT OR REPLACE INTO attractions
                (city, name, spot_type, price, open, close, visit_minutes, lon, lat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(write("prepare attraction insert"))?;
    for spot in &city.attractions {
        let (lon, lat) = lon_lat(spot.location);
        attractions
            .execute((
                name,
                &spot.name,
                &spot.spot_type,
                spot.price,
                spot.open.to_string(),
                spot.close.to_string(),
                spot.recommended_visit_minutes,
                lon,
                lat,
            ))
            .map_err(write("insert attraction"))?;
        summary.attractions += 1;
    }

    let mut restaurants = transaction
        .prepare_cached(
            "INSERT OR REPLACE INTO restaurants
                (city, name, cuisine, price, open, close, lon, lat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(write("prepare restaurant insert"))?;
    for diner in &city.restaurants {
        let (lon, lat) = lon_lat(diner.location);
        restaurants
            .execute((
                name,
                &diner.name,
                &diner.cuisine,
                diner.price,
                diner.open.to_string(),
                diner.close.to_string(),
                lon,
                lat,
            ))
            .map_err(write("insert restaurant"))?;
        summary.restaurants += 1;
    }
    Ok(())
}

fn import_route(
    transaction: &Transaction<'_>,
    route: &TimetableRoute,
    summary: &mut ImportSummary,
) -> Result<(), SqliteEnvironmentError> {
    insert_city(transaction, &route.from_city)?;
    insert_city(transaction, &route.to_city)?;
    let mut services = transaction
        .prepare_cached(
            "INSERT OR REPLACE INTO intercity
                (id, mode, from_city, to_city, from_station, to_station, depart, arrive, cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(|source| SqliteEnvironmentError::Sqlite {
            operation: "prepare timetable insert",
            source,
        })?;
    for service in &route.services {
        services
            .execute((
                &service.id,
                service.mode.as_str(),
                &route.from_city,
                &route.to_city,
                &service.from,
                &service.to,
                service.depart.to_string(),
                service.arrive.to_string(),
                service.cost,
            ))
            .map_err(|source| SqliteEnvironmentError::Sqlite {
                operation: "insert timetable row",
                source,
            })?;
        summary.services += 1;
    }
    Ok(())
}
