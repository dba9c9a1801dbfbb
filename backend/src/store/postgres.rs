// PostgreSQL implementation of the trip store.
// Tables: profiles, trips, stops, pois (see migrations/).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{PoiCategory, PointOfInterest, Profile, Stop, Trip};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use super::{StoreError, TripStore};

#[derive(Debug, FromRow)]
struct TripRow {
    id: i64,
    title: String,
    description: Option<String>,
    header_image_url: Option<String>,
    user_id: i64,
    created_at: DateTime<Utc>,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Trip {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            header_image_url: row.header_image_url,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct StopRow {
    id: i64,
    trip_id: i64,
    name: String,
    description: Option<String>,
    latitude: f64,
    longitude: f64,
    nights: i32,
    trip_stop_number: i32,
}

impl StopRow {
    fn into_stop(self, pois: Vec<PointOfInterest>) -> Stop {
        Stop {
            id: self.id,
            trip_id: self.trip_id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            latitude: self.latitude,
            longitude: self.longitude,
            nights: non_negative(self.nights),
            trip_stop_number: non_negative(self.trip_stop_number),
            pois,
        }
    }
}

#[derive(Debug, FromRow)]
struct PoiRow {
    id: i64,
    stop_id: i64,
    trip_id: i64,
    name: String,
    description: Option<String>,
    latitude: f64,
    longitude: f64,
    images: Vec<String>,
    category: String,
}

impl From<PoiRow> for PointOfInterest {
    fn from(row: PoiRow) -> Self {
        PointOfInterest {
            id: row.id,
            stop_id: row.stop_id,
            trip_id: row.trip_id,
            name: row.name,
            description: row.description.unwrap_or_default(),
            latitude: row.latitude,
            longitude: row.longitude,
            photos: row.images,
            category: PoiCategory::from(row.category),
        }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: i64,
    name: String,
    username: String,
    avatar_url: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: row.user_id,
            name: row.name,
            username: row.username,
            avatar_url: row.avatar_url,
        }
    }
}

fn non_negative(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

pub struct PgTripStore {
    pool: PgPool,
}

impl PgTripStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "PostgreSQL connection pool created");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the schema if missing. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        // query() cannot run several statements, raw_sql can
        let mut conn = self.pool.acquire().await?;
        let migration_sql = include_str!("../../migrations/20250301_create_trips.sql");
        sqlx::raw_sql(migration_sql).execute(&mut *conn).await?;

        tracing::info!("database migrations completed");
        Ok(())
    }

    /// POIs of the given stops, grouped by stop. A failing query degrades to
    /// an itinerary without POIs rather than failing the page.
    async fn pois_by_stop(&self, trip_id: i64, stop_ids: &[i64]) -> HashMap<i64, Vec<PointOfInterest>> {
        let rows = sqlx::query_as::<_, PoiRow>(
            r#"
            SELECT id, stop_id, trip_id, name, description, latitude, longitude,
                   images, category
            FROM pois
            WHERE stop_id = ANY($1)
            ORDER BY stop_id, id
            "#,
        )
        .bind(stop_ids)
        .fetch_all(&self.pool)
        .await;

        let rows = match rows {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(trip_id, error = %err, "failed to fetch POIs, continuing without them");
                return HashMap::new();
            }
        };

        let mut grouped: HashMap<i64, Vec<PointOfInterest>> = HashMap::new();
        for row in rows {
            grouped.entry(row.stop_id).or_default().push(row.into());
        }
        grouped
    }
}

#[async_trait]
impl TripStore for PgTripStore {
    async fn fetch_trip(&self, id: i64) -> Result<Option<Trip>, StoreError> {
        let row = sqlx::query_as::<_, TripRow>(
            "SELECT id, title, description, header_image_url, user_id, created_at FROM trips WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Trip::from))
    }

    async fn fetch_stops_with_pois(&self, trip_id: i64) -> Result<Vec<Stop>, StoreError> {
        let stops = sqlx::query_as::<_, StopRow>(
            r#"
            SELECT id, trip_id, name, description, latitude, longitude, nights, trip_stop_number
            FROM stops
            WHERE trip_id = $1
            ORDER BY trip_stop_number ASC
            "#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        if stops.is_empty() {
            return Ok(Vec::new());
        }

        let stop_ids: Vec<i64> = stops.iter().map(|row| row.id).collect();
        let mut pois = self.pois_by_stop(trip_id, &stop_ids).await;
        let stops: Vec<Stop> = stops
            .into_iter()
            .map(|row| {
                let own = pois.remove(&row.id).unwrap_or_default();
                row.into_stop(own)
            })
            .collect();

        tracing::debug!(trip_id, stops = stops.len(), "fetched itinerary");
        Ok(stops)
    }

    async fn fetch_profile(&self, user_id: i64) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT user_id, name, username, avatar_url FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns the store with the container; keep the container alive for the test.
    async fn setup_test_db() -> (
        PgTripStore,
        testcontainers::ContainerAsync<testcontainers_modules::postgres::Postgres>,
    ) {
        use testcontainers::{runners::AsyncRunner, ImageExt};
        use testcontainers_modules::postgres::Postgres;

        let container = Postgres::default()
            .with_tag("17-alpine")
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let host = container.get_host().await.expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get port");
        let database_url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

        let store = PgTripStore::connect(&database_url, 2)
            .await
            .expect("Failed to connect to test DB");
        store.migrate().await.expect("Failed to run migrations");

        (store, container)
    }

    async fn seed(store: &PgTripStore) {
        sqlx::raw_sql(
            r#"
            INSERT INTO profiles (user_id, name, username) VALUES (10, 'Alex Adventure', 'alexadventure');
            INSERT INTO trips (id, title, description, user_id) VALUES (1, 'Europe', 'Three cities', 10);
            INSERT INTO stops (id, trip_id, name, latitude, longitude, nights, trip_stop_number)
            VALUES (2, 1, 'Rome', 41.90, 12.50, 3, 2),
                   (1, 1, 'Paris', 48.85, 2.35, 2, 1);
            INSERT INTO pois (id, stop_id, trip_id, name, latitude, longitude, images, category)
            VALUES (7, 1, 1, 'Louvre', 48.86, 2.34, ARRAY['/louvre.jpg'], 'museum'),
                   (8, 2, 1, 'Campground', 41.95, 12.40, ARRAY[]::text[], 'campsite');
            "#,
        )
        .execute(&store.pool)
        .await
        .expect("Failed to seed test data");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_fetch_trip_and_profile() {
        let (store, _container) = setup_test_db().await;
        seed(&store).await;

        let trip = store.fetch_trip(1).await.unwrap().expect("trip exists");
        assert_eq!(trip.title, "Europe");
        assert_eq!(trip.user_id, 10);

        let profile = store.fetch_profile(10).await.unwrap().expect("profile");
        assert_eq!(profile.username, "alexadventure");
        assert!(store.fetch_trip(999).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_stops_are_ordered_with_their_pois() {
        let (store, _container) = setup_test_db().await;
        seed(&store).await;

        let stops = store.fetch_stops_with_pois(1).await.unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].name, "Paris");
        assert_eq!(stops[0].pois[0].photos, vec!["/louvre.jpg".to_string()]);
        assert_eq!(stops[1].pois[0].category, PoiCategory::Other("campsite".into()));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_pois_follow_their_stop_not_their_trip_column() {
        let (store, _container) = setup_test_db().await;
        seed(&store).await;
        sqlx::raw_sql(
            r#"
            INSERT INTO trips (id, title, user_id) VALUES (2, 'Other', 10);
            INSERT INTO pois (id, stop_id, trip_id, name, latitude, longitude, category)
            VALUES (9, 1, 2, 'Mislabelled cafe', 48.87, 2.33, 'food');
            "#,
        )
        .execute(&store.pool)
        .await
        .expect("Failed to seed mislabelled POI");

        let stops = store.fetch_stops_with_pois(1).await.unwrap();
        let names: Vec<_> = stops[0].pois.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Louvre", "Mislabelled cafe"]);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_unknown_trip_has_no_stops() {
        let (store, _container) = setup_test_db().await;
        assert!(store.fetch_stops_with_pois(5).await.unwrap().is_empty());
    }
}
