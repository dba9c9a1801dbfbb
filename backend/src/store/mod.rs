// Data-access layer for trips, their itinerary and owner profiles.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use shared::{Profile, Stop, Trip};

pub use memory::{MemoryTripStore, TripFixture};
pub use postgres::PgTripStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid fixture data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Read side of the trip page. Implementations must return stops ordered by
/// `trip_stop_number` with each stop carrying only its own POIs.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn fetch_trip(&self, id: i64) -> Result<Option<Trip>, StoreError>;

    async fn fetch_stops_with_pois(&self, trip_id: i64) -> Result<Vec<Stop>, StoreError>;

    async fn fetch_profile(&self, user_id: i64) -> Result<Option<Profile>, StoreError>;
}
