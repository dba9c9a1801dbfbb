use std::{fs::File, io::Read, path::Path};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{Profile, Stop, Trip};

use super::{StoreError, TripStore};

/// On-disk layout of a fixture file. Stops carry their POIs inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripFixture {
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Read-only store backed by a JSON fixture, for local development and tests.
#[derive(Debug, Default)]
pub struct MemoryTripStore {
    fixture: TripFixture,
}

impl MemoryTripStore {
    pub fn new(fixture: TripFixture) -> Self {
        Self { fixture }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, StoreError> {
        let fixture: TripFixture = serde_json::from_reader(reader)?;
        tracing::info!(
            trips = fixture.trips.len(),
            stops = fixture.stops.len(),
            profiles = fixture.profiles.len(),
            "loaded trip fixtures"
        );
        Ok(Self::new(fixture))
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn fetch_trip(&self, id: i64) -> Result<Option<Trip>, StoreError> {
        Ok(self.fixture.trips.iter().find(|trip| trip.id == id).cloned())
    }

    async fn fetch_stops_with_pois(&self, trip_id: i64) -> Result<Vec<Stop>, StoreError> {
        let mut stops: Vec<Stop> = self
            .fixture
            .stops
            .iter()
            .filter(|stop| stop.trip_id == trip_id)
            .cloned()
            .map(|mut stop| {
                let stop_id = stop.id;
                stop.pois.retain(|poi| poi.stop_id == stop_id);
                stop
            })
            .collect();
        stops.sort_by_key(|stop| stop.trip_stop_number);
        Ok(stops)
    }

    async fn fetch_profile(&self, user_id: i64) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .fixture
            .profiles
            .iter()
            .find(|profile| profile.user_id == user_id)
            .cloned())
    }
}
