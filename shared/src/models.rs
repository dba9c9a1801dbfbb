use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub header_image_url: Option<String>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: i64,
    pub trip_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub nights: u32,
    pub trip_stop_number: u32,
    #[serde(default)]
    pub pois: Vec<PointOfInterest>,
}

impl Stop {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Groups POIs by category. Groups appear in the order their category is
    /// first seen; POIs keep their relative order inside a group.
    pub fn pois_by_category(&self) -> Vec<(&PoiCategory, Vec<&PointOfInterest>)> {
        let mut groups: Vec<(&PoiCategory, Vec<&PointOfInterest>)> = Vec::new();
        for poi in &self.pois {
            match groups.iter_mut().find(|(category, _)| **category == poi.category) {
                Some((_, members)) => members.push(poi),
                None => groups.push((&poi.category, vec![poi])),
            }
        }
        groups
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: i64,
    pub stop_id: i64,
    pub trip_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub photos: Vec<String>,
    pub category: PoiCategory,
}

impl PointOfInterest {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// POI category as stored by users. Unknown values are kept verbatim in
/// `Other` so they survive a round trip and still render with a fallback style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PoiCategory {
    Food,
    Hike,
    Shop,
    CulturalCenter,
    Museum,
    NatureSight,
    UrbanSight,
    Other(String),
}

impl PoiCategory {
    pub const KNOWN: [PoiCategory; 7] = [
        PoiCategory::Food,
        PoiCategory::Hike,
        PoiCategory::Shop,
        PoiCategory::CulturalCenter,
        PoiCategory::Museum,
        PoiCategory::NatureSight,
        PoiCategory::UrbanSight,
    ];

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "food" => Self::Food,
            "hike" => Self::Hike,
            "shop" => Self::Shop,
            "cultural_center" => Self::CulturalCenter,
            "museum" => Self::Museum,
            "nature_sight" => Self::NatureSight,
            "urban_sight" => Self::UrbanSight,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Food => "food",
            Self::Hike => "hike",
            Self::Shop => "shop",
            Self::CulturalCenter => "cultural_center",
            Self::Museum => "museum",
            Self::NatureSight => "nature_sight",
            Self::UrbanSight => "urban_sight",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for PoiCategory {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for PoiCategory {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<PoiCategory> for String {
    fn from(category: PoiCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Body of `GET /api/trip/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPayload {
    pub message: String,
    pub trip: Trip,
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
