use serde::{Deserialize, Serialize};

use crate::models::{LatLng, Stop};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewportError {
    #[error("cannot compute map bounds without at least one point")]
    InsufficientData,
    #[error("point {index} has a non-finite coordinate ({lat}, {lng})")]
    NonFiniteCoordinate { index: usize, lat: f64, lng: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    /// Inclusive on every edge.
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    pub fn is_degenerate(&self) -> bool {
        self.north - self.south <= f64::EPSILON || self.east - self.west <= f64::EPSILON
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Grows each axis symmetrically around the center until it spans at
    /// least `min_span_deg`. Axes already wider are left untouched.
    pub fn with_min_span(self, min_span_deg: f64) -> Self {
        let center = self.center();
        let half = min_span_deg / 2.0;
        let (south, north) = if self.north - self.south < min_span_deg {
            (center.lat - half, center.lat + half)
        } else {
            (self.south, self.north)
        };
        let (west, east) = if self.east - self.west < min_span_deg {
            (center.lng - half, center.lng + half)
        } else {
            (self.west, self.east)
        };
        Self {
            north,
            south,
            east,
            west,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub center: LatLng,
    pub bounds: GeoBounds,
}

impl MapViewport {
    pub fn from_stops(stops: &[Stop]) -> Result<Self, ViewportError> {
        Self::from_points(stops.iter().map(Stop::position))
    }

    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Result<Self, ViewportError> {
        let mut bounds: Option<GeoBounds> = None;

        for (index, point) in points.into_iter().enumerate() {
            if !point.is_finite() {
                return Err(ViewportError::NonFiniteCoordinate {
                    index,
                    lat: point.lat,
                    lng: point.lng,
                });
            }
            bounds = Some(match bounds {
                None => GeoBounds {
                    north: point.lat,
                    south: point.lat,
                    east: point.lng,
                    west: point.lng,
                },
                Some(b) => GeoBounds {
                    north: b.north.max(point.lat),
                    south: b.south.min(point.lat),
                    east: b.east.max(point.lng),
                    west: b.west.min(point.lng),
                },
            });
        }

        let bounds = bounds.ok_or(ViewportError::InsufficientData)?;
        Ok(Self {
            center: bounds.center(),
            bounds,
        })
    }
}
