pub mod config;
pub mod highlight;
pub mod markers;
pub mod models;
pub mod renderer;
pub mod styling;
pub mod trip_map;
pub mod viewport;

pub use config::HighlightConfig;
pub use highlight::{
    Coordinator, DismissToken, HighlightChange, HighlightEvent, HighlightState, PointerSource,
    ScheduledDismissal,
};
pub use markers::{MarkerKey, MarkerKind, MarkerRegistry};
pub use models::{
    ApiError, LatLng, PoiCategory, PointOfInterest, Profile, Stop, Trip, TripPayload,
};
pub use renderer::{HighlightObserver, ItineraryView, MapSurface};
pub use trip_map::TripMap;
pub use viewport::{GeoBounds, MapViewport, ViewportError};
