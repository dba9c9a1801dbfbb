use std::time::Duration;

use crate::config::HighlightConfig;
use crate::highlight::{
    Coordinator, HighlightChange, HighlightEvent, HighlightState, ScheduledDismissal,
};
use crate::markers::MarkerKey;
use crate::models::{LatLng, Stop};
use crate::renderer::{
    CrossHighlightRenderer, HighlightObserver, ItineraryView, LineStyle, MapSurface, Polyline,
};
use crate::styling::{self, BaseIcon, marker_icon};
use crate::viewport::{MapViewport, ViewportError};

const ROUTE_WEIGHT: f64 = 3.0;
const CONNECTOR_WEIGHT: f64 = 1.5;
const CONNECTOR_OPACITY: f64 = 0.5;

/// Wires the coordinator to the renderer and to any extra subscribers, and
/// owns the stop set currently shown on the map.
pub struct TripMap<S, V> {
    coordinator: Coordinator,
    renderer: CrossHighlightRenderer<S, V>,
    subscribers: Vec<Box<dyn HighlightObserver>>,
    viewport: Option<MapViewport>,
    revision: u64,
    config: HighlightConfig,
}

impl<S: MapSurface, V: ItineraryView> TripMap<S, V> {
    pub fn new(surface: S, view: V, config: HighlightConfig) -> Self {
        Self {
            coordinator: Coordinator::new(config.dismiss_grace),
            renderer: CrossHighlightRenderer::new(surface, view, config),
            subscribers: Vec::new(),
            viewport: None,
            revision: 0,
            config,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn HighlightObserver>) {
        self.subscribers.push(observer);
    }

    pub fn state(&self) -> HighlightState {
        self.coordinator.state()
    }

    pub fn viewport(&self) -> Option<MapViewport> {
        self.viewport
    }

    /// Whether a dismissal handed out by `handle` is still awaited.
    pub fn dismissal_pending(&self) -> bool {
        self.coordinator.timer().is_pending()
    }

    /// Number of stop sets loaded so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn renderer(&self) -> &CrossHighlightRenderer<S, V> {
        &self.renderer
    }

    /// Replaces the stop set on the map and refits the viewport. Nothing is
    /// touched when the viewport cannot be computed.
    pub fn load(&mut self, stops: &[Stop]) -> Result<MapViewport, ViewportError> {
        let viewport = MapViewport::from_stops(stops)?;

        self.dispatch(HighlightEvent::Clear);
        self.renderer.reset();
        for key in self.renderer.registry_mut().clear() {
            self.renderer.surface().remove_marker(key);
        }
        self.renderer.surface().clear_polylines();

        self.draw_lines(stops);
        self.place_markers(stops);

        self.renderer
            .surface()
            .fit_bounds(viewport.bounds.with_min_span(self.config.min_span_deg));

        self.revision += 1;
        self.viewport = Some(viewport);
        tracing::debug!(
            revision = self.revision,
            stops = stops.len(),
            markers = self.renderer.registry().len(),
            "stop set loaded"
        );
        Ok(viewport)
    }

    fn place_markers(&mut self, stops: &[Stop]) {
        for stop in stops {
            let key = MarkerKey::stop(stop.id);
            self.renderer
                .registry_mut()
                .register_stop(stop.id, stop.position(), stop.trip_stop_number);
            let icon = marker_icon(
                &BaseIcon::Stop {
                    number: stop.trip_stop_number,
                },
                false,
            );
            self.renderer
                .surface()
                .place_marker(key, stop.position(), &icon, &stop.name);

            for poi in &stop.pois {
                if !poi.position().is_finite() {
                    tracing::warn!(poi = poi.id, stop = stop.id, "skipping POI with non-finite coordinates");
                    continue;
                }
                let key = MarkerKey::poi(poi.id);
                self.renderer.registry_mut().register_poi(
                    poi.id,
                    poi.position(),
                    poi.category.clone(),
                );
                let icon = marker_icon(&BaseIcon::Poi(poi.category.clone()), false);
                self.renderer
                    .surface()
                    .place_marker(key, poi.position(), &icon, &poi.name);
            }
        }
    }

    fn draw_lines(&self, stops: &[Stop]) {
        let surface = self.renderer.surface();

        for stop in stops {
            for poi in stop.pois.iter().filter(|poi| poi.position().is_finite()) {
                surface.draw_polyline(&Polyline {
                    path: vec![stop.position(), poi.position()],
                    color: styling::connector_color(&poi.category).to_string(),
                    opacity: CONNECTOR_OPACITY,
                    weight: CONNECTOR_WEIGHT,
                    style: LineStyle::Dashed,
                });
            }
        }

        if stops.len() > 1 {
            surface.draw_polyline(&Polyline {
                path: stops.iter().map(Stop::position).collect::<Vec<LatLng>>(),
                color: styling::STOP_EMPHASIZED_COLOR.to_string(),
                opacity: 1.0,
                weight: ROUTE_WEIGHT,
                style: LineStyle::Solid,
            });
        }
    }

    /// Feeds one pointer event through the coordinator. The caller must
    /// deliver `DismissalElapsed` for any returned dismissal.
    pub fn handle(&mut self, event: HighlightEvent) -> Option<ScheduledDismissal> {
        let reaction = self.coordinator.handle(event);
        if let Some(change) = reaction.change {
            self.notify(&change);
        }
        reaction.dismissal
    }

    fn dispatch(&mut self, event: HighlightEvent) {
        if let Some(change) = self.coordinator.handle(event).change {
            self.notify(&change);
        }
    }

    fn notify(&mut self, change: &HighlightChange) {
        self.renderer.on_highlight_change(change);
        for subscriber in &mut self.subscribers {
            subscriber.on_highlight_change(change);
        }
    }

    /// Advances marker animation by `dt`; `true` while another frame is wanted.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.renderer.tick(dt)
    }
}
