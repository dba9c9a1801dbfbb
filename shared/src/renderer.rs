use std::f64::consts::PI;
use std::time::Duration;

use crate::config::HighlightConfig;
use crate::highlight::{HighlightChange, HighlightState};
use crate::markers::{MarkerKey, MarkerRegistry};
use crate::models::LatLng;
use crate::styling::{MarkerIcon, marker_icon};
use crate::viewport::GeoBounds;

pub const EMPHASIZED_Z: i32 = 1000;
pub const RESTING_Z: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub path: Vec<LatLng>,
    pub color: String,
    pub opacity: f64,
    pub weight: f64,
    pub style: LineStyle,
}

/// Calls made against the map widget. Implementations wrap a JS map in the
/// browser and a recorder in tests.
pub trait MapSurface {
    fn pan_to(&self, point: LatLng);
    fn fit_bounds(&self, bounds: GeoBounds);
    fn set_marker_icon(&self, key: MarkerKey, icon: &MarkerIcon);
    fn set_marker_z_order(&self, key: MarkerKey, z: i32);

    /// Currently visible area, `None` until the map has a size.
    fn visible_bounds(&self) -> Option<GeoBounds>;
    fn place_marker(&self, key: MarkerKey, position: LatLng, icon: &MarkerIcon, title: &str);
    fn remove_marker(&self, key: MarkerKey);
    fn draw_polyline(&self, line: &Polyline);
    fn clear_polylines(&self);
    fn show_popup(&self, key: MarkerKey, position: LatLng);
    fn hide_popup(&self);
}

/// The scrollable itinerary list.
pub trait ItineraryView {
    fn scroll_into_view(&self, key: MarkerKey);
    fn set_pulse(&self, key: MarkerKey, on: bool);
}

pub trait HighlightObserver {
    fn on_highlight_change(&mut self, change: &HighlightChange);
}

/// Single-pass size pulse: `1 + sin(pi * p) * amplitude` for `p` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub key: MarkerKey,
    elapsed: Duration,
    duration: Duration,
    amplitude: f64,
}

impl Pulse {
    pub fn new(key: MarkerKey, duration: Duration, amplitude: f64) -> Self {
        Self {
            key,
            elapsed: Duration::ZERO,
            duration,
            amplitude,
        }
    }

    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn scale(&self) -> f64 {
        1.0 + (self.progress() * PI).sin() * self.amplitude
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }
}

pub struct CrossHighlightRenderer<S, V> {
    registry: MarkerRegistry,
    surface: S,
    view: V,
    pulse: Option<Pulse>,
    popup: Option<MarkerKey>,
    config: HighlightConfig,
}

impl<S: MapSurface, V: ItineraryView> CrossHighlightRenderer<S, V> {
    pub fn new(surface: S, view: V, config: HighlightConfig) -> Self {
        Self {
            registry: MarkerRegistry::new(),
            surface,
            view,
            pulse: None,
            popup: None,
            config,
        }
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MarkerRegistry {
        &mut self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn pulse(&self) -> Option<&Pulse> {
        self.pulse.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.pulse.is_some()
    }

    /// Advances the marker pulse. Returns `true` while more frames are needed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(pulse) = self.pulse.as_mut() else {
            return false;
        };
        pulse.advance(dt);
        let pulse = *pulse;

        let Some(entry) = self.registry.get(&pulse.key) else {
            self.pulse = None;
            return false;
        };
        let icon = marker_icon(&entry.base, entry.emphasized);

        if pulse.is_finished() {
            self.surface.set_marker_icon(pulse.key, &icon);
            self.pulse = None;
            false
        } else {
            self.surface
                .set_marker_icon(pulse.key, &icon.scaled(pulse.scale()));
            true
        }
    }

    fn restyle(&mut self, target: Option<MarkerKey>) {
        let keys: Vec<MarkerKey> = self.registry.keys().collect();
        for key in keys {
            let emphasized = Some(key) == target;
            if !self.registry.set_emphasis(key, emphasized) {
                continue;
            }
            let Some(entry) = self.registry.get(&key) else {
                continue;
            };
            self.surface
                .set_marker_icon(key, &marker_icon(&entry.base, emphasized));
            self.surface.set_marker_z_order(
                key,
                if emphasized { EMPHASIZED_Z } else { RESTING_Z },
            );
        }
    }

    fn release(&mut self, key: MarkerKey) {
        if self.pulse.is_some_and(|pulse| pulse.key == key) {
            self.pulse = None;
        }
        if self.registry.contains(&key) {
            self.view.set_pulse(key, false);
        }
    }

    fn acquire(&mut self, key: MarkerKey) {
        let Some(position) = self.registry.get(&key).map(|entry| entry.position) else {
            tracing::debug!(%key, "highlight target has no marker, skipping effects");
            return;
        };

        self.pulse = Some(Pulse::new(
            key,
            self.config.pulse_duration,
            self.config.pulse_amplitude,
        ));

        if let Some(visible) = self.surface.visible_bounds()
            && !visible.contains(position)
        {
            self.surface.pan_to(position);
        }

        self.view.scroll_into_view(key);
        self.view.set_pulse(key, true);
    }

    fn sync_popup(&mut self, state: &HighlightState) {
        let wanted = state
            .popup_target()
            .and_then(|key| self.registry.get(&key).map(|entry| (key, entry.position)));

        match wanted {
            Some((key, position)) if self.popup != Some(key) => {
                self.surface.show_popup(key, position);
                self.popup = Some(key);
            }
            Some(_) => {}
            None => {
                if self.popup.take().is_some() {
                    self.surface.hide_popup();
                }
            }
        }
    }

    /// Forgets animation and popup state; used before the registry is rebuilt.
    pub fn reset(&mut self) {
        self.pulse = None;
        if self.popup.take().is_some() {
            self.surface.hide_popup();
        }
    }
}

impl<S: MapSurface, V: ItineraryView> HighlightObserver for CrossHighlightRenderer<S, V> {
    fn on_highlight_change(&mut self, change: &HighlightChange) {
        self.restyle(change.current.target());

        if let Some(key) = change.released() {
            self.release(key);
        }
        if let Some(key) = change.acquired() {
            self.acquire(key);
        }
        self.sync_popup(&change.current);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::highlight::PointerSource;
    use crate::models::PoiCategory;
    use crate::styling::BaseIcon;

    fn renderer() -> (
        CrossHighlightRenderer<RecordingMap, RecordingList>,
        RecordingMap,
        RecordingList,
    ) {
        let map = RecordingMap::default();
        let list = RecordingList::default();
        let mut renderer =
            CrossHighlightRenderer::new(map.clone(), list.clone(), HighlightConfig::default());
        renderer
            .registry_mut()
            .register_stop(1, LatLng::new(48.85, 2.35), 1);
        renderer
            .registry_mut()
            .register_poi(7, LatLng::new(48.86, 2.34), PoiCategory::Museum);
        (renderer, map, list)
    }

    fn hover(target: MarkerKey, source: PointerSource) -> HighlightState {
        HighlightState::Hovering { target, source }
    }

    #[test]
    fn emphasis_follows_target_and_raises_z() {
        let (mut renderer, map, list) = renderer();
        renderer.on_highlight_change(&HighlightChange {
            previous: HighlightState::Idle,
            current: hover(MarkerKey::stop(1), PointerSource::List),
        });

        let calls = map.take();
        assert!(calls.contains(&MapCall::SetIcon(
            MarkerKey::stop(1),
            marker_icon(&BaseIcon::Stop { number: 1 }, true)
        )));
        assert!(calls.contains(&MapCall::SetZ(MarkerKey::stop(1), EMPHASIZED_Z)));
        assert_eq!(
            list.take(),
            vec![
                ViewCall::Scroll(MarkerKey::stop(1)),
                ViewCall::Pulse(MarkerKey::stop(1), true)
            ]
        );
        assert!(renderer.is_animating());
    }

    #[test]
    fn release_reverts_immediately_without_animation() {
        let (mut renderer, map, list) = renderer();
        let hovering = hover(MarkerKey::poi(7), PointerSource::List);
        renderer.on_highlight_change(&HighlightChange {
            previous: HighlightState::Idle,
            current: hovering,
        });
        map.take();
        list.take();

        renderer.on_highlight_change(&HighlightChange {
            previous: hovering,
            current: HighlightState::Idle,
        });

        assert_eq!(
            map.take(),
            vec![
                MapCall::SetIcon(
                    MarkerKey::poi(7),
                    marker_icon(&BaseIcon::Poi(PoiCategory::Museum), false)
                ),
                MapCall::SetZ(MarkerKey::poi(7), RESTING_Z),
            ]
        );
        assert_eq!(list.take(), vec![ViewCall::Pulse(MarkerKey::poi(7), false)]);
        assert!(!renderer.is_animating());
        assert_eq!(renderer.registry().emphasized().count(), 0);
    }

    #[test]
    fn pans_only_when_target_is_off_screen() {
        let (mut renderer, map, _list) = renderer();
        map.set_visible(Some(GeoBounds {
            north: 49.0,
            south: 48.0,
            east: 3.0,
            west: 2.0,
        }));
        renderer.on_highlight_change(&HighlightChange {
            previous: HighlightState::Idle,
            current: hover(MarkerKey::stop(1), PointerSource::List),
        });
        assert!(!map.take().iter().any(|c| matches!(c, MapCall::PanTo(_))));

        map.set_visible(Some(GeoBounds {
            north: 42.0,
            south: 41.0,
            east: 13.0,
            west: 12.0,
        }));
        renderer.on_highlight_change(&HighlightChange {
            previous: hover(MarkerKey::stop(1), PointerSource::List),
            current: hover(MarkerKey::poi(7), PointerSource::Map),
        });
        assert!(
            map.take()
                .contains(&MapCall::PanTo(LatLng::new(48.86, 2.34)))
        );
    }

    #[test]
    fn unknown_target_has_no_effects() {
        let (mut renderer, map, list) = renderer();
        renderer.on_highlight_change(&HighlightChange {
            previous: HighlightState::Idle,
            current: hover(MarkerKey::poi(404), PointerSource::Map),
        });
        assert!(map.take().is_empty());
        assert!(list.take().is_empty());
        assert!(!renderer.is_animating());
    }

    #[test]
    fn pulse_is_single_pass_and_settles_on_base_size() {
        let (mut renderer, map, _list) = renderer();
        renderer.on_highlight_change(&HighlightChange {
            previous: HighlightState::Idle,
            current: HighlightState::Locked {
                target: MarkerKey::poi(7),
            },
        });
        map.take();

        let emphasized = marker_icon(&BaseIcon::Poi(PoiCategory::Museum), true);
        assert!(renderer.tick(Duration::from_millis(150)));
        match map.take().as_slice() {
            [MapCall::SetIcon(_, icon)] => {
                assert!((icon.size - emphasized.size * 1.3).abs() < 1e-6)
            }
            other => panic!("unexpected calls {other:?}"),
        }

        assert!(!renderer.tick(Duration::from_millis(200)));
        assert_eq!(
            map.take(),
            vec![MapCall::SetIcon(MarkerKey::poi(7), emphasized)]
        );
        assert!(!renderer.tick(Duration::from_millis(16)));
        assert!(map.take().is_empty());
    }

    #[test]
    fn popup_tracks_map_side_poi_states() {
        let (mut renderer, map, _list) = renderer();
        let poi = MarkerKey::poi(7);
        renderer.on_highlight_change(&HighlightChange {
            previous: HighlightState::Idle,
            current: hover(poi, PointerSource::Map),
        });
        assert!(map.take().contains(&MapCall::ShowPopup(poi)));

        renderer.on_highlight_change(&HighlightChange {
            previous: hover(poi, PointerSource::Map),
            current: HighlightState::Locked { target: poi },
        });
        assert!(!map.take().contains(&MapCall::ShowPopup(poi)));

        renderer.on_highlight_change(&HighlightChange {
            previous: HighlightState::Locked { target: poi },
            current: HighlightState::Idle,
        });
        assert!(map.take().contains(&MapCall::HidePopup));
    }

    #[test]
    fn pulse_curve_peaks_midway() {
        let mut pulse = Pulse::new(MarkerKey::stop(1), Duration::from_millis(300), 0.3);
        assert!((pulse.scale() - 1.0).abs() < 1e-9);
        pulse.advance(Duration::from_millis(150));
        assert!((pulse.scale() - 1.3).abs() < 1e-9);
        pulse.advance(Duration::from_millis(150));
        assert!(pulse.is_finished());
        assert!((pulse.scale() - 1.0).abs() < 1e-9);
    }
}
