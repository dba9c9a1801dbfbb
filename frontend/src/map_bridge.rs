use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use shared::{
    renderer::{LineStyle, Polyline},
    styling::MarkerIcon,
    GeoBounds, HighlightEvent, ItineraryView, LatLng, MapSurface, MarkerKey, MarkerKind,
    PointerSource,
};
use wasm_bindgen::prelude::{wasm_bindgen, JsValue};

#[wasm_bindgen(module = "/trip_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = initTripMap)]
    pub fn init_trip_map();
    #[wasm_bindgen(js_name = fitBounds)]
    fn fit_bounds_js(north: f64, south: f64, east: f64, west: f64);
    #[wasm_bindgen(js_name = panTo)]
    fn pan_to_js(lat: f64, lng: f64);
    #[wasm_bindgen(js_name = visibleBounds)]
    fn visible_bounds_js() -> JsValue;
    #[wasm_bindgen(js_name = placeMarker)]
    fn place_marker_js(key: &str, lat: f64, lng: f64, icon_url: &str, size: f64, title: &str);
    #[wasm_bindgen(js_name = setMarkerIcon)]
    fn set_marker_icon_js(key: &str, icon_url: &str, size: f64);
    #[wasm_bindgen(js_name = setMarkerZOrder)]
    fn set_marker_z_order_js(key: &str, z: i32);
    #[wasm_bindgen(js_name = removeMarker)]
    fn remove_marker_js(key: &str);
    #[wasm_bindgen(js_name = drawPolyline)]
    fn draw_polyline_js(line: JsValue);
    #[wasm_bindgen(js_name = clearPolylines)]
    fn clear_polylines_js();
    #[wasm_bindgen(js_name = showPopup)]
    fn show_popup_js(key: &str, lat: f64, lng: f64);
    #[wasm_bindgen(js_name = hidePopup)]
    fn hide_popup_js();
}

/// Window events raised by `trip_map.js`.
pub const MARKER_EVENT: &str = "trip-marker";
pub const POPUP_EVENT: &str = "trip-popup";
pub const CANVAS_CLICK_EVENT: &str = "trip-map-click";

/// Attribute carrying a `MarkerKey` on itinerary rows.
pub const MARKER_KEY_ATTR: &str = "data-marker-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerAction {
    Enter,
    Leave,
    Click,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MarkerEventPayload {
    pub action: PointerAction,
    pub kind: MarkerKind,
    pub id: i64,
}

impl MarkerEventPayload {
    pub fn to_event(self) -> HighlightEvent {
        let target = MarkerKey {
            kind: self.kind,
            id: self.id,
        };
        match self.action {
            PointerAction::Enter => HighlightEvent::Enter {
                target,
                source: PointerSource::Map,
            },
            PointerAction::Leave => HighlightEvent::Leave {
                target,
                source: PointerSource::Map,
            },
            PointerAction::Click => HighlightEvent::MarkerClick(target),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PopupEventPayload {
    pub action: PointerAction,
}

impl PopupEventPayload {
    pub fn to_event(self) -> Option<HighlightEvent> {
        match self.action {
            PointerAction::Enter => Some(HighlightEvent::PopupEnter),
            PointerAction::Leave => Some(HighlightEvent::PopupLeave),
            PointerAction::Click => None,
        }
    }
}

#[derive(Serialize)]
struct JsPolyline<'a> {
    coordinates: Vec<[f64; 2]>,
    color: &'a str,
    opacity: f64,
    weight: f64,
    dashed: bool,
}

impl<'a> From<&'a Polyline> for JsPolyline<'a> {
    fn from(line: &'a Polyline) -> Self {
        Self {
            // MapLibre wants [lng, lat]
            coordinates: line.path.iter().map(|p| [p.lng, p.lat]).collect(),
            color: &line.color,
            opacity: line.opacity,
            weight: line.weight,
            dashed: line.style == LineStyle::Dashed,
        }
    }
}

pub fn icon_url(icon: &MarkerIcon) -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(icon.to_svg())
    )
}

/// MapLibre map living in `trip_map.js`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsMapSurface;

impl MapSurface for JsMapSurface {
    fn pan_to(&self, point: LatLng) {
        pan_to_js(point.lat, point.lng);
    }

    fn fit_bounds(&self, bounds: GeoBounds) {
        fit_bounds_js(bounds.north, bounds.south, bounds.east, bounds.west);
    }

    fn set_marker_icon(&self, key: MarkerKey, icon: &MarkerIcon) {
        set_marker_icon_js(&key.to_string(), &icon_url(icon), icon.size);
    }

    fn set_marker_z_order(&self, key: MarkerKey, z: i32) {
        set_marker_z_order_js(&key.to_string(), z);
    }

    fn visible_bounds(&self) -> Option<GeoBounds> {
        let value = visible_bounds_js();
        if value.is_null() || value.is_undefined() {
            return None;
        }
        from_value(value).ok()
    }

    fn place_marker(&self, key: MarkerKey, position: LatLng, icon: &MarkerIcon, title: &str) {
        place_marker_js(
            &key.to_string(),
            position.lat,
            position.lng,
            &icon_url(icon),
            icon.size,
            title,
        );
    }

    fn remove_marker(&self, key: MarkerKey) {
        remove_marker_js(&key.to_string());
    }

    fn draw_polyline(&self, line: &Polyline) {
        match to_value(&JsPolyline::from(line)) {
            Ok(value) => draw_polyline_js(value),
            Err(err) => web_sys::console::error_1(
                &format!("[frontend] polyline not serializable: {err:?}").into(),
            ),
        }
    }

    fn clear_polylines(&self) {
        clear_polylines_js();
    }

    fn show_popup(&self, key: MarkerKey, position: LatLng) {
        show_popup_js(&key.to_string(), position.lat, position.lng);
    }

    fn hide_popup(&self) {
        hide_popup_js();
    }
}

/// Itinerary rows rendered by the seed view, found by their marker key.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomItinerary;

impl DomItinerary {
    fn row(key: MarkerKey) -> Option<web_sys::Element> {
        let document = web_sys::window()?.document()?;
        document
            .query_selector(&format!("[{MARKER_KEY_ATTR}=\"{key}\"]"))
            .ok()
            .flatten()
    }
}

impl ItineraryView for DomItinerary {
    fn scroll_into_view(&self, key: MarkerKey) {
        let Some(row) = Self::row(key) else {
            return;
        };
        let options = web_sys::ScrollIntoViewOptions::new();
        options.set_behavior(web_sys::ScrollBehavior::Smooth);
        options.set_block(web_sys::ScrollLogicalPosition::Nearest);
        row.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn set_pulse(&self, key: MarkerKey, on: bool) {
        let Some(row) = Self::row(key) else {
            return;
        };
        let result = if on {
            row.set_attribute("data-pulse", "on")
        } else {
            row.remove_attribute("data-pulse")
        };
        if let Err(err) = result {
            web_sys::console::warn_1(&format!("[frontend] pulse on {key} failed: {err:?}").into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::styling::{marker_icon, BaseIcon};

    #[test]
    fn marker_payload_maps_to_map_sourced_events() {
        let payload = MarkerEventPayload {
            action: PointerAction::Leave,
            kind: MarkerKind::Poi,
            id: 7,
        };
        assert_eq!(
            payload.to_event(),
            HighlightEvent::Leave {
                target: MarkerKey::poi(7),
                source: PointerSource::Map,
            }
        );

        let click = MarkerEventPayload {
            action: PointerAction::Click,
            kind: MarkerKind::Stop,
            id: 2,
        };
        assert_eq!(click.to_event(), HighlightEvent::MarkerClick(MarkerKey::stop(2)));
    }

    #[test]
    fn popup_clicks_are_not_events() {
        let click = PopupEventPayload {
            action: PointerAction::Click,
        };
        assert_eq!(click.to_event(), None);
        let enter = PopupEventPayload {
            action: PointerAction::Enter,
        };
        assert_eq!(enter.to_event(), Some(HighlightEvent::PopupEnter));
    }

    #[test]
    fn payload_decodes_from_js_detail() {
        let payload: MarkerEventPayload =
            serde_json::from_str(r#"{"action":"enter","kind":"poi","id":12}"#).unwrap();
        assert_eq!(payload.action, PointerAction::Enter);
        assert_eq!(payload.kind, MarkerKind::Poi);
        assert_eq!(payload.id, 12);
    }

    #[test]
    fn polyline_coordinates_are_lng_first() {
        let line = Polyline {
            path: vec![LatLng::new(48.85, 2.35), LatLng::new(41.90, 12.49)],
            color: "#000000".to_string(),
            opacity: 0.5,
            weight: 2.0,
            style: LineStyle::Dashed,
        };
        let js = JsPolyline::from(&line);
        assert_eq!(js.coordinates[0], [2.35, 48.85]);
        assert!(js.dashed);
    }

    #[test]
    fn icon_url_is_base64_svg() {
        let icon = marker_icon(&BaseIcon::Stop { number: 1 }, false);
        let url = icon_url(&icon);
        let encoded = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.starts_with("<svg"));
    }
}
