mod map_bridge;

use std::time::Duration;

use seed::{prelude::*, *};
use shared::{
    styling::{self, marker_icon, BaseIcon},
    ApiError, HighlightChange, HighlightConfig, HighlightEvent, HighlightObserver, MarkerKey,
    PoiCategory, PointOfInterest, PointerSource, Profile, Stop, Trip, TripMap, TripPayload,
    ViewportError,
};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast};

use crate::map_bridge::{
    icon_url, init_trip_map, DomItinerary, JsMapSurface, MarkerEventPayload, PopupEventPayload,
    CANVAS_CLICK_EVENT, MARKER_EVENT, MARKER_KEY_ATTR, POPUP_EVENT,
};

/// Fallback frame time when the browser gives no delta.
const FRAME_MS: f64 = 16.0;

fn api_root() -> String {
    if let Some(url) = option_env!("FRONTEND_API_ROOT") {
        return url.trim_end_matches('/').to_string();
    }
    "http://localhost:8080/api".to_string()
}

pub struct Model {
    page: Page,
    trip_map: TripMap<JsMapSurface, DomItinerary>,
    dismissal: Option<CmdHandle>,
    animating: bool,
}

pub enum Page {
    Loading,
    Loaded(Box<TripPayload>),
    Failed(String),
}

pub enum Msg {
    TripFetched(Result<TripPayload, String>),
    Highlight(HighlightEvent),
    AnimationFrame(Option<f64>),
}

/// Logs every emphasis change to the browser console.
struct ConsoleTrace;

impl HighlightObserver for ConsoleTrace {
    fn on_highlight_change(&mut self, change: &HighlightChange) {
        web_sys::console::debug_1(
            &format!(
                "[frontend] highlight {:?} -> {:?}",
                change.previous, change.current
            )
            .into(),
        );
    }
}

pub fn init(url: Url, orders: &mut impl Orders<Msg>) -> Model {
    orders.stream(streams::window_event(Ev::from(MARKER_EVENT), |event| {
        let event = event.dyn_into::<web_sys::CustomEvent>().ok()?;
        match serde_wasm_bindgen::from_value::<MarkerEventPayload>(event.detail()) {
            Ok(payload) => Some(Msg::Highlight(payload.to_event())),
            Err(err) => {
                web_sys::console::warn_1(&format!("[frontend] bad marker event: {err:?}").into());
                None
            }
        }
    }));
    orders.stream(streams::window_event(Ev::from(POPUP_EVENT), |event| {
        let event = event.dyn_into::<web_sys::CustomEvent>().ok()?;
        serde_wasm_bindgen::from_value::<PopupEventPayload>(event.detail())
            .ok()
            .and_then(PopupEventPayload::to_event)
            .map(Msg::Highlight)
    }));
    orders.stream(streams::window_event(Ev::from(CANVAS_CLICK_EVENT), |_| {
        Msg::Highlight(HighlightEvent::CanvasClick)
    }));

    let mut trip_map = TripMap::new(JsMapSurface, DomItinerary, HighlightConfig::default());
    trip_map.subscribe(Box::new(ConsoleTrace));

    let page = match trip_id_from_url(&url) {
        Ok(id) => {
            orders.perform_cmd(fetch_trip(id));
            Page::Loading
        }
        Err(message) => Page::Failed(message),
    };

    Model {
        page,
        trip_map,
        dismissal: None,
        animating: false,
    }
}

pub fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::TripFetched(Ok(payload)) => {
            match model.trip_map.load(&payload.stops) {
                Ok(viewport) => web_sys::console::debug_1(
                    &format!(
                        "[frontend] {} stops, centered on {:.4} / {:.4}",
                        payload.stops.len(),
                        viewport.center.lat,
                        viewport.center.lng
                    )
                    .into(),
                ),
                Err(ViewportError::InsufficientData) => {
                    web_sys::console::log_1(&"[frontend] trip has no stops, map left as is".into())
                }
                Err(err) => web_sys::console::warn_1(&format!("[frontend] {err}").into()),
            }
            model.page = Page::Loaded(Box::new(payload));
        }
        Msg::TripFetched(Err(message)) => {
            web_sys::console::error_1(&format!("[frontend] trip fetch failed: {message}").into());
            model.page = Page::Failed(message);
        }
        Msg::Highlight(event) => {
            if let Some(scheduled) = model.trip_map.handle(event) {
                let ms = u32::try_from(scheduled.delay.as_millis()).unwrap_or(u32::MAX);
                let token = scheduled.token;
                // replacing the handle aborts the previous wake-up
                model.dismissal = Some(orders.perform_cmd_with_handle(cmds::timeout(
                    ms,
                    move || Msg::Highlight(HighlightEvent::DismissalElapsed(token)),
                )));
            } else if !model.trip_map.dismissal_pending() {
                model.dismissal = None;
            }

            if model.trip_map.renderer().is_animating() && !model.animating {
                model.animating = true;
                request_frame(orders);
            }
        }
        Msg::AnimationFrame(delta) => {
            let dt = Duration::from_secs_f64(delta.unwrap_or(FRAME_MS).max(0.0) / 1000.0);
            if model.trip_map.tick(dt) {
                request_frame(orders);
            } else {
                model.animating = false;
            }
        }
    }
}

fn request_frame(orders: &mut impl Orders<Msg>) {
    orders.after_next_render(|info| Msg::AnimationFrame(info.timestamp_delta.map(f64::from)));
}

/// Accepts `/trip/<id>` or `?id=<id>`.
fn trip_id_from_url(url: &Url) -> Result<i64, String> {
    let from_path = url
        .path()
        .iter()
        .skip_while(|segment| segment.as_str() != "trip")
        .nth(1)
        .map(String::as_str);
    let from_query = url
        .search()
        .get("id")
        .and_then(|values| values.first())
        .map(String::as_str);
    parse_trip_id(from_path.or(from_query))
}

fn parse_trip_id(raw: Option<&str>) -> Result<i64, String> {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| "Invalid trip ID".to_string())
}

async fn fetch_trip(id: i64) -> Msg {
    let url = format!("{}/trip/{id}", api_root());
    web_sys::console::debug_1(&format!("[frontend] fetching {url}").into());

    let response = match Request::new(url).method(Method::Get).fetch().await {
        Err(err) => Err(format!("{err:?}")),
        Ok(resp) if resp.status().is_ok() => match resp.json::<TripPayload>().await {
            Ok(payload) => Ok(payload),
            Err(err) => Err(format!("{err:?}")),
        },
        Ok(resp) => {
            let code = resp.status().code;
            match resp.json::<ApiError>().await {
                Ok(body) => Err(body.message),
                Err(_) => Err(format!("Request failed with status {code}")),
            }
        }
    };

    Msg::TripFetched(response)
}

pub fn view(model: &Model) -> Node<Msg> {
    let active = model.trip_map.state().target();
    match &model.page {
        Page::Loading => div![C!["trip-page"], p![C!["placeholder"], "Loading trip..."]],
        Page::Failed(message) => div![
            C!["trip-page"],
            div![
                C!["placeholder"],
                h2!["This trip is unavailable"],
                p![C!["error"], message],
            ]
        ],
        Page::Loaded(payload) => div![
            C!["trip-page"],
            view_header(&payload.trip, payload.profile.as_ref()),
            view_itinerary(&payload.stops, active),
        ],
    }
}

fn view_header(trip: &Trip, profile: Option<&Profile>) -> Node<Msg> {
    let author = match profile {
        Some(profile) => div![
            C!["author"],
            profile.avatar_url.as_ref().map(|src| img![
                C!["avatar"],
                attrs! { At::Src => src, At::Alt => &profile.name },
            ]),
            strong![&profile.name],
            span![C!["username"], format!("@{}", profile.username)],
        ],
        None => empty![],
    };

    header![
        C!["trip-header"],
        trip.header_image_url.as_ref().map(|src| img![
            C!["header-image"],
            attrs! { At::Src => src, At::Alt => &trip.title },
        ]),
        h1![&trip.title],
        author,
        small![trip.created_at.format("%Y-%m-%d").to_string()],
        IF!(!trip.description.is_empty() => p![C!["description"], &trip.description]),
    ]
}

fn view_itinerary(stops: &[Stop], active: Option<MarkerKey>) -> Node<Msg> {
    if stops.is_empty() {
        return section![
            C!["itinerary"],
            h2!["Itinerary"],
            p![C!["placeholder"], "No stops yet."]
        ];
    }

    section![
        C!["itinerary"],
        h2!["Itinerary"],
        ol![C!["stops"], stops.iter().map(|stop| view_stop(stop, active))],
    ]
}

fn view_stop(stop: &Stop, active: Option<MarkerKey>) -> Node<Msg> {
    let key = MarkerKey::stop(stop.id);
    li![
        C!["stop"],
        div![
            C!["stop-header", IF!(active == Some(key) => "highlighted")],
            attrs! { At::from(MARKER_KEY_ATTR) => key.to_string() },
            span![C!["stop-number"], stop.trip_stop_number.to_string()],
            div![
                h3![&stop.name],
                p![C!["nights"], nights_label(stop.nights)],
                IF!(!stop.description.is_empty() => p![&stop.description]),
            ],
            list_pointer_events(key),
        ],
        ul![
            C!["poi-groups"],
            stop.pois_by_category()
                .into_iter()
                .map(|(category, pois)| view_poi_group(category, &pois, active)),
        ],
    ]
}

fn view_poi_group(
    category: &PoiCategory,
    pois: &[&PointOfInterest],
    active: Option<MarkerKey>,
) -> Node<Msg> {
    let style = styling::style(category);
    let badge = icon_url(&marker_icon(&BaseIcon::Poi(category.clone()), true));
    li![
        C!["poi-group"],
        div![
            C!["poi-group-header"],
            img![
                C!["category-badge"],
                attrs! { At::Src => badge, At::Alt => style.label },
            ],
            span![style.label],
            span![C!["count"], format!("({})", pois.len())],
        ],
        ul![pois.iter().map(|poi| view_poi(poi, active))],
    ]
}

fn view_poi(poi: &PointOfInterest, active: Option<MarkerKey>) -> Node<Msg> {
    let key = MarkerKey::poi(poi.id);
    li![
        C!["poi", IF!(active == Some(key) => "highlighted")],
        attrs! { At::from(MARKER_KEY_ATTR) => key.to_string() },
        h5![&poi.name],
        IF!(!poi.description.is_empty() => p![&poi.description]),
        poi.photos.first().map(|src| div![
            C!["poi-photo"],
            img![attrs! { At::Src => src, At::Alt => &poi.name }],
            IF!(poi.photos.len() > 1 => span![C!["photo-count"], format!("+{}", poi.photos.len() - 1)]),
        ]),
        list_pointer_events(key),
    ]
}

fn list_pointer_events(target: MarkerKey) -> Vec<EventHandler<Msg>> {
    vec![
        ev(Ev::MouseEnter, move |_| {
            Msg::Highlight(HighlightEvent::Enter {
                target,
                source: PointerSource::List,
            })
        }),
        ev(Ev::MouseLeave, move |_| {
            Msg::Highlight(HighlightEvent::Leave {
                target,
                source: PointerSource::List,
            })
        }),
    ]
}

fn nights_label(nights: u32) -> String {
    if nights == 1 {
        "1 night".to_string()
    } else {
        format!("{nights} nights")
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    init_trip_map();
    App::start("app", init, update, view);
}
