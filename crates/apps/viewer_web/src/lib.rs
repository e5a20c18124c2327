use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use serde::Serialize;
use std::cell::RefCell;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use catalog::{Dataset, InMemorySource, PrepareOptions, Selection};
use foundation::VoyageId;
use playback::{DriverState, PlaybackConfig, PlaybackCoordinator, PlaybackEvent, PlaybackSession};
use runtime::Event;

mod frame_loop;
use frame_loop::AnimationFrameLoop;

thread_local! {
    static SESSION: RefCell<Option<PlaybackSession>> = const { RefCell::new(None) };
    static FRAME_LOOP: RefCell<Option<AnimationFrameLoop>> = const { RefCell::new(None) };
    static EVENT_LISTENER: RefCell<Option<js_sys::Function>> = const { RefCell::new(None) };
}

/// Payload handed to the event listener as a JSON string.
#[derive(Debug, Serialize)]
struct EventMessage<'a> {
    frame: u64,
    #[serde(flatten)]
    event: &'a PlaybackEvent,
}

/// One route for the map layer.
#[derive(Debug, Serialize)]
struct RouteLayer {
    id: VoyageId,
    name: String,
    color: String,
    path: Vec<[f64; 2]>,
    /// Unrounded playback position of each path vertex; the route is drawn up
    /// to the current position.
    positions: Vec<f64>,
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn log_error(context: &str, err: &JsValue) {
    web_sys::console::error_2(&JsValue::from_str(context), err);
}

fn with_session<T>(f: impl FnOnce(&mut PlaybackSession) -> Result<T, JsValue>) -> Result<T, JsValue> {
    let (out, events) = SESSION.with(|session| {
        let mut session = session.borrow_mut();
        let session = session
            .as_mut()
            .ok_or_else(|| JsValue::from_str("dataset not loaded"))?;
        let out = f(session)?;
        Ok::<_, JsValue>((out, session.take_events()))
    })?;
    sync_frame_loop()?;
    dispatch(&events);
    Ok(out)
}

fn update<T>(f: impl FnOnce(&mut PlaybackCoordinator) -> T) -> Result<T, JsValue> {
    with_session(|session| session.update(f).map_err(to_js))
}

fn read<T>(f: impl FnOnce(&PlaybackCoordinator) -> T) -> Result<T, JsValue> {
    SESSION.with(|session| {
        session
            .borrow()
            .as_ref()
            .map(|s| f(s.coordinator()))
            .ok_or_else(|| JsValue::from_str("dataset not loaded"))
    })
}

fn on_frame(host_ms: f64) -> bool {
    let (animating, events) = SESSION.with(|session| match session.borrow_mut().as_mut() {
        Some(session) => {
            let report = session.run_host_frame(host_ms);
            (session.is_animating(), report.events)
        }
        None => (false, Vec::new()),
    });
    dispatch(&events);
    animating
}

/// Drains whatever the session has queued and forwards it.
fn flush_events() {
    let events = SESSION.with(|session| {
        session
            .borrow_mut()
            .as_mut()
            .map(PlaybackSession::take_events)
            .unwrap_or_default()
    });
    dispatch(&events);
}

/// Hands drained events to the registered listener. Without a listener
/// they are dropped. Must be called with no session borrow held, as the
/// listener may call back into the exports.
fn dispatch(events: &[Event<PlaybackEvent>]) {
    if events.is_empty() {
        return;
    }
    let Some(listener) = EVENT_LISTENER.with(|l| l.borrow().clone()) else {
        return;
    };
    for event in events {
        let message = EventMessage {
            frame: event.frame_index,
            event: &event.payload,
        };
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(err) => {
                log_error("failed to encode playback event:", &to_js(err));
                continue;
            }
        };
        if let Err(err) = listener.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            log_error("playback event listener failed:", &err);
        }
    }
}

/// Keeps a pending animation frame exactly while the session animates.
fn sync_frame_loop() -> Result<(), JsValue> {
    let animating = SESSION.with(|s| s.borrow().as_ref().is_some_and(|s| s.is_animating()));
    FRAME_LOOP.with(|frame_loop| {
        let mut frame_loop = frame_loop.borrow_mut();
        if let Some(running) = frame_loop.as_ref() {
            if animating {
                running.resume()
            } else {
                running.cancel();
                Ok(())
            }
        } else if animating {
            *frame_loop = Some(AnimationFrameLoop::start(on_frame)?);
            Ok(())
        } else {
            Ok(())
        }
    })
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Fetches the dataset, replaces any running session and starts playback.
#[wasm_bindgen]
pub fn load_dataset(
    voyages_url: String,
    occurrences_url: String,
    metadata_url: Option<String>,
    config_json: Option<String>,
) {
    spawn_local(async move {
        if let Err(err) = load_dataset_inner(voyages_url, occurrences_url, metadata_url, config_json).await {
            log_error("failed to load dataset:", &err);
        }
    });
}

/// Registers `listener` to receive every playback event as a JSON string,
/// e.g. `{"frame":12,"type":"scrolled","row":3}`. Replaces any earlier
/// listener.
#[wasm_bindgen]
pub fn set_event_listener(listener: js_sys::Function) {
    EVENT_LISTENER.with(|l| *l.borrow_mut() = Some(listener));
}

#[wasm_bindgen]
pub fn clear_event_listener() {
    EVENT_LISTENER.with(|l| l.borrow_mut().take());
}

#[wasm_bindgen]
pub fn toggle() -> Result<bool, JsValue> {
    update(|c| c.toggle() == DriverState::Playing)
}

#[wasm_bindgen]
pub fn reset() -> Result<(), JsValue> {
    update(PlaybackCoordinator::reset)
}

#[wasm_bindgen]
pub fn seek(position: f64) -> Result<u32, JsValue> {
    update(|c| c.seek(position.round() as i64).value())
}

#[wasm_bindgen]
pub fn slider_pressed() -> Result<(), JsValue> {
    update(PlaybackCoordinator::begin_scrub)
}

#[wasm_bindgen]
pub fn slider_changed(position: f64) -> Result<u32, JsValue> {
    update(|c| c.scrub_to(position.round() as i64).value())
}

#[wasm_bindgen]
pub fn slider_released() -> Result<bool, JsValue> {
    update(|c| c.end_scrub() == DriverState::Playing)
}

/// Selects voyage `index`, or every voyage for a negative index.
#[wasm_bindgen]
pub fn select_voyage(index: i32) -> Result<bool, JsValue> {
    let selection = match u32::try_from(index) {
        Ok(index) => Selection::Voyage(VoyageId::new(index)),
        Err(_) => Selection::All,
    };
    with_session(|session| {
        session
            .update(|c| c.select(selection))
            .and_then(|selected| selected)
            .map_err(to_js)
    })
}

/// The occurrence list was scrolled by the user; `top_row` is the first
/// visible row. Returns the new position if playback seeked.
#[wasm_bindgen]
pub fn list_rendered(top_row: u32) -> Result<Option<u32>, JsValue> {
    update(|c| c.manual_scroll(top_row as usize).map(|p| p.value()))
}

#[wasm_bindgen]
pub fn view_json() -> Result<String, JsValue> {
    read(|c| serde_json::to_string(&c.view()))?.map_err(to_js)
}

#[wasm_bindgen]
pub fn selector_options_json() -> Result<String, JsValue> {
    read(|c| serde_json::to_string(&c.selector_options()))?.map_err(to_js)
}

#[wasm_bindgen]
pub fn occurrence_rows_json() -> Result<String, JsValue> {
    read(|c| serde_json::to_string(&c.occurrence_rows()))?.map_err(to_js)
}

#[wasm_bindgen]
pub fn routes_json() -> Result<String, JsValue> {
    read(|c| {
        let scale = c.time_scale();
        let routes: Vec<RouteLayer> = c
            .visible_voyages()
            .iter()
            .map(|v| RouteLayer {
                id: v.id(),
                name: v.metadata().vessel_name.clone(),
                color: v.metadata().color.to_hex(),
                path: v.path().collect(),
                positions: v
                    .coordinates()
                    .iter()
                    .map(|p| scale.forward_exact(p.timestamp))
                    .collect(),
            })
            .collect();
        serde_json::to_string(&routes)
    })?
    .map_err(to_js)
}

/// Stops playback and cancels every pending frame. Call when the map is
/// unmounted.
#[wasm_bindgen]
pub fn teardown() {
    FRAME_LOOP.with(|frame_loop| frame_loop.borrow_mut().take());
    SESSION.with(|session| {
        if let Some(session) = session.borrow_mut().as_mut() {
            session.teardown();
        }
    });
    flush_events();
}

async fn load_dataset_inner(
    voyages_url: String,
    occurrences_url: String,
    metadata_url: Option<String>,
    config_json: Option<String>,
) -> Result<(), JsValue> {
    let config = match config_json {
        Some(raw) => PlaybackConfig::from_json_str(&raw).map_err(to_js)?,
        None => PlaybackConfig::default(),
    };

    let voyages_json = fetch_text(&voyages_url).await?;
    let occurrences_json = fetch_text(&occurrences_url).await?;
    let metadata_json = match metadata_url {
        Some(url) => Some(fetch_text(&url).await?),
        None => None,
    };

    let source = InMemorySource {
        voyages_json,
        occurrences_json,
        metadata_json,
    };
    let options = PrepareOptions {
        lead_in_months: config.lead_in_months,
    };
    let dataset = Dataset::load(&source, options).map_err(to_js)?;
    let coordinator = PlaybackCoordinator::new(Arc::new(dataset), config).map_err(to_js)?;

    teardown();
    let mut session = PlaybackSession::new(coordinator);
    session.mount().map_err(to_js)?;
    SESSION.with(|s| *s.borrow_mut() = Some(session));
    sync_frame_loop()?;
    flush_events();
    Ok(())
}

async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let resp = Request::get(url).send().await.map_err(to_js)?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!(
            "GET {url} failed with status {}",
            resp.status()
        )));
    }
    resp.text().await.map_err(to_js)
}
