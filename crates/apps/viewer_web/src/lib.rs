use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use formats::{ViewerConfig, parse_dataset_csv};
use gpu::{DriverSettings, FrameDriver, InitError};
use runtime::{SessionEvent, StateError};

mod wgpu;
use crate::wgpu::{WgpuBackend, init_wgpu_from_canvas_id};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Default)]
struct ViewerState {
    config: ViewerConfig,
    backend: Option<WgpuBackend>,
    driver: Option<FrameDriver>,
}

thread_local! {
    static STATE: RefCell<ViewerState> = RefCell::new(ViewerState::default());
}

fn with_state<R>(f: impl FnOnce(&mut ViewerState) -> R) -> Option<R> {
    STATE.try_with(|state| f(&mut state.borrow_mut())).ok()
}

fn state_gone() -> JsValue {
    JsValue::from_str("viewer state unavailable")
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn log_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn state_error(e: StateError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    set_once();
    Ok(())
}

/// Boots the viewer. `config_json` overrides the default [`ViewerConfig`].
#[wasm_bindgen]
pub fn init_viewer(config_json: Option<String>) {
    spawn_local(async move {
        if let Err(err) = init_inner(config_json).await {
            log_error(&format!("viewer init failed: {}", err.as_string().unwrap_or_default()));
        }
    });
}

async fn init_inner(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => {
            ViewerConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        None => ViewerConfig::default(),
    };
    let settings = DriverSettings::from_config(&config).map_err(state_error)?;

    let mut backend = init_wgpu_from_canvas_id(&config.canvas_id)
        .await
        .map_err(|e| {
            let err = InitError::ContextUnavailable(e.as_string().unwrap_or_default());
            JsValue::from_str(&err.to_string())
        })?;

    let csv = fetch_text(&config.dataset_url).await?;
    let rows = parse_dataset_csv(&csv).map_err(|e| JsValue::from_str(&e.to_string()))?;
    log(&format!("loaded {} rows from {}", rows.len(), config.dataset_url));

    let driver = FrameDriver::new(settings, rows, &mut backend)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let texture_url = config.texture_url.clone();
    with_state(|s| {
        s.config = config;
        s.backend = Some(backend);
        s.driver = Some(driver);
    });

    spawn_local(async move {
        if let Err(err) = load_texture(&texture_url).await {
            log_error(&format!(
                "texture {texture_url} unavailable, keeping placeholder: {}",
                err.as_string().unwrap_or_default()
            ));
        }
    });

    start_animation_loop()
}

async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    resp.text()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

async fn load_texture(url: &str) -> Result<(), JsValue> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", resp.status())));
    }
    let bytes = resp
        .binary()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))?
        .to_rgba8();
    let (width, height) = image.dimensions();

    with_state(|s| {
        let ViewerState {
            backend, driver, ..
        } = s;
        match (backend.as_mut(), driver.as_ref()) {
            (Some(backend), Some(driver)) => driver
                .replace_texture(backend, width, height, image.as_raw())
                .map_err(|e| JsValue::from_str(&e.to_string())),
            _ => Err(JsValue::from_str("viewer not initialized")),
        }
    })
    .unwrap_or_else(|| Err(state_gone()))
}

fn request_animation_frame(f: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("window missing"))?
        .request_animation_frame(f.as_ref().unchecked_ref())
}

/// Schedules one frame per display refresh for the rest of the session.
fn start_animation_loop() -> Result<(), JsValue> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
        with_state(|s| {
            let ViewerState {
                backend, driver, ..
            } = s;
            if let (Some(backend), Some(driver)) = (backend.as_mut(), driver.as_mut()) {
                if let Err(err) = driver.frame_at(now_ms, backend) {
                    log_error(&format!("frame skipped: {err}"));
                }
                for event in driver.drain_events() {
                    match event.event {
                        SessionEvent::DayAdvanced { from, to } => {
                            log(&format!("day {from} -> {to}"));
                        }
                        SessionEvent::VelocityRejected { text } => {
                            log(&format!("velocity {text:?} is not an integer"));
                        }
                        _ => {}
                    }
                }
            }
        });

        if let Some(f) = next.borrow().as_ref() {
            if let Err(err) = request_animation_frame(f) {
                log_error(&format!("animation loop stopped: {err:?}"));
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let borrowed = callback.borrow();
    let f = borrowed
        .as_ref()
        .ok_or_else(|| JsValue::from_str("animation callback missing"))?;
    request_animation_frame(f)?;
    Ok(())
}

fn with_driver<R: Default>(f: impl FnOnce(&mut FrameDriver) -> R) -> R {
    with_state(|s| s.driver.as_mut().map(f))
        .flatten()
        .unwrap_or_default()
}

fn with_driver_result(
    f: impl FnOnce(&mut FrameDriver) -> Result<(), StateError>,
) -> Result<(), JsValue> {
    with_state(|s| match s.driver.as_mut() {
        Some(driver) => f(driver).map_err(state_error),
        None => Err(JsValue::from_str("viewer not initialized")),
    })
    .unwrap_or_else(|| Err(state_gone()))
}

/// Pointer pressed at canvas pixel `(x, y)`.
#[wasm_bindgen]
pub fn pointer_down(x: f64, y: f64) -> bool {
    with_driver(|d| d.pointer_down(x, y))
}

#[wasm_bindgen]
pub fn pointer_move(x: f64, y: f64) -> Result<bool, JsValue> {
    with_state(|s| match s.driver.as_mut() {
        Some(driver) => driver.pointer_move(x, y).map_err(state_error),
        None => Ok(false),
    })
    .unwrap_or_else(|| Err(state_gone()))
}

#[wasm_bindgen]
pub fn pointer_up() -> bool {
    with_driver(|d| d.pointer_up())
}

#[wasm_bindgen]
pub fn get_day() -> u32 {
    with_driver(|d| u32::from(d.state().day().get()))
}

#[wasm_bindgen]
pub fn set_day(day: i32) -> Result<(), JsValue> {
    with_driver_result(|d| d.state_mut().set_day(i64::from(day)))
}

#[wasm_bindgen]
pub fn get_latitude() -> f64 {
    with_driver(|d| d.state().latitude())
}

#[wasm_bindgen]
pub fn set_latitude(latitude: f64) -> Result<(), JsValue> {
    with_driver_result(|d| d.state_mut().set_latitude(latitude))
}

#[wasm_bindgen]
pub fn get_longitude() -> f64 {
    with_driver(|d| d.state().longitude())
}

#[wasm_bindgen]
pub fn set_longitude(longitude: f64) -> Result<(), JsValue> {
    with_driver_result(|d| d.state_mut().set_longitude(longitude))
}

#[wasm_bindgen]
pub fn get_animate() -> bool {
    with_driver(|d| d.state().animate())
}

#[wasm_bindgen]
pub fn set_animate(animate: bool) {
    with_driver(|d| d.state_mut().set_animate(animate))
}

#[wasm_bindgen]
pub fn get_velocity() -> String {
    with_driver(|d| d.state().velocity().to_string())
}

/// Stores the text as typed; it is parsed each frame.
#[wasm_bindgen]
pub fn set_velocity(velocity: String) {
    with_driver(|d| d.state_mut().set_velocity(velocity))
}

#[derive(Debug, Serialize)]
struct InteractionSnapshot {
    day: u8,
    day_label: String,
    latitude: f64,
    longitude: f64,
    animate: bool,
    velocity: String,
    dragging: bool,
}

/// Current control values as JSON, for syncing GUI widgets.
#[wasm_bindgen]
pub fn interaction_snapshot() -> Result<String, JsValue> {
    let snapshot = with_state(|s| {
        s.driver.as_ref().map(|d| {
            let state = d.state();
            InteractionSnapshot {
                day: state.day().get(),
                day_label: state.day().label(),
                latitude: state.latitude(),
                longitude: state.longitude(),
                animate: state.animate(),
                velocity: state.velocity().to_string(),
                dragging: d.is_dragging(),
            }
        })
    })
    .flatten()
    .ok_or_else(|| JsValue::from_str("viewer not initialized"))?;
    serde_json::to_string(&snapshot).map_err(|e| JsValue::from_str(&e.to_string()))
}
