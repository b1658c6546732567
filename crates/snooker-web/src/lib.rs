pub mod runner;

pub use runner::SessionRunner;

use std::cell::RefCell;

use snooker_engine::{BallKind, FoulDecision, Intent, JsonStatsStore, SessionConfig, Vec2};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SessionRunner>> = RefCell::new(None);
}

/// Run `f` against the live runner. `None` before `snooker_init`.
fn with_runner<R>(f: impl FnOnce(&mut SessionRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                web_sys::console::warn_1(&"snooker: call snooker_init() first".into());
                None
            }
        }
    })
}

fn push(intent: Intent) {
    with_runner(|r| r.push_intent(intent));
}

/// Start a session. Empty or invalid JSON falls back to defaults.
#[wasm_bindgen]
pub fn snooker_init(config_json: &str, stats_json: &str) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        SessionConfig::default()
    } else {
        SessionConfig::from_json(config_json).unwrap_or_else(|e| {
            log::warn!("Invalid session config, using defaults: {}", e);
            SessionConfig::default()
        })
    };
    let stats = if stats_json.trim().is_empty() {
        JsonStatsStore::new()
    } else {
        JsonStatsStore::from_json(stats_json).unwrap_or_else(|e| {
            log::warn!("Invalid stats, starting fresh: {}", e);
            JsonStatsStore::new()
        })
    };

    let runner = SessionRunner::new(config, stats);
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("snooker: initialized");
}

#[wasm_bindgen]
pub fn snooker_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

// ---- Input ----

#[wasm_bindgen]
pub fn snooker_aim(x: f32, y: f32) {
    push(Intent::Aim {
        direction: Vec2::new(x, y),
    });
}

#[wasm_bindgen]
pub fn snooker_spin(side: f32, top: f32) {
    push(Intent::Spin { side, top });
}

#[wasm_bindgen]
pub fn snooker_shoot(x: f32, y: f32, power: f32) {
    push(Intent::Shoot {
        direction: Vec2::new(x, y),
        power,
    });
}

#[wasm_bindgen]
pub fn snooker_place_cue(x: f32, y: f32) {
    push(Intent::PlaceCue {
        position: Vec2::new(x, y),
    });
}

/// Nominate a colour by its point value (2 = yellow .. 7 = black).
#[wasm_bindgen]
pub fn snooker_nominate(value: u32) {
    match BallKind::from_value(value) {
        Some(kind) => push(Intent::Nominate { kind }),
        None => log::warn!("No ball has value {}", value),
    }
}

/// 0 = play on, 1 = replay, 2 = free ball.
#[wasm_bindgen]
pub fn snooker_decide(code: u32) {
    let decision = match code {
        0 => FoulDecision::PlayOn,
        1 => FoulDecision::Replay,
        2 => FoulDecision::FreeBall,
        _ => {
            log::warn!("Unknown foul decision {}", code);
            return;
        }
    };
    push(Intent::Decide { decision });
}

#[wasm_bindgen]
pub fn snooker_new_frame() {
    with_runner(|r| r.session_mut().new_frame());
}

// ---- Networking ----

#[wasm_bindgen]
pub fn snooker_receive_message(json: &str) -> bool {
    with_runner(|r| r.receive_message(json)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn snooker_drain_outbox() -> String {
    with_runner(|r| r.drain_outbox_json()).unwrap_or_else(|| "[]".to_string())
}

#[wasm_bindgen]
pub fn snooker_peer_disconnected() {
    with_runner(|r| r.session_mut().on_peer_disconnected());
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn snooker_snapshot() -> String {
    with_runner(|r| r.snapshot_json()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn snooker_stats() -> String {
    with_runner(|r| r.stats_json()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn snooker_status_message() -> String {
    with_runner(|r| r.status_message()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_buffer_ptr() -> *const f32 {
    with_runner(|r| r.buffer_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.buffer_total_floats()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_max_balls() -> u32 {
    with_runner(|r| r.max_balls()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_max_sounds() -> u32 {
    with_runner(|r| r.max_sounds()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_max_events() -> u32 {
    with_runner(|r| r.max_events()).unwrap_or(0)
}
