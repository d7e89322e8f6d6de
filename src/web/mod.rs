//! Browser bindings: the `requestAnimationFrame` clock, navigator-backed
//! capability signals, and the JS-facing exports.
//!
//! JS callers share one scheduler and one config cache per page, kept in
//! thread-locals. Rust callers can build their own instances instead.

mod env;
mod raf;

pub use env::BrowserEnvironment;
pub use raf::RafClock;

use crate::constants::REDUCED_MOTION_QUERY;
use crate::profiler::{detect_device_capabilities, PerformanceConfigCache};
use crate::scheduler::FrameScheduler;
use serde::Serialize;
use std::cell::{OnceCell, RefCell};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

thread_local! {
    static CONTROLLER: RefCell<Option<AnimationController>> = const { RefCell::new(None) };
    static CONFIG_CACHE: OnceCell<PerformanceConfigCache<BrowserEnvironment>> = const { OnceCell::new() };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("grimoire-motion starting");
    watch_reduced_motion();
    Ok(())
}

/// Drops the cached profile whenever the reduced-motion preference flips, so
/// effects mounted afterwards see the new budget.
fn watch_reduced_motion() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(Some(mql)) = window.match_media(REDUCED_MOTION_QUERY) else {
        return;
    };
    let closure = Closure::wrap(Box::new(move || {
        log::info!("reduced-motion preference changed; profile will be recomputed");
        CONFIG_CACHE.with(|cell| {
            if let Some(cache) = cell.get() {
                cache.reset();
            }
        });
    }) as Box<dyn FnMut()>);
    _ = mql.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(js_err)?;
    js_sys::JSON::parse(&json)
}

/// JS handle to a frame scheduler driven by `requestAnimationFrame`.
#[wasm_bindgen]
#[derive(Clone)]
pub struct AnimationController {
    scheduler: FrameScheduler<RafClock>,
}

#[wasm_bindgen]
impl AnimationController {
    /// Creates an independent scheduler. Most pages want the shared one from
    /// `animationController()`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<AnimationController, JsValue> {
        let clock = RafClock::new().map_err(js_err)?;
        Ok(Self {
            scheduler: FrameScheduler::new(clock),
        })
    }

    /// `callback(deltaTime, timestamp)` runs every frame until unregistered.
    /// Exceptions it throws are logged and do not affect other callbacks.
    pub fn register(&self, key: String, callback: js_sys::Function) {
        self.scheduler.register(key, move |delta, timestamp| {
            callback
                .call2(
                    &JsValue::NULL,
                    &JsValue::from_f64(delta),
                    &JsValue::from_f64(timestamp),
                )
                .map(|_| ())
                .map_err(|e| anyhow::anyhow!("{:?}", e))
        });
    }

    pub fn unregister(&self, key: &str) {
        self.scheduler.unregister(key);
    }

    #[wasm_bindgen(js_name = activeCount)]
    pub fn active_count(&self) -> usize {
        self.scheduler.active_count()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }
}

impl AnimationController {
    pub fn scheduler(&self) -> &FrameScheduler<RafClock> {
        &self.scheduler
    }
}

/// Shared page-wide controller, created on first use.
#[wasm_bindgen(js_name = animationController)]
pub fn animation_controller() -> Result<AnimationController, JsValue> {
    CONTROLLER.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(existing) = slot.as_ref() {
            return Ok(existing.clone());
        }
        let controller = AnimationController::new()?;
        *slot = Some(controller.clone());
        Ok(controller)
    })
}

fn with_config_cache<R>(
    f: impl FnOnce(&PerformanceConfigCache<BrowserEnvironment>) -> R,
) -> Result<R, JsValue> {
    CONFIG_CACHE.with(|cell| {
        if cell.get().is_none() {
            let env = BrowserEnvironment::new().ok_or_else(|| js_err("no window"))?;
            _ = cell.set(PerformanceConfigCache::new(env));
        }
        let cache = cell.get().ok_or_else(|| js_err("config cache unavailable"))?;
        Ok(f(cache))
    })
}

#[wasm_bindgen(js_name = getCachedPerformanceConfig)]
pub fn get_cached_performance_config() -> Result<JsValue, JsValue> {
    let config = with_config_cache(|cache| cache.get())?;
    to_js(&config)
}

#[wasm_bindgen(js_name = resetPerformanceConfig)]
pub fn reset_performance_config() -> Result<(), JsValue> {
    with_config_cache(|cache| cache.reset())
}

#[wasm_bindgen(js_name = detectDeviceCapabilities)]
pub fn detect_device_capabilities_js() -> Result<JsValue, JsValue> {
    let env = BrowserEnvironment::new().ok_or_else(|| js_err("no window"))?;
    to_js(&detect_device_capabilities(&env))
}

#[wasm_bindgen(js_name = prefersReducedMotion)]
pub fn prefers_reduced_motion_js() -> bool {
    BrowserEnvironment::new()
        .map(|env| crate::profiler::prefers_reduced_motion(&env))
        .unwrap_or(false)
}
