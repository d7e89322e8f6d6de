use crate::constants::REDUCED_MOTION_QUERY;
use crate::profiler::Environment;
use wasm_bindgen::JsValue;
use web_sys as web;

/// Capability signals read from `navigator` and `matchMedia`.
///
/// `deviceMemory` and `connection` are not in every browser's typings, so
/// they are read reflectively.
pub struct BrowserEnvironment {
    window: web::Window,
}

impl BrowserEnvironment {
    pub fn new() -> Option<Self> {
        web::window().map(|window| Self { window })
    }

    fn navigator_prop(&self, name: &str) -> Option<JsValue> {
        let nav = self.window.navigator();
        js_sys::Reflect::get(&nav, &JsValue::from_str(name))
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
    }
}

impl Environment for BrowserEnvironment {
    fn user_agent(&self) -> String {
        self.window.navigator().user_agent().unwrap_or_default()
    }

    fn logical_cores(&self) -> Option<u32> {
        let n = self.window.navigator().hardware_concurrency();
        (n >= 1.0).then_some(n as u32)
    }

    fn device_memory_gb(&self) -> Option<f64> {
        self.navigator_prop("deviceMemory").and_then(|v| v.as_f64())
    }

    fn effective_connection_type(&self) -> Option<String> {
        let connection = self.navigator_prop("connection")?;
        js_sys::Reflect::get(&connection, &JsValue::from_str("effectiveType"))
            .ok()
            .and_then(|v| v.as_string())
    }

    fn prefers_reduced_motion(&self) -> bool {
        match self.window.match_media(REDUCED_MOTION_QUERY) {
            Ok(Some(mql)) => mql.matches(),
            _ => false,
        }
    }
}
