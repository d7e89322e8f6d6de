//! Environment signals and the device classification derived from them.

use crate::constants::{DEFAULT_CORES, DEFAULT_EFFECTIVE_TYPE, DEFAULT_MEMORY_GB};
use serde::{Deserialize, Serialize};

/// Read-only view of the host runtime's capability signals.
///
/// `None` means the host does not expose the signal; detection substitutes
/// a conservative default.
pub trait Environment {
    fn user_agent(&self) -> String;
    fn logical_cores(&self) -> Option<u32>;
    fn device_memory_gb(&self) -> Option<f64>;
    fn effective_connection_type(&self) -> Option<String>;
    fn prefers_reduced_motion(&self) -> bool;
}

impl<E: Environment + ?Sized> Environment for &E {
    fn user_agent(&self) -> String {
        (**self).user_agent()
    }
    fn logical_cores(&self) -> Option<u32> {
        (**self).logical_cores()
    }
    fn device_memory_gb(&self) -> Option<f64> {
        (**self).device_memory_gb()
    }
    fn effective_connection_type(&self) -> Option<String> {
        (**self).effective_connection_type()
    }
    fn prefers_reduced_motion(&self) -> bool {
        (**self).prefers_reduced_motion()
    }
}

/// Fixed set of signals, for native hosts, server-side rendering and tests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticEnvironment {
    pub user_agent: String,
    pub cores: Option<u32>,
    pub memory_gb: Option<f64>,
    pub effective_type: Option<String>,
    pub reduced_motion: bool,
}

impl StaticEnvironment {
    pub fn desktop(cores: u32, memory_gb: f64) -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0".into(),
            cores: Some(cores),
            memory_gb: Some(memory_gb),
            effective_type: Some("4g".into()),
            reduced_motion: false,
        }
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_connection(mut self, effective_type: impl Into<String>) -> Self {
        self.effective_type = Some(effective_type.into());
        self
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }
}

impl Environment for StaticEnvironment {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
    fn logical_cores(&self) -> Option<u32> {
        self.cores
    }
    fn device_memory_gb(&self) -> Option<f64> {
        self.memory_gb
    }
    fn effective_connection_type(&self) -> Option<String> {
        self.effective_type.clone()
    }
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
}

/// Network Information API `effectiveType`, slowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConnectionType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
}

impl ConnectionType {
    /// Parses an `effectiveType` string; unknown values yield `None`.
    pub fn from_effective_type(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow-2g" => Some(Self::Slow2g),
            "2g" => Some(Self::TwoG),
            "3g" => Some(Self::ThreeG),
            "4g" => Some(Self::FourG),
            _ => None,
        }
    }

    pub fn is_slow(self) -> bool {
        matches!(self, Self::Slow2g | Self::TwoG)
    }
}

/// Classification of the current device. Hardware classes are derived from
/// `cores`/`memory_gb` and are mutually exclusive, but a device may fall in
/// none of them (e.g. many cores with mid-range memory).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub cores: u32,
    pub memory_gb: f64,
    pub connection: ConnectionType,
    pub is_low_end: bool,
    pub is_mid_range: bool,
    pub is_high_end: bool,
    pub is_slow_connection: bool,
}

/// Hardware class cut-offs: `mid_*` is the first value that is no longer
/// low-end, `high_*` the first value that counts as high-end.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareThresholds {
    pub mid_cores: u32,
    pub high_cores: u32,
    pub mid_memory_gb: f64,
    pub high_memory_gb: f64,
}

impl Default for HardwareThresholds {
    fn default() -> Self {
        use crate::constants::{HIGH_CORES, HIGH_MEMORY_GB, MID_CORES, MID_MEMORY_GB};
        Self {
            mid_cores: MID_CORES,
            high_cores: HIGH_CORES,
            mid_memory_gb: MID_MEMORY_GB,
            high_memory_gb: HIGH_MEMORY_GB,
        }
    }
}

impl HardwareThresholds {
    pub fn classify<E: Environment>(&self, env: &E) -> DeviceCapabilities {
        let ua = env.user_agent().to_ascii_lowercase();
        let cores = env.logical_cores().filter(|&c| c > 0).unwrap_or(DEFAULT_CORES);
        let memory_gb = env
            .device_memory_gb()
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(DEFAULT_MEMORY_GB);
        let connection = env
            .effective_connection_type()
            .and_then(|t| ConnectionType::from_effective_type(&t))
            .or_else(|| ConnectionType::from_effective_type(DEFAULT_EFFECTIVE_TYPE))
            .unwrap_or(ConnectionType::FourG);

        let is_low_end = cores < self.mid_cores || memory_gb < self.mid_memory_gb;
        let is_mid_range = (self.mid_cores..self.high_cores).contains(&cores)
            && memory_gb >= self.mid_memory_gb
            && memory_gb < self.high_memory_gb;
        let is_high_end = cores >= self.high_cores && memory_gb >= self.high_memory_gb;

        DeviceCapabilities {
            is_mobile: is_mobile_agent(&ua),
            is_tablet: is_tablet_agent(&ua),
            cores,
            memory_gb,
            connection,
            is_low_end,
            is_mid_range,
            is_high_end,
            is_slow_connection: connection.is_slow(),
        }
    }
}

const MOBILE_MARKERS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

// Expects a lowercased user agent.
fn is_mobile_agent(ua: &str) -> bool {
    MOBILE_MARKERS.iter().any(|m| ua.contains(m))
}

// Android tablets omit "mobile" from their user agent.
fn is_tablet_agent(ua: &str) -> bool {
    ua.contains("ipad")
        || ua.contains("tablet")
        || (ua.contains("android") && !ua.contains("mobile"))
}

/// Classifies the device with the default thresholds.
pub fn detect_device_capabilities<E: Environment>(env: &E) -> DeviceCapabilities {
    HardwareThresholds::default().classify(env)
}

pub fn prefers_reduced_motion<E: Environment>(env: &E) -> bool {
    env.prefers_reduced_motion()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";
    const ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 14; SM-X710) Safari/537.36";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36";

    #[test]
    fn missing_signals_fall_back_to_conservative_defaults() {
        let caps = detect_device_capabilities(&StaticEnvironment::default());
        assert_eq!(caps.cores, DEFAULT_CORES);
        assert_eq!(caps.memory_gb, DEFAULT_MEMORY_GB);
        assert_eq!(caps.connection, ConnectionType::FourG);
        assert!(caps.is_low_end);
        assert!(!caps.is_slow_connection);
    }

    #[test]
    fn user_agent_classification() {
        assert!(is_mobile_agent(&IPHONE.to_ascii_lowercase()));
        assert!(!is_tablet_agent(&IPHONE.to_ascii_lowercase()));
        assert!(is_tablet_agent(&ANDROID_TABLET.to_ascii_lowercase()));
        assert!(!is_tablet_agent(&ANDROID_PHONE.to_ascii_lowercase()));
        assert!(!is_mobile_agent("mozilla/5.0 (windows nt 10.0; win64; x64)"));
    }

    #[test]
    fn slow_connections() {
        assert!(ConnectionType::Slow2g.is_slow());
        assert!(ConnectionType::TwoG.is_slow());
        assert!(!ConnectionType::ThreeG.is_slow());
        assert_eq!(ConnectionType::from_effective_type("SLOW-2G"), Some(ConnectionType::Slow2g));
        assert_eq!(ConnectionType::from_effective_type("5g"), None);
    }

    #[test]
    fn hardware_classes_are_exclusive() {
        for (cores, mem) in [(2, 2.0), (4, 4.0), (6, 7.5), (8, 8.0), (16, 32.0), (16, 6.0)] {
            let caps = detect_device_capabilities(&StaticEnvironment::desktop(cores, mem));
            let n = [caps.is_low_end, caps.is_mid_range, caps.is_high_end]
                .iter()
                .filter(|b| **b)
                .count();
            assert!(n <= 1, "cores={cores} mem={mem} matched {n} classes");
        }
    }
}
