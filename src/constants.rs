//! Device classification and animation budget tuning constants.
//!
//! Thresholds and per-tier presets are product tuning, not contracts. The
//! only property callers may rely on is that budgets grow monotonically from
//! the reduced-motion tier up to the high-end desktop tier.

// Fallbacks used when the browser does not expose a signal
pub const DEFAULT_CORES: u32 = 2;
pub const DEFAULT_MEMORY_GB: f64 = 4.0;
pub const DEFAULT_EFFECTIVE_TYPE: &str = "4g";

// Hardware class boundaries (low < MID_* <= mid < HIGH_* <= high)
pub const MID_CORES: u32 = 4;
pub const HIGH_CORES: u32 = 8;
pub const MID_MEMORY_GB: f64 = 4.0;
pub const HIGH_MEMORY_GB: f64 = 8.0;

// Per-category unit counts: [ambient particles, cursor trail, icons, sparkles]
pub const REDUCED_MOTION_UNITS: [u32; 4] = [0, 0, 0, 0];
pub const LOW_END_UNITS: [u32; 4] = [5, 3, 3, 2];
pub const MOBILE_UNITS: [u32; 4] = [10, 5, 5, 4];
pub const MID_RANGE_UNITS: [u32; 4] = [20, 8, 8, 6];
pub const HIGH_END_UNITS: [u32; 4] = [30, 12, 12, 10];

// Pointer polling interval (ms); 0 means frame-locked
pub const REDUCED_MOTION_THROTTLE_MS: f64 = 100.0;
pub const LOW_END_THROTTLE_MS: f64 = 50.0;
pub const MOBILE_THROTTLE_MS: f64 = 32.0;
pub const MID_RANGE_THROTTLE_MS: f64 = 16.0;
pub const HIGH_END_THROTTLE_MS: f64 = 0.0;

// Settle time for bursty events such as resize (ms)
pub const REDUCED_MOTION_DEBOUNCE_MS: f64 = 300.0;
pub const LOW_END_DEBOUNCE_MS: f64 = 250.0;
pub const MOBILE_DEBOUNCE_MS: f64 = 200.0;
pub const MID_RANGE_DEBOUNCE_MS: f64 = 150.0;
pub const HIGH_END_DEBOUNCE_MS: f64 = 100.0;

// Media query watched for the user's motion preference
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
