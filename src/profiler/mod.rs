//! Device capability profiling and the animation budget derived from it.
//!
//! Effects read a [`PerformanceConfig`] before creating any animated units so
//! the total workload tracks what the device can sustain.

pub mod cache;
pub mod capabilities;
pub mod config;

pub use cache::*;
pub use capabilities::*;
pub use config::*;
