//! Utilities:
//!
//! - [`OrbitControls`]: orbit camera driven by pointer input
//! - [`Timer`]: per-frame delta clock

pub mod orbit_control;
pub mod time;

pub use orbit_control::OrbitControls;
pub use time::Timer;
