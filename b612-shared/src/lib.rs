//! B612 shared value types
//!
//! Colors, color ramps, easing curves, and the small scalar curves used by the
//! narrative runtime. Everything here is pure and host-independent.

pub mod color;
pub mod easing;
pub mod math;

pub use color::{interpolate, ColorRamp, ParseColorError, Rgb};
pub use easing::Easing;
