//! Terminal fireworks: rockets climb to their apex, burst into fading particles and drift
//! away under gravity and wind.

pub mod audio;
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod firework;
pub mod logging;
pub mod particle;
pub mod surface;

pub use error::{Error, Result};

/// An RGB colour.
pub type Rgb = (u8, u8, u8);

/// Downward acceleration shared by rockets and particles, in pixels per tick².
pub const GRAVITY: f32 = 0.05;
