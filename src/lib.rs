// src/lib.rs

//! KMS/DRM video context driver.
//!
//! Brings up a render context on a bare KMS device (no window system) through
//! libgo2, and presents frames to a fixed, rotated 480x320 panel. The frontend
//! talks to the driver through the [`display::ContextDriver`] trait.

pub mod config;
pub mod display;
pub mod input;
pub mod platform;

pub use display::{ContextDriver, KmsContext, VideoContext};
