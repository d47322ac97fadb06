// src/display/mod.rs
//! Video context drivers.
//!
//! - ContextDriver: the entry points the frontend drives
//! - VideoContext: frontend-side slot holding the active driver
//! - drivers: concrete implementations (KMS)

pub mod driver;
pub mod drivers;
pub mod manager;
pub mod types;

pub use driver::ContextDriver;
pub use drivers::KmsContext;
pub use manager::VideoContext;
pub use types::{
    ContextAttributes, ContextFlags, FrameInfo, GfxApi, PanelOrientation, PixelFormat,
    ProcAddress, Rect, Rotation, WindowStatus,
};
