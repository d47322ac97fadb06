// src/platform/mod.rs
//
// Collaborators the context driver is built on: presentation backends, the
// EGL layer, frontend hooks and OS signal handling.

pub mod backends;
pub mod frontend;
pub mod os;

pub use backends::headless::{HeadlessBackend, HeadlessEgl};
pub use backends::{EglApi, EglLayer, PresentationBackend};
pub use frontend::{Frontend, SystemFrontend};
