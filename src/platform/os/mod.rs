// src/platform/os/mod.rs

//! OS-level helpers.

pub mod signals;
