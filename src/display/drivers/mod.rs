// src/display/drivers/mod.rs
//! Context driver implementations.

pub mod kms;

pub use kms::KmsContext;
