//! Unified, format-pluggable input/output for cosmologies.
//!
//! - [`registry`] maps `(format, class)` pairs to readers, writers and identifiers.
//! - [`connect`] exposes the `read`/`write` adapters that forward calls to it.
//! - [`formats`] ships the built-in file formats.

pub mod args;
pub mod connect;
pub mod error;
pub mod formats;
pub mod registry;
pub mod traits;
