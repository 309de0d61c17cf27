//! # cosmoio
//!
//! Unified, format-pluggable reading and writing of cosmology models.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** The cosmology data model (`CosmologyClass`,
//!   `Cosmology`) and the unified I/O layer: a registry mapping
//!   `(format, class)` pairs to reader, writer and identifier plugins, the
//!   `read`/`write` adapters that forward calls to it, and the built-in formats.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built on `core`,
//!   such as converting a cosmology file from one format to another.

pub mod core;
pub mod workflows;
