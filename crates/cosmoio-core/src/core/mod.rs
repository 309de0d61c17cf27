//! # Core Module
//!
//! The foundation layer: the cosmology data model ([`models`]) and the unified
//! I/O machinery that reads and writes it ([`io`]).

pub mod io;
pub mod models;
