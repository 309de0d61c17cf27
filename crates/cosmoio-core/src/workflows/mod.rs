//! # Workflows Module
//!
//! High-level procedures built on the core I/O layer. Each workflow goes through
//! the same `read`/`write` adapters a library user would call.
//!
//! - **Conversion** ([`convert`]) - read a cosmology in one format and write it in another.

pub mod convert;
