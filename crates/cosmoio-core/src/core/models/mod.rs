//! Cosmology data model: the class hierarchy, named parameters and validated instances.

pub mod class;
pub mod cosmology;
pub mod params;
