//! Test fixtures for hos-planner.
//!
//! Provides:
//! - Real US freight corridor cities
//! - Canned geocoders built from them

pub mod corridor_locations;

pub use corridor_locations::*;
