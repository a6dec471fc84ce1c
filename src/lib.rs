//! hos-planner core
//!
//! Hours-of-Service trip planning: a duty-cycle simulator, daily log
//! partitioning, and projection of duty events back onto route geometry.

pub mod config;
pub mod daily_log;
pub mod error;
pub mod haversine;
pub mod instruction;
pub mod mapbox;
pub mod model;
pub mod osrm;
pub mod osrm_data;
pub mod planner;
pub mod polyline;
pub mod projector;
pub mod remarks;
pub mod simulator;
pub mod traits;
pub mod waypoints;
