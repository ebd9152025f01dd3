//! Overlap detection between controller and trigger volumes
//!
//! The engine does not simulate physics. It only needs sphere/sphere overlap
//! to turn tracked controller positions into enter/exit edges for the
//! session's intersection feed.

pub mod collision;
pub mod intersection;

pub use collision::BoundingSphere;
pub use intersection::IntersectionTracker;

/// Diameter of a trigger volume in meters
pub const TRIGGER_DIAMETER: f32 = 0.1;
