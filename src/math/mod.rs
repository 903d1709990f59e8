pub mod anomaly;
pub mod geometry;
pub mod hermite;
pub mod intervals;
pub mod root_finding;
pub mod stumpff;
