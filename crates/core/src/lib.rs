//! Head-turn liveness challenge engine.
//!
//! Landmark sets produced by an external face-landmark detector flow through
//! yaw estimation, smoothing, calibration and a debounced four-step challenge
//! (right, center, left, center). Sustained landmark corruption on mobile
//! clients escalates to a single-photo capture instead.

pub mod capture;
pub mod challenge;
pub mod detection;
pub mod estimation;
pub mod session;
pub mod shared;
pub mod storage;
