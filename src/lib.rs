//! Per-frame performance layer for real-time 2D entity simulations
//!
//! Keeps large active entity counts tractable:
//!
//! - [`pool`] - recycle transient objects instead of allocating every frame
//! - [`spatial`] - uniform-grid index so proximity queries avoid O(n^2) scans
//! - [`batch`] - homogeneous same-type groupings for cache-friendly passes
//! - [`lod`] + [`throttle`] - cheaper handling of distant or low-priority work
//! - [`optimizer`] - the orchestrator the frame loop and consumer systems talk to
//!
//! Entities are owned by an external ECS and only read through the accessor
//! contracts in [`entity`]. Everything is single-threaded and synchronous;
//! no operation blocks or raises a fatal error on the frame path.

pub mod batch;
pub mod config;
pub mod entity;
pub mod lod;
pub mod optimizer;
pub mod pool;
pub mod spatial;
pub mod throttle;
pub mod util;
