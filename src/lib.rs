//! dmn-worker - scheduled batch job that tells each registered user which
//! premium vendor items they have not unlocked yet.
//!
//! One invocation performs a single run:
//! - load the two reference catalogs for the active vendor rotation
//! - bulk-read the user roster
//! - fan the roster out over a bounded worker pool, each worker doing a
//!   rate-limited profile fetch, a bitmask diff, and a notification dispatch
//! - record run telemetry

pub mod bungie;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod store;
