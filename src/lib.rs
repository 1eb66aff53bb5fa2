//! FitTrack: workout and diet logging behind token authentication and
//! per-user permissions, with cached per-user totals.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod records;
pub mod state;
pub mod stats;
