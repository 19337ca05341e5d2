//! SiteTrack: construction project tracking.
//!
//! Projects move through lifecycle phases (concept through handover). Their
//! progress is derived from the status of tasks in the current phase; see
//! [`progress`] for the rules.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod progress;
pub mod templates;
