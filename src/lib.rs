//! Budget alert engine for a personal-finance tracker.
//!
//! Turns per-category budget/spend snapshots into a prioritized, filterable
//! feed of alerts, and remembers which alerts the user dismissed.
//!
//! # Modules
//! - [`budget`]: snapshot records and period arithmetic
//! - [`alerts`]: tier classification and the pure alert pipeline
//! - [`dismissal`]: the persisted set of dismissed alert ids
//! - [`engine`]: stateful façade with latest-wins refresh
//! - [`source`]: where snapshots come from
//! - [`api`]: HTTP surface for the consuming view

pub mod alerts;
pub mod api;
pub mod budget;
pub mod config;
pub mod dismissal;
pub mod engine;
pub mod error;
pub mod logging;
pub mod source;

pub use error::AlertError;
