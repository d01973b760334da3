//! Periodic webpage content-change detection.
//!
//! A `SiteMonitor` fetches a target over HTTP on a fixed cadence, reduces
//! the document to canonical text (dropping scripts, styles, comments and
//! volatile substrings like clock times), fingerprints it and compares
//! the fingerprint against the last known baseline. Detected changes fan
//! out to pluggable notification channels and every check is recorded in
//! a bounded history log.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod fingerprint;
pub mod history;
pub mod monitor;
pub mod normalizer;
pub mod notifiers;
pub mod state;
pub mod utils;

pub use config::MonitorConfig;
pub use monitor::SiteMonitor;
pub use state::Outcome;
