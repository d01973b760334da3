use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::config::{MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};
use crate::error::{ConfigError, FailureKind};
use crate::fingerprint::Fingerprint;

/// A monitored resource and its check cadence.
///
/// Immutable per run; changing the target goes through
/// `SiteMonitor::reconfigure`, which also resets the baseline, since
/// comparing fingerprints across different targets is meaningless.
#[derive(Clone, Debug)]
pub struct MonitorTarget {
    pub url: String,
    pub interval: Duration,
}

impl MonitorTarget {
    pub fn new(url: &str, interval_secs: u64) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.is_empty() || !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }
        if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&interval_secs) {
            return Err(ConfigError::IntervalOutOfRange(
                interval_secs,
                MIN_INTERVAL_SECS,
                MAX_INTERVAL_SECS,
            ));
        }
        Ok(Self {
            url: url.to_string(),
            interval: Duration::from_secs(interval_secs),
        })
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval.as_secs()
    }
}

/// Result of one completed check cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// First successful check after a (re)start recorded the reference
    /// fingerprint.
    BaselineEstablished,
    /// The computed fingerprint matched the baseline.
    Unchanged,
    /// The computed fingerprint differed from an existing baseline.
    ChangeDetected,
    /// The cycle did not produce a fingerprint.
    Failed(FailureKind),
}

/// Outcome discriminant, used for history filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OutcomeKind {
    BaselineEstablished,
    Unchanged,
    ChangeDetected,
    Failed,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::BaselineEstablished => OutcomeKind::BaselineEstablished,
            Outcome::Unchanged => OutcomeKind::Unchanged,
            Outcome::ChangeDetected => OutcomeKind::ChangeDetected,
            Outcome::Failed(_) => OutcomeKind::Failed,
        }
    }

    /// Short status label used in exports and filters.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::BaselineEstablished => "baseline",
            Outcome::Unchanged => "unchanged",
            Outcome::ChangeDetected => "changed",
            Outcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::BaselineEstablished => write!(f, "Baseline established"),
            Outcome::Unchanged => write!(f, "Unchanged"),
            Outcome::ChangeDetected => write!(f, "Change detected"),
            Outcome::Failed(kind) => write!(f, "Failed ({})", kind),
        }
    }
}

/// Single mutable cell holding the baseline fingerprint.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    baseline: Option<Fingerprint>,
}

impl SnapshotStore {
    /// Compare a freshly computed fingerprint against the baseline and
    /// update it when appropriate.
    ///
    /// Absent baseline: record it, `BaselineEstablished`. Matching
    /// baseline: `Unchanged`, no mutation. Differing baseline: replace it,
    /// `ChangeDetected`.
    pub fn compare_and_set(&mut self, new: Fingerprint) -> Outcome {
        match &self.baseline {
            None => {
                self.baseline = Some(new);
                Outcome::BaselineEstablished
            }
            Some(prev) if *prev == new => Outcome::Unchanged,
            Some(_) => {
                self.baseline = Some(new);
                Outcome::ChangeDetected
            }
        }
    }

    pub fn baseline(&self) -> Option<&Fingerprint> {
        self.baseline.as_ref()
    }

    /// Forget the baseline. The next successful check re-establishes it.
    pub fn reset(&mut self) {
        self.baseline = None;
    }
}

/// Mutable per-target monitor state, owned by the scheduler.
#[derive(Debug)]
pub struct MonitorState {
    pub target: MonitorTarget,
    pub snapshot: SnapshotStore,
    pub running: bool,
    pub next_check_due: Option<DateTime<Local>>,
    pub check_count: u64,
}

impl MonitorState {
    pub fn new(target: MonitorTarget) -> Self {
        Self {
            target,
            snapshot: SnapshotStore::default(),
            running: false,
            next_check_due: None,
            check_count: 0,
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            url: self.target.url.clone(),
            interval_secs: self.target.interval_secs(),
            running: self.running,
            baseline: self.snapshot.baseline().map(Fingerprint::to_hex),
            next_check_due: self.next_check_due,
            check_count: self.check_count,
        }
    }
}

/// Read-only view of the monitor state for status displays.
#[derive(Clone, Debug, Serialize)]
pub struct StatusSnapshot {
    pub url: String,
    pub interval_secs: u64,
    pub running: bool,
    pub baseline: Option<String>,
    pub next_check_due: Option<DateTime<Local>>,
    pub check_count: u64,
}
