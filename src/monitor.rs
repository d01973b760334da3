use chrono::Local;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::MonitorConfig;
use crate::error::{ConfigError, FailureKind};
use crate::fetcher::{ContentFetcher, HttpFetcher};
use crate::fingerprint::Fingerprint;
use crate::history::{HistoryFilter, HistoryLog, VerificationEvent};
use crate::normalizer::Normalizer;
use crate::notifiers::{dispatch_all, Notifier, NotifyContext};
use crate::state::{MonitorState, MonitorTarget, Outcome, StatusSnapshot};

/// Periodic content-change monitor for a single target.
///
/// Owns the run/stop state machine and the timing of check cycles. Check
/// cycles for one target never overlap: the periodic driver, the manual
/// trigger and reconfiguration all serialize on a single-slot cycle lock.
/// Independent targets get independent `SiteMonitor` instances.
pub struct SiteMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    fetcher: Box<dyn ContentFetcher>,
    normalizer: Normalizer,
    channels: Vec<Box<dyn Notifier>>,
    state: Mutex<MonitorState>,
    history: Mutex<HistoryLog>,
    /// Single-slot guard: at most one in-flight check cycle per target.
    cycle: Mutex<()>,
    stop: Notify,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SiteMonitor {
    /// Create a monitor with an explicit fetcher and notification
    /// channels.
    pub fn new(
        config: &MonitorConfig,
        fetcher: Box<dyn ContentFetcher>,
        channels: Vec<Box<dyn Notifier>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let target = config.target()?;
        let normalizer = Normalizer::new(&config.volatile_patterns)?;

        Ok(Self {
            inner: Arc::new(MonitorInner {
                fetcher,
                normalizer,
                channels,
                state: Mutex::new(MonitorState::new(target)),
                history: Mutex::new(HistoryLog::new(config.history_capacity)),
                cycle: Mutex::new(()),
                stop: Notify::new(),
                task: Mutex::new(None),
            }),
        })
    }

    /// Create a monitor backed by the HTTP fetcher.
    pub fn from_config(
        config: &MonitorConfig,
        channels: Vec<Box<dyn Notifier>>,
    ) -> Result<Self, ConfigError> {
        let fetcher = HttpFetcher::new(
            std::time::Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )?;
        Self::new(config, Box::new(fetcher), channels)
    }

    /// Start periodic checking.
    ///
    /// Starting always re-baselines: the first successful check after any
    /// start records a fresh reference point instead of silently resuming
    /// against a stale one.
    pub async fn start(&self) {
        {
            let mut state = self.inner.state.lock().await;
            if state.running {
                debug!("Monitor already running for {}", state.target.url);
                return;
            }
            state.running = true;
            state.snapshot.reset();
            state.next_check_due = Some(Local::now());
            info!(
                "Starting monitoring of {} every {}s",
                state.target.url,
                state.target.interval_secs()
            );
        }

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(inner.run_loop());
        *self.inner.task.lock().await = Some(handle);
    }

    /// Stop periodic checking.
    ///
    /// Only prevents new cycles from starting: an in-flight cycle
    /// completes and records its event before the task exits.
    pub async fn stop(&self) {
        let handle = {
            let mut state = self.inner.state.lock().await;
            if !state.running {
                return;
            }
            state.running = false;
            state.next_check_due = None;
            info!("Stopping monitoring of {}", state.target.url);
            self.inner.task.lock().await.take()
        };

        self.inner.stop.notify_waiters();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Monitor task ended abnormally: {}", e);
            }
        }
    }

    /// Run one check cycle out-of-band, regardless of the running state.
    ///
    /// Serialized against the periodic cycle; does not reset or otherwise
    /// interfere with the periodic timer.
    pub async fn trigger_check(&self) -> Outcome {
        self.inner.run_cycle().await
    }

    /// Point the monitor at a new target.
    ///
    /// Resets the baseline, since fingerprints from different targets are
    /// not comparable. Waits for any in-flight cycle to finish first so a
    /// cycle never records a fingerprint against a target it did not
    /// fetch. An updated interval takes effect from the next scheduled
    /// tick.
    pub async fn reconfigure(&self, url: &str, interval_secs: u64) -> Result<(), ConfigError> {
        let target = MonitorTarget::new(url, interval_secs)?;
        let _guard = self.inner.cycle.lock().await;
        let mut state = self.inner.state.lock().await;
        info!(
            "Reconfiguring monitor: {} every {}s",
            target.url,
            target.interval_secs()
        );
        state.target = target;
        state.snapshot.reset();
        Ok(())
    }

    /// Read-only view of the monitor state.
    pub async fn status(&self) -> StatusSnapshot {
        self.inner.state.lock().await.status()
    }

    /// Retrieve recorded verification events.
    pub async fn history(&self, filter: &HistoryFilter) -> Vec<VerificationEvent> {
        self.inner.history.lock().await.query(filter)
    }

    /// Serialize the full retained history as CSV.
    pub async fn export_history(&self) -> String {
        self.inner.history.lock().await.export_csv()
    }

    /// Drop all recorded verification events.
    pub async fn clear_history(&self) {
        self.inner.history.lock().await.clear();
    }
}

impl MonitorInner {
    /// Periodic driver: check, then wait one full interval measured from
    /// the end of the completed cycle, so a slow fetch never compresses
    /// the effective gap.
    async fn run_loop(self: Arc<Self>) {
        loop {
            {
                let state = self.state.lock().await;
                if !state.running {
                    break;
                }
            }

            self.run_cycle().await;

            let interval = {
                let mut state = self.state.lock().await;
                if !state.running {
                    break;
                }
                let interval = state.target.interval;
                state.next_check_due =
                    Some(Local::now() + chrono::Duration::seconds(interval.as_secs() as i64));
                interval
            };

            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = self.stop.notified() => {}
            }
        }
        debug!("Periodic check loop exited");
    }

    /// One full fetch → normalize → digest → compare → record sequence.
    ///
    /// Every error is converted into a `Failed` event here, at the cycle
    /// boundary; nothing propagates out of a cycle.
    async fn run_cycle(&self) -> Outcome {
        let _guard = self.cycle.lock().await;

        let url = { self.state.lock().await.target.url.clone() };
        let timestamp = Local::now();
        debug!("Checking {}", url);

        let (outcome, detail) = match self.fetcher.fetch(&url).await {
            Ok(body) => {
                let canonical = self.normalizer.normalize(&body);
                let fingerprint = Fingerprint::digest(&canonical);
                let mut state = self.state.lock().await;
                let outcome = state.snapshot.compare_and_set(fingerprint);
                let detail = match &outcome {
                    Outcome::BaselineEstablished => {
                        format!("Baseline fingerprint {}", fingerprint.short())
                    }
                    Outcome::ChangeDetected => {
                        format!("New fingerprint {}", fingerprint.short())
                    }
                    _ => "Content matches the baseline".to_string(),
                };
                (outcome, detail)
            }
            // Failures never touch the baseline; the next scheduled tick
            // is the retry.
            Err(err) => (Outcome::Failed(FailureKind::from(&err)), err.to_string()),
        };

        match &outcome {
            Outcome::BaselineEstablished => info!("{}: baseline established", url),
            Outcome::Unchanged => debug!("{}: no change", url),
            Outcome::ChangeDetected => info!("{}: change detected", url),
            Outcome::Failed(_) => warn!("{}: check failed: {}", url, detail),
        }

        if outcome == Outcome::ChangeDetected {
            let message = format!("Content change detected at {}", url);
            let context = NotifyContext {
                url: url.clone(),
                timestamp,
            };
            dispatch_all(&self.channels, &message, &context).await;
        }

        {
            let mut history = self.history.lock().await;
            history.append(timestamp, &url, outcome.clone(), &detail);
        }
        {
            let mut state = self.state.lock().await;
            state.check_count += 1;
        }

        outcome
    }
}
