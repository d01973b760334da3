use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;

use crate::state::{Outcome, OutcomeKind};
use crate::utils::{format_timestamp, truncate_detail};

/// One recorded check cycle. Immutable once appended.
#[derive(Clone, Debug, Serialize)]
pub struct VerificationEvent {
    /// Monotonically increasing per-monitor sequence number
    pub sequence: u64,
    pub timestamp: DateTime<Local>,
    /// Target URL at the time the event was recorded
    pub url: String,
    pub outcome: Outcome,
    /// Human-readable context, truncated with an ellipsis
    pub detail: String,
}

/// Result ordering for history queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recent first
    #[default]
    Descending,
    /// Oldest first
    Ascending,
}

/// Optional constraints for a history query.
#[derive(Clone, Debug, Default)]
pub struct HistoryFilter {
    /// Keep only events with this exact status
    pub status: Option<OutcomeKind>,
    /// Cap the number of returned events
    pub limit: Option<usize>,
    pub order: SortOrder,
}

/// Bounded, time-ordered log of verification events.
///
/// Append-only from the monitor's perspective; once the capacity is
/// exceeded the oldest event is evicted. The sequence counter never
/// rewinds, including across `clear`.
#[derive(Debug)]
pub struct HistoryLog {
    events: VecDeque<VerificationEvent>,
    capacity: usize,
    next_sequence: u64,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            next_sequence: 0,
        }
    }

    /// Record one completed check cycle, evicting the oldest event when
    /// the log is full.
    pub fn append(
        &mut self,
        timestamp: DateTime<Local>,
        url: &str,
        outcome: Outcome,
        detail: &str,
    ) {
        let event = VerificationEvent {
            sequence: self.next_sequence,
            timestamp,
            url: url.to_string(),
            outcome,
            detail: truncate_detail(detail),
        };
        self.next_sequence += 1;

        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Retrieve events matching the filter, most recent first by default.
    pub fn query(&self, filter: &HistoryFilter) -> Vec<VerificationEvent> {
        let mut result: Vec<VerificationEvent> = self
            .events
            .iter()
            .filter(|event| match filter.status {
                Some(kind) => event.outcome.kind() == kind,
                None => true,
            })
            .cloned()
            .collect();

        if filter.order == SortOrder::Descending {
            result.reverse();
        }
        if let Some(limit) = filter.limit {
            result.truncate(limit);
        }
        result
    }

    /// Serialize every retained event as CSV, oldest first, regardless of
    /// any filtered view.
    pub fn export_csv(&self) -> String {
        let mut out = String::from("Timestamp,URL,Status,Detail\n");
        for event in &self.events {
            out.push_str(&format!(
                "{},{},{},{}\n",
                csv_field(&format_timestamp(event.timestamp)),
                csv_field(&event.url),
                event.outcome.label(),
                csv_field(&event.detail),
            ));
        }
        out
    }

    /// Drop all retained events. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    const URL: &str = "https://example.com/menu";

    fn log_with(outcomes: &[Outcome]) -> HistoryLog {
        let mut log = HistoryLog::new(10);
        for outcome in outcomes {
            log.append(Local::now(), URL, outcome.clone(), "detail");
        }
        log
    }

    #[test]
    fn append_past_capacity_evicts_exactly_the_oldest() {
        let mut log = HistoryLog::new(3);
        for i in 0..4 {
            log.append(Local::now(), URL, Outcome::Unchanged, &format!("event {}", i));
        }
        assert_eq!(log.len(), 3);
        let events = log.query(&HistoryFilter {
            order: SortOrder::Ascending,
            ..Default::default()
        });
        let sequences: Vec<u64> = events.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(events[0].detail, "event 1");
    }

    #[test]
    fn default_query_returns_most_recent_first() {
        let log = log_with(&[
            Outcome::BaselineEstablished,
            Outcome::Unchanged,
            Outcome::ChangeDetected,
        ]);
        let events = log.query(&HistoryFilter::default());
        assert_eq!(events[0].outcome, Outcome::ChangeDetected);
        assert_eq!(events[2].outcome, Outcome::BaselineEstablished);
    }

    #[test]
    fn status_filter_and_limit() {
        let log = log_with(&[
            Outcome::BaselineEstablished,
            Outcome::Failed(FailureKind::Timeout),
            Outcome::Unchanged,
            Outcome::Failed(FailureKind::HttpStatus(500)),
            Outcome::Unchanged,
        ]);

        let failed = log.query(&HistoryFilter {
            status: Some(OutcomeKind::Failed),
            ..Default::default()
        });
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].outcome, Outcome::Failed(FailureKind::HttpStatus(500)));

        let limited = log.query(&HistoryFilter {
            limit: Some(2),
            ..Default::default()
        });
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].outcome, Outcome::Unchanged);
    }

    #[test]
    fn export_includes_every_retained_event() {
        let log = log_with(&[
            Outcome::BaselineEstablished,
            Outcome::Unchanged,
            Outcome::ChangeDetected,
        ]);
        let csv = log.export_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Timestamp,URL,Status,Detail");
        assert!(lines[1].contains("baseline"));
        assert!(lines[3].contains("changed"));
    }

    #[test]
    fn export_quotes_fields_with_delimiters() {
        let mut log = HistoryLog::new(5);
        log.append(
            Local::now(),
            URL,
            Outcome::Failed(FailureKind::Unexpected),
            "error: first, \"second\"",
        );
        let csv = log.export_csv();
        assert!(csv.contains("\"error: first, \"\"second\"\"\""));
    }

    #[test]
    fn detail_is_truncated_with_ellipsis() {
        let mut log = HistoryLog::new(5);
        log.append(Local::now(), URL, Outcome::Unchanged, &"x".repeat(500));
        let events = log.query(&HistoryFilter::default());
        assert!(events[0].detail.chars().count() <= 201);
        assert!(events[0].detail.ends_with('…'));
    }

    #[test]
    fn clear_keeps_the_sequence_monotonic() {
        let mut log = log_with(&[Outcome::Unchanged, Outcome::Unchanged]);
        log.clear();
        assert!(log.is_empty());
        log.append(Local::now(), URL, Outcome::Unchanged, "after clear");
        let events = log.query(&HistoryFilter::default());
        assert_eq!(events[0].sequence, 2);
    }
}
