//! Upload progress events.
//!
//! Progress flows over an explicit channel rather than a free callback: each
//! upload task holds a [`ProgressSink`] producer bound to its storage key,
//! and the batch orchestrator drains the consuming end into its progress
//! map. This keeps progress updates deterministic to test.

use tokio::sync::mpsc;

/// One progress update for an in-flight upload, keyed by storage key so
/// concurrent tasks in a batch stay independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub storage_key: String,
    pub percent: u8,
}

/// Producer half of a batch progress channel, bound to one storage key.
///
/// Dropping the sink closes this task's contribution to the channel; the
/// orchestrator's drain ends once every task sink is gone.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    inner: Option<SinkInner>,
}

#[derive(Debug, Clone)]
struct SinkInner {
    storage_key: String,
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSink {
    pub fn new(storage_key: impl Into<String>, tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        ProgressSink {
            inner: Some(SinkInner {
                storage_key: storage_key.into(),
                tx,
            }),
        }
    }

    /// A sink that drops every report. For callers that do not track progress.
    pub fn disabled() -> Self {
        ProgressSink { inner: None }
    }

    /// Report transfer progress as sent/total byte counts.
    ///
    /// The percentage is rounded to an integer; duplicate percentages are
    /// fine, consumers treat them as idempotent display updates. A closed
    /// receiver is not an error: progress is best-effort.
    pub fn report(&self, sent: u64, total: u64) {
        let Some(inner) = &self.inner else {
            return;
        };

        let percent = if total == 0 {
            100
        } else {
            ((sent as f64 / total as f64) * 100.0).round().min(100.0) as u8
        };

        let _ = inner.tx.send(ProgressEvent {
            storage_key: inner.storage_key.clone(),
            percent,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_rounded_percentages() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ProgressSink::new("k", tx);

        sink.report(1, 3);
        sink.report(2, 3);
        sink.report(3, 3);
        drop(sink);

        let mut percents = Vec::new();
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event.storage_key, "k");
            percents.push(event.percent);
        }
        assert_eq!(percents, vec![33, 67, 100]);
    }

    #[test]
    fn test_zero_total_reports_complete() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ProgressSink::new("empty", tx);

        sink.report(0, 0);
        assert_eq!(rx.try_recv().unwrap().percent, 100);
    }

    #[test]
    fn test_disabled_sink_is_a_no_op() {
        let sink = ProgressSink::disabled();
        sink.report(10, 100);
    }

    #[test]
    fn test_closed_receiver_is_not_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = ProgressSink::new("k", tx);
        sink.report(50, 100);
    }
}
