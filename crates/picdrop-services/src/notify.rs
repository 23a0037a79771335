//! User-facing notifications.
//!
//! Presentation is out of scope for this crate, so outcomes that the user
//! must see (batch summaries, delete confirmations, failures) go through
//! this trait. Frontends plug in their own sink; the default logs.

/// Sink for user-visible notices.
pub trait Notify: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
}

/// Default notifier: routes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notice = "success", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(notice = "error", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(notice = "info", "{}", message);
    }
}
