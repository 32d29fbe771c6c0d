// ── Notification side-channel ──
//
// Panels report progress through a `Notifier`: fire-and-forget toasts in a
// dashboard, log lines or a spinner in the CLI.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info};

/// Whether failed mutations emit an error notice in addition to returning
/// the error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Errors only propagate to the caller.
    #[default]
    Silent,
    /// Also call [`Notifier::error`].
    Notify,
}

/// Receiver of user-facing notices.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn loading(&self, message: &str);

    /// Only called under [`FailurePolicy::Notify`].
    fn error(&self, message: &str) {
        let _ = message;
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn success(&self, message: &str) {
        (**self).success(message);
    }

    fn loading(&self, message: &str) {
        (**self).loading(message);
    }

    fn error(&self, message: &str) {
        (**self).error(message);
    }
}

/// Notifier that writes notices to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        info!(kind = "info", "{message}");
    }

    fn success(&self, message: &str) {
        info!(kind = "success", "{message}");
    }

    fn loading(&self, message: &str) {
        info!(kind = "loading", "{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}

/// A recorded notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
    Loading(String),
    Error(String),
}

/// Notifier that keeps every notice in memory, in emission order.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.lock().clone()
    }

    /// Drain the recorded notices.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    fn push(&self, notice: Notice) {
        self.lock().push(notice);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for NoticeLog {
    fn info(&self, message: &str) {
        self.push(Notice::Info(message.to_owned()));
    }

    fn success(&self, message: &str) {
        self.push(Notice::Success(message.to_owned()));
    }

    fn loading(&self, message: &str) {
        self.push(Notice::Loading(message.to_owned()));
    }

    fn error(&self, message: &str) {
        self.push(Notice::Error(message.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_log_records_in_order_and_drains() {
        let log = Arc::new(NoticeLog::new());
        log.loading("Setting localisation...");
        log.success("Localisation saved");

        assert_eq!(
            log.take(),
            vec![
                Notice::Loading("Setting localisation...".into()),
                Notice::Success("Localisation saved".into()),
            ]
        );
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn default_error_notice_is_a_no_op() {
        struct Quiet;
        impl Notifier for Quiet {
            fn info(&self, _: &str) {}
            fn success(&self, _: &str) {}
            fn loading(&self, _: &str) {}
        }
        Quiet.error("ignored");
    }
}
