// ── Notification and confirmation collaborators ──
//
// The gateway reports every mutation outcome through a `Notifier` and
// gates destructive actions behind a `Confirm`. Presentation (colours,
// prompts) belongs to the caller.

use tracing::{info, warn};

/// Fire-and-forget outcome reporting.
pub trait Notifier: Send + Sync {
    fn notify_success(&self, message: &str);

    fn notify_failure(&self, message: &str);
}

/// Explicit user acknowledgement before a destructive action.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

/// Routes notifications into the tracing pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        info!(target: "schoolbus::notify", "{message}");
    }

    fn notify_failure(&self, message: &str) {
        warn!(target: "schoolbus::notify", "{message}");
    }
}

/// Answers every confirmation with a fixed value (`--yes`, scripted runs).
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}
