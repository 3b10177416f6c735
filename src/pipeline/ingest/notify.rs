use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A time-boxed user-visible notice emitted by the upload workflow.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    #[serde(skip)]
    pub dismiss_after: Duration,
}

/// Owns the single active notification and its auto-dismiss timer.
///
/// At most one timer is pending at any time: showing a new notification
/// atomically aborts the previous timer and replaces the notice.
#[derive(Clone, Default)]
pub struct Notifier {
    inner: Arc<Mutex<NotifierInner>>,
}

#[derive(Default)]
struct NotifierInner {
    current: Option<Notification>,
    timer: Option<JoinHandle<()>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, message: impl Into<String>, severity: Severity, dismiss_after: Duration) {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            dismiss_after,
        };
        let id = notification.id;

        let mut inner = self.inner.lock().expect("notifier lock");
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.current = Some(notification);

        // Auto-dismiss runs only when a runtime is present; without one the
        // notice stays until replaced or dismissed.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let shared = self.inner.clone();
            inner.timer = Some(handle.spawn(async move {
                tokio::time::sleep(dismiss_after).await;
                let mut inner = shared.lock().expect("notifier lock");
                if inner.current.as_ref().is_some_and(|n| n.id == id) {
                    inner.current = None;
                    inner.timer = None;
                }
            }));
        }
    }

    pub fn current(&self) -> Option<Notification> {
        self.inner.lock().expect("notifier lock").current.clone()
    }

    pub fn dismiss(&self) {
        let mut inner = self.inner.lock().expect("notifier lock");
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.current = None;
    }
}
