//! Server-side notifier: every complaint outcome becomes a log line.

use praktikum_core::notify::{Notification, Notifier};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify(&self, notification: Notification) {
    if notification.is_success() {
      tracing::info!(title = notification.title(), "{notification}");
    } else {
      tracing::warn!(title = notification.title(), "{notification}");
    }
  }
}
