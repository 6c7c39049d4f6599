//! Transient user-visible notifications ("toasts").

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// At most this many toasts are kept; the oldest goes first.
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
  Success,
  Warning,
  Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
  pub level: ToastLevel,
  pub message: String,
  pub created_at: Instant,
}

/// Queue of toasts, newest last
#[derive(Debug)]
pub struct Notifications {
  toasts: VecDeque<Toast>,
  ttl: Duration,
}

impl Notifications {
  pub fn new(ttl: Duration) -> Self {
    Self {
      toasts: VecDeque::new(),
      ttl,
    }
  }

  pub fn success(&mut self, message: impl Into<String>) {
    let message = message.into();
    info!(%message, "notification");
    self.push(ToastLevel::Success, message);
  }

  pub fn warning(&mut self, message: impl Into<String>) {
    let message = message.into();
    warn!(%message, "notification");
    self.push(ToastLevel::Warning, message);
  }

  pub fn error(&mut self, message: impl Into<String>) {
    let message = message.into();
    error!(%message, "notification");
    self.push(ToastLevel::Error, message);
  }

  fn push(&mut self, level: ToastLevel, message: String) {
    if self.toasts.len() == MAX_TOASTS {
      self.toasts.pop_front();
    }
    self.toasts.push_back(Toast {
      level,
      message,
      created_at: Instant::now(),
    });
  }

  /// Drop expired toasts. Returns whether anything was removed.
  pub fn prune(&mut self) -> bool {
    self.prune_at(Instant::now())
  }

  fn prune_at(&mut self, now: Instant) -> bool {
    let before = self.toasts.len();
    let ttl = self.ttl;
    self
      .toasts
      .retain(|t| now.saturating_duration_since(t.created_at) < ttl);
    before != self.toasts.len()
  }

  pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Toast> {
    self.toasts.iter()
  }

  pub fn is_empty(&self) -> bool {
    self.toasts.is_empty()
  }

  /// Most recent toast
  #[cfg(test)]
  pub fn latest(&self) -> Option<&Toast> {
    self.toasts.back()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_levels_and_order() {
    let mut n = Notifications::new(Duration::from_secs(4));
    n.success("User created successfully");
    n.error("Failed to delete user");

    let levels: Vec<ToastLevel> = n.iter().map(|t| t.level).collect();
    assert_eq!(levels, vec![ToastLevel::Success, ToastLevel::Error]);
    assert_eq!(n.latest().unwrap().message, "Failed to delete user");
  }

  #[test]
  fn test_oldest_dropped_when_full() {
    let mut n = Notifications::new(Duration::from_secs(4));
    for i in 0..7 {
      n.success(format!("toast {}", i));
    }

    let messages: Vec<&str> = n.iter().map(|t| t.message.as_str()).collect();
    assert_eq!(messages.len(), MAX_TOASTS);
    assert_eq!(messages[0], "toast 2");
  }

  #[test]
  fn test_prune_expired() {
    let mut n = Notifications::new(Duration::from_millis(100));
    n.warning("slow down");

    assert!(!n.prune_at(Instant::now()));
    assert!(n.prune_at(Instant::now() + Duration::from_millis(200)));
    assert!(n.is_empty());
  }
}
