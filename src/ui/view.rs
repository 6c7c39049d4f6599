use chrono::{DateTime, Utc};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the footer
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
  /// No action needed
  None,
  /// Leave the application
  Quit,
}

/// Data-dependent parts of the header
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewStatus {
  pub record_count: Option<usize>,
  pub synced_at: Option<DateTime<Utc>>,
}

/// Trait for view behavior
///
/// Views handle their own overlays (dialogs, prompts) and return actions
/// for the App to execute. Views that load data asynchronously poll their
/// queries and mutations in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Called on each tick to apply finished async work
  fn tick(&mut self) {}

  fn status(&self) -> ViewStatus {
    ViewStatus::default()
  }

  /// Keyboard shortcuts to display in the footer
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "quit").with_priority(90)]
  }
}
