use super::KeyResult;
use crate::api::User;
use crate::ui::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Events emitted by the confirmation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent {
  /// Delete confirmed for this id
  Confirmed(u64),
  Cancelled,
}

/// "Are you sure?" prompt guarding a delete.
///
/// Confirming does not close the prompt; the parent hides it once the
/// delete succeeds, so a failure leaves it on screen.
#[derive(Debug, Clone, Default)]
pub struct ConfirmPrompt {
  target: Option<User>,
}

impl ConfirmPrompt {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.target.is_some()
  }

  pub fn show(&mut self, user: User) {
    self.target = Some(user);
  }

  pub fn hide(&mut self) {
    self.target = None;
  }

  /// Id of the record awaiting confirmation
  pub fn target_id(&self) -> Option<u64> {
    self.target.as_ref().map(|u| u.id)
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    let Some(id) = self.target_id() else {
      return KeyResult::NotHandled;
    };

    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => KeyResult::Event(ConfirmEvent::Confirmed(id)),
      KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some(user) = &self.target else {
      return;
    };

    let width = 48.min(area.width);
    let overlay_area = centered_rect(width, 7, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(" Confirm Delete ");

    let text = vec![
      Line::from("Are you sure you want to delete this user?"),
      Line::from(Span::styled(
        format!("{} <{}>", user.name, user.email),
        Style::default().fg(Color::Cyan),
      )),
      Line::from(""),
      Line::from(vec![
        Span::styled("<y>", Style::default().fg(Color::Cyan)),
        Span::styled(" delete", Style::default().fg(Color::DarkGray)),
        Span::raw("   "),
        Span::styled("<n>", Style::default().fg(Color::Cyan)),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
      ]),
    ];

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, overlay_area);
  }
}
