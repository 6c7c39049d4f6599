use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::api::{User, UserData};
use crate::ui::centered_rect;
use crate::validation::{FieldErrors, UserForm};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// A validated form ready to be dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
  Create(UserData),
  Update(User),
}

/// Events emitted by the dialog that the parent view handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
  Submitted(Submission),
  Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Field {
  #[default]
  Name,
  Email,
}

/// Add/edit dialog for a user record.
///
/// Validation runs on Enter; an invalid form shows field errors and emits
/// nothing. A valid submission leaves the dialog open so a failed request
/// keeps the entered values; the parent closes it on success.
#[derive(Debug, Clone, Default)]
pub struct UserDialog {
  active: bool,
  /// Record being edited, `None` in create mode
  editing: Option<User>,
  name: TextInput,
  email: TextInput,
  focus: Field,
  errors: FieldErrors,
}

impl UserDialog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open with empty fields
  pub fn open_create(&mut self) {
    *self = Self {
      active: true,
      ..Self::default()
    };
  }

  /// Open prefilled from `user`
  pub fn open_edit(&mut self, user: User) {
    *self = Self {
      active: true,
      name: TextInput::with_value(user.name.clone()),
      email: TextInput::with_value(user.email.clone()),
      editing: Some(user),
      ..Self::default()
    };
  }

  pub fn close(&mut self) {
    *self = Self::default();
  }

  /// Id of the record being edited
  #[cfg(test)]
  pub fn editing_id(&self) -> Option<u64> {
    self.editing.as_ref().map(|u| u.id)
  }

  #[cfg(test)]
  pub fn name(&self) -> &str {
    self.name.value()
  }

  #[cfg(test)]
  pub fn email(&self) -> &str {
    self.email.value()
  }

  #[cfg(test)]
  pub fn errors(&self) -> &FieldErrors {
    &self.errors
  }

  fn title(&self) -> &'static str {
    if self.editing.is_some() {
      "Edit User"
    } else {
      "Add User"
    }
  }

  fn submit_label(&self) -> &'static str {
    if self.editing.is_some() {
      "Update"
    } else {
      "Create"
    }
  }

  fn focused_input(&mut self) -> &mut TextInput {
    match self.focus {
      Field::Name => &mut self.name,
      Field::Email => &mut self.email,
    }
  }

  fn toggle_focus(&mut self) {
    self.focus = match self.focus {
      Field::Name => Field::Email,
      Field::Email => Field::Name,
    };
  }

  fn submit(&mut self) -> KeyResult<DialogEvent> {
    let form = UserForm {
      name: self.name.value().to_string(),
      email: self.email.value().to_string(),
    };

    match form.validate() {
      Ok(data) => {
        self.errors = FieldErrors::default();
        let submission = match &self.editing {
          Some(user) => Submission::Update(User {
            id: user.id,
            name: data.name,
            email: data.email,
          }),
          None => Submission::Create(data),
        };
        KeyResult::Event(DialogEvent::Submitted(submission))
      }
      Err(errors) => {
        // Jump to the first field that needs fixing
        if errors.name.is_some() {
          self.focus = Field::Name;
        } else if errors.email.is_some() {
          self.focus = Field::Email;
        }
        self.errors = errors;
        KeyResult::Handled
      }
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<DialogEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.close();
        KeyResult::Event(DialogEvent::Cancelled)
      }
      KeyCode::Enter => self.submit(),
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.toggle_focus();
        KeyResult::Handled
      }
      _ => {
        let focus = self.focus;
        match self.focused_input().handle_key(key) {
          InputResult::Consumed => {
            match focus {
              Field::Name => self.errors.name = None,
              Field::Email => self.errors.email = None,
            }
            KeyResult::Handled
          }
          InputResult::NotHandled => KeyResult::NotHandled,
          // Enter and Esc are intercepted above
          InputResult::Submitted(_) | InputResult::Cancelled => KeyResult::Handled,
        }
      }
    }
  }

  /// Render the dialog overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (u32::from(area.width) * 60 / 100).clamp(36, 64) as u16;
    let width = width.min(area.width);
    let overlay_area = centered_rect(width, 10, area);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title()));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height < 8 {
      return;
    }

    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Name label
        Constraint::Length(1), // Name input
        Constraint::Length(1), // Name error
        Constraint::Length(1), // Email label
        Constraint::Length(1), // Email input
        Constraint::Length(1), // Email error
        Constraint::Min(0),
        Constraint::Length(1), // Hints
      ])
      .split(inner);

    self.render_field(frame, [rows[0], rows[1], rows[2]], "Name", Field::Name);
    self.render_field(frame, [rows[3], rows[4], rows[5]], "Email", Field::Email);

    let hints = Line::from(vec![
      Span::styled("<Enter>", Style::default().fg(Color::Cyan)),
      Span::styled(format!(" {}", self.submit_label()), Style::default().fg(Color::DarkGray)),
      Span::raw("   "),
      Span::styled("<Tab>", Style::default().fg(Color::Cyan)),
      Span::styled(" next field", Style::default().fg(Color::DarkGray)),
      Span::raw("   "),
      Span::styled("<Esc>", Style::default().fg(Color::Cyan)),
      Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(hints), rows[7]);
  }

  fn render_field(&self, frame: &mut Frame, rows: [Rect; 3], label: &str, field: Field) {
    let (input, error) = match field {
      Field::Name => (&self.name, self.errors.name),
      Field::Email => (&self.email, self.errors.email),
    };
    let focused = self.focus == field;

    let label_style = if focused {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::White)
    };
    frame.render_widget(Paragraph::new(Span::styled(label, label_style)), rows[0]);

    let input_line = Line::from(vec![
      Span::styled("> ", Style::default().fg(Color::DarkGray)),
      Span::raw(input.value()),
    ]);
    frame.render_widget(Paragraph::new(input_line), rows[1]);

    if focused {
      let offset = u16::try_from(input.cursor_position()).unwrap_or(u16::MAX);
      let x = rows[1].x.saturating_add(2).saturating_add(offset);
      frame.set_cursor_position(Position::new(x.min(rows[1].right().saturating_sub(1)), rows[1].y));
    }

    if let Some(error) = error {
      frame.render_widget(
        Paragraph::new(Span::styled(error.to_string(), Style::default().fg(Color::Red))),
        rows[2],
      );
    }
  }
}
