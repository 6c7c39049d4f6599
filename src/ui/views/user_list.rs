use crate::api::{User, UserClient};
use crate::cache::{CacheStore, UserQueryKey};
use crate::mutation::{MutationEvent, Ticket, UserMutations};
use crate::notify::Notifications;
use crate::query::UsersQuery;
use crate::ui::components::{
  render_toasts, ConfirmEvent, ConfirmPrompt, DialogEvent, KeyResult, Submission, UserDialog,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewStatus};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState, Wrap};

/// The user table plus its add/edit dialog and delete prompt.
///
/// Owns the cache store and both coordinators; everything they change is
/// applied here, on the UI thread, during `tick()`.
pub struct UserListView {
  cache: CacheStore<User>,
  query: UsersQuery,
  mutations: UserMutations,
  notifications: Notifications,
  table_state: TableState,
  dialog: UserDialog,
  /// Submission the open dialog is waiting on
  dialog_ticket: Option<Ticket>,
  confirm: ConfirmPrompt,
}

impl UserListView {
  pub fn new(client: UserClient, cache: CacheStore<User>, notifications: Notifications) -> Self {
    let mut query = UsersQuery::new(client.clone());

    // Start fetching immediately
    query.fetch();

    Self {
      cache,
      query,
      mutations: UserMutations::new(client),
      notifications,
      table_state: TableState::default(),
      dialog: UserDialog::new(),
      dialog_ticket: None,
      confirm: ConfirmPrompt::new(),
    }
  }

  fn users(&self) -> &[User] {
    self.cache.get(&UserQueryKey::Users).unwrap_or(&[])
  }

  fn has_data(&self) -> bool {
    self.cache.get(&UserQueryKey::Users).is_some()
  }

  fn selected_user(&self) -> Option<&User> {
    self
      .table_state
      .selected()
      .and_then(|idx| self.users().get(idx))
  }

  fn submit(&mut self, submission: Submission) {
    match submission {
      Submission::Create(data) => {
        self.dialog_ticket = Some(self.mutations.create(data));
      }
      Submission::Update(user) => match self.mutations.update(user) {
        Ok(ticket) => self.dialog_ticket = Some(ticket),
        Err(e) => self.notifications.warning(e.to_string()),
      },
    }
  }

  fn open_dialog(&mut self, user: Option<User>) {
    // Anything still in flight belongs to a form that no longer exists
    self.dialog_ticket = None;
    match user {
      Some(user) => self.dialog.open_edit(user),
      None => self.dialog.open_create(),
    }
  }

  fn confirm_delete(&mut self, id: u64) {
    if let Err(e) = self.mutations.delete(id) {
      self.notifications.warning(e.to_string());
    }
  }

  /// Close whichever overlay a finished mutation belongs to
  fn apply_event(&mut self, event: MutationEvent) {
    match event {
      MutationEvent::Created(ticket, _) | MutationEvent::Updated(ticket, _) => {
        if self.dialog_ticket == Some(ticket) {
          self.dialog_ticket = None;
          self.dialog.close();
        }
      }
      // The form stays open so the operator can retry
      MutationEvent::CreateFailed(ticket) | MutationEvent::UpdateFailed(ticket, _) => {
        if self.dialog_ticket == Some(ticket) {
          self.dialog_ticket = None;
        }
      }
      MutationEvent::Deleted(id) => {
        if self.confirm.target_id() == Some(id) {
          self.confirm.hide();
        }
      }
      // The prompt stays open for the same reason
      MutationEvent::DeleteFailed(_) => {}
    }
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.users().len();
    ensure_valid_selection(&mut self.table_state, len);

    let title = if self.query.is_loading() && !self.has_data() {
      " Users (loading...) ".to_string()
    } else if self.query.is_error() && self.has_data() {
      format!(" Users ({}, refresh failed) ", len)
    } else if self.mutations.is_pending() {
      format!(" Users ({}, saving...) ", len)
    } else {
      format!(" Users ({}) ", len)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if !self.has_data() {
      let (content, style) = match self.query.error() {
        Some(e) => (
          format!("Error fetching users: {}\n\nPress 'r' to retry.", e),
          Style::default().fg(Color::Red),
        ),
        None => ("Loading...".to_string(), Style::default().fg(Color::DarkGray)),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(style)
        .wrap(Wrap { trim: true });
      frame.render_widget(paragraph, area);
      return;
    }

    if len == 0 {
      let paragraph = Paragraph::new("No users. Press 'a' to add one.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let name_width = (area.width.saturating_sub(4) / 2).max(10) as usize;

    let rows: Vec<Row> = self
      .users()
      .iter()
      .map(|user| {
        let busy = self.mutations.is_busy(user.id);
        let style = if busy {
          Style::default().fg(Color::DarkGray)
        } else {
          Style::default()
        };
        Row::new(vec![
          truncate(&user.name, name_width),
          truncate(&user.email, name_width),
        ])
        .style(style)
      })
      .collect();

    let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
      .header(
        Row::new(vec!["Name", "Email"]).style(Style::default().fg(Color::Cyan).bold()),
      )
      .block(block)
      .row_highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.table_state);
  }
}

impl View for UserListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Overlays get the key first
    match self.dialog.handle_key(key) {
      KeyResult::Event(DialogEvent::Submitted(submission)) => {
        self.submit(submission);
        return ViewAction::None;
      }
      KeyResult::Event(DialogEvent::Cancelled) => {
        self.dialog_ticket = None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled if self.dialog.is_active() => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(id)) => {
        self.confirm_delete(id);
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.table_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.table_state.select_previous();
      }
      KeyCode::Char('a') => self.open_dialog(None),
      KeyCode::Char('e') | KeyCode::Enter => {
        if let Some(user) = self.selected_user().cloned() {
          self.open_dialog(Some(user));
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        if let Some(user) = self.selected_user().cloned() {
          self.confirm.show(user);
        }
      }
      KeyCode::Char('r') => {
        self.query.refetch();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_table(frame, area);
    self.dialog.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
    render_toasts(frame, area, &self.notifications);
  }

  fn tick(&mut self) {
    self.query.poll(&mut self.cache);

    let events = self.mutations.poll(&mut self.cache, &mut self.notifications);
    for event in events {
      self.apply_event(event);
    }

    let len = self.users().len();
    ensure_valid_selection(&mut self.table_state, len);

    self.notifications.prune();
  }

  fn status(&self) -> ViewStatus {
    let entry = self.cache.entry(&UserQueryKey::Users);
    ViewStatus {
      record_count: entry.map(|e| e.entities.len()),
      synced_at: entry.map(|e| e.updated_at),
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.dialog.is_active() || self.confirm.is_active() {
      return Vec::new();
    }
    vec![
      ShortcutInfo::new("a", "add").with_priority(10),
      ShortcutInfo::new("e", "edit").with_priority(20),
      ShortcutInfo::new("d", "delete").with_priority(30),
      ShortcutInfo::new("r", "refresh").with_priority(40),
      ShortcutInfo::new("j/k", "navigate").with_priority(50),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ApiConfig;
  use crate::notify::ToastLevel;
  use crossterm::event::KeyModifiers;
  use ratatui::backend::TestBackend;
  use ratatui::Terminal;
  use serde_json::json;
  use std::time::Duration;
  use wiremock::matchers::{body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn press(view: &mut UserListView, code: KeyCode) -> ViewAction {
    view.handle_key(key(code))
  }

  fn type_str(view: &mut UserListView, s: &str) {
    for c in s.chars() {
      press(view, KeyCode::Char(c));
    }
  }

  fn view_for(server: &MockServer) -> UserListView {
    let client = UserClient::new(&ApiConfig {
      base_url: server.uri(),
      timeout_secs: None,
    })
    .unwrap();
    UserListView::new(client, CacheStore::new(), Notifications::new(Duration::from_secs(30)))
  }

  async fn settle(view: &mut UserListView, done: impl Fn(&UserListView) -> bool) {
    for _ in 0..400 {
      view.tick();
      if done(view) {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("view did not settle");
  }

  fn rendered(view: &mut UserListView) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal
      .draw(|frame| {
        let area = frame.area();
        view.render(frame, area);
      })
      .unwrap();
    terminal
      .backend()
      .buffer()
      .content()
      .iter()
      .map(|cell| cell.symbol())
      .collect()
  }

  async fn mount_list(server: &MockServer) {
    Mock::given(method("GET"))
      .and(path("/users"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(json!([{ "id": 1, "name": "Leanne", "email": "a@b.com" }])),
      )
      .mount(server)
      .await;
  }

  #[tokio::test]
  async fn test_edit_delete_and_failed_create() {
    let server = MockServer::start().await;
    mount_list(&server).await;
    Mock::given(method("PUT"))
      .and(path("/users/1"))
      .and(body_json(json!({ "name": "Leanne", "email": "c@d.com" })))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "Leanne", "email": "c@d.com" })),
      )
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("DELETE"))
      .and(path("/users/1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("POST"))
      .and(path("/users"))
      .respond_with(ResponseTemplate::new(500))
      .expect(1)
      .mount(&server)
      .await;

    let mut view = view_for(&server);

    // Initial load
    settle(&mut view, |v| v.has_data()).await;
    assert_eq!(view.users().len(), 1);
    let screen = rendered(&mut view);
    assert!(screen.contains("Leanne"));
    assert!(screen.contains("a@b.com"));

    // Edit email
    press(&mut view, KeyCode::Char('e'));
    assert!(view.dialog.is_active());
    press(&mut view, KeyCode::Tab);
    for _ in 0.."a@b.com".len() {
      press(&mut view, KeyCode::Backspace);
    }
    type_str(&mut view, "c@d.com");
    press(&mut view, KeyCode::Enter);

    settle(&mut view, |v| !v.dialog.is_active()).await;
    assert_eq!(view.users()[0].email, "c@d.com");
    assert_eq!(view.users().len(), 1);
    let toast = view.notifications.latest().unwrap();
    assert_eq!(toast.level, ToastLevel::Success);
    assert_eq!(toast.message, "User updated successfully");
    assert!(rendered(&mut view).contains("c@d.com"));

    // Delete with confirmation
    press(&mut view, KeyCode::Char('d'));
    assert!(view.confirm.is_active());
    press(&mut view, KeyCode::Char('y'));

    settle(&mut view, |v| !v.confirm.is_active()).await;
    assert!(view.users().is_empty());
    assert_eq!(
      view.notifications.latest().unwrap().message,
      "User deleted successfully"
    );

    // Create against a failing service
    press(&mut view, KeyCode::Char('a'));
    type_str(&mut view, "Kim");
    press(&mut view, KeyCode::Tab);
    type_str(&mut view, "k@x.com");
    press(&mut view, KeyCode::Enter);

    settle(&mut view, |v| {
      v.notifications
        .latest()
        .is_some_and(|t| t.level == ToastLevel::Error)
    })
    .await;
    assert!(view.users().is_empty());
    assert_eq!(view.notifications.latest().unwrap().message, "Failed to create user");
    assert!(view.dialog.is_active());
    assert_eq!(view.dialog.name(), "Kim");
    assert_eq!(view.dialog.email(), "k@x.com");
  }

  #[tokio::test]
  async fn test_invalid_form_sends_nothing() {
    let server = MockServer::start().await;
    mount_list(&server).await;
    Mock::given(method("POST"))
      .and(path("/users"))
      .respond_with(ResponseTemplate::new(201))
      .expect(0)
      .mount(&server)
      .await;

    let mut view = view_for(&server);
    settle(&mut view, |v| v.has_data()).await;

    press(&mut view, KeyCode::Char('a'));
    press(&mut view, KeyCode::Tab);
    type_str(&mut view, "not-an-email");
    press(&mut view, KeyCode::Enter);

    assert!(view.dialog.is_active());
    assert!(view.dialog.errors().name.is_some());
    assert!(view.dialog.errors().email.is_some());
    assert!(!view.mutations.is_pending());

    let screen = rendered(&mut view);
    assert!(screen.contains("Name is required"));
    assert!(screen.contains("Invalid email address"));
  }

  #[tokio::test]
  async fn test_failed_delete_keeps_prompt() {
    let server = MockServer::start().await;
    mount_list(&server).await;
    Mock::given(method("DELETE"))
      .and(path("/users/1"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let mut view = view_for(&server);
    settle(&mut view, |v| v.has_data()).await;

    press(&mut view, KeyCode::Char('d'));
    press(&mut view, KeyCode::Enter);

    settle(&mut view, |v| v.notifications.latest().is_some()).await;
    assert!(view.confirm.is_active());
    assert_eq!(view.users().len(), 1);
    assert_eq!(view.notifications.latest().unwrap().message, "Failed to delete user");
  }

  #[tokio::test]
  async fn test_load_error_then_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/users"))
      .respond_with(ResponseTemplate::new(500))
      .up_to_n_times(1)
      .mount(&server)
      .await;
    mount_list(&server).await;

    let mut view = view_for(&server);
    settle(&mut view, |v| v.query.is_error()).await;
    assert!(rendered(&mut view).contains("Error fetching users"));

    press(&mut view, KeyCode::Char('r'));
    settle(&mut view, |v| v.has_data()).await;
    assert_eq!(view.users()[0].name, "Leanne");
    assert_eq!(view.status().record_count, Some(1));
  }

  #[tokio::test]
  async fn test_quit_key() {
    let server = MockServer::start().await;
    mount_list(&server).await;
    let mut view = view_for(&server);
    assert_eq!(press(&mut view, KeyCode::Char('q')), ViewAction::Quit);
  }

  #[tokio::test]
  async fn test_earlier_create_does_not_close_newer_form() {
    let server = MockServer::start().await;
    mount_list(&server).await;
    Mock::given(method("POST"))
      .and(path("/users"))
      .and(body_json(json!({ "name": "Ann", "email": "ann@x.com" })))
      .respond_with(
        ResponseTemplate::new(201)
          .set_body_json(json!({ "id": 11, "name": "Ann", "email": "ann@x.com" }))
          .set_delay(Duration::from_millis(60)),
      )
      .expect(1)
      .mount(&server)
      .await;

    let mut view = view_for(&server);
    settle(&mut view, |v| v.has_data()).await;

    // Submit Ann, walk away from the form, start typing Bo
    press(&mut view, KeyCode::Char('a'));
    type_str(&mut view, "Ann");
    press(&mut view, KeyCode::Tab);
    type_str(&mut view, "ann@x.com");
    press(&mut view, KeyCode::Enter);
    assert!(rendered(&mut view).contains("saving..."));
    press(&mut view, KeyCode::Esc);
    press(&mut view, KeyCode::Char('a'));
    type_str(&mut view, "Bo");

    settle(&mut view, |v| v.users().len() == 2).await;
    assert_eq!(view.users()[1].name, "Ann");
    assert!(view.dialog.is_active());
    assert_eq!(view.dialog.name(), "Bo");
  }
}
