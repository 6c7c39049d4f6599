use crate::api::UserClient;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::notify::Notifications;
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::UserListView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(250);

/// Main application state
pub struct App {
  /// The user list; owns the cache and both coordinators
  view: Box<dyn View>,

  /// Header title
  title: String,

  /// Base URL shown in the header
  service_url: String,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = UserClient::new(&config.api)?;
    let service_url = client.base_url().to_string();
    let notifications = Notifications::new(config.notifications.duration());
    let view = UserListView::new(client, CacheStore::new(), notifications);

    Ok(Self {
      view: Box::new(view),
      title: config.title.unwrap_or_else(|| "Users".to_string()),
      service_url,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);
    info!(service = %self.service_url, "started");

    while !self.should_quit {
      let (title, service_url) = (&self.title, &self.service_url);
      let view = self.view.as_mut();
      terminal.draw(|frame| ui::draw(frame, title, service_url, view))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    info!("exiting");
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.view.tick(),
      Event::Resize => {} // Redrawn at the top of the loop
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Quit => {
        debug!("quit requested");
        self.should_quit = true;
      }
    }
  }
}
