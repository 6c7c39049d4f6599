mod components;
mod renderfns;
pub mod view;
pub mod views;

use ratatui::prelude::*;
use ratatui::widgets::TableState;
use renderfns::header::HeaderInfo;
use view::View;

/// Main draw function: header, current view, footer
pub fn draw(frame: &mut Frame, title: &str, service_url: &str, view: &mut dyn View) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let status = view.status();
  renderfns::draw_header(
    frame,
    chunks[0],
    &HeaderInfo {
      title,
      service_url,
      record_count: status.record_count,
      synced_at: status.synced_at,
    },
  );

  view.render(frame, chunks[1]);

  renderfns::draw_footer(frame, chunks[2], &view.shortcuts());
}

/// Keep the table selection inside `len` rows
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}

/// A `width` x `height` rect centered in `area`, clipped to it
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  let x = area.x + (area.width - width) / 2;
  let y = area.y + (area.height - height) / 2;
  Rect::new(x, y, width, height)
}
