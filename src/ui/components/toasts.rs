use crate::notify::{Notifications, ToastLevel};
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const TOAST_WIDTH: u16 = 40;

/// Stack toasts in the bottom-right corner, newest at the bottom
pub fn render_toasts(frame: &mut Frame, area: Rect, notifications: &Notifications) {
  if notifications.is_empty() || area.width < 10 {
    return;
  }

  let width = TOAST_WIDTH.min(area.width);
  let x = area.right().saturating_sub(width + 1).max(area.x);
  let mut bottom = area.bottom();

  for toast in notifications.iter().rev() {
    if bottom < area.y + 3 {
      break;
    }
    let toast_area = Rect::new(x, bottom - 3, width, 3);
    bottom -= 3;

    let color = level_color(toast.level);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(color));
    let text = truncate(&toast.message, width.saturating_sub(4) as usize);

    frame.render_widget(Clear, toast_area);
    frame.render_widget(
      Paragraph::new(Span::styled(text, Style::default().fg(color))).block(block),
      toast_area,
    );
  }
}

fn level_color(level: ToastLevel) -> Color {
  match level {
    ToastLevel::Success => Color::Green,
    ToastLevel::Warning => Color::Yellow,
    ToastLevel::Error => Color::Red,
  }
}
