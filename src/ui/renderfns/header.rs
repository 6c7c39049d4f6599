use chrono::{DateTime, Local, Utc};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// What the header shows besides the title
pub struct HeaderInfo<'a> {
  pub title: &'a str,
  pub service_url: &'a str,
  pub record_count: Option<usize>,
  pub synced_at: Option<DateTime<Utc>>,
}

/// Draw the header bar with title, service host and sync state
pub fn draw_header(frame: &mut Frame, area: Rect, info: &HeaderInfo) {
  let mut spans = vec![
    Span::styled(format!(" {} ", info.title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", extract_domain(info.service_url)),
      Style::default().fg(Color::White),
    ),
  ];

  if let Some(count) = info.record_count {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" {} users ", count),
      Style::default().fg(Color::Yellow).bold(),
    ));
  }

  if let Some(synced_at) = info.synced_at {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" synced {} ", synced_at.with_timezone(&Local).format("%H:%M:%S")),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Extract host (and port) from the service URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}
