use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Terminal was resized; redraw on the next loop
  Resize,
  /// Periodic tick for query/mutation polling and toast expiry
  Tick,
}

/// Merges terminal input and a tick timer into one stream.
///
/// Terminal reads block, so they run on a blocking thread; the tick timer is
/// a plain tokio interval.
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    let input_tx = tx.clone();
    tokio::task::spawn_blocking(move || loop {
      // Wake up periodically so the thread notices a closed channel
      match event::poll(tick_rate) {
        Ok(true) => {}
        Ok(false) => {
          if input_tx.is_closed() {
            break;
          }
          continue;
        }
        Err(e) => {
          debug!(error = %e, "terminal poll failed");
          break;
        }
      }

      let forwarded = match event::read() {
        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
          input_tx.send(Event::Key(key))
        }
        Ok(CrosstermEvent::Resize(_, _)) => input_tx.send(Event::Resize),
        Ok(_) => Ok(()),
        Err(e) => {
          debug!(error = %e, "terminal read failed");
          break;
        }
      };
      if forwarded.is_err() {
        break;
      }
    });

    tokio::spawn(async move {
      let mut interval = tokio::time::interval(tick_rate);
      loop {
        interval.tick().await;
        if tx.send(Event::Tick).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
