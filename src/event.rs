use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Events that can occur in the application
#[derive(Debug, Clone)]
pub enum Event {
    /// Terminal key press event
    Key(KeyEvent),
    /// Terminal mouse event
    Mouse(MouseEvent),
    /// Terminal resize event
    Resize(u16, u16),
    /// Tick event for periodic updates (spinner, stream redraws)
    Tick,
    /// Terminal input closed
    Quit,
}

/// Result type for event handling
pub type EventResult<T> = anyhow::Result<T>;

/// Merges terminal input with a fixed-rate tick
pub struct EventReader {
    terminal: EventStream,
    ticker: Interval,
}

impl EventReader {
    pub fn new(tick_rate: Duration) -> Self {
        let mut ticker = interval(tick_rate);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            terminal: EventStream::new(),
            ticker,
        }
    }

    /// Wait for the next event
    pub async fn next(&mut self) -> EventResult<Event> {
        loop {
            tokio::select! {
                _ = self.ticker.tick() => return Ok(Event::Tick),
                maybe = self.terminal.next() => {
                    let Some(event) = maybe else {
                        return Ok(Event::Quit);
                    };
                    if let Some(event) = Self::convert(event?) {
                        return Ok(event);
                    }
                }
            }
        }
    }

    fn convert(event: CrosstermEvent) -> Option<Event> {
        match event {
            // Windows reports releases too; only presses drive the UI.
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
            _ => None,
        }
    }
}
