/// Bounded-wait keyboard poll.
///
/// One poll per tick doubles as the inter-generation delay: it blocks
/// up to the requested window and returns early only when a key press
/// arrives. Non-key events (resize, focus) and key releases are
/// swallowed without restarting the window.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::sim::world::Input;

pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> Self {
        TerminalInput
    }
}

impl Input for TerminalInput {
    fn poll_key(&mut self, wait: Duration) -> io::Result<Option<KeyEvent>> {
        let deadline = Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(None);
            }
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    return Ok(Some(key));
                }
                _ => {
                    // Resize/focus/release: keep waiting out the window.
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                }
            }
        }
    }
}
