//! Terminal User Interface for episode-browser using ratatui.
//!
//! This module provides a full-screen TUI with a show selector, an episode
//! selector, a search field, a status line and a scrolling column of
//! episode cards.

mod render;
mod scroll;
mod state;
mod types;

pub use render::{draw, markup_to_lines};
pub use scroll::ScrollPosition;
pub use state::App;
pub use types::{Action, Focus};

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
