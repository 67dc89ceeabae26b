//! A terminal browser for TV shows and their episodes.
//!
//! episode-browser loads the show catalogue from a TVMaze-compatible API,
//! lets you pick a show, and lays out its episodes as cards that can be
//! narrowed with a free-text search. Matches are highlighted inside the
//! episode titles and summaries.
//!
//! # Features
//!
//! - Alphabetical show selector
//! - Episode selector with a "show all" entry
//! - Live search over episode names and summaries
//! - Highlighting that leaves the summary markup intact
//! - Scroll-to-card when a single episode is chosen
//!
//! # Usage
//!
//! ```bash
//! # Browse the public TVMaze catalogue
//! cargo run
//!
//! # Open straight into a show with a search already applied
//! cargo run -- --show 169 --search chemistry
//! ```

pub mod api;
pub mod browser;
pub mod cards;
pub mod config;
pub mod error;
pub mod highlight;
pub mod markup;
pub mod tui;
pub mod types;
