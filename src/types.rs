//! Type definitions for the episode-browser application.
//!
//! This module contains the catalog records the browser works with. They are
//! built from the TVMaze wire format in [`crate::api`] and never change after
//! being fetched.

use serde::Serialize;

/// A TV series from the show listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Show {
    /// Server-assigned identifier.
    pub id: u64,

    /// Display name of the show.
    pub name: String,
}

impl Show {
    /// Value used for this show in the show selector.
    pub fn option_value(&self) -> String {
        self.id.to_string()
    }
}

/// A single episode of a show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Episode {
    /// Identifier, unique within the show.
    pub id: u64,

    /// Season number (0 for specials).
    pub season: u32,

    /// Episode number within the season.
    pub number: u32,

    /// Episode title.
    pub name: String,

    /// Image reference, if the API has one.
    pub image: Option<String>,

    /// Summary as rich-text markup, if the API has one.
    pub summary: Option<String>,
}

impl Episode {
    /// Zero-padded season/episode code.
    ///
    /// # Examples
    ///
    /// ```
    /// use episode_browser::types::Episode;
    ///
    /// let ep = Episode {
    ///     id: 1,
    ///     season: 1,
    ///     number: 3,
    ///     name: "Pilot".to_string(),
    ///     image: None,
    ///     summary: None,
    /// };
    /// assert_eq!(ep.code(), "S01E03");
    /// ```
    pub fn code(&self) -> String {
        format!("S{:02}E{:02}", self.season, self.number)
    }

    /// Card title: name followed by the episode code.
    pub fn title(&self) -> String {
        format!("{} - {}", self.name, self.code())
    }

    /// Label used in the episode selector.
    pub fn to_display(&self) -> String {
        format!("{} - {}", self.code(), self.name)
    }

    /// Summary text, treating an empty string the same as a missing one.
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref().filter(|s| !s.is_empty())
    }
}
