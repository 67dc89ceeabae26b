//! API client for the TVMaze catalog.
//!
//! Two read-only endpoints are used: the show listing and the per-show
//! episode listing. Each call is a single request with no retries and no
//! timeout; failures are reported to the caller as [`AppError`].

use crate::error::{AppError, Result};
use crate::types::{Episode, Show};
use log::debug;
use serde::Deserialize;

/// Default TVMaze API base URL.
pub const DEFAULT_API_URL: &str = "https://api.tvmaze.com";

const USER_AGENT: &str = concat!("episode-browser/", env!("CARGO_PKG_VERSION"));

// Response types for /shows
#[derive(Debug, Deserialize)]
struct ShowRecord {
    id: u64,
    name: String,
}

// Response types for /shows/{id}/episodes
#[derive(Debug, Deserialize)]
struct EpisodeRecord {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    season: Option<u32>,
    #[serde(default)]
    number: Option<u32>,
    #[serde(default)]
    image: Option<ImageRecord>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageRecord {
    #[serde(default)]
    medium: Option<String>,
    #[serde(default)]
    original: Option<String>,
}

impl From<ShowRecord> for Show {
    fn from(raw: ShowRecord) -> Self {
        Show {
            id: raw.id,
            name: raw.name,
        }
    }
}

impl From<EpisodeRecord> for Episode {
    fn from(raw: EpisodeRecord) -> Self {
        Episode {
            id: raw.id,
            season: raw.season.unwrap_or(0),
            number: raw.number.unwrap_or(0),
            name: raw.name.unwrap_or_default(),
            image: raw.image.and_then(|img| img.medium.or(img.original)),
            summary: raw.summary,
        }
    }
}

/// Parse a show listing body.
pub fn parse_shows(body: &str) -> Result<Vec<Show>> {
    let records: Vec<ShowRecord> = serde_json::from_str(body)?;
    Ok(records.into_iter().map(Show::from).collect())
}

/// Parse an episode listing body.
pub fn parse_episodes(body: &str) -> Result<Vec<Episode>> {
    let records: Vec<EpisodeRecord> = serde_json::from_str(body)?;
    Ok(records.into_iter().map(Episode::from).collect())
}

/// Client for the TVMaze REST API.
///
/// Cloning is cheap; clones share the underlying connection pool, so a clone
/// can be moved into each spawned fetch task.
#[derive(Debug, Clone)]
pub struct TvMazeClient {
    client: reqwest::Client,
    base_url: String,
}

impl TvMazeClient {
    /// Create a client for the given base URL (trailing slashes are ignored).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the show listing.
    pub fn shows_url(&self) -> String {
        format!("{}/shows", self.base_url)
    }

    /// URL of the episode listing for one show.
    pub fn episodes_url(&self, show_id: u64) -> String {
        format!("{}/shows/{}/episodes", self.base_url, show_id)
    }

    /// Fetch the show listing, in server order.
    pub async fn fetch_shows(&self) -> Result<Vec<Show>> {
        let body = self.get(&self.shows_url()).await?;
        let shows = parse_shows(&body)?;
        debug!("Fetched {} shows", shows.len());
        Ok(shows)
    }

    /// Fetch all episodes of a show, in server order.
    pub async fn fetch_episodes(&self, show_id: u64) -> Result<Vec<Episode>> {
        let body = self.get(&self.episodes_url(show_id)).await?;
        let episodes = parse_episodes(&body)?;
        debug!("Fetched {} episodes for show {}", episodes.len(), show_id);
        Ok(episodes)
    }

    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}
