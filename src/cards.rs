//! Episode cards: the rendered unit for one episode.

use crate::highlight::highlight;
use crate::markup;
use crate::types::Episode;

/// Summary shown when an episode has none.
pub const NO_SUMMARY: &str = "No summary available.";

/// One rendered episode.
///
/// `title` and `summary` are markup with the current search term already
/// highlighted; `image` is a plain reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub episode_id: u64,
    pub title: String,
    pub image: String,
    pub summary: String,
}

/// Identifier of the card for an episode, used for scroll targeting.
pub fn card_id(episode_id: u64) -> String {
    format!("episode-{}", episode_id)
}

impl Card {
    /// Build the card for `episode`, highlighting `term`.
    pub fn new(episode: &Episode, term: &str, placeholder_image: &str) -> Self {
        let title = episode.title();
        let title = markup::escape(&title);
        let summary = episode.summary_text().unwrap_or(NO_SUMMARY);

        Self {
            id: card_id(episode.id),
            episode_id: episode.id,
            title: highlight(&title, term),
            image: episode
                .image
                .clone()
                .unwrap_or_else(|| placeholder_image.to_string()),
            summary: highlight(summary, term),
        }
    }
}

/// Render one card per episode, in the given order.
pub fn render_cards<'a, I>(episodes: I, term: &str, placeholder_image: &str) -> Vec<Card>
where
    I: IntoIterator<Item = &'a Episode>,
{
    episodes
        .into_iter()
        .map(|ep| Card::new(ep, term, placeholder_image))
        .collect()
}
