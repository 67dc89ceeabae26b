//! Episode browser state and the operations that drive it.
//!
//! [`Browser`] owns everything the UI shows: the sorted show list, the
//! episode set of the selected show, the search input, the episode choice,
//! the status line and the rendered cards. It performs no I/O; network
//! requests are described by [`EpisodeRequest`] values and their outcomes
//! are fed back through [`Browser::apply`].

use crate::cards::{Card, card_id, render_cards};
use crate::config::DEFAULT_PLACEHOLDER_IMAGE;
use crate::error::Result;
use crate::markup;
use crate::types::{Episode, Show};
use log::{debug, error, info};
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub const SHOWS_ERROR: &str = "Error: Unable to fetch shows. Please try again.";
pub const EPISODES_ERROR: &str = "Error: Unable to load episodes.";
pub const LOADING_SHOWS: &str = "Loading shows...";
pub const LOADING_EPISODES: &str = "Loading episodes...";
pub const SELECT_PROMPT: &str = "Please select a show.";
pub const SHOWING_ALL: &str = "Displaying all episodes";

/// Placeholder entry of the show selector.
pub const SHOW_PLACEHOLDER_LABEL: &str = "Select a show";
/// Sentinel entry of the episode selector.
pub const SHOW_ALL_VALUE: &str = "all";
pub const SHOW_ALL_LABEL: &str = "Show All Episodes";

/// Status line for a non-empty search.
pub fn search_status(matched: usize, total: usize) -> String {
    format!(
        "{} episode(s) found out of {} total episodes",
        matched, total
    )
}

/// Primary sort key of a name: decomposed, accents stripped, lowercased.
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Locale-style name ordering.
///
/// Names compare by base letters first, ignoring accents and case. Ties
/// put unaccented before accented and lowercase before uppercase.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Sort shows by name for the selector. The sort is stable.
pub fn sort_shows(shows: &mut [Show]) {
    shows.sort_by(|a, b| compare_names(&a.name, &b.name));
}

/// Normalized search term: trimmed and lowercased.
pub fn normalize_term(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Episodes whose name or summary contains `term`, in their original order.
///
/// Summaries are matched with entity references decoded, the same text the
/// highlighter sees.
///
/// `term` must already be normalized; an empty term matches everything.
pub fn filter_episodes<'a>(episodes: &'a [Episode], term: &str) -> Vec<&'a Episode> {
    if term.is_empty() {
        return episodes.iter().collect();
    }

    episodes
        .iter()
        .filter(|ep| {
            ep.name.to_lowercase().contains(term)
                || ep
                    .summary
                    .as_deref()
                    .is_some_and(|s| markup::unescape(s).to_lowercase().contains(term))
        })
        .collect()
}

/// An entry of a selector control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Current choice of the episode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeChoice {
    #[default]
    All,
    Episode(u64),
}

impl EpisodeChoice {
    /// Selector value for this choice.
    pub fn value(&self) -> String {
        match self {
            EpisodeChoice::All => SHOW_ALL_VALUE.to_string(),
            EpisodeChoice::Episode(id) => id.to_string(),
        }
    }

    /// Parse a selector value.
    pub fn from_value(value: &str) -> Option<Self> {
        if value == SHOW_ALL_VALUE {
            Some(EpisodeChoice::All)
        } else {
            value.parse().ok().map(EpisodeChoice::Episode)
        }
    }
}

/// Lifecycle of the episode set for the selected show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No show selected.
    #[default]
    Idle,
    /// Episode request in flight.
    Loading,
    /// Episodes loaded; search and selection are live.
    Ready,
    /// The last episode request failed.
    Error,
}

/// An episode fetch the caller should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRequest {
    pub show_id: u64,
    pub generation: u64,
}

/// Outcome of a network request, delivered back to the browser.
#[derive(Debug)]
pub enum Loaded {
    Shows(Result<Vec<Show>>),
    Episodes {
        generation: u64,
        result: Result<Vec<Episode>>,
    },
}

/// Episode browser state.
#[derive(Debug)]
pub struct Browser {
    shows: Vec<Show>,
    show_options: Vec<SelectOption>,
    selected_show: Option<u64>,
    episodes: Vec<Episode>,
    episode_options: Vec<SelectOption>,
    choice: EpisodeChoice,
    search_input: String,
    state: LoadState,
    generation: u64,
    status: String,
    status_is_error: bool,
    cards: Vec<Card>,
    revision: u64,
    pending_scroll: Option<String>,
    placeholder_image: String,
}

impl Default for Browser {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_IMAGE)
    }
}

impl Browser {
    /// Create an empty browser, waiting for the show list.
    pub fn new(placeholder_image: &str) -> Self {
        Self {
            shows: Vec::new(),
            show_options: Vec::new(),
            selected_show: None,
            episodes: Vec::new(),
            episode_options: Vec::new(),
            choice: EpisodeChoice::All,
            search_input: String::new(),
            state: LoadState::Idle,
            generation: 0,
            status: LOADING_SHOWS.to_string(),
            status_is_error: false,
            cards: Vec::new(),
            revision: 0,
            pending_scroll: None,
            placeholder_image: placeholder_image.to_string(),
        }
    }

    pub fn shows(&self) -> &[Show] {
        &self.shows
    }

    /// Show selector entries; empty until the show list has loaded.
    pub fn show_options(&self) -> &[SelectOption] {
        &self.show_options
    }

    pub fn selected_show(&self) -> Option<u64> {
        self.selected_show
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Episode selector entries; empty until an episode set has loaded.
    pub fn episode_options(&self) -> &[SelectOption] {
        &self.episode_options
    }

    pub fn choice(&self) -> EpisodeChoice {
        self.choice
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn search_term(&self) -> String {
        normalize_term(&self.search_input)
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_is_error(&self) -> bool {
        self.status_is_error
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Incremented on every render; lets views notice replaced cards.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Take the card id that should be scrolled into view once the
    /// current cards have been laid out.
    pub fn take_pending_scroll(&mut self) -> Option<String> {
        self.pending_scroll.take()
    }

    /// Feed a network outcome back into the browser.
    ///
    /// Returns `false` when the outcome was stale and ignored.
    pub fn apply(&mut self, loaded: Loaded) -> bool {
        match loaded {
            Loaded::Shows(result) => {
                self.on_shows_loaded(result);
                true
            }
            Loaded::Episodes { generation, result } => self.on_episodes_loaded(generation, result),
        }
    }

    fn on_shows_loaded(&mut self, result: Result<Vec<Show>>) {
        match result {
            Ok(mut shows) => {
                sort_shows(&mut shows);
                info!("Loaded {} shows", shows.len());

                let mut options = Vec::with_capacity(shows.len() + 1);
                options.push(SelectOption::new("", SHOW_PLACEHOLDER_LABEL));
                options.extend(
                    shows
                        .iter()
                        .map(|show| SelectOption::new(show.option_value(), show.name.clone())),
                );

                self.shows = shows;
                self.show_options = options;
                self.set_status(SELECT_PROMPT, false);
            }
            Err(e) => {
                error!("Failed to load shows: {}", e);
                self.set_status(SHOWS_ERROR, true);
            }
        }
    }

    /// Change the show selection.
    ///
    /// `Some(id)` starts loading that show and returns the request to
    /// perform; `None` (the placeholder) clears everything locally.
    /// Either way any request still in flight becomes stale.
    pub fn select_show(&mut self, show_id: Option<u64>) -> Option<EpisodeRequest> {
        self.generation += 1;
        self.selected_show = show_id;

        // the previous show's episodes must not outlive the selection change
        self.episodes.clear();
        self.episode_options.clear();
        self.choice = EpisodeChoice::All;
        self.replace_cards(Vec::new());

        match show_id {
            Some(show_id) => {
                debug!(
                    "Requesting episodes for show {} (generation {})",
                    show_id, self.generation
                );
                self.state = LoadState::Loading;
                self.set_status(LOADING_EPISODES, false);
                Some(EpisodeRequest {
                    show_id,
                    generation: self.generation,
                })
            }
            None => {
                self.state = LoadState::Idle;
                self.set_status(SELECT_PROMPT, false);
                None
            }
        }
    }

    fn on_episodes_loaded(&mut self, generation: u64, result: Result<Vec<Episode>>) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping stale episode response (generation {}, current {})",
                generation, self.generation
            );
            return false;
        }

        match result {
            Ok(episodes) => {
                info!("Loaded {} episodes", episodes.len());
                self.episodes = episodes;
                self.state = LoadState::Ready;
                self.setup();
            }
            Err(e) => {
                error!("Failed to load episodes: {}", e);
                self.state = LoadState::Error;
                self.set_status(EPISODES_ERROR, true);
            }
        }
        true
    }

    /// Rebuild the episode selector and render for a fresh episode set.
    fn setup(&mut self) {
        let mut options = Vec::with_capacity(self.episodes.len() + 1);
        options.push(SelectOption::new(SHOW_ALL_VALUE, SHOW_ALL_LABEL));
        options.extend(
            self.episodes
                .iter()
                .map(|ep| SelectOption::new(ep.id.to_string(), ep.to_display())),
        );
        self.episode_options = options;
        self.choice = EpisodeChoice::All;
        self.refresh_search();
    }

    /// Replace the search input and re-filter.
    ///
    /// Before an episode set is ready the input is only stored.
    pub fn set_search_input(&mut self, input: &str) {
        self.search_input = input.to_string();
        if self.state == LoadState::Ready {
            self.choice = EpisodeChoice::All;
            self.refresh_search();
        }
    }

    fn refresh_search(&mut self) {
        let term = self.search_term();
        let matched = filter_episodes(&self.episodes, &term);

        let status = if term.is_empty() {
            SHOWING_ALL.to_string()
        } else {
            search_status(matched.len(), self.episodes.len())
        };

        let cards = render_cards(matched, &term, &self.placeholder_image);
        self.replace_cards(cards);
        self.set_status(&status, false);
    }

    /// Change the episode selector.
    ///
    /// `All` renders the full set; a specific episode renders only that
    /// one and queues a scroll to its card. Unknown ids are ignored.
    pub fn select_episode(&mut self, choice: EpisodeChoice) {
        if self.state != LoadState::Ready {
            return;
        }

        match choice {
            EpisodeChoice::All => {
                self.choice = choice;
                self.render_all();
            }
            EpisodeChoice::Episode(id) => {
                let Some(index) = self.episodes.iter().position(|ep| ep.id == id) else {
                    debug!("Episode {} is not in the current set", id);
                    return;
                };
                self.choice = choice;
                let term = self.search_term();
                let cards = render_cards(
                    std::iter::once(&self.episodes[index]),
                    &term,
                    &self.placeholder_image,
                );
                self.replace_cards(cards);
                self.pending_scroll = Some(card_id(id));
            }
        }
    }

    fn render_all(&mut self) {
        let term = self.search_term();
        let cards = render_cards(&self.episodes, &term, &self.placeholder_image);
        self.replace_cards(cards);
    }

    fn replace_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.revision += 1;
        self.pending_scroll = None;
    }

    fn set_status(&mut self, message: &str, is_error: bool) {
        self.status = message.to_string();
        self.status_is_error = is_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn show(id: u64, name: &str) -> Show {
        Show {
            id,
            name: name.to_string(),
        }
    }

    fn episode(id: u64, season: u32, number: u32, name: &str, summary: Option<&str>) -> Episode {
        Episode {
            id,
            season,
            number,
            name: name.to_string(),
            image: None,
            summary: summary.map(str::to_string),
        }
    }

    fn sample_episodes() -> Vec<Episode> {
        vec![
            episode(1, 1, 1, "Pilot", Some("<p>A chemistry teacher turns to crime.</p>")),
            episode(2, 1, 2, "Cat's in the Bag...", Some("<p>Walter and Jesse clean up.</p>")),
            episode(3, 1, 3, "...And the Bag's in the River", None),
            episode(4, 2, 1, "Seven Thirty-Seven", Some("<p>Chemistry again.</p>")),
        ]
    }

    fn ready_browser() -> Browser {
        let mut browser = Browser::default();
        browser.apply(Loaded::Shows(Ok(vec![show(169, "Breaking Bad")])));
        let request = browser.select_show(Some(169)).unwrap();
        browser.apply(Loaded::Episodes {
            generation: request.generation,
            result: Ok(sample_episodes()),
        });
        browser
    }

    fn card_ids(browser: &Browser) -> Vec<u64> {
        browser.cards().iter().map(|c| c.episode_id).collect()
    }

    #[test]
    fn test_compare_names_folds_case() {
        let mut names = vec!["banana", "Apple", "cherry", "apple", "Banana"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["apple", "Apple", "banana", "Banana", "cherry"]);
    }

    #[test]
    fn test_compare_names_ignores_accents() {
        let mut shows = vec![
            show(1, "Friends"),
            show(2, "Élite"),
            show(3, "Zoo"),
            show(4, "Arrow"),
        ];
        sort_shows(&mut shows);
        let names: Vec<&str> = shows.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Arrow", "Élite", "Friends", "Zoo"]);

        assert_eq!(compare_names("Élite", "Friends"), Ordering::Less);
        assert_eq!(compare_names("elite", "Élite"), Ordering::Less);
        assert_eq!(compare_names("Élite", "élite"), Ordering::Greater);
        assert_eq!(compare_names("Élite", "Élite"), Ordering::Equal);
    }

    #[test]
    fn test_filter_matches_decoded_summary() {
        let episodes = vec![episode(
            9,
            1,
            1,
            "Opening",
            Some("<p>A caf&eacute; on the corner.</p>"),
        )];
        assert_eq!(filter_episodes(&episodes, "café").len(), 1);
        assert!(filter_episodes(&episodes, "eacute").is_empty());
    }

    #[test]
    fn test_shows_sorted_with_placeholder_first() {
        let mut browser = Browser::default();
        browser.apply(Loaded::Shows(Ok(vec![
            show(3, "the Wire"),
            show(1, "Breaking Bad"),
            show(2, "arrow"),
        ])));

        let labels: Vec<&str> = browser
            .show_options()
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Select a show", "arrow", "Breaking Bad", "the Wire"]);
        assert_eq!(browser.show_options()[0].value, "");
        assert_eq!(browser.show_options()[1].value, "2");
        assert_eq!(browser.status(), SELECT_PROMPT);
    }

    #[test]
    fn test_shows_failure_leaves_selector_empty() {
        let mut browser = Browser::default();
        browser.apply(Loaded::Shows(Err(AppError::Network("refused".to_string()))));

        assert_eq!(browser.status(), SHOWS_ERROR);
        assert!(browser.status_is_error());
        assert!(browser.show_options().is_empty());
        assert!(browser.shows().is_empty());
    }

    #[test]
    fn test_select_show_sets_loading() {
        let mut browser = Browser::default();
        let request = browser.select_show(Some(82)).unwrap();
        assert_eq!(request.show_id, 82);
        assert_eq!(browser.state(), LoadState::Loading);
        assert_eq!(browser.status(), LOADING_EPISODES);
    }

    #[test]
    fn test_episodes_loaded_renders_all_and_builds_selector() {
        let browser = ready_browser();
        assert_eq!(browser.state(), LoadState::Ready);
        assert_eq!(card_ids(&browser), vec![1, 2, 3, 4]);
        assert_eq!(browser.status(), SHOWING_ALL);

        let options = browser.episode_options();
        assert_eq!(options.len(), 5);
        assert_eq!(options[0], SelectOption::new("all", "Show All Episodes"));
        assert_eq!(options[1], SelectOption::new("1", "S01E01 - Pilot"));
        assert_eq!(options[4], SelectOption::new("4", "S02E01 - Seven Thirty-Seven"));
    }

    #[test]
    fn test_loading_clears_previous_show() {
        let mut browser = ready_browser();
        browser.select_show(Some(2));
        assert!(browser.cards().is_empty());
        assert!(browser.episodes().is_empty());
        assert_eq!(browser.state(), LoadState::Loading);
    }

    #[test]
    fn test_episodes_failure() {
        let mut browser = Browser::default();
        let request = browser.select_show(Some(5)).unwrap();
        browser.apply(Loaded::Episodes {
            generation: request.generation,
            result: Err(AppError::Status(404)),
        });
        assert_eq!(browser.state(), LoadState::Error);
        assert_eq!(browser.status(), EPISODES_ERROR);
        assert!(browser.status_is_error());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut browser = Browser::default();
        let first = browser.select_show(Some(1)).unwrap();
        let second = browser.select_show(Some(2)).unwrap();

        // the newer request resolves first, then the older one arrives
        assert!(browser.apply(Loaded::Episodes {
            generation: second.generation,
            result: Ok(vec![episode(20, 1, 1, "Second show", None)]),
        }));
        assert!(!browser.apply(Loaded::Episodes {
            generation: first.generation,
            result: Ok(vec![episode(10, 1, 1, "First show", None)]),
        }));

        assert_eq!(card_ids(&browser), vec![20]);
        assert_eq!(browser.episodes()[0].name, "Second show");
    }

    #[test]
    fn test_placeholder_resets_locally() {
        let mut browser = ready_browser();
        assert!(browser.select_show(None).is_none());

        assert_eq!(browser.state(), LoadState::Idle);
        assert!(browser.episodes().is_empty());
        assert!(browser.cards().is_empty());
        assert!(browser.episode_options().is_empty());
        assert_eq!(browser.status(), SELECT_PROMPT);
    }

    #[test]
    fn test_placeholder_invalidates_in_flight_request() {
        let mut browser = Browser::default();
        let request = browser.select_show(Some(1)).unwrap();
        browser.select_show(None);

        assert!(!browser.apply(Loaded::Episodes {
            generation: request.generation,
            result: Ok(sample_episodes()),
        }));
        assert!(browser.cards().is_empty());
        assert_eq!(browser.state(), LoadState::Idle);
    }

    #[test]
    fn test_filter_matches_name_or_summary() {
        let episodes = sample_episodes();
        let ids: Vec<u64> = filter_episodes(&episodes, "chemistry")
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![1, 4]);

        let ids: Vec<u64> = filter_episodes(&episodes, "bag")
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_filter_empty_term_returns_everything() {
        let episodes = sample_episodes();
        assert_eq!(filter_episodes(&episodes, "").len(), episodes.len());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let episodes = sample_episodes();
        let once: Vec<Episode> = filter_episodes(&episodes, "the")
            .into_iter()
            .cloned()
            .collect();
        let twice: Vec<Episode> = filter_episodes(&once, "the")
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_search_updates_cards_and_status() {
        let mut browser = ready_browser();
        browser.set_search_input("  CHEMISTRY ");

        assert_eq!(card_ids(&browser), vec![1, 4]);
        assert_eq!(
            browser.status(),
            "2 episode(s) found out of 4 total episodes"
        );
        assert!(browser.cards()[0]
            .summary
            .contains("<span class=\"highlight\">chemistry</span>"));
    }

    #[test]
    fn test_search_with_no_matches() {
        let mut browser = ready_browser();
        browser.set_search_input("zebra");
        assert!(browser.cards().is_empty());
        assert_eq!(
            browser.status(),
            "0 episode(s) found out of 4 total episodes"
        );
        assert!(!browser.status_is_error());
    }

    #[test]
    fn test_clearing_search_shows_all() {
        let mut browser = ready_browser();
        browser.set_search_input("pilot");
        browser.set_search_input("   ");
        assert_eq!(card_ids(&browser), vec![1, 2, 3, 4]);
        assert_eq!(browser.status(), SHOWING_ALL);
    }

    #[test]
    fn test_search_before_load_applies_on_load() {
        let mut browser = Browser::default();
        browser.set_search_input("pilot");
        assert!(browser.cards().is_empty());

        let request = browser.select_show(Some(169)).unwrap();
        browser.apply(Loaded::Episodes {
            generation: request.generation,
            result: Ok(sample_episodes()),
        });
        assert_eq!(card_ids(&browser), vec![1]);
    }

    #[test]
    fn test_select_single_episode_queues_scroll() {
        let mut browser = ready_browser();
        browser.select_episode(EpisodeChoice::Episode(3));

        assert_eq!(card_ids(&browser), vec![3]);
        assert_eq!(browser.choice(), EpisodeChoice::Episode(3));
        assert_eq!(browser.take_pending_scroll().as_deref(), Some("episode-3"));
        assert_eq!(browser.take_pending_scroll(), None);
    }

    #[test]
    fn test_show_all_restores_full_set_in_order() {
        let mut browser = ready_browser();
        browser.select_episode(EpisodeChoice::Episode(2));
        browser.select_episode(EpisodeChoice::All);

        assert_eq!(card_ids(&browser), vec![1, 2, 3, 4]);
        assert_eq!(browser.take_pending_scroll(), None);
    }

    #[test]
    fn test_unknown_episode_is_ignored() {
        let mut browser = ready_browser();
        let before = browser.revision();
        browser.select_episode(EpisodeChoice::Episode(999));

        assert_eq!(browser.revision(), before);
        assert_eq!(card_ids(&browser), vec![1, 2, 3, 4]);
        assert_eq!(browser.take_pending_scroll(), None);
    }

    #[test]
    fn test_new_show_replaces_episode_set() {
        let mut browser = ready_browser();
        let request = browser.select_show(Some(2)).unwrap();
        browser.apply(Loaded::Episodes {
            generation: request.generation,
            result: Ok(vec![episode(50, 1, 1, "Other", None)]),
        });

        assert_eq!(browser.episodes().len(), 1);
        assert_eq!(card_ids(&browser), vec![50]);
        assert_eq!(browser.choice(), EpisodeChoice::All);
    }

    #[test]
    fn test_episode_choice_values() {
        assert_eq!(EpisodeChoice::All.value(), "all");
        assert_eq!(EpisodeChoice::Episode(7).value(), "7");
        assert_eq!(EpisodeChoice::from_value("all"), Some(EpisodeChoice::All));
        assert_eq!(
            EpisodeChoice::from_value("42"),
            Some(EpisodeChoice::Episode(42))
        );
        assert_eq!(EpisodeChoice::from_value("nope"), None);
    }
}
