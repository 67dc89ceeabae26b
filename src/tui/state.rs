//! Application state management and input handling.

use crate::browser::{Browser, EpisodeChoice, EpisodeRequest, Loaded};
use crate::config::ColorScheme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, warn};
use ratatui::widgets::ListState;

use super::scroll::{self, ScrollPosition};
use super::types::{Action, Focus};

/// Cards moved per PageUp/PageDown.
const PAGE_CARDS: isize = 5;

/// Application state for the TUI.
pub struct App {
    /// Browser state shown by the UI
    pub browser: Browser,
    /// Control receiving keyboard input
    pub focus: Focus,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Whether the focused selector's option list is open
    pub dropdown_open: bool,
    /// Highlighted entry of the show selector
    pub show_list_state: ListState,
    /// Highlighted entry of the episode selector
    pub episode_list_state: ListState,
    /// Current position of the card column
    pub scroll: ScrollPosition,
    /// Position the card column is animating toward
    pub scroll_target: Option<ScrollPosition>,
    /// Browser render revision the scroll position belongs to
    pub seen_revision: u64,
    /// Whether help modal is shown
    pub show_help: bool,
    /// Color scheme
    pub colors: ColorScheme,
}

impl App {
    /// Create a new App around a browser.
    pub fn new(browser: Browser, colors: ColorScheme) -> Self {
        let seen_revision = browser.revision();
        Self {
            browser,
            focus: Focus::Shows,
            should_quit: false,
            dropdown_open: false,
            show_list_state: ListState::default(),
            episode_list_state: ListState::default(),
            scroll: ScrollPosition::default(),
            scroll_target: None,
            seen_revision,
            show_help: false,
            colors,
        }
    }

    /// Feed a network outcome into the browser and refresh the selectors.
    pub fn apply(&mut self, loaded: Loaded) -> bool {
        let applied = self.browser.apply(loaded);
        self.sync_selectors();
        applied
    }

    /// Change the show selection, returning the fetch to start, if any.
    pub fn select_show(&mut self, show_id: Option<u64>) -> Option<EpisodeRequest> {
        let request = self.browser.select_show(show_id);
        self.sync_selectors();
        request
    }

    /// Select a show by id if it is in the loaded show list.
    ///
    /// Used for the start-up `--show` preset; unknown ids are logged and
    /// leave the selection untouched.
    pub fn preselect_show(&mut self, show_id: u64) -> Option<EpisodeRequest> {
        if !self.browser.shows().iter().any(|s| s.id == show_id) {
            warn!("Show {} is not in the show list", show_id);
            return None;
        }
        self.select_show(Some(show_id))
    }

    /// Replace the search input.
    pub fn set_search_input(&mut self, input: &str) {
        self.browser.set_search_input(input);
        self.sync_selectors();
    }

    /// Point both selectors at the browser's current values.
    fn sync_selectors(&mut self) {
        let show_value = self
            .browser
            .selected_show()
            .map(|id| id.to_string())
            .unwrap_or_default();
        let show_index = self
            .browser
            .show_options()
            .iter()
            .position(|o| o.value == show_value);
        self.show_list_state.select(show_index);

        let choice_value = self.browser.choice().value();
        let episode_index = self
            .browser
            .episode_options()
            .iter()
            .position(|o| o.value == choice_value);
        self.episode_list_state.select(episode_index);
    }

    /// Reconcile the scroll position with the latest render.
    ///
    /// Called from the draw pass once card heights are known: new cards
    /// reset the column to the top, and a pending scroll request from the
    /// browser is turned into an animation target centred on its card.
    /// Each call advances the animation by one step.
    pub fn sync_scroll(&mut self, heights: &[u16], viewport: u16) {
        if self.browser.revision() != self.seen_revision {
            self.seen_revision = self.browser.revision();
            self.scroll = ScrollPosition::default();
            self.scroll_target = None;
        }

        if let Some(card_id) = self.browser.take_pending_scroll() {
            let index = self.browser.cards().iter().position(|c| c.id == card_id);
            match index.and_then(|i| scroll::centered(heights, i, viewport)) {
                Some(target) => self.scroll_target = Some(target),
                None => debug!("Card {} not found, skipping scroll", card_id),
            }
        }

        if let Some(target) = self.scroll_target {
            self.scroll = scroll::step_toward(self.scroll, target);
            if self.scroll == target {
                self.scroll_target = None;
            }
        }

        let last = self.browser.cards().len().saturating_sub(1);
        if self.scroll.first_card > last {
            self.scroll.first_card = last;
        }
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        if self.show_help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return Action::None;
        }

        if self.dropdown_open {
            return self.handle_dropdown_input(key);
        }

        if self.focus == Focus::Search {
            return self.handle_search_input(key);
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Action::None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return Action::None;
            }
            KeyCode::Char('/') => {
                self.focus = Focus::Search;
                return Action::None;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return Action::None;
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Action::Quit;
            }
            _ => {}
        }

        match self.focus {
            Focus::Shows | Focus::Episodes => self.handle_selector_input(key),
            Focus::Cards => self.handle_cards_input(key),
            Focus::Search => Action::None,
        }
    }

    fn handle_selector_input(&mut self, key: KeyEvent) -> Action {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
            let has_options = match self.focus {
                Focus::Shows => !self.browser.show_options().is_empty(),
                _ => !self.browser.episode_options().is_empty(),
            };
            if has_options {
                self.dropdown_open = true;
                let state = self.focused_list_state();
                if state.selected().is_none() {
                    state.select(Some(0));
                }
            }
        }
        Action::None
    }

    fn handle_dropdown_input(&mut self, key: KeyEvent) -> Action {
        let len = match self.focus {
            Focus::Shows => self.browser.show_options().len(),
            _ => self.browser.episode_options().len(),
        };

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                let state = self.focused_list_state();
                let i = state.selected().unwrap_or(0);
                state.select(Some(i.saturating_sub(1)));
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let state = self.focused_list_state();
                let i = state.selected().unwrap_or(0);
                if i + 1 < len {
                    state.select(Some(i + 1));
                }
                Action::None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.focused_list_state().select(Some(0));
                Action::None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.focused_list_state().select(Some(len.saturating_sub(1)));
                Action::None
            }
            KeyCode::Enter => {
                self.dropdown_open = false;
                self.commit_selection()
            }
            KeyCode::Esc => {
                self.dropdown_open = false;
                self.sync_selectors();
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Apply the highlighted dropdown entry.
    fn commit_selection(&mut self) -> Action {
        match self.focus {
            Focus::Shows => {
                let Some(option) = self
                    .show_list_state
                    .selected()
                    .and_then(|i| self.browser.show_options().get(i))
                else {
                    return Action::None;
                };
                // the placeholder has an empty value
                Action::SelectShow(option.value.parse().ok())
            }
            Focus::Episodes => {
                let choice = self
                    .episode_list_state
                    .selected()
                    .and_then(|i| self.browser.episode_options().get(i))
                    .and_then(|o| EpisodeChoice::from_value(&o.value));
                if let Some(choice) = choice {
                    self.browser.select_episode(choice);
                    if choice != EpisodeChoice::All {
                        self.focus = Focus::Cards;
                    }
                }
                self.sync_selectors();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut input = self.browser.search_input().to_string();
                input.push(c);
                self.set_search_input(&input);
            }
            KeyCode::Backspace => {
                let mut input = self.browser.search_input().to_string();
                if input.pop().is_some() {
                    self.set_search_input(&input);
                }
            }
            KeyCode::Esc => {
                if !self.browser.search_input().is_empty() {
                    self.set_search_input("");
                }
            }
            KeyCode::Enter => self.focus = Focus::Cards,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            _ => {}
        }
        Action::None
    }

    fn handle_cards_input(&mut self, key: KeyEvent) -> Action {
        let count = self.browser.cards().len();
        let delta = match key.code {
            KeyCode::Down | KeyCode::Char('j') => 1,
            KeyCode::Up | KeyCode::Char('k') => -1,
            KeyCode::PageDown => PAGE_CARDS,
            KeyCode::PageUp => -PAGE_CARDS,
            KeyCode::Home | KeyCode::Char('g') => isize::MIN,
            KeyCode::End | KeyCode::Char('G') => isize::MAX,
            _ => return Action::None,
        };
        self.scroll_target = None;
        self.scroll = scroll::scroll_by(self.scroll, delta, count);
        Action::None
    }

    fn focused_list_state(&mut self) -> &mut ListState {
        match self.focus {
            Focus::Shows => &mut self.show_list_state,
            _ => &mut self.episode_list_state,
        }
    }
}
