//! TUI type definitions for focus and actions.

/// Which control receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Show selector
    Shows,
    /// Episode selector
    Episodes,
    /// Free-text search field
    Search,
    /// Card column
    Cards,
}

impl Focus {
    /// Next control in tab order.
    pub fn next(self) -> Self {
        match self {
            Focus::Shows => Focus::Episodes,
            Focus::Episodes => Focus::Search,
            Focus::Search => Focus::Cards,
            Focus::Cards => Focus::Shows,
        }
    }

    /// Previous control in tab order.
    pub fn prev(self) -> Self {
        match self {
            Focus::Shows => Focus::Cards,
            Focus::Episodes => Focus::Shows,
            Focus::Search => Focus::Episodes,
            Focus::Cards => Focus::Search,
        }
    }
}

/// Actions the event loop has to carry out after input handling.
///
/// Everything that stays local to the browser state is handled inside
/// [`super::App`]; only work that needs the runtime comes back here.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// The show selector changed (`None` is the placeholder)
    SelectShow(Option<u64>),
}
