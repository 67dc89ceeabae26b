//! UI rendering functions for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::browser::{LoadState, SelectOption};
use crate::cards::Card;
use crate::highlight::HIGHLIGHT_CLASS;
use crate::markup::{self, Token};

use super::state::App;
use super::types::Focus;

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Controls
            Constraint::Length(3), // Status
            Constraint::Min(0),    // Cards
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);

    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
        ])
        .split(chunks[1]);

    draw_selector(frame, app, Focus::Shows, controls[0]);
    draw_selector(frame, app, Focus::Episodes, controls[1]);
    draw_search_bar(frame, app, controls[2]);
    draw_status(frame, app, chunks[2]);
    draw_cards(frame, app, chunks[3]);
    draw_footer(frame, app, chunks[4]);

    if app.dropdown_open {
        draw_dropdown(frame, app, chunks[1], &controls);
    }

    if app.show_help {
        draw_help_modal(frame, app);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let show_name = app
        .browser
        .selected_show()
        .and_then(|id| app.browser.shows().iter().find(|s| s.id == id))
        .map(|s| s.name.as_str());

    let mut spans = vec![Span::styled(
        "episode-browser",
        Style::default()
            .fg(app.colors.accent_color())
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(name) = show_name {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[{}]", name),
            Style::default().fg(Color::Green),
        ));
    }
    if !app.browser.episodes().is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[{} episodes]", app.browser.episodes().len()),
            Style::default().fg(Color::Yellow),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn border_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(app.colors.accent_color())
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_selector(frame: &mut Frame, app: &App, focus: Focus, area: Rect) {
    let (title, options, state) = match focus {
        Focus::Shows => ("Show", app.browser.show_options(), &app.show_list_state),
        _ => ("Episode", app.browser.episode_options(), &app.episode_list_state),
    };

    let label = state
        .selected()
        .and_then(|i| options.get(i))
        .map(|o| format!("{} ▾", o.label))
        .unwrap_or_else(|| "-".to_string());

    let style = if options.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let widget = Paragraph::new(label).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style(app, focus)),
    );

    frame.render_widget(widget, area);
}

fn draw_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Search;
    let input = app.browser.search_input();

    let search_text = if input.is_empty() && !focused {
        "Press '/' to search..."
    } else {
        input
    };

    let search = Paragraph::new(search_text)
        .style(if focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search")
                .border_style(border_style(app, Focus::Search)),
        );

    frame.render_widget(search, area);

    if focused {
        let offset = input.chars().count() as u16;
        frame.set_cursor_position((area.x + offset.min(area.width.saturating_sub(3)) + 1, area.y + 1));
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let color = if app.browser.status_is_error() {
        app.colors.error_color()
    } else {
        app.colors.status_color()
    };

    let status = Paragraph::new(app.browser.status())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Body of a card: image reference followed by the summary.
fn card_paragraph(card: &Card, app: &App) -> Paragraph<'static> {
    let highlight = Style::default()
        .fg(Color::Black)
        .bg(app.colors.highlight_color());

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Image: ", Style::default().fg(Color::DarkGray)),
            Span::styled(card.image.clone(), Style::default().fg(Color::Blue)),
        ]),
        Line::default(),
    ];
    lines.extend(markup_to_lines(&card.summary, Style::default(), highlight));

    Paragraph::new(lines).wrap(Wrap { trim: true })
}

fn card_title(card: &Card, app: &App) -> Line<'static> {
    let base = Style::default().add_modifier(Modifier::BOLD);
    let highlight = Style::default()
        .fg(Color::Black)
        .bg(app.colors.highlight_color());
    let spans: Vec<Span<'static>> = markup_to_lines(&card.title, base, highlight)
        .into_iter()
        .flat_map(|line| line.spans)
        .collect();
    Line::from(spans)
}

fn draw_cards(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Episodes ({})", app.browser.cards().len()))
        .border_style(border_style(app, Focus::Cards));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.browser.cards().is_empty() {
        let message = match app.browser.state() {
            LoadState::Ready => "No episodes to display",
            LoadState::Loading => "Loading...",
            _ => "",
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let body_width = inner.width.saturating_sub(2);
    let view: &App = app;
    let paragraphs: Vec<(Line<'static>, Paragraph<'static>)> = view
        .browser
        .cards()
        .iter()
        .map(|card| (card_title(card, view), card_paragraph(card, view)))
        .collect();
    let heights: Vec<u16> = paragraphs
        .iter()
        .map(|(_, p)| (p.line_count(body_width) as u16).saturating_add(2))
        .collect();

    // cards are laid out now, so a queued scroll can be resolved
    app.sync_scroll(&heights, inner.height);

    let bottom = inner.y + inner.height;
    let mut y = inner.y + app.scroll.padding.min(inner.height);

    for ((title, paragraph), height) in paragraphs
        .into_iter()
        .zip(heights)
        .skip(app.scroll.first_card)
    {
        if y >= bottom {
            break;
        }
        let card_area = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height: height.min(bottom - y),
        };
        let widget = paragraph.block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(widget, card_area);
        y = y.saturating_add(height);
    }
}

fn draw_dropdown(frame: &mut Frame, app: &mut App, controls_area: Rect, controls: &[Rect]) {
    let (anchor, options, state) = match app.focus {
        Focus::Shows => (
            controls[0],
            app.browser.show_options(),
            &mut app.show_list_state,
        ),
        _ => (
            controls[1],
            app.browser.episode_options(),
            &mut app.episode_list_state,
        ),
    };

    let available = frame.area().height.saturating_sub(controls_area.y + controls_area.height);
    let wanted = (options.len() as u16).saturating_add(2);
    let area = Rect {
        x: anchor.x,
        y: controls_area.y + controls_area.height,
        width: anchor.width,
        height: wanted.min(available),
    };
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = options
        .iter()
        .map(|o: &SelectOption| ListItem::new(o.label.clone()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.colors.accent_color())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, state);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.dropdown_open {
        "[↑↓] navigate  [Enter] choose  [Esc] close"
    } else {
        match app.focus {
            Focus::Shows | Focus::Episodes => {
                "[Enter] open  [Tab] switch  [/] search  [?] help  [q] quit"
            }
            Focus::Search => "[Type] filter  [Esc] clear  [Enter] cards  [Tab] switch",
            Focus::Cards => "[↑↓] scroll  [PgUp/PgDn] page  [g/G] top/bottom  [Tab] switch  [?] help  [q] quit",
        }
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let help_text = Paragraph::new(help_content())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(app.colors.accent_color())),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

fn help_content() -> &'static str {
    "\
Global Commands
───────────────
  ?           Show/hide this help
  Ctrl+C      Force quit
  Tab         Next control
  Shift+Tab   Previous control
  /           Focus search
  q           Quit

Show / Episode Selectors
────────────────────────
  Enter       Open the list
  j / ↓       Move down
  k / ↑       Move up
  Enter       Choose
  Esc         Close without choosing

Search
──────
  (Type)      Filter episodes by name or summary
  Backspace   Delete character
  Esc         Clear search
  Enter       Jump to cards

Cards
─────
  j / ↓       Scroll down
  k / ↑       Scroll up
  PgDn / PgUp Scroll a page
  g / G       Top / bottom

Press ? to close"
}

/// Convert a markup fragment to styled terminal lines.
///
/// Block tags (`p`, `div`, `li`, headings) start a new line and `br` forces
/// one. `b`/`strong`, `i`/`em` and `u`/`a` map to modifiers, and a span
/// carrying the highlight class is drawn with `highlight` patched over the
/// surrounding style. Unknown tags are dropped; entity references are
/// decoded. Whitespace follows HTML rules closely enough for summaries:
/// newlines are spaces and lines never start with blanks.
pub fn markup_to_lines(markup: &str, base: Style, highlight: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut stack: Vec<(String, Style)> = Vec::new();

    for token in markup::tokenize(markup) {
        let style = stack.last().map(|(_, s)| *s).unwrap_or(base);
        match token {
            Token::Tag(tag) => {
                let (name, closing) = markup::tag_name(tag);

                if name == "br" {
                    lines.push(Line::from(std::mem::take(&mut current)));
                    continue;
                }
                if is_block(&name) && !current.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current)));
                }

                if closing {
                    if let Some(pos) = stack.iter().rposition(|(n, _)| *n == name) {
                        stack.truncate(pos);
                    }
                } else if !tag.ends_with("/>") {
                    let style = match name.as_str() {
                        "b" | "strong" => style.add_modifier(Modifier::BOLD),
                        "i" | "em" => style.add_modifier(Modifier::ITALIC),
                        "u" | "a" => style.add_modifier(Modifier::UNDERLINED),
                        "span" if markup::tag_class(tag) == Some(HIGHLIGHT_CLASS) => {
                            style.patch(highlight)
                        }
                        _ => style,
                    };
                    stack.push((name, style));
                }
            }
            Token::Text(raw) => {
                let decoded = markup::unescape(raw).replace(['\n', '\r'], " ");
                let text = if current.is_empty() {
                    decoded.trim_start()
                } else {
                    decoded.as_str()
                };
                if !text.is_empty() {
                    current.push(Span::styled(text.to_string(), style));
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(Line::from(current));
    }

    lines
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote"
    )
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn hl() -> Style {
        Style::default().bg(Color::Yellow)
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let lines = markup_to_lines("<p>One</p>\n<p>Two</p>", Style::default(), hl());
        let texts: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(texts, vec!["One", "Two"]);
    }

    #[test]
    fn test_inline_styles() {
        let lines = markup_to_lines("<p>A <b>bold</b> <i>move</i></p>", Style::default(), hl());
        assert_eq!(lines.len(), 1);
        let spans = &lines[0].spans;
        assert_eq!(spans[0].content, "A ");
        assert_eq!(spans[1].content, "bold");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[2].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[3].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_highlight_span_is_styled() {
        let lines = markup_to_lines(
            "A <span class=\"highlight\">chem</span>istry",
            Style::default(),
            hl(),
        );
        let spans = &lines[0].spans;
        assert_eq!(spans[1].content, "chem");
        assert_eq!(spans[1].style.bg, Some(Color::Yellow));
        assert_eq!(spans[2].style.bg, None);
    }

    #[test]
    fn test_highlight_inherits_surrounding_style() {
        let lines = markup_to_lines(
            "<b><span class=\"highlight\">x</span></b>",
            Style::default(),
            hl(),
        );
        let style = lines[0].spans[0].style;
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style.bg, Some(Color::Yellow));
    }

    #[test]
    fn test_br_and_entities() {
        let lines = markup_to_lines("Tom &amp; Jerry<br/>Second", Style::default(), hl());
        let texts: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(texts, vec!["Tom & Jerry", "Second"]);
    }

    #[test]
    fn test_named_entities_are_decoded() {
        let lines = markup_to_lines(
            "<p>Caf&eacute; owner&#39;s d&eacute;j&agrave; vu</p>",
            Style::default(),
            hl(),
        );
        assert_eq!(text_of(&lines[0]), "Café owner's déjà vu");
    }

    #[test]
    fn test_highlight_across_accent_renders() {
        let markup = crate::highlight::highlight("<p>d&eacute;j&agrave; vu</p>", "déjà");
        let lines = markup_to_lines(&markup, Style::default(), hl());
        let spans = &lines[0].spans;
        assert_eq!(spans[0].content, "déjà");
        assert_eq!(spans[0].style.bg, Some(Color::Yellow));
        assert_eq!(text_of(&lines[0]), "déjà vu");
    }

    #[test]
    fn test_plain_and_empty() {
        let lines = markup_to_lines("No summary available.", Style::default(), hl());
        assert_eq!(lines.len(), 1);
        assert_eq!(text_of(&lines[0]), "No summary available.");
        assert!(markup_to_lines("", Style::default(), hl()).is_empty());
    }

    #[test]
    fn test_unknown_tags_are_dropped() {
        let lines = markup_to_lines("<p>a <blink>b</blink></p>", Style::default(), hl());
        assert_eq!(text_of(&lines[0]), "a b");
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(50, 50, outer);
        assert_eq!(inner.width, 50);
        assert!(inner.x >= 25 && inner.y >= 12);
    }
}
