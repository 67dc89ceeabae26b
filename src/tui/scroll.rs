//! Card-column scrolling.
//!
//! The column scrolls in whole cards: a position is the first visible card
//! plus blank rows above it. Centering a card may need that padding when
//! there are not enough cards before it to fill the upper half.

use std::cmp::Ordering;

/// Scroll position of the card column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollPosition {
    pub first_card: usize,
    pub padding: u16,
}

/// Position that puts card `target` in the middle of a viewport of
/// `viewport` rows, given the rendered height of every card.
///
/// Returns `None` when `target` is out of range.
pub fn centered(heights: &[u16], target: usize, viewport: u16) -> Option<ScrollPosition> {
    let height = *heights.get(target)?;
    let mut room = viewport.saturating_sub(height) / 2;
    let mut first_card = target;

    while first_card > 0 && heights[first_card - 1] <= room {
        first_card -= 1;
        room -= heights[first_card];
    }

    Some(ScrollPosition {
        first_card,
        padding: room,
    })
}

/// One animation step from `current` toward `target`.
///
/// Halves the remaining distance each step, moving through cards first and
/// then settling the padding, so a jump completes in a handful of frames.
pub fn step_toward(current: ScrollPosition, target: ScrollPosition) -> ScrollPosition {
    match current.first_card.cmp(&target.first_card) {
        Ordering::Less => ScrollPosition {
            first_card: current.first_card + (target.first_card - current.first_card).div_ceil(2),
            padding: 0,
        },
        Ordering::Greater => ScrollPosition {
            first_card: current.first_card - (current.first_card - target.first_card).div_ceil(2),
            padding: 0,
        },
        Ordering::Equal => {
            let padding = match current.padding.cmp(&target.padding) {
                Ordering::Less => {
                    current.padding + (target.padding - current.padding).div_ceil(2)
                }
                Ordering::Greater => {
                    current.padding - (current.padding - target.padding).div_ceil(2)
                }
                Ordering::Equal => current.padding,
            };
            ScrollPosition {
                first_card: current.first_card,
                padding,
            }
        }
    }
}

/// Move the first visible card by `delta`, clamped to the card count.
pub fn scroll_by(current: ScrollPosition, delta: isize, card_count: usize) -> ScrollPosition {
    let last = card_count.saturating_sub(1);
    let first_card = current.first_card.saturating_add_signed(delta).min(last);
    ScrollPosition {
        first_card,
        padding: 0,
    }
}
