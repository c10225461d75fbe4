//! # Syntax Cursor Navigator
//!
//! Cursor movement that treats markup syntax as (configurably) invisible.
//!
//! Each range kind has a [`CursorMovement`] deciding which of its characters
//! a single step jumps over:
//!
//! - `Unchanged`: none, brackets are ordinary characters.
//! - `IgnoreBracket`: the brackets and the substitution separator.
//! - `IgnoreMetadata`: as above, with the metadata header joined to the
//!   opening bracket.
//! - `IgnoreCompletely`: the whole range.
//!
//! A step that lands strictly inside a skipped zone continues to its far
//! side. With skipped brackets the positions on either side of a bracket
//! look identical, so a [`BracketMovement`] picks the one a step rests on.

use std::ops::Range;

use criticmark_config::{BracketMovement, CursorMovement, Settings};
use criticmark_syntax::RangeKind;

use crate::collection::RangeCollection;
use crate::range::CriticRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// The spans one step skips in `range` under `movement`.
pub fn skip_zones(range: &CriticRange, movement: CursorMovement) -> Vec<Range<usize>> {
    match movement {
        CursorMovement::Unchanged => Vec::new(),
        CursorMovement::IgnoreBracket => range.syntax_zones(false),
        CursorMovement::IgnoreMetadata => range.syntax_zones(true),
        CursorMovement::IgnoreCompletely => vec![range.full_range()],
    }
}

/// One character over, ignoring markup. Stays put at the document edges.
fn char_step(doc: &str, pos: usize, direction: Direction) -> usize {
    match direction {
        Direction::Forward => doc
            .get(pos..)
            .and_then(|rest| rest.chars().next())
            .map_or(pos, |c| pos + c.len_utf8()),
        Direction::Backward => doc
            .get(..pos)
            .and_then(|head| head.chars().next_back())
            .map_or(pos, |c| pos - c.len_utf8()),
    }
}

/// A single character step followed by the zone jump, without the bracket
/// movement adjustment.
pub fn step(
    collection: &RangeCollection,
    doc: &str,
    pos: usize,
    direction: Direction,
    settings: &Settings,
) -> usize {
    let next = char_step(doc, pos, direction);
    if next == pos {
        return pos;
    }

    for range in collection.ranges_in_range(next, next) {
        let movement = *settings.cursor_movement.get(range.kind);
        let zone = skip_zones(range, movement)
            .into_iter()
            .find(|zone| zone.start < next && next < zone.end);
        if let Some(zone) = zone {
            log::trace!("skipping {} syntax {}..{}", range.kind, zone.start, zone.end);
            return match direction {
                Direction::Forward => zone.end,
                Direction::Backward => zone.start,
            };
        }
    }
    next
}

/// Move the cursor at `pos` by one visible character.
pub fn advance(
    collection: &RangeCollection,
    doc: &str,
    pos: usize,
    direction: Direction,
    settings: &Settings,
) -> usize {
    let pos = pos.min(doc.len());
    let landed = step(collection, doc, pos, direction, settings);
    if landed == pos {
        return pos;
    }
    settle(collection, doc, pos, landed, direction, settings)
}

/// Apply the bracket movement policy of the range whose edge `landed` is on.
fn settle(
    collection: &RangeCollection,
    doc: &str,
    start: usize,
    landed: usize,
    direction: Direction,
    settings: &Settings,
) -> usize {
    for range in collection.ranges_in_interval(landed, landed) {
        let inner_left = match *settings.cursor_movement.get(range.kind) {
            CursorMovement::IgnoreBracket => range.from + RangeKind::BRACKET_LEN,
            CursorMovement::IgnoreMetadata => range.content_start(),
            _ => continue,
        };
        let inner_right = range.content_end();

        let forward = direction == Direction::Forward;
        match *settings.bracket_movement.get(range.kind) {
            BracketMovement::Unchanged => {}
            BracketMovement::StayInside => {
                if forward && landed == range.from {
                    return inner_left;
                }
                if !forward && landed == range.to {
                    return inner_right;
                }
                let leaving = (forward && landed == range.to && start == inner_right)
                    || (!forward && landed == range.from && start == inner_left);
                if leaving {
                    return advance(collection, doc, landed, direction, settings);
                }
            }
            BracketMovement::StayOutside => {
                if forward && landed == inner_right && start < inner_right {
                    return range.to;
                }
                if !forward && landed == inner_left && start > inner_left {
                    return range.from;
                }
                let entering = (forward && landed == inner_left && start == range.from)
                    || (!forward && landed == inner_right && start == range.to);
                if entering {
                    return advance(collection, doc, landed, direction, settings);
                }
            }
        }
    }
    landed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Space,
    Word,
    Punctuation,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            CharClass::Space
        } else if c.is_alphanumeric() || c == '_' {
            CharClass::Word
        } else {
            CharClass::Punctuation
        }
    }
}

/// Move over a group of characters: leading whitespace, then a run of one
/// class. Syntax jumps count as zero width.
pub fn advance_word(
    collection: &RangeCollection,
    doc: &str,
    pos: usize,
    direction: Direction,
    settings: &Settings,
) -> usize {
    let mut pos = pos.min(doc.len());
    let mut group = None;

    loop {
        let next = advance(collection, doc, pos, direction, settings);
        if next == pos {
            return pos;
        }
        if next != char_step(doc, pos, direction) {
            pos = next;
            continue;
        }

        let consumed = match direction {
            Direction::Forward => doc.get(pos..next),
            Direction::Backward => doc.get(next..pos),
        };
        let Some(class) = consumed.and_then(|s| s.chars().next()).map(CharClass::of) else {
            return pos;
        };
        match group {
            None if class == CharClass::Space => {}
            None => group = Some(class),
            Some(current) if current != class => return pos,
            Some(_) => {}
        }
        pos = next;
    }
}

/// The syntax zone, metadata included, holding all of `span`.
fn syntax_zone_at(collection: &RangeCollection, span: Range<usize>) -> Option<Range<usize>> {
    collection
        .ranges_in_range(span.start, span.end)
        .into_iter()
        .find_map(|range| {
            range
                .syntax_zones(true)
                .into_iter()
                .find(|zone| zone.start <= span.start && span.end <= zone.end)
        })
}

/// The character a single backspace (`Backward`) or delete (`Forward`) at
/// `pos` removes. Syntax next to the cursor is passed over, never included.
/// Empty at the document edges.
pub fn deletion_span(
    collection: &RangeCollection,
    doc: &str,
    pos: usize,
    direction: Direction,
) -> Range<usize> {
    let mut pos = pos.min(doc.len());
    loop {
        let next = char_step(doc, pos, direction);
        if next == pos {
            return pos..pos;
        }
        let span = pos.min(next)..pos.max(next);
        match syntax_zone_at(collection, span.clone()) {
            Some(zone) => {
                pos = match direction {
                    Direction::Forward => zone.end,
                    Direction::Backward => zone.start,
                };
            }
            None => return span,
        }
    }
}
