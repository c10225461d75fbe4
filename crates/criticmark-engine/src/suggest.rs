//! Keystroke entry points for suggestion mode: typing becomes an Addition
//! (or Substitution over a selection) and deleting becomes a Deletion,
//! except inside text that is already proposed.

use std::ops::Range;

use criticmark_config::Settings;
use criticmark_syntax::RangeKind;

use crate::collection::RangeCollection;
use crate::mark::{MarkRequest, MarkResult, MarkType, mark};
use crate::metadata::MetadataFields;
use crate::navigation::{Direction, deletion_span};

/// Whether `span` lies in text this document already proposes: the content
/// of an Addition or Comment, or the inserted side of a Substitution.
fn in_proposed_text(collection: &RangeCollection, span: &Range<usize>) -> bool {
    match collection.ranges_in_range(span.start, span.end).as_slice() {
        [range] => {
            matches!(
                range.kind,
                RangeKind::Addition | RangeKind::Substitution | RangeKind::Comment
            ) && range.part_encloses_range(span.start, span.end, false)
        }
        _ => false,
    }
}

/// Type `text` over `selection`.
pub fn suggest_insert(
    collection: &RangeCollection,
    doc: &str,
    selection: Range<usize>,
    text: &str,
    metadata: &MetadataFields,
    settings: &Settings,
) -> MarkResult {
    let in_comment = collection
        .ranges_in_range(selection.start, selection.end)
        .first()
        .is_some_and(|range| {
            range.kind == RangeKind::Comment
                && range.part_encloses_range(selection.start, selection.end, false)
        });

    let request = if in_comment {
        MarkRequest::new(selection.start, selection.end, text, MarkType::Regular)
    } else {
        MarkRequest::new(
            selection.start,
            selection.end,
            text,
            MarkType::Suggestion(RangeKind::Addition),
        )
        .with_metadata(metadata.clone())
    };
    mark(collection, doc, &request, settings)
}

/// Backspace (`Backward`) or delete (`Forward`) at `selection`.
///
/// An empty selection removes the character next to the cursor, passing
/// over syntax. Proposed text is removed outright; anything else is marked
/// as a Deletion and the cursor steps past it.
pub fn suggest_delete(
    collection: &RangeCollection,
    doc: &str,
    selection: Range<usize>,
    direction: Direction,
    metadata: &MetadataFields,
    settings: &Settings,
) -> MarkResult {
    let collapsed = selection.is_empty();
    let span = if collapsed {
        deletion_span(collection, doc, selection.start, direction)
    } else {
        selection
    };
    if span.is_empty() {
        return MarkResult::cursor(span);
    }

    if in_proposed_text(collection, &span) {
        log::debug!("removing proposed text {}..{}", span.start, span.end);
        let request = MarkRequest::new(span.start, span.end, "", MarkType::Regular);
        return mark(collection, doc, &request, settings);
    }

    let request = MarkRequest::new(
        span.start,
        span.end,
        "",
        MarkType::Suggestion(RangeKind::Deletion),
    )
    .with_metadata(metadata.clone());
    let mut result = mark(collection, doc, &request, settings);
    if collapsed {
        let at = match direction {
            Direction::Backward => result.selection.start,
            Direction::Forward => result.selection.end,
        };
        result.selection = at..at;
    }
    result
}
