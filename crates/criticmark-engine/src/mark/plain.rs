//! Edits that create no new markup: regular typing and clearing.

use criticmark_syntax::RangeKind;

use super::{MarkResult, RunEdit, remainder, snap_into_content};
use crate::collection::RangeCollection;
use crate::edit::TextEdit;
use crate::range::CriticRange;
use crate::serializer::construct_suggestion;

/// Replace `from..to` with `inserted` as ordinary text.
///
/// Inside plain text or a single content part the edit is applied as is.
/// Otherwise the ranges cut by the selection keep their outer parts as
/// remainders and everything between them, syntax included, is replaced.
pub(super) fn regular(
    collection: &RangeCollection,
    from: usize,
    to: usize,
    inserted: &str,
) -> MarkResult {
    let (from, to) = if from == to {
        let pos = snap_into_content(collection, from);
        (pos, pos)
    } else {
        (from, to)
    };
    if from == to && inserted.is_empty() {
        return MarkResult::cursor(from..from);
    }

    let touched = collection.ranges_in_range(from, to);
    let in_place = match touched.as_slice() {
        [] => true,
        [range] => {
            let left = range.middle.is_some_and(|middle| to <= middle);
            if !range.part_encloses_range(from, to, left) {
                false
            } else if let Some(run) = emptied_range(range, from, to, inserted, left) {
                return MarkResult::from_runs(vec![run], from..to, true);
            } else {
                true
            }
        }
        _ => false,
    };

    if in_place {
        let cursor = from + inserted.len();
        let run = RunEdit {
            edit: TextEdit::new(from, to, inserted),
            selection: cursor..cursor,
        };
        return MarkResult::from_runs(vec![run], from..from, true);
    }

    let (Some(first), Some(last)) = (touched.first(), touched.last()) else {
        return MarkResult::cursor(from..to);
    };
    let left_rest = if first.from < from {
        remainder(first, first.unwrap_slice_parts(first.from, from))
    } else {
        String::new()
    };
    let right_rest = if last.to > to {
        remainder(last, last.unwrap_slice_parts(to, last.to))
    } else {
        String::new()
    };

    let start = from.min(first.from);
    let end = to.max(last.to);
    log::debug!("regular edit {from}..{to} widened to {start}..{end}");

    let cursor = start + left_rest.len() + inserted.len();
    let run = RunEdit {
        edit: TextEdit::new(start, end, format!("{left_rest}{inserted}{right_rest}")),
        selection: cursor..cursor,
    };
    MarkResult::from_runs(vec![run], from..to, true)
}

/// An edit deleting a whole content part rewrites the range: an emptied
/// substitution side downgrades it to an Addition or Deletion, anything
/// else but a comment disappears.
fn emptied_range(
    range: &CriticRange,
    from: usize,
    to: usize,
    inserted: &str,
    left: bool,
) -> Option<RunEdit> {
    if !inserted.is_empty() || range.kind == RangeKind::Comment {
        return None;
    }
    let part = match range.kind {
        RangeKind::Substitution if left => range.deleted_range(),
        RangeKind::Substitution => range.inserted_range(),
        _ => range.content_start()..range.content_end(),
    };
    if from > part.start || to < part.end {
        return None;
    }

    let parts = range.parts();
    let (deleted, proposed, offset) = match range.kind {
        RangeKind::Substitution if left => ("", parts.inserted, 0),
        RangeKind::Substitution => (parts.deleted, "", parts.deleted.len()),
        _ => ("", "", 0),
    };
    log::debug!("{} at {}..{} emptied, rewriting", range.kind, range.from, range.to);

    let built = construct_suggestion(proposed, deleted, &range.fields, offset, offset);
    let (text, cursor) = match built {
        Some(built) => (built.text, range.from + built.start_offset),
        None => (String::new(), range.from),
    };
    Some(RunEdit {
        edit: TextEdit::new(range.from, range.to, text),
        selection: cursor..cursor,
    })
}

/// Strip the markup of every range in `from..to`, keeping its content.
///
/// Ranges cut by the selection keep their outer parts as markup.
/// Substitutions unwrap to their original text followed by the proposed
/// text. Comments stay as they are.
pub(super) fn clear(collection: &RangeCollection, doc: &str, from: usize, to: usize) -> MarkResult {
    let touched = collection.ranges_in_range(from, to);
    if touched.iter().all(|range| range.kind == RangeKind::Comment) {
        return MarkResult::cursor(from..to);
    }

    let start = touched.first().map_or(from, |range| range.from.min(from));
    let end = touched.last().map_or(to, |range| range.to.max(to));

    let mut output = String::new();
    let mut selection_start = 0;
    let mut selection_end = None;
    let mut last = start;

    for range in &touched {
        output.push_str(doc.get(last..range.from.max(last)).unwrap_or(""));
        last = range.to;

        if range.kind == RangeKind::Comment {
            output.push_str(doc.get(range.from..range.to).unwrap_or(&range.text));
            continue;
        }

        let before = remainder(range, range.unwrap_slice_parts(range.from, from));
        if !before.is_empty() {
            output.push_str(&before);
            selection_start = output.len();
        }
        output.push_str(&range.unwrap_slice(from, to));
        if range.to > to {
            selection_end = Some(output.len());
            output.push_str(&remainder(range, range.unwrap_slice_parts(to, range.to)));
        }
    }
    output.push_str(doc.get(last.min(end)..end).unwrap_or(""));

    let selection_end = selection_end.unwrap_or(output.len());
    log::debug!("clearing markup in {start}..{end}");

    let run = RunEdit {
        edit: TextEdit::new(start, end, output),
        selection: start + selection_start..start + selection_end,
    };
    MarkResult::from_runs(vec![run], from..to, false)
}
