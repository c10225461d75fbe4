//! Marking one contiguous run.
//!
//! Every range touching the run is sorted into one of three buckets:
//!
//! - `left` / `right`: content of compatible ranges outside the run (an
//!   adjacent range, or the part of a cut range beyond the run's edge).
//!   It joins the new range unchanged.
//! - `selected`: plain text and range content inside the run. Original
//!   text stays original; proposed text is replaced by the inserted text,
//!   except under a Deletion target, which never discards proposals.
//! - split remainders: the parts of incompatible ranges beyond the run's
//!   edges, re-closed with their own brackets on either side of the new
//!   range.

use criticmark_config::MetadataMergePolicies;
use criticmark_syntax::RangeKind;

use super::{Compat, RunEdit, compatibility, remainder};
use crate::collection::RangeCollection;
use crate::edit::TextEdit;
use crate::metadata::MetadataFields;
use crate::range::RangeParts;
use crate::serializer::{construct_range, infer_kind};

#[derive(Debug, Clone, Copy)]
pub(super) struct RunInput<'a> {
    pub from: usize,
    pub to: usize,
    pub inserted: &'a str,
    pub target: RangeKind,
    pub fields: &'a MetadataFields,
}

#[derive(Debug, Default)]
struct Side {
    deleted: String,
    inserted: String,
}

impl Side {
    fn push(&mut self, parts: RangeParts<'_>) {
        self.deleted.push_str(parts.deleted);
        self.inserted.push_str(parts.inserted);
    }
}

/// Where an empty run has to move so that it neither splits a comment
/// thread nor lands inside a range whose metadata demands new markup be
/// kept outside.
fn relocate(
    collection: &RangeCollection,
    input: &RunInput<'_>,
    policies: &MetadataMergePolicies,
) -> Option<usize> {
    let pos = input.from;
    match collection.ranges_in_range(pos, pos).first() {
        Some(range) if range.kind != RangeKind::Comment => {
            match compatibility(range, input.target, input.fields, policies) {
                Compat::MoveOutside => Some(range.to),
                _ => None,
            }
        }
        _ => collection.thread_span_at(pos).map(|span| span.end),
    }
}

pub(super) fn mark_run(
    collection: &RangeCollection,
    doc: &str,
    input: &RunInput<'_>,
    policies: &MetadataMergePolicies,
) -> Option<RunEdit> {
    let RunInput {
        from,
        to,
        inserted,
        target,
        ..
    } = *input;

    if from == to {
        if let Some(pos) = relocate(collection, input, policies) {
            log::debug!("moving {target} from {from} to {pos}");
            let moved = RunInput {
                from: pos,
                to: pos,
                ..*input
            };
            return mark_run(collection, doc, &moved, policies);
        }
    }

    let mut fields = input.fields.clone();
    let mut span = from..to;
    let mut left = Side::default();
    let mut selected = Side::default();
    let mut right = Side::default();
    let mut left_rest = String::new();
    let mut right_rest = String::new();
    let mut last = from;

    for range in collection.ranges_in_interval(from, to) {
        let left_adjacent = range.to == from && range.from < from;
        let right_adjacent = range.from == to && range.to > to;

        if left_adjacent || right_adjacent {
            if let Compat::Merge(merged) = compatibility(range, target, &fields, policies) {
                log::trace!("merging adjacent {} at {}..{}", range.kind, range.from, range.to);
                fields = merged;
                if left_adjacent {
                    span.start = range.from;
                    left.push(range.parts());
                } else {
                    span.end = range.to;
                    right.push(range.parts());
                }
            }
            continue;
        }

        if range.to <= from || (from != to && range.from >= to) {
            continue;
        }

        if range.from > last {
            selected
                .deleted
                .push_str(doc.get(last..range.from.min(to)).unwrap_or(""));
        }
        last = last.max(range.to);

        let before = range.unwrap_slice_parts(range.from, from);
        let inner = range.unwrap_slice_parts(from, to);
        let after = range.unwrap_slice_parts(to, range.to);
        span.start = span.start.min(range.from);
        span.end = span.end.max(range.to);

        match compatibility(range, target, &fields, policies) {
            Compat::Merge(merged) => {
                log::trace!("merging {} at {}..{}", range.kind, range.from, range.to);
                fields = merged;
                left.push(before);
                right.push(after);
            }
            _ => {
                log::trace!("splitting {} at {}..{}", range.kind, range.from, range.to);
                left_rest.push_str(&remainder(range, before));
                right_rest.push_str(&remainder(range, after));
            }
        }

        match target {
            RangeKind::Highlight => {
                selected.deleted.push_str(inner.deleted);
                selected.deleted.push_str(inner.inserted);
            }
            _ => selected.push(inner),
        }
    }
    if last < to {
        selected.deleted.push_str(doc.get(last..to).unwrap_or(""));
    }

    let proposed = match target {
        RangeKind::Deletion => format!("{}{inserted}", selected.inserted),
        RangeKind::Highlight => String::new(),
        _ => inserted.to_string(),
    };
    let deleted = format!("{}{}{}", left.deleted, selected.deleted, right.deleted);
    let proposed_all = format!("{}{}{}", left.inserted, proposed, right.inserted);

    let kind = match target {
        RangeKind::Highlight => (!deleted.is_empty()).then_some(RangeKind::Highlight),
        _ => infer_kind(&proposed_all, &deleted),
    };

    let (start, end) = if inserted.is_empty() && !selected.deleted.is_empty() {
        let start = left.deleted.len();
        (start, start + selected.deleted.len())
    } else {
        let at = deleted.len() + left.inserted.len() + proposed.len();
        (at, at)
    };

    let base = span.start + left_rest.len();
    let (text, selection) = match kind {
        Some(kind) => {
            let built = construct_range(&proposed_all, &deleted, kind, &fields, start, end);
            (built.text, base + built.start_offset..base + built.end_offset)
        }
        None => (String::new(), base..base),
    };

    let insert = format!("{left_rest}{text}{right_rest}");
    if span.is_empty() && insert.is_empty() {
        return None;
    }

    log::debug!(
        "{target} run {from}..{to} becomes {:?} over {}..{}",
        kind,
        span.start,
        span.end
    );
    Some(RunEdit {
        edit: TextEdit::new(span.start, span.end, insert),
        selection,
    })
}

/// A forced highlight: everything in the run, widened to whole ranges, is
/// unwrapped into one new highlight.
pub(super) fn highlight_unwrapped(
    collection: &RangeCollection,
    doc: &str,
    input: &RunInput<'_>,
) -> Option<RunEdit> {
    let unwrapped = collection.unwrap_in_range(doc, input.from, input.to);
    if unwrapped.output.is_empty() {
        return None;
    }
    let built = construct_range(
        "",
        &unwrapped.output,
        RangeKind::Highlight,
        input.fields,
        0,
        unwrapped.output.len(),
    );
    let base = unwrapped.from;
    Some(RunEdit {
        edit: TextEdit::new(unwrapped.from, unwrapped.to, built.text),
        selection: base + built.start_offset..base + built.end_offset,
    })
}
