//! Inserting comments and threading them onto existing ranges.

use criticmark_config::MetadataMergePolicies;
use criticmark_syntax::RangeKind;

use super::{Compat, MarkRequest, MarkResult, RunEdit, compatibility};
use crate::collection::RangeCollection;
use crate::edit::TextEdit;
use crate::serializer::construct_range;

/// Insert a comment at the end of the selection.
///
/// Typing inside a comment the request may merge with extends it. Anywhere
/// else the comment goes after the enclosing range, and when that spot is
/// the end of another range it is appended to that range's thread.
pub(super) fn mark_comment(
    collection: &RangeCollection,
    request: &MarkRequest,
    policies: &MetadataMergePolicies,
) -> MarkResult {
    let text = request.inserted.as_str();
    let mut pos = request.to;

    if let Some(range) = collection.ranges_in_range(pos, pos).first().copied() {
        let extends = range.kind == RangeKind::Comment
            && matches!(
                compatibility(range, RangeKind::Comment, &request.metadata, policies),
                Compat::Merge(_)
            );
        if extends {
            let at = range
                .cursor_move_inside(pos, true)
                .clamp(range.content_start(), range.content_end());
            if text.is_empty() {
                return MarkResult::cursor(at..at);
            }
            log::debug!("extending comment at {}..{}", range.from, range.to);
            let cursor = at + text.len();
            let run = RunEdit {
                edit: TextEdit::insert(at, text),
                selection: cursor..cursor,
            };
            return MarkResult::from_runs(vec![run], at..at, true);
        }
        pos = range.to;
    }

    if let Some(span) = collection.thread_span_at(pos) {
        pos = span.end;
    } else if let Some(index) = collection.ranges().iter().position(|r| r.to == pos) {
        pos = collection.thread_end(index).unwrap_or(pos);
    }

    let built = construct_range(
        "",
        text,
        RangeKind::Comment,
        &request.metadata,
        text.len(),
        text.len(),
    );
    log::debug!("inserting comment at {pos}");

    let cursor = pos + built.end_offset;
    let run = RunEdit {
        edit: TextEdit::insert(pos, built.text),
        selection: cursor..cursor,
    };
    MarkResult::from_runs(vec![run], pos..pos, true)
}
