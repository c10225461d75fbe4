//! # Mark Engine
//!
//! Turns a selection, some inserted text and a target kind into the
//! document edits that keep all markup well formed.
//!
//! ## Targets
//!
//! - **Suggestions** (Addition, Deletion, Substitution) and **Highlights**
//!   go through [`mark_ranges`]: the selection is cut into runs around the
//!   ranges that must not be touched, and every run becomes one edit that
//!   merges compatible boundary ranges and splits incompatible ones.
//! - **Comments** are inserted at the end of the selection, as a reply when
//!   they land next to another range.
//! - **Regular** edits change the text as is, inside a single content part
//!   when possible.
//! - **Clear** strips all markup but Comments from the selection.
//!
//! ## Output
//!
//! Every [`MarkEdit`] is expressed against the unmodified document. Its
//! `start`/`end` fields give the position of its text in the document with
//! all earlier edits of the same result already applied.
//!
//! ## Merging
//!
//! A boundary range merges with the new markup when its kind accepts the
//! target and its metadata merges with the request's metadata:
//!
//! | existing \ target | Addition | Deletion | Substitution | Highlight | Comment |
//! |---|---|---|---|---|---|
//! | Addition     | merge | -     | merge | -     | -     |
//! | Deletion     | merge | merge | merge | -     | -     |
//! | Substitution | merge | merge | merge | -     | -     |
//! | Highlight    | -     | -     | -     | merge | -     |
//! | Comment      | -     | -     | -     | -     | merge |
//!
//! The merged kind follows from which sides end up non-empty: both sides
//! give a Substitution, only the original side a Deletion, only the
//! proposed side an Addition.

mod comment;
mod plain;
mod resolve;
mod run;

use std::ops::Range;

use criticmark_config::{MetadataMergePolicies, Settings};
use criticmark_syntax::RangeKind;

use crate::collection::RangeCollection;
use crate::edit::{ChangeSet, EditError, TextEdit};
use crate::metadata::{MergeOutcome, MetadataFields};
use crate::range::{CriticRange, RangeParts};
use crate::serializer::{construct_range, infer_kind};

pub use resolve::{accept_in_range, reject_in_range};

use run::{RunInput, mark_run};

/// What a mark operation should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkType {
    Suggestion(RangeKind),
    /// Strip suggestion markup, keep content.
    Clear,
    /// Plain edit, no new markup.
    Regular,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRequest {
    pub from: usize,
    pub to: usize,
    pub inserted: String,
    pub mark_type: MarkType,
    pub metadata: MetadataFields,
    /// Absorb incompatible ranges instead of carving them out.
    pub force: bool,
}

impl MarkRequest {
    pub fn new(from: usize, to: usize, inserted: impl Into<String>, mark_type: MarkType) -> Self {
        Self {
            from,
            to,
            inserted: inserted.into(),
            mark_type,
            metadata: MetadataFields::default(),
            force: false,
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataFields) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

/// One edit of a [`MarkResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkEdit {
    pub from: usize,
    pub to: usize,
    pub insert: String,
    /// `from` in the document produced by all earlier edits.
    pub start: usize,
    /// End of `insert` in that same document.
    pub end: usize,
}

impl MarkEdit {
    pub fn text_edit(&self) -> TextEdit {
        TextEdit::new(self.from, self.to, self.insert.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkResult {
    pub edits: Vec<MarkEdit>,
    /// Selection in the document after all edits.
    pub selection: Range<usize>,
}

impl MarkResult {
    pub(crate) fn cursor(selection: Range<usize>) -> Self {
        Self {
            edits: Vec::new(),
            selection,
        }
    }

    /// Build a result from base-document edits and a selection that is
    /// relative to the document with only the last edit applied.
    fn from_runs(runs: Vec<RunEdit>, fallback: Range<usize>, collapse: bool) -> Self {
        let mut edits: Vec<MarkEdit> = Vec::with_capacity(runs.len());
        let mut selections = Vec::with_capacity(runs.len());
        let mut shift: isize = 0;

        for run in runs {
            if let Some(previous) = edits.last() {
                if run.edit.from < previous.to {
                    log::warn!(
                        "skipping edit {}..{} overlapping {}..{}",
                        run.edit.from,
                        run.edit.to,
                        previous.from,
                        previous.to
                    );
                    continue;
                }
            }
            let start = run.edit.from.saturating_add_signed(shift);
            selections.push(
                run.selection.start.saturating_add_signed(shift)
                    ..run.selection.end.saturating_add_signed(shift),
            );
            shift += run.edit.delta_len();
            edits.push(MarkEdit {
                start,
                end: start + run.edit.insert.len(),
                from: run.edit.from,
                to: run.edit.to,
                insert: run.edit.insert,
            });
        }

        let selection = match (selections.first(), selections.last()) {
            (Some(_), Some(last)) if collapse => last.clone(),
            (Some(first), Some(last)) => first.start..last.end,
            _ => fallback,
        };
        Self { edits, selection }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn text_edits(&self) -> Vec<TextEdit> {
        self.edits.iter().map(MarkEdit::text_edit).collect()
    }

    pub fn change_set(&self, base_len: usize) -> Result<ChangeSet, EditError> {
        ChangeSet::new(base_len, self.text_edits())
    }

    /// Apply the edits one after another through their running offsets.
    pub fn apply_sequentially(&self, doc: &str) -> String {
        let mut text = doc.to_string();
        for edit in &self.edits {
            let end = edit.start + (edit.to - edit.from);
            if text.is_char_boundary(edit.start) && end <= text.len() && text.is_char_boundary(end) {
                text.replace_range(edit.start..end, &edit.insert);
            }
        }
        text
    }
}

/// One processed run: a base-document edit plus the selection in the
/// document with that edit alone applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunEdit {
    pub edit: TextEdit,
    pub selection: Range<usize>,
}

/// How an existing range relates to new markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Compat {
    Merge(MetadataFields),
    Split,
    /// Metadata forbids sharing the range; new markup goes after it.
    MoveOutside,
}

pub(crate) fn kinds_merge(existing: RangeKind, target: RangeKind) -> bool {
    match target {
        RangeKind::Addition | RangeKind::Substitution => existing.is_suggestion(),
        RangeKind::Deletion => matches!(existing, RangeKind::Deletion | RangeKind::Substitution),
        RangeKind::Highlight => existing == RangeKind::Highlight,
        RangeKind::Comment => existing == RangeKind::Comment,
    }
}

pub(crate) fn compatibility(
    range: &CriticRange,
    target: RangeKind,
    fields: &MetadataFields,
    policies: &MetadataMergePolicies,
) -> Compat {
    if !kinds_merge(range.kind, target) {
        return Compat::Split;
    }
    match range.fields.merge_with(fields, policies, range.kind) {
        MergeOutcome::Merged(merged) => Compat::Merge(merged),
        MergeOutcome::Conflict { move_outside: true } => Compat::MoveOutside,
        MergeOutcome::Conflict { move_outside: false } => Compat::Split,
    }
}

/// Re-serialize the part of `range` outside the edited span. Suggestion
/// remainders take the kind their surviving sides imply.
pub(crate) fn remainder(range: &CriticRange, parts: RangeParts<'_>) -> String {
    let kind = if range.kind.is_suggestion() {
        infer_kind(parts.inserted, parts.deleted)
    } else if parts.deleted.is_empty() && parts.inserted.is_empty() {
        None
    } else {
        Some(range.kind)
    };
    kind.map(|kind| construct_range(parts.inserted, parts.deleted, kind, &range.fields, 0, 0).text)
        .unwrap_or_default()
}

/// Snap a cursor out of brackets, metadata and separators into content.
pub(crate) fn snap_into_content(collection: &RangeCollection, pos: usize) -> usize {
    match collection.ranges_in_range(pos, pos).first() {
        Some(range) if range.touches_separator(pos, false, false) => {
            range.separator().map_or(pos, |separator| separator.end)
        }
        Some(range) if range.in_syntax(pos, true) => range.cursor_move_inside(pos, true),
        _ => pos,
    }
}

/// Apply `request` to `doc`.
///
/// Offsets are clamped to the document. Nothing here fails: the worst
/// outcome is an empty edit list with a cursor-only selection.
pub fn mark(
    collection: &RangeCollection,
    doc: &str,
    request: &MarkRequest,
    settings: &Settings,
) -> MarkResult {
    let from = request.from.min(doc.len());
    let to = request.to.clamp(from, doc.len());
    let request = MarkRequest {
        from,
        to,
        ..request.clone()
    };

    log::debug!(
        "mark {:?} over {from}..{to} inserting {:?}",
        request.mark_type,
        request.inserted
    );

    match request.mark_type {
        MarkType::Clear => plain::clear(collection, doc, from, to),
        MarkType::Regular => plain::regular(collection, from, to, &request.inserted),
        MarkType::Suggestion(RangeKind::Comment) => {
            comment::mark_comment(collection, &request, &settings.metadata_merge)
        }
        MarkType::Suggestion(_) => mark_ranges(collection, doc, &request, settings),
    }
}

/// Whether `range`, overlapping the selection, is left out of every run.
fn carves(
    range: &CriticRange,
    request: &MarkRequest,
    target: RangeKind,
    policies: &MetadataMergePolicies,
) -> bool {
    if range.kind == RangeKind::Comment {
        return true;
    }
    if request.force {
        return false;
    }
    let covered = request.from <= range.from && range.to <= request.to;
    match compatibility(range, target, &request.metadata, policies) {
        Compat::Merge(_) => false,
        Compat::MoveOutside => true,
        Compat::Split => match target {
            RangeKind::Highlight => true,
            // A range cut by the selection is split around the new markup,
            // only whole ones are kept.
            _ if range.kind == RangeKind::Highlight || kinds_merge(range.kind, target) => covered,
            _ => true,
        },
    }
}

/// Mark a selection that may span several ranges with a suggestion or
/// highlight.
///
/// Comments are always carved out of the selection. Without `force`, so is
/// every range the target cannot merge with, unless the selection only cuts
/// into it: then the run splits it and its outer parts stay on either side
/// of the new markup. The remaining runs are marked one by one and the
/// inserted text goes to the last of them. With `force`
/// the whole selection is a single run that absorbs what it covers.
pub fn mark_ranges(
    collection: &RangeCollection,
    doc: &str,
    request: &MarkRequest,
    settings: &Settings,
) -> MarkResult {
    let MarkType::Suggestion(target) = request.mark_type else {
        return mark(collection, doc, request, settings);
    };
    let policies = &settings.metadata_merge;
    let (from, to) = (request.from, request.to);
    let inserted = match target {
        RangeKind::Highlight => "",
        _ => request.inserted.as_str(),
    };

    if from == to {
        let pos = snap_into_content(collection, from);
        if inserted.is_empty() {
            return MarkResult::cursor(pos..pos);
        }
        let input = RunInput {
            from: pos,
            to: pos,
            inserted,
            target,
            fields: &request.metadata,
        };
        let runs = mark_run(collection, doc, &input, policies).into_iter().collect();
        return MarkResult::from_runs(runs, pos..pos, true);
    }

    let mut spans = Vec::new();
    let mut cursor = from;
    for range in collection.ranges_in_range(from, to) {
        if carves(range, request, target, policies) {
            log::trace!("carving {} at {}..{} out of {from}..{to}", range.kind, range.from, range.to);
            if range.from > cursor {
                spans.push(cursor..range.from);
            }
            cursor = cursor.max(range.to);
        }
    }
    if cursor < to {
        spans.push(cursor..to);
    }

    if spans.is_empty() {
        if inserted.is_empty() {
            return MarkResult::cursor(from..to);
        }
        let pos = collection
            .ranges_in_range(to, to)
            .first()
            .map_or(to, |range| range.to);
        spans.push(pos..pos);
    }

    let last = spans.len() - 1;
    let mut runs = Vec::with_capacity(spans.len());
    for (i, span) in spans.into_iter().enumerate() {
        let input = RunInput {
            from: span.start,
            to: span.end,
            inserted: if i == last { inserted } else { "" },
            target,
            fields: &request.metadata,
        };
        let run = if request.force && target == RangeKind::Highlight {
            run::highlight_unwrapped(collection, doc, &input)
        } else {
            mark_run(collection, doc, &input, policies)
        };
        runs.extend(run);
    }

    MarkResult::from_runs(runs, from..to, !inserted.is_empty())
}
