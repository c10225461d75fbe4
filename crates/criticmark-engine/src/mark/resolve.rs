//! Accepting or rejecting the suggestions in a span.

use crate::collection::RangeCollection;
use crate::edit::{ChangeSet, EditError, TextEdit};
use crate::range::CriticRange;

/// Replace every suggestion lying entirely inside `from..to` with its
/// accepted text. An empty span resolves the suggestion enclosing it.
pub fn accept_in_range(
    collection: &RangeCollection,
    doc: &str,
    from: usize,
    to: usize,
) -> Result<ChangeSet, EditError> {
    resolve(collection, doc, from, to, CriticRange::accept)
}

/// Like [`accept_in_range`], restoring the original text instead.
pub fn reject_in_range(
    collection: &RangeCollection,
    doc: &str,
    from: usize,
    to: usize,
) -> Result<ChangeSet, EditError> {
    resolve(collection, doc, from, to, CriticRange::reject)
}

fn resolve(
    collection: &RangeCollection,
    doc: &str,
    from: usize,
    to: usize,
    resolution: fn(&CriticRange) -> String,
) -> Result<ChangeSet, EditError> {
    let from = from.min(doc.len());
    let to = to.clamp(from, doc.len());

    let edits: Vec<TextEdit> = collection
        .ranges_in_range(from, to)
        .into_iter()
        .filter(|range| from == to || (from <= range.from && range.to <= to))
        .filter(|range| range.kind.is_suggestion())
        .map(|range| TextEdit::new(range.from, range.to, resolution(range)))
        .collect();

    log::debug!("resolving {} suggestions in {from}..{to}", edits.len());
    ChangeSet::new(doc.len(), edits)
}
