//! # Range Collection
//!
//! The ordered set of ranges in one document plus an [`IntervalTree`] over
//! their spans. Ranges never partially overlap, so document order and start
//! order coincide.
//!
//! A collection is never mutated once built. Document changes produce a
//! new collection, either by re-parsing ([`RangeCollection::parse`]) or by
//! remapping offsets ([`RangeCollection::apply_changes`]).

use std::ops::Range;

use criticmark_syntax::RangeKind;
use thiserror::Error;
use xi_rope::delta::Transformer;

use crate::edit::ChangeSet;
use crate::interval_tree::{Interval, IntervalTree};
use crate::range::CriticRange;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThreadError {
    #[error("no range at index {0}")]
    NotFound(usize),
}

#[derive(Debug, Clone, Default)]
pub struct RangeCollection {
    ranges: Vec<CriticRange>,
    /// For each range, the index of the range its thread is rooted at.
    roots: Vec<usize>,
    index: IntervalTree,
}

/// Result of [`RangeCollection::unwrap_in_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrapResult {
    /// Content of `from..to` with all syntax removed.
    pub output: String,
    /// Start of the span, widened to the start of a range it cut into.
    pub from: usize,
    /// End of the span, widened to the end of a range it cut into.
    pub to: usize,
    /// The range `from` originally fell inside of.
    pub front_range: Option<CriticRange>,
    /// The range `to` originally fell inside of.
    pub back_range: Option<CriticRange>,
}

impl RangeCollection {
    pub fn new(mut ranges: Vec<CriticRange>) -> Self {
        ranges.sort_by_key(|r| (r.from, r.to));

        let mut roots: Vec<usize> = Vec::with_capacity(ranges.len());
        for (i, range) in ranges.iter().enumerate() {
            let root = match i.checked_sub(1) {
                Some(prev)
                    if range.kind == RangeKind::Comment && ranges[prev].to == range.from =>
                {
                    roots[prev]
                }
                _ => i,
            };
            roots.push(root);
        }

        for (i, &root) in roots.iter().enumerate() {
            if root != i {
                let reply = ranges[i].clone();
                ranges[root].replies.push(reply);
            }
        }

        let index = IntervalTree::from_intervals(
            ranges
                .iter()
                .enumerate()
                .map(|(i, r)| Interval::new(r.from, r.to, i))
                .collect(),
        );

        Self {
            ranges,
            roots,
            index,
        }
    }

    /// Build the collection for `text` with the in-tree parser.
    pub fn parse(text: &str) -> Self {
        let ranges = criticmark_syntax::ranges(text)
            .iter()
            .map(CriticRange::from_parsed)
            .collect();
        Self::new(ranges)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CriticRange> {
        self.ranges.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CriticRange> {
        self.ranges.get(index)
    }

    pub fn ranges(&self) -> &[CriticRange] {
        &self.ranges
    }

    fn resolve(&self, found: Vec<&Interval>) -> Vec<&CriticRange> {
        found
            .into_iter()
            .filter_map(|interval| self.ranges.get(interval.index))
            .collect()
    }

    /// The range touching `pos` (edges included).
    ///
    /// When `pos` sits between two adjacent ranges, the left one wins
    /// unless `break_ties_right`.
    pub fn at_cursor(&self, pos: usize, break_ties_right: bool) -> Option<&CriticRange> {
        let found = self.resolve(self.index.query_point_inclusive(pos));
        if break_ties_right {
            found.last().copied()
        } else {
            found.first().copied()
        }
    }

    /// Ranges intersecting `from..to`, in document order. An empty span
    /// returns the range strictly enclosing it, if any.
    pub fn ranges_in_range(&self, from: usize, to: usize) -> Vec<&CriticRange> {
        if from == to {
            return self
                .resolve(self.index.query_point(from))
                .into_iter()
                .filter(|r| r.encloses(from))
                .collect();
        }
        self.resolve(self.index.query_range(from, to))
    }

    /// Ranges touching the closed span `[from, to]`, adjacent ones included.
    pub fn ranges_in_interval(&self, from: usize, to: usize) -> Vec<&CriticRange> {
        self.resolve(self.index.query_closed(from, to))
    }

    /// The nearest range on one side of `pos`.
    ///
    /// With `left` this is the range ending closest before `pos`, otherwise
    /// the one starting closest after it. `loose` also accepts a range that
    /// strictly encloses `pos`; `include_edge` accepts a range whose edge is
    /// exactly `pos`.
    pub fn range_adjacent_to_cursor(
        &self,
        pos: usize,
        left: bool,
        loose: bool,
        include_edge: bool,
    ) -> Option<&CriticRange> {
        if loose {
            if let Some(range) = self.ranges_in_range(pos, pos).first().copied() {
                return Some(range);
            }
        }
        let found = if left {
            self.index.nearest_before(pos, include_edge)
        } else {
            self.index.nearest_after(pos, include_edge)
        };
        found.and_then(|interval| self.ranges.get(interval.index))
    }

    /// Strip all syntax from `doc[from..to]`.
    ///
    /// Comments contribute nothing to the output. When `from` or `to` falls
    /// strictly inside a range the span is widened to cover the whole range,
    /// and callers must use the returned bounds.
    pub fn unwrap_in_range(&self, doc: &str, from: usize, to: usize) -> UnwrapResult {
        let front_range = self
            .ranges_in_range(from, from)
            .first()
            .map(|r| (*r).clone());
        let back_range = self.ranges_in_range(to, to).first().map(|r| (*r).clone());

        let from = front_range.as_ref().map_or(from, |r| r.from);
        let to = back_range.as_ref().map_or(to, |r| r.to);

        let mut output = String::new();
        let mut last = from;
        for range in self.ranges_in_range(from, to) {
            output.push_str(doc.get(last..range.from.max(last)).unwrap_or(""));
            if range.kind != RangeKind::Comment {
                output.push_str(&range.unwrap());
            }
            last = range.to;
        }
        output.push_str(doc.get(last.min(to)..to).unwrap_or(""));

        UnwrapResult {
            output,
            from,
            to,
            front_range,
            back_range,
        }
    }

    /// Remap every range through `changes`.
    ///
    /// Text inserted exactly at a range edge stays outside it. Edits inside
    /// a range are spliced into its cached text; a range an edit cuts
    /// across, or whose syntax no longer balances, is dropped.
    pub fn apply_changes(&self, changes: &ChangeSet) -> Self {
        if changes.is_empty() {
            return self.clone();
        }

        let delta = changes.to_delta();
        let mut transformer = Transformer::new(&delta);

        let remapped = self
            .ranges
            .iter()
            .filter_map(|range| {
                let text = splice_edits(range, changes)?;
                let from = transformer.transform(range.from, true);
                let middle = range.middle.map(|m| transformer.transform(m, true));
                let metadata = range.metadata.map(|m| transformer.transform(m, false));

                let moved = CriticRange::new(range.kind, from, text, middle, metadata);
                let balanced = moved.text.starts_with(range.kind.open())
                    && moved.text.ends_with(range.kind.close())
                    && moved.is_well_formed();
                if !balanced {
                    log::debug!(
                        "dropping {} at {}..{} after remap",
                        range.kind,
                        range.from,
                        range.to
                    );
                    return None;
                }
                let mut moved = moved;
                moved.replies.clear();
                Some(moved)
            })
            .collect();

        Self::new(remapped)
    }

    /// The thread containing range `index`: its root followed by the replies.
    pub fn thread_of(&self, index: usize) -> Result<Vec<&CriticRange>, ThreadError> {
        let root = *self.roots.get(index).ok_or(ThreadError::NotFound(index))?;
        Ok(self
            .roots
            .iter()
            .enumerate()
            .skip(root)
            .take_while(|(_, r)| **r == root)
            .filter_map(|(i, _)| self.ranges.get(i))
            .collect())
    }

    /// The range the thread containing `index` is anchored to.
    pub fn base_range_of(&self, index: usize) -> Result<&CriticRange, ThreadError> {
        let root = *self.roots.get(index).ok_or(ThreadError::NotFound(index))?;
        self.ranges.get(root).ok_or(ThreadError::NotFound(index))
    }

    /// The span of a comment thread, base range through last reply, that
    /// `pos` falls strictly inside of while not being inside the base range
    /// itself. Text placed at `pos` would break the thread apart.
    pub fn thread_span_at(&self, pos: usize) -> Option<Range<usize>> {
        self.index.query_point_inclusive(pos).iter().find_map(|interval| {
            let range = self.ranges.get(interval.index)?;
            if range.kind != RangeKind::Comment && range.encloses(pos) {
                return None;
            }
            let root = *self.roots.get(interval.index)?;
            let start = self.ranges.get(root)?.from;
            let end = self.thread_end(interval.index).ok()?;
            (start < pos && pos < end).then_some(start..end)
        })
    }

    /// One past the last range of the thread containing `index`.
    pub fn thread_end(&self, index: usize) -> Result<usize, ThreadError> {
        self.thread_of(index)?
            .last()
            .map(|r| r.to)
            .ok_or(ThreadError::NotFound(index))
    }
}

/// Apply the edits that fall inside `range` to its cached text. `None` when
/// an edit straddles one of its edges.
fn splice_edits(range: &CriticRange, changes: &ChangeSet) -> Option<String> {
    let mut text = String::with_capacity(range.text.len());
    let mut last = range.from;

    for edit in changes.edits() {
        let at_outer_edge = edit.from == edit.to && (edit.from == range.from || edit.from == range.to);
        if edit.to < range.from || edit.from > range.to || at_outer_edge {
            continue;
        }
        let inside = range.from <= edit.from && edit.to <= range.to;
        let touches = edit.from < range.to && edit.to > range.from;
        if !inside {
            if touches {
                log::debug!(
                    "edit {}..{} cuts across {} at {}..{}",
                    edit.from,
                    edit.to,
                    range.kind,
                    range.from,
                    range.to
                );
                return None;
            }
            continue;
        }
        text.push_str(range.text.get(last - range.from..edit.from - range.from)?);
        text.push_str(&edit.insert);
        last = edit.to;
    }
    text.push_str(range.text.get(last - range.from..)?);
    Some(text)
}
