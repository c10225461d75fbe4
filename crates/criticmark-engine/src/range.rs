//! # Range
//!
//! One bracketed span of suggestion markup. `from..to` always covers the
//! whole syntax, brackets included:
//!
//! ```text
//! {~~author:A@@old~>new~~}
//! ^  ^         ^  ^    ^  ^
//! |  |         |  |    |  to
//! |  |         |  |    to - 3 (closing bracket)
//! |  |         |  middle (separator)
//! |  |         metadata (content start)
//! |  from + 3
//! from
//! ```
//!
//! Every offset is absolute in the document. The cached `text` is the raw
//! slice `doc[from..to]` at the time the range was built; slicing helpers
//! read from it, so they never need the document.

use std::ops::Range;

use criticmark_syntax::{ParsedRange, RangeKind};

use crate::metadata::MetadataFields;

const BRACKET: usize = RangeKind::BRACKET_LEN;
const SEPARATOR: usize = RangeKind::SEPARATOR.len();
const SENTINEL: usize = RangeKind::METADATA_END.len();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticRange {
    pub kind: RangeKind,
    pub from: usize,
    pub to: usize,
    pub text: String,
    /// Offset just past the metadata `@@`, when the range has a header.
    pub metadata: Option<usize>,
    pub fields: MetadataFields,
    /// Offset of the `~>` separator. Substitutions only.
    pub middle: Option<usize>,
    /// Comments threaded onto this range, in document order.
    pub replies: Vec<CriticRange>,
}

/// The two sides of a range's content.
///
/// Additions only have an inserted side; Deletions, Highlights and
/// Comments keep their content on the deleted side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeParts<'a> {
    pub deleted: &'a str,
    pub inserted: &'a str,
}

impl CriticRange {
    /// Build a range from its raw text starting at `from`.
    ///
    /// A metadata offset that does not point just past an `@@` inside the
    /// range is ignored, and undecodable metadata yields empty fields.
    pub fn new(
        kind: RangeKind,
        from: usize,
        text: impl Into<String>,
        middle: Option<usize>,
        metadata: Option<usize>,
    ) -> Self {
        let text = text.into();
        let to = from + text.len();

        let metadata = metadata.filter(|&end| {
            end >= from + BRACKET + SENTINEL
                && end + BRACKET <= to
                && text.get(end - from - SENTINEL..end - from) == Some(RangeKind::METADATA_END)
        });

        let content_start = metadata.unwrap_or(from + BRACKET);
        let middle = match kind {
            RangeKind::Substitution => middle
                .filter(|&m| {
                    m >= content_start
                        && m + SEPARATOR + BRACKET <= to
                        && text.get(m - from..m - from + SEPARATOR) == Some(RangeKind::SEPARATOR)
                })
                .or_else(|| {
                    let body = text.get(content_start - from..to.saturating_sub(from + BRACKET))?;
                    body.find(RangeKind::SEPARATOR).map(|idx| content_start + idx)
                }),
            _ => None,
        };

        let fields = match metadata {
            Some(end) => text
                .get(BRACKET..end - from - SENTINEL)
                .map(MetadataFields::decode_lossy)
                .unwrap_or_default(),
            None => MetadataFields::default(),
        };

        Self {
            kind,
            from,
            to,
            text,
            metadata,
            fields,
            middle,
            replies: Vec::new(),
        }
    }

    pub fn from_parsed(parsed: &ParsedRange) -> Self {
        Self::new(
            parsed.kind,
            parsed.from,
            parsed.text.clone(),
            parsed.middle,
            parsed.metadata_end,
        )
    }

    /// Whether the offsets still describe balanced syntax.
    pub fn is_well_formed(&self) -> bool {
        if self.to < self.from || self.to - self.from < self.kind.num_ignore_chars() {
            return false;
        }
        if self.content_start() > self.content_end() {
            return false;
        }
        match (self.kind, self.middle) {
            (RangeKind::Substitution, Some(m)) => {
                m >= self.content_start() && m + SEPARATOR <= self.content_end()
            }
            (RangeKind::Substitution, None) => false,
            (_, middle) => middle.is_none(),
        }
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    pub fn full_range(&self) -> Range<usize> {
        self.from..self.to
    }

    /// Start of the content, after the opening bracket and any metadata.
    pub fn content_start(&self) -> usize {
        self.metadata.unwrap_or(self.from + BRACKET)
    }

    /// Start of the closing bracket.
    pub fn content_end(&self) -> usize {
        self.to.saturating_sub(BRACKET).max(self.from)
    }

    pub fn separator(&self) -> Option<Range<usize>> {
        self.middle.map(|m| m..m + SEPARATOR)
    }

    /// The span holding original text.
    pub fn deleted_range(&self) -> Range<usize> {
        match self.kind {
            RangeKind::Addition => self.content_start()..self.content_start(),
            RangeKind::Substitution => {
                self.content_start()..self.middle.unwrap_or(self.content_end())
            }
            _ => self.content_start()..self.content_end(),
        }
    }

    /// The span holding proposed text.
    pub fn inserted_range(&self) -> Range<usize> {
        match self.kind {
            RangeKind::Addition => self.content_start()..self.content_end(),
            RangeKind::Substitution => match self.middle {
                Some(m) => m + SEPARATOR..self.content_end(),
                None => self.content_end()..self.content_end(),
            },
            _ => self.content_end()..self.content_end(),
        }
    }

    /// The syntax spans of this range: opening bracket (with metadata when
    /// `include_metadata`), separator, closing bracket.
    pub fn syntax_zones(&self, include_metadata: bool) -> Vec<Range<usize>> {
        let left_end = if include_metadata {
            self.content_start()
        } else {
            self.from + BRACKET
        };
        let mut zones = vec![self.from..left_end];
        zones.extend(self.separator());
        zones.push(self.content_end()..self.to);
        zones
    }

    /// Slice the cached text by absolute offsets, clipped to the range.
    fn slice(&self, range: Range<usize>) -> &str {
        let start = range.start.clamp(self.from, self.to) - self.from;
        let end = range.end.clamp(self.from, self.to) - self.from;
        if start >= end {
            return "";
        }
        self.text.get(start..end).unwrap_or("")
    }

    pub fn parts(&self) -> RangeParts<'_> {
        RangeParts {
            deleted: self.slice(self.deleted_range()),
            inserted: self.slice(self.inserted_range()),
        }
    }

    /// The text if this suggestion were approved.
    pub fn accept(&self) -> String {
        match self.kind {
            RangeKind::Addition | RangeKind::Substitution => self.parts().inserted.to_string(),
            RangeKind::Deletion => String::new(),
            RangeKind::Highlight | RangeKind::Comment => self.text.clone(),
        }
    }

    /// The text if this suggestion were declined.
    pub fn reject(&self) -> String {
        match self.kind {
            RangeKind::Deletion | RangeKind::Substitution => self.parts().deleted.to_string(),
            RangeKind::Addition => String::new(),
            RangeKind::Highlight | RangeKind::Comment => self.text.clone(),
        }
    }

    /// Content without brackets, metadata or separator.
    pub fn unwrap(&self) -> String {
        self.unwrap_parts().concat()
    }

    /// Substitutions yield `[deleted, inserted]`, everything else `[content]`.
    pub fn unwrap_parts(&self) -> Vec<&str> {
        let parts = self.parts();
        match self.kind {
            RangeKind::Substitution => vec![parts.deleted, parts.inserted],
            RangeKind::Addition => vec![parts.inserted],
            _ => vec![parts.deleted],
        }
    }

    /// Content inside `from..to`, skipping all syntax characters.
    pub fn unwrap_slice(&self, from: usize, to: usize) -> String {
        let parts = self.unwrap_slice_parts(from, to);
        format!("{}{}", parts.deleted, parts.inserted)
    }

    /// Content inside `from..to`, split by side.
    pub fn unwrap_slice_parts(&self, from: usize, to: usize) -> RangeParts<'_> {
        let clip = |part: Range<usize>| part.start.max(from)..part.end.min(to);
        RangeParts {
            deleted: self.slice(clip(self.deleted_range())),
            inserted: self.slice(clip(self.inserted_range())),
        }
    }

    /// Whether `cursor` lies in the opening bracket.
    ///
    /// `outside_loose` also accepts `from`, `inside_loose` also accepts the
    /// inner edge. With `include_metadata` the header counts as bracket.
    pub fn touches_left_bracket(
        &self,
        cursor: usize,
        outside_loose: bool,
        inside_loose: bool,
        include_metadata: bool,
    ) -> bool {
        let inner = if include_metadata {
            self.content_start()
        } else {
            self.from + BRACKET
        };
        (self.from < cursor && cursor < inner)
            || (outside_loose && cursor == self.from)
            || (inside_loose && cursor == inner)
    }

    /// Mirror of [`touches_left_bracket`](Self::touches_left_bracket) for
    /// the closing bracket.
    pub fn touches_right_bracket(&self, cursor: usize, outside_loose: bool, inside_loose: bool) -> bool {
        let inner = self.content_end();
        (inner < cursor && cursor < self.to)
            || (outside_loose && cursor == self.to)
            || (inside_loose && cursor == inner)
    }

    pub fn touches_bracket(
        &self,
        cursor: usize,
        outside_loose: bool,
        inside_loose: bool,
        include_metadata: bool,
    ) -> bool {
        self.touches_left_bracket(cursor, outside_loose, inside_loose, include_metadata)
            || self.touches_right_bracket(cursor, outside_loose, inside_loose)
    }

    pub fn touches_separator(&self, cursor: usize, left_loose: bool, right_loose: bool) -> bool {
        match self.middle {
            Some(m) => {
                (m < cursor && cursor < m + SEPARATOR)
                    || (left_loose && cursor == m)
                    || (right_loose && cursor == m + SEPARATOR)
            }
            None => false,
        }
    }

    /// Whether `cursor` sits strictly inside any syntax zone.
    pub fn in_syntax(&self, cursor: usize, include_metadata: bool) -> bool {
        self.touches_bracket(cursor, false, false, include_metadata)
            || self.touches_separator(cursor, false, false)
    }

    /// Snap a cursor in a bracket to the adjacent content edge.
    pub fn cursor_move_inside(&self, cursor: usize, include_metadata: bool) -> usize {
        if self.touches_left_bracket(cursor, true, false, include_metadata) {
            if include_metadata {
                self.content_start()
            } else {
                self.from + BRACKET
            }
        } else if self.touches_right_bracket(cursor, true, false) {
            self.content_end()
        } else {
            cursor
        }
    }

    /// Snap a cursor in a bracket to the outer edge of the range.
    pub fn cursor_move_outside(&self, cursor: usize, include_metadata: bool) -> usize {
        if self.touches_left_bracket(cursor, false, true, include_metadata) {
            self.from
        } else if self.touches_right_bracket(cursor, false, true) {
            self.to
        } else {
            cursor
        }
    }

    /// Whether `start..end` lies entirely inside one content part: the
    /// deleted part when `left`, the inserted part otherwise. For ranges
    /// with a single part `left` is ignored.
    pub fn part_encloses_range(&self, start: usize, end: usize, left: bool) -> bool {
        let part = match self.kind {
            RangeKind::Substitution if left => self.deleted_range(),
            RangeKind::Substitution => self.inserted_range(),
            _ => self.content_start()..self.content_end(),
        };
        part.start <= start && end <= part.end
    }

    /// Whether `from..to` reaches into the separator. An empty span counts
    /// only when it sits strictly inside the separator.
    pub fn contains_separator(&self, from: usize, to: usize) -> bool {
        match self.middle {
            Some(m) if from == to => m < from && from < m + SEPARATOR,
            Some(m) => from < m + SEPARATOR && to > m,
            None => false,
        }
    }

    /// Bracket and separator characters inside `from..to`.
    pub fn num_ignored_chars(&self, from: usize, to: usize) -> usize {
        self.count_zone_overlap(from, to, false)
    }

    /// Like [`num_ignored_chars`](Self::num_ignored_chars), counting the
    /// metadata header as well.
    pub fn num_syntax_chars(&self, from: usize, to: usize) -> usize {
        self.count_zone_overlap(from, to, true)
    }

    fn count_zone_overlap(&self, from: usize, to: usize, include_metadata: bool) -> usize {
        self.syntax_zones(include_metadata)
            .into_iter()
            .map(|zone| zone.end.min(to).saturating_sub(zone.start.max(from)))
            .sum()
    }

    /// Strictly inside: `from < pos < to`.
    pub fn encloses(&self, pos: usize) -> bool {
        self.from < pos && pos < self.to
    }

    pub fn overlaps(&self, from: usize, to: usize) -> bool {
        self.from < to && from < self.to
    }

    /// Shift every offset by `offset`, replies included.
    pub fn apply_offset(&mut self, offset: isize) {
        let shift = |pos: usize| pos.saturating_add_signed(offset);
        self.from = shift(self.from);
        self.to = shift(self.to);
        self.metadata = self.metadata.map(shift);
        self.middle = self.middle.map(shift);
        for reply in &mut self.replies {
            reply.apply_offset(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn range(kind: RangeKind, from: usize, text: &str) -> CriticRange {
        let parsed = criticmark_syntax::ranges(text);
        let first = &parsed[0];
        CriticRange::new(
            kind,
            from,
            text,
            first.middle.map(|m| m + from),
            first.metadata_end.map(|m| m + from),
        )
    }

    #[rstest]
    #[case(RangeKind::Addition, "{++new++}", "new", "")]
    #[case(RangeKind::Deletion, "{--old--}", "", "old")]
    #[case(RangeKind::Substitution, "{~~old~>new~~}", "new", "old")]
    #[case(RangeKind::Highlight, "{==look==}", "{==look==}", "{==look==}")]
    #[case(RangeKind::Comment, "{>>why<<}", "{>>why<<}", "{>>why<<}")]
    fn accept_and_reject(
        #[case] kind: RangeKind,
        #[case] text: &str,
        #[case] accepted: &str,
        #[case] rejected: &str,
    ) {
        let r = range(kind, 0, text);
        assert_eq!(r.accept(), accepted);
        assert_eq!(r.reject(), rejected);
    }

    #[test]
    fn metadata_is_decoded_and_skipped() {
        let r = range(RangeKind::Substitution, 10, "{~~author:A@@old~>new~~}");

        assert_eq!(r.metadata, Some(23));
        assert_eq!(r.middle, Some(26));
        assert_eq!(r.fields.author.as_deref(), Some("A"));
        assert_eq!(r.unwrap_parts(), vec!["old", "new"]);
        assert_eq!(r.unwrap(), "oldnew");
    }

    #[test]
    fn malformed_metadata_yields_empty_fields() {
        let r = range(RangeKind::Addition, 0, "{++mood:odd@@x++}");

        assert_eq!(r.metadata, Some(13));
        assert!(r.fields.is_empty());
        assert_eq!(r.unwrap(), "x");
    }

    #[test]
    fn bogus_metadata_offset_is_ignored() {
        let r = CriticRange::new(RangeKind::Addition, 0, "{++abc++}", None, Some(5));
        assert_eq!(r.metadata, None);
        assert_eq!(r.content_start(), 3);
    }

    #[test]
    fn missing_middle_is_recovered_from_text() {
        let r = CriticRange::new(RangeKind::Substitution, 4, "{~~a~>b~~}", None, None);
        assert_eq!(r.middle, Some(8));
        assert!(r.is_well_formed());
    }

    #[test]
    fn unwrap_slice_clips_across_separator() {
        // {~~abc~>xyz~~} at 0: deleted 3..6, separator 6..8, inserted 8..11
        let r = range(RangeKind::Substitution, 0, "{~~abc~>xyz~~}");

        assert_eq!(r.unwrap_slice(4, 10), "bcxy");
        assert_eq!(
            r.unwrap_slice_parts(4, 10),
            RangeParts {
                deleted: "bc",
                inserted: "xy"
            }
        );
        assert_eq!(r.unwrap_slice(0, 14), "abcxyz");
        assert_eq!(r.unwrap_slice(6, 8), "");
    }

    #[test]
    fn bracket_touching_is_symmetric() {
        let r = range(RangeKind::Addition, 5, "{++abc++}");
        // from = 5, inner left = 8, inner right = 11, to = 14
        for (left, right) in [(5, 14), (6, 13), (7, 12), (8, 11)] {
            for outside in [false, true] {
                for inside in [false, true] {
                    assert_eq!(
                        r.touches_left_bracket(left, outside, inside, false),
                        r.touches_right_bracket(right, outside, inside),
                        "left {left} right {right} outside {outside} inside {inside}"
                    );
                }
            }
        }
    }

    #[rstest]
    #[case(5, false, false, false)]
    #[case(5, true, false, true)]
    #[case(6, false, false, true)]
    #[case(8, false, false, false)]
    #[case(8, false, true, true)]
    fn touches_left_bracket_cases(
        #[case] cursor: usize,
        #[case] outside: bool,
        #[case] inside: bool,
        #[case] expected: bool,
    ) {
        let r = range(RangeKind::Deletion, 5, "{--abc--}");
        assert_eq!(r.touches_left_bracket(cursor, outside, inside, true), expected);
    }

    #[test]
    fn metadata_counts_as_bracket_only_when_asked() {
        let r = range(RangeKind::Comment, 0, "{>>a:X@@hi<<}");
        assert!(r.touches_left_bracket(5, false, false, true));
        assert!(!r.touches_left_bracket(5, false, false, false));
    }

    #[test]
    fn separator_touching() {
        let r = range(RangeKind::Substitution, 0, "{~~a~>b~~}");
        assert!(r.touches_separator(5, false, false));
        assert!(!r.touches_separator(4, false, false));
        assert!(r.touches_separator(4, true, false));
        assert!(r.touches_separator(6, false, true));
    }

    #[test]
    fn cursor_snapping() {
        let r = range(RangeKind::Highlight, 0, "{==a:B@@text==}");
        // from 0, content 8..12, to 15
        assert_eq!(r.cursor_move_inside(0, true), 8);
        assert_eq!(r.cursor_move_inside(2, false), 3);
        assert_eq!(r.cursor_move_inside(14, true), 12);
        assert_eq!(r.cursor_move_inside(10, true), 10);

        assert_eq!(r.cursor_move_outside(8, true), 0);
        assert_eq!(r.cursor_move_outside(13, true), 15);
        assert_eq!(r.cursor_move_outside(10, true), 10);
    }

    #[test]
    fn part_enclosure() {
        let r = range(RangeKind::Substitution, 0, "{~~abc~>xyz~~}");
        assert!(r.part_encloses_range(3, 6, true));
        assert!(!r.part_encloses_range(3, 7, true));
        assert!(r.part_encloses_range(8, 11, false));
        assert!(!r.part_encloses_range(5, 9, false));
    }

    #[test]
    fn separator_containment() {
        let r = range(RangeKind::Substitution, 0, "{~~abc~>xyz~~}");
        assert!(r.contains_separator(5, 9));
        assert!(r.contains_separator(7, 7));
        assert!(!r.contains_separator(6, 6));
        assert!(!r.contains_separator(3, 6));
        assert!(!r.contains_separator(8, 11));
    }

    #[rstest]
    #[case(20, 30, 0)]
    #[case(0, 4, 3)]
    #[case(0, 9, 5)]
    #[case(4, 14, 5)]
    #[case(0, 14, 8)]
    fn ignored_chars(#[case] from: usize, #[case] to: usize, #[case] expected: usize) {
        let r = range(RangeKind::Substitution, 0, "{~~abc~>xyz~~}");
        assert_eq!(r.num_ignored_chars(from, to), expected);
    }

    #[test]
    fn syntax_chars_include_metadata() {
        let r = range(RangeKind::Addition, 0, "{++a:B@@x++}");
        assert_eq!(r.num_ignored_chars(0, 12), 6);
        assert_eq!(r.num_syntax_chars(0, 12), 11);
    }

    #[test]
    fn apply_offset_moves_everything() {
        let mut r = range(RangeKind::Substitution, 0, "{~~a:B@@x~>y~~}");
        r.replies.push(range(RangeKind::Comment, 15, "{>>c<<}"));

        r.apply_offset(4);
        assert_eq!((r.from, r.to, r.metadata, r.middle), (4, 19, Some(12), Some(13)));
        assert_eq!(r.replies[0].from, 19);

        r.apply_offset(-4);
        assert_eq!(r.from, 0);
        assert_eq!(r.unwrap_parts(), vec!["x", "y"]);
    }
}
