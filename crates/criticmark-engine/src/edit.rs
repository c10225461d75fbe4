//! Text edits and change sets.
//!
//! A [`ChangeSet`] is a sorted, non-overlapping list of `(from, to, insert)`
//! edits against one base document. Every offset refers to the base, never
//! to the result of an earlier edit in the same set. Application and
//! offset mapping go through `xi_rope::Delta`.

use std::ops::Range;

use thiserror::Error;
use xi_rope::delta::{Builder, Transformer};
use xi_rope::{Delta, Rope, RopeInfo};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit {index} starts before the previous edit ends")]
    Overlapping { index: usize },

    #[error("edit {index} has from {from} after to {to}")]
    Inverted { index: usize, from: usize, to: usize },

    #[error("edit {from}..{to} is outside a document of length {len}")]
    OutOfBounds { from: usize, to: usize, len: usize },

    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("change set expects a document of length {expected}, found {actual}")]
    BaseLength { expected: usize, actual: usize },
}

/// Replace `from..to` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl TextEdit {
    pub fn new(from: usize, to: usize, insert: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range.start, range.end, "")
    }

    /// Change in document length caused by this edit.
    pub fn delta_len(&self) -> isize {
        self.insert.len() as isize - (self.to - self.from) as isize
    }
}

/// Which side of an insertion a mapped position sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Stay before text inserted exactly at the position.
    Before,
    /// Move past text inserted exactly at the position.
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    base_len: usize,
    edits: Vec<TextEdit>,
}

impl ChangeSet {
    /// Validate `edits` against a document of `base_len` bytes.
    pub fn new(base_len: usize, edits: Vec<TextEdit>) -> Result<Self, EditError> {
        let mut last_end = 0;
        for (index, edit) in edits.iter().enumerate() {
            if edit.from > edit.to {
                return Err(EditError::Inverted {
                    index,
                    from: edit.from,
                    to: edit.to,
                });
            }
            if edit.to > base_len {
                return Err(EditError::OutOfBounds {
                    from: edit.from,
                    to: edit.to,
                    len: base_len,
                });
            }
            if edit.from < last_end {
                return Err(EditError::Overlapping { index });
            }
            last_end = edit.to;
        }
        Ok(Self { base_len, edits })
    }

    pub fn empty(base_len: usize) -> Self {
        Self {
            base_len,
            edits: Vec::new(),
        }
    }

    pub fn base_len(&self) -> usize {
        self.base_len
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn new_len(&self) -> usize {
        let delta: isize = self.edits.iter().map(TextEdit::delta_len).sum();
        self.base_len.saturating_add_signed(delta)
    }

    /// Check that every edit boundary is a char boundary of `text`.
    pub fn check_boundaries(&self, text: &str) -> Result<(), EditError> {
        for edit in &self.edits {
            for offset in [edit.from, edit.to] {
                if !text.is_char_boundary(offset) {
                    return Err(EditError::NotCharBoundary { offset });
                }
            }
        }
        Ok(())
    }

    pub fn to_delta(&self) -> Delta<RopeInfo> {
        let mut builder = Builder::new(self.base_len);
        for edit in &self.edits {
            builder.replace(edit.from..edit.to, Rope::from(edit.insert.as_str()));
        }
        builder.build()
    }

    pub fn apply_to_rope(&self, rope: &Rope) -> Rope {
        self.to_delta().apply(rope)
    }

    pub fn apply_to_str(&self, text: &str) -> String {
        let mut out = String::with_capacity(self.new_len());
        let mut last = 0;
        for edit in &self.edits {
            out.push_str(text.get(last..edit.from).unwrap_or(""));
            out.push_str(&edit.insert);
            last = edit.to;
        }
        out.push_str(text.get(last..).unwrap_or(""));
        out
    }

    /// Map a base offset to the corresponding offset after the edits.
    pub fn map_pos(&self, pos: usize, assoc: Assoc) -> usize {
        let delta = self.to_delta();
        let mut transformer = Transformer::new(&delta);
        transformer.transform(pos.min(self.base_len), assoc == Assoc::After)
    }

    /// Byte ranges of inserted text in the result document.
    pub fn changed_ranges(&self) -> Vec<Range<usize>> {
        let mut shift: isize = 0;
        self.edits
            .iter()
            .map(|edit| {
                let start = edit.from.saturating_add_signed(shift);
                shift += edit.delta_len();
                start..start + edit.insert.len()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn apply_to_str_uses_base_offsets() {
        let changes = ChangeSet::new(
            11,
            vec![
                TextEdit::insert(0, "{++"),
                TextEdit::new(5, 6, "_"),
                TextEdit::insert(11, "++}"),
            ],
        )
        .unwrap();

        assert_eq!(changes.apply_to_str("hello world"), "{++hello_world++}");
        assert_eq!(changes.new_len(), 17);
    }

    #[test]
    fn rope_and_str_agree() {
        let text = "one two three";
        let changes = ChangeSet::new(
            text.len(),
            vec![TextEdit::delete(0..4), TextEdit::new(8, 13, "3")],
        )
        .unwrap();

        let rope = changes.apply_to_rope(&Rope::from(text));
        assert_eq!(rope.to_string(), changes.apply_to_str(text));
    }

    #[test]
    fn validation_rejects_bad_edits() {
        assert_eq!(
            ChangeSet::new(5, vec![TextEdit::new(3, 2, "")]),
            Err(EditError::Inverted {
                index: 0,
                from: 3,
                to: 2
            })
        );
        assert_eq!(
            ChangeSet::new(5, vec![TextEdit::new(3, 9, "")]),
            Err(EditError::OutOfBounds {
                from: 3,
                to: 9,
                len: 5
            })
        );
        assert_eq!(
            ChangeSet::new(5, vec![TextEdit::new(1, 3, ""), TextEdit::new(2, 4, "")]),
            Err(EditError::Overlapping { index: 1 })
        );
    }

    #[test]
    fn touching_edits_are_allowed() {
        let changes = ChangeSet::new(4, vec![TextEdit::new(0, 2, "x"), TextEdit::insert(2, "y")]);
        assert!(changes.is_ok());
    }

    #[test]
    fn map_pos_association() {
        let changes = ChangeSet::new(10, vec![TextEdit::insert(4, "abc")]).unwrap();

        assert_eq!(changes.map_pos(2, Assoc::Before), 2);
        assert_eq!(changes.map_pos(4, Assoc::Before), 4);
        assert_eq!(changes.map_pos(4, Assoc::After), 7);
        assert_eq!(changes.map_pos(9, Assoc::Before), 12);
    }

    #[test]
    fn map_pos_inside_deletion_collapses() {
        let changes = ChangeSet::new(10, vec![TextEdit::delete(2..6)]).unwrap();
        assert_eq!(changes.map_pos(4, Assoc::Before), 2);
        assert_eq!(changes.map_pos(8, Assoc::After), 4);
    }

    #[test]
    fn char_boundaries_are_checked() {
        let text = "héllo";
        let changes = ChangeSet::new(text.len(), vec![TextEdit::insert(2, "x")]).unwrap();
        assert_eq!(
            changes.check_boundaries(text),
            Err(EditError::NotCharBoundary { offset: 2 })
        );
    }

    #[test]
    fn changed_ranges_are_in_result_coordinates() {
        let changes = ChangeSet::new(
            10,
            vec![TextEdit::new(0, 4, "ab"), TextEdit::insert(6, "xyz")],
        )
        .unwrap();
        assert_eq!(changes.changed_ranges(), vec![0..2, 4..7]);
    }
}
