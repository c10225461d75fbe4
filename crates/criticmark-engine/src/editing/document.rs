use std::ops::Range;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use criticmark_config::Settings;
use xi_rope::Rope;

use crate::collection::RangeCollection;
use crate::edit::{Assoc, ChangeSet, EditError};
use crate::editing::Patch;
use crate::mark::{self, MarkRequest, MarkResult};
use crate::metadata::MetadataFields;
use crate::navigation::{self, Direction};
use crate::suggest;

/// A document with suggestion markup.
///
/// Holds the text in a rope, the ranges parsed from it and the current
/// selection. Every applied change bumps the version and swaps in a new
/// range collection; an `Arc` handed out by [`ranges`](Self::ranges) keeps
/// describing the text it was parsed from.
///
/// ```rust
/// # use criticmark_engine::editing::Document;
/// # use criticmark_engine::mark::{MarkRequest, MarkType};
/// # use criticmark_syntax::RangeKind;
/// let mut doc = Document::from_bytes(b"a fine day").unwrap();
/// let patch = doc
///     .mark(&MarkRequest::new(2, 6, "", MarkType::Suggestion(RangeKind::Deletion)))
///     .unwrap();
///
/// assert_eq!(doc.text(), "a {--fine--} day");
/// assert_eq!(patch.version, 1);
/// assert_eq!(doc.ranges().len(), 1);
/// ```
pub struct Document {
    /// xi-rope buffer holding the whole document as UTF-8
    pub(crate) buffer: Rope,
    /// Ranges parsed from `buffer`, replaced on every change
    pub(crate) ranges: Arc<RangeCollection>,
    /// Current selection/cursor position as byte offsets in buffer
    pub(crate) selection: Range<usize>,
    /// Version counter incremented on each edit (enables change detection)
    pub(crate) version: u64,
    pub(crate) settings: Settings,
}

impl Document {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        let buffer = Rope::from(text);
        let len = buffer.len();
        let ranges = Arc::new(RangeCollection::parse(text));
        log::debug!("loaded document of {len} bytes with {} ranges", ranges.len());

        Ok(Self {
            buffer,
            ranges,
            selection: len..len, // Start with cursor at end
            version: 0,
            settings: Settings::default(),
        })
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn ranges(&self) -> Arc<RangeCollection> {
        Arc::clone(&self.ranges)
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Set the selection range, clamped to the document
    pub fn set_selection(&mut self, selection: Range<usize>) {
        let len = self.len();
        let start = selection.start.min(len);
        self.selection = start..selection.end.clamp(start, len);
    }

    /// Metadata stamped on new markup: the configured author and, when
    /// enabled, the current time.
    pub fn new_metadata(&self) -> MetadataFields {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|elapsed| i64::try_from(elapsed.as_secs()).ok());
        MetadataFields::from_defaults(&self.settings.default_metadata, now)
    }

    /// Apply a change set made against the current text.
    ///
    /// The selection is carried through the change, growing over text
    /// inserted at its edges.
    pub fn apply(&mut self, changes: &ChangeSet) -> Result<Patch, EditError> {
        let text = self.text();
        self.check(&text, changes)?;
        let selection = changes.map_pos(self.selection.start, Assoc::Before)
            ..changes.map_pos(self.selection.end, Assoc::After);
        Ok(self.commit(changes, selection))
    }

    fn check(&self, text: &str, changes: &ChangeSet) -> Result<(), EditError> {
        if changes.base_len() != text.len() {
            return Err(EditError::BaseLength {
                expected: changes.base_len(),
                actual: text.len(),
            });
        }
        changes.check_boundaries(text)
    }

    fn commit(&mut self, changes: &ChangeSet, selection: Range<usize>) -> Patch {
        if changes.is_empty() {
            self.set_selection(selection);
            return Patch {
                changed: Vec::new(),
                new_selection: self.selection(),
                version: self.version,
            };
        }

        self.buffer = changes.apply_to_rope(&self.buffer);
        self.ranges = Arc::new(RangeCollection::parse(&self.buffer.to_string()));
        self.set_selection(selection);
        self.version += 1;
        log::debug!(
            "applied {} edits, version {} has {} ranges",
            changes.edits().len(),
            self.version,
            self.ranges.len()
        );

        Patch {
            changed: changes.changed_ranges(),
            new_selection: self.selection(),
            version: self.version,
        }
    }

    fn commit_mark(&mut self, text: &str, result: MarkResult) -> Result<Patch, EditError> {
        let changes = result.change_set(text.len())?;
        self.check(text, &changes)?;
        Ok(self.commit(&changes, result.selection))
    }

    pub fn mark(&mut self, request: &MarkRequest) -> Result<Patch, EditError> {
        let text = self.text();
        let result = mark::mark(&self.ranges, &text, request, &self.settings);
        self.commit_mark(&text, result)
    }

    /// Type `text` over the selection in suggestion mode.
    pub fn suggest_insert(&mut self, text: &str) -> Result<Patch, EditError> {
        let doc = self.text();
        let result = suggest::suggest_insert(
            &self.ranges,
            &doc,
            self.selection(),
            text,
            &self.new_metadata(),
            &self.settings,
        );
        self.commit_mark(&doc, result)
    }

    /// Backspace or delete in suggestion mode.
    pub fn suggest_delete(&mut self, direction: Direction) -> Result<Patch, EditError> {
        let doc = self.text();
        let result = suggest::suggest_delete(
            &self.ranges,
            &doc,
            self.selection(),
            direction,
            &self.new_metadata(),
            &self.settings,
        );
        self.commit_mark(&doc, result)
    }

    pub fn accept_all(&mut self) -> Result<Patch, EditError> {
        let text = self.text();
        let changes = mark::accept_in_range(&self.ranges, &text, 0, text.len())?;
        self.apply(&changes)
    }

    pub fn reject_all(&mut self) -> Result<Patch, EditError> {
        let text = self.text();
        let changes = mark::reject_in_range(&self.ranges, &text, 0, text.len())?;
        self.apply(&changes)
    }

    /// Move the cursor one character (or word) and collapse the selection.
    pub fn move_cursor(&mut self, direction: Direction, by_word: bool) -> usize {
        let text = self.text();
        let from = match direction {
            Direction::Backward => self.selection.start,
            Direction::Forward => self.selection.end,
        };
        let to = if by_word {
            navigation::advance_word(&self.ranges, &text, from, direction, &self.settings)
        } else {
            navigation::advance(&self.ranges, &text, from, direction, &self.settings)
        };
        self.selection = to..to;
        to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::TextEdit;
    use crate::mark::MarkType;
    use criticmark_syntax::RangeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_bytes_rejects_invalid_utf8() {
        assert!(Document::from_bytes(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_round_trip_bytes() {
        let original = b"keep {~~this~>that~~} exactly {>>as is<<}";
        let doc = Document::from_bytes(original).unwrap();
        assert_eq!(doc.to_bytes(), original.to_vec());
        assert_eq!(doc.ranges().len(), 2);
        assert_eq!(doc.selection(), original.len()..original.len());
    }

    #[test]
    fn test_apply_maps_selection_and_reparses() {
        let mut doc = Document::from_bytes(b"ab").unwrap();
        doc.set_selection(1..1);

        let changes = ChangeSet::new(2, vec![TextEdit::insert(0, "{++x++}")]).unwrap();
        let patch = doc.apply(&changes).unwrap();

        assert_eq!(doc.text(), "{++x++}ab");
        assert_eq!(patch.changed, vec![0..7]);
        assert_eq!(patch.new_selection, 8..8);
        assert_eq!(patch.version, 1);
        assert_eq!(doc.ranges().len(), 1);
    }

    #[test]
    fn test_apply_rejects_stale_change_set() {
        let mut doc = Document::from_bytes(b"abc").unwrap();
        let changes = ChangeSet::new(2, vec![TextEdit::insert(0, "x")]).unwrap();

        let err = doc.apply(&changes).unwrap_err();
        assert_eq!(
            err,
            EditError::BaseLength {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_apply_rejects_split_character() {
        let mut doc = Document::from_bytes("é".as_bytes()).unwrap();
        let changes = ChangeSet::new(2, vec![TextEdit::insert(1, "x")]).unwrap();
        assert_eq!(
            doc.apply(&changes).unwrap_err(),
            EditError::NotCharBoundary { offset: 1 }
        );
    }

    #[test]
    fn test_old_ranges_survive_edit() {
        let mut doc = Document::from_bytes(b"{++a++}").unwrap();
        let before = doc.ranges();

        doc.reject_all().unwrap();

        assert_eq!(doc.text(), "");
        assert_eq!(before.len(), 1);
        assert!(doc.ranges().is_empty());
    }

    #[test]
    fn test_mark_uses_result_selection() {
        let mut doc = Document::from_bytes(b"hello world").unwrap();
        let patch = doc
            .mark(&MarkRequest::new(
                5,
                5,
                "X",
                MarkType::Suggestion(RangeKind::Addition),
            ))
            .unwrap();

        assert_eq!(doc.text(), "hello{++X++} world");
        assert_eq!(patch.new_selection, 9..9);
        assert_eq!(doc.selection(), 9..9);
    }

    #[test]
    fn test_empty_mark_keeps_version() {
        let mut doc = Document::from_bytes(b"{++ab++}").unwrap();
        let patch = doc
            .mark(&MarkRequest::new(
                1,
                1,
                "",
                MarkType::Suggestion(RangeKind::Addition),
            ))
            .unwrap();

        assert!(patch.changed.is_empty());
        assert_eq!(patch.version, 0);
        assert_eq!(doc.selection(), 3..3);
    }

    #[test]
    fn test_suggest_typing_with_author() {
        let mut settings = Settings::default();
        settings.default_metadata.author = Some("Ann".to_string());
        let mut doc = Document::from_bytes(b"ab").unwrap().with_settings(settings);
        doc.set_selection(1..1);

        doc.suggest_insert("x").unwrap();
        doc.suggest_insert("y").unwrap();

        assert_eq!(doc.text(), "a{++author:Ann@@xy++}b");
        assert_eq!(doc.selection(), 18..18);
    }

    #[test]
    fn test_accept_and_reject_all() {
        let source = b"a{++b++}{--c--}{~~d~>e~~}{==f==}{>>g<<}";

        let mut accepted = Document::from_bytes(source).unwrap();
        accepted.accept_all().unwrap();
        assert_eq!(accepted.text(), "abe{==f==}{>>g<<}");

        let mut rejected = Document::from_bytes(source).unwrap();
        rejected.reject_all().unwrap();
        assert_eq!(rejected.text(), "acd{==f==}{>>g<<}");
    }

    #[test]
    fn test_move_cursor_skips_syntax() {
        let mut doc = Document::from_bytes(b"a{++b++}c").unwrap();
        doc.set_selection(1..1);

        assert_eq!(doc.move_cursor(Direction::Forward, false), 4);
        assert_eq!(doc.move_cursor(Direction::Forward, false), 5);
        assert_eq!(doc.move_cursor(Direction::Forward, false), 8);
        // "a" and "b" read as one word once the brackets are hidden
        assert_eq!(doc.move_cursor(Direction::Backward, true), 0);
    }
}
