//! # criticmark-engine
//!
//! Editing engine for inline suggestion markup: additions `{++ ++}`,
//! deletions `{-- --}`, substitutions `{~~ ~> ~~}`, highlights `{== ==}` and
//! threaded comments `{>> <<}`, each with an optional `key:value@@`
//! metadata header.
//!
//! ## Layers
//!
//! - [`range`]: one parsed range with its syntax zones and content parts.
//! - [`collection`]: all ranges of a document behind an [`interval_tree`]
//!   index, with threading and remapping through edits.
//! - [`serializer`]: building and decoding the markup of a single range.
//! - [`mark`]: turning a selection, text and target kind into edits that
//!   keep the markup well formed.
//! - [`navigation`]: cursor movement and deletion boundaries that treat
//!   syntax as invisible.
//! - [`suggest`]: the single-keystroke entry points of suggestion mode.
//! - [`editing`]: a rope-backed [`Document`](editing::Document) tying it
//!   all together.
//!
//! Everything below [`editing`] is a pure function of its arguments: the
//! text, the collection parsed from it and the [`Settings`](criticmark_config::Settings).

pub mod collection;
pub mod edit;
pub mod editing;
pub mod interval_tree;
pub mod mark;
pub mod metadata;
pub mod navigation;
pub mod range;
pub mod serializer;
pub mod suggest;

// Re-export key types for easier usage
pub use collection::{RangeCollection, ThreadError, UnwrapResult};
pub use edit::{Assoc, ChangeSet, EditError, TextEdit};
pub use editing::{Document, Patch};
pub use mark::{MarkEdit, MarkRequest, MarkResult, MarkType, mark, mark_ranges};
pub use metadata::{MergeOutcome, MetadataError, MetadataFields};
pub use navigation::Direction;
pub use range::{CriticRange, RangeParts};
pub use serializer::{ConstructedRange, DecodedRange, construct_range, construct_suggestion};
