//! # Parser Events
//!
//! Events are the intermediate representation between parsing and tree building.
//! Instead of building the tree directly, the parser emits a **flat sequence**
//! of events that describe the tree structure:
//!
//! ```text
//! Start(ADDITION)      ← Begin an ADDITION node
//!   Token(ADD_OPEN)
//!   Start(CONTENT)
//!     Token(TEXT)
//!   Finish
//!   Token(ADD_CLOSE)
//! Finish               ← End the ADDITION node
//! ```
//!
//! The Sink processes these in order, maintaining a stack of open nodes.
//! Start pushes, Finish pops.

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    Start { kind: SyntaxKind },

    /// Add one raw lexer token to the current node under the given kind.
    ///
    /// The kind can differ from the lexer's: a `++}` inside a deletion is
    /// re-tagged as `TEXT` because it closes nothing there.
    Token { kind: SyntaxKind },

    /// Finish the current node.
    Finish,

    /// A reserved slot for a node that was never completed.
    ///
    /// `parser.start()` pushes one of these; `marker.complete()` turns it
    /// into a `Start`, and the Sink skips any left behind by `abandon()`.
    Placeholder,
}

impl Event {
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start { kind }
    }

    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token { kind }
    }
}
