//! # Grammar Rules
//!
//! Suggestion markup is flat: ranges never nest, so the grammar is a single
//! loop over the token stream. At each opening bracket we look ahead for the
//! matching closing bracket of the same kind; if there is one the whole span
//! becomes a range node, otherwise the bracket is plain text.
//!
//! ## Error Recovery
//!
//! Nothing here fails. Unclosed brackets, stray closers, and substitutions
//! missing their `~>` are all kept as `TEXT`, so every input yields a valid
//! tree that preserves all bytes.

mod range;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse the root document.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    while !p.at_end() {
        match p.current().opens().and_then(|kind| Some((kind, range::scan(p, kind)?))) {
            Some((kind, layout)) => range::range(p, kind, layout),
            None => range::bump_plain(p),
        }
    }

    m.complete(p, SyntaxKind::ROOT);
}
