//! Range-level grammar: one bracketed span with optional metadata header.
//!
//! ```text
//! SUBSTITUTION
//!   SUB_OPEN "{~~"
//!   METADATA
//!     TEXT "author:A"
//!     META_END "@@"
//!   CONTENT
//!     TEXT "old"
//!   SUB_SEP "~>"
//!   CONTENT
//!     TEXT "new"
//!   SUB_CLOSE "~~}"
//! ```

use crate::kinds::RangeKind;
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Token offsets (relative to the opening bracket) of the parts of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Layout {
    close: usize,
    separator: Option<usize>,
    meta_end: Option<usize>,
}

/// Look ahead from an opening bracket for the tokens that complete it.
///
/// The metadata sentinel only counts when it appears before the separator,
/// and a substitution without a separator is not a range at all.
pub(super) fn scan(p: &Parser<'_, '_>, kind: RangeKind) -> Option<Layout> {
    let mut separator = None;
    let mut meta_end = None;

    let mut n = 1;
    loop {
        let current = p.nth(n);
        if current == SyntaxKind::EOF {
            return None;
        }
        if current.closes() == Some(kind) {
            break;
        }
        if current == SyntaxKind::SUB_SEP && kind == RangeKind::Substitution && separator.is_none()
        {
            separator = Some(n);
        }
        if current == SyntaxKind::META_END && meta_end.is_none() && separator.is_none() {
            meta_end = Some(n);
        }
        n += 1;
    }

    if kind == RangeKind::Substitution && separator.is_none() {
        return None;
    }

    Some(Layout {
        close: n,
        separator,
        meta_end,
    })
}

/// Parse a range whose layout was found by [`scan`].
pub(super) fn range(p: &mut Parser<'_, '_>, kind: RangeKind, layout: Layout) {
    let m = p.start();
    p.bump(); // opening bracket
    let mut consumed = 1;

    if let Some(meta_end) = layout.meta_end {
        let header = p.start();
        while consumed < meta_end {
            bump_plain(p);
            consumed += 1;
        }
        p.bump(); // @@
        consumed += 1;
        header.complete(p, SyntaxKind::METADATA);
    }

    if let Some(separator) = layout.separator {
        content(p, &mut consumed, separator);
        p.bump(); // ~>
        consumed += 1;
    }
    content(p, &mut consumed, layout.close);

    p.bump(); // closing bracket
    m.complete(p, SyntaxKind::node_for(kind));
}

fn content(p: &mut Parser<'_, '_>, consumed: &mut usize, until: usize) {
    let m = p.start();
    while *consumed < until {
        bump_plain(p);
        *consumed += 1;
    }
    m.complete(p, SyntaxKind::CONTENT);
}

/// Consume one token as content: brackets that close nothing here are text.
pub(super) fn bump_plain(p: &mut Parser<'_, '_>) {
    if p.current().is_syntax() {
        p.bump_as(SyntaxKind::TEXT);
    } else {
        p.bump();
    }
}
