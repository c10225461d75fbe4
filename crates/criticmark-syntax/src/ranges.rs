//! Extraction of flat range tuples from the syntax tree.
//!
//! This is the interface the engine consumes: an ordered list of
//! `(from, to, kind, text, middle?, metadata_end?)` in document order.

use crate::kinds::RangeKind;
use crate::parser::parse;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// One range discovered by the parser, with byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRange {
    pub kind: RangeKind,
    /// Offset of the opening bracket.
    pub from: usize,
    /// Offset just past the closing bracket.
    pub to: usize,
    /// Offset of the `~>` separator, substitutions only.
    pub middle: Option<usize>,
    /// Offset just past the metadata `@@`, when a header is present.
    pub metadata_end: Option<usize>,
    /// The raw source of the whole range, brackets included.
    pub text: String,
}

/// Parse `source` and return its ranges in document order.
pub fn ranges(source: &str) -> Vec<ParsedRange> {
    ranges_from_tree(&parse(source))
}

/// Collect the ranges of an already-parsed tree.
pub fn ranges_from_tree(root: &SyntaxNode) -> Vec<ParsedRange> {
    root.children()
        .filter_map(|node| {
            let kind = node.kind().range_kind()?;
            let span = node.text_range();

            let middle = node
                .children_with_tokens()
                .filter_map(|element| element.into_token())
                .find(|token| token.kind() == SyntaxKind::SUB_SEP)
                .map(|token| usize::from(token.text_range().start()));

            let metadata_end = node
                .children()
                .find(|child| child.kind() == SyntaxKind::METADATA)
                .map(|header| usize::from(header.text_range().end()));

            Some(ParsedRange {
                kind,
                from: usize::from(span.start()),
                to: usize::from(span.end()),
                middle,
                metadata_end,
                text: node.text().to_string(),
            })
        })
        .collect()
}
