//! SyntaxKind enum for all tokens and nodes in the suggestion-markup CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Every byte in the source must appear as a token in the tree.

use crate::kinds::RangeKind;

/// All syntax kinds for the suggestion-markup CST.
///
/// This enum represents both tokens (lexer output) and composite nodes (parser output).
/// The `repr(u16)` ensures efficient storage in rowan's green tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens (lexer output) ===
    /// Horizontal whitespace (spaces, tabs)
    WHITESPACE,
    /// Line ending
    NEWLINE,
    /// Plain text content
    TEXT,
    /// `{++`
    ADD_OPEN,
    /// `++}`
    ADD_CLOSE,
    /// `{--`
    DEL_OPEN,
    /// `--}`
    DEL_CLOSE,
    /// `{~~`
    SUB_OPEN,
    /// `~>` between the deleted and inserted halves of a substitution
    SUB_SEP,
    /// `~~}`
    SUB_CLOSE,
    /// `{==`
    HL_OPEN,
    /// `==}`
    HL_CLOSE,
    /// `{>>`
    COMMENT_OPEN,
    /// `<<}`
    COMMENT_CLOSE,
    /// `@@` terminating a metadata header
    META_END,
    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root document node
    ROOT,
    /// `{++ ... ++}`
    ADDITION,
    /// `{-- ... --}`
    DELETION,
    /// `{~~ ... ~> ... ~~}`
    SUBSTITUTION,
    /// `{== ... ==}`
    HIGHLIGHT,
    /// `{>> ... <<}`
    COMMENT,
    /// Metadata header including its `@@` sentinel
    METADATA,
    /// Content run inside a range (two of these in a substitution)
    CONTENT,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia (whitespace/newlines).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE)
    }

    /// The range kind opened by this token, if it is an opening bracket.
    pub fn opens(self) -> Option<RangeKind> {
        match self {
            Self::ADD_OPEN => Some(RangeKind::Addition),
            Self::DEL_OPEN => Some(RangeKind::Deletion),
            Self::SUB_OPEN => Some(RangeKind::Substitution),
            Self::HL_OPEN => Some(RangeKind::Highlight),
            Self::COMMENT_OPEN => Some(RangeKind::Comment),
            _ => None,
        }
    }

    /// The range kind closed by this token, if it is a closing bracket.
    pub fn closes(self) -> Option<RangeKind> {
        match self {
            Self::ADD_CLOSE => Some(RangeKind::Addition),
            Self::DEL_CLOSE => Some(RangeKind::Deletion),
            Self::SUB_CLOSE => Some(RangeKind::Substitution),
            Self::HL_CLOSE => Some(RangeKind::Highlight),
            Self::COMMENT_CLOSE => Some(RangeKind::Comment),
            _ => None,
        }
    }

    /// Returns true for any token that carries markup meaning.
    pub fn is_syntax(self) -> bool {
        self.opens().is_some()
            || self.closes().is_some()
            || matches!(self, Self::SUB_SEP | Self::META_END)
    }

    /// The node kind wrapping a range of the given kind.
    pub fn node_for(kind: RangeKind) -> Self {
        match kind {
            RangeKind::Addition => Self::ADDITION,
            RangeKind::Deletion => Self::DELETION,
            RangeKind::Substitution => Self::SUBSTITUTION,
            RangeKind::Highlight => Self::HIGHLIGHT,
            RangeKind::Comment => Self::COMMENT,
        }
    }

    /// The range kind represented by a node, if it is a range node.
    pub fn range_kind(self) -> Option<RangeKind> {
        match self {
            Self::ADDITION => Some(RangeKind::Addition),
            Self::DELETION => Some(RangeKind::Deletion),
            Self::SUBSTITUTION => Some(RangeKind::Substitution),
            Self::HIGHLIGHT => Some(RangeKind::Highlight),
            Self::COMMENT => Some(RangeKind::Comment),
            _ => None,
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CriticLang {}

impl rowan::Language for CriticLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::CONTENT as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<CriticLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<CriticLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<CriticLang>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_kinds_are_tokens() {
        assert!(SyntaxKind::WHITESPACE.is_token());
        assert!(SyntaxKind::SUB_SEP.is_token());
        assert!(SyntaxKind::EOF.is_token());
    }

    #[test]
    fn node_kinds_are_nodes() {
        assert!(SyntaxKind::ROOT.is_node());
        assert!(SyntaxKind::SUBSTITUTION.is_node());
        assert!(SyntaxKind::METADATA.is_node());
    }

    #[test]
    fn open_and_close_agree() {
        for kind in RangeKind::ALL {
            let node = SyntaxKind::node_for(kind);
            assert_eq!(node.range_kind(), Some(kind));
        }
        assert_eq!(SyntaxKind::SUB_OPEN.opens(), SyntaxKind::SUB_CLOSE.closes());
        assert_eq!(SyntaxKind::TEXT.opens(), None);
    }

    #[test]
    fn rowan_conversion_roundtrip() {
        let kind = SyntaxKind::COMMENT;
        let raw: rowan::SyntaxKind = kind.into();
        let back = CriticLang::kind_from_raw(raw);
        assert_eq!(kind, back);
    }
}
