//! # Range Kinds
//!
//! The five suggestion kinds and the delimiters they own. All bracket
//! constants live here; the lexer, parser and engine never hardcode `{++`
//! or `~>` themselves.

/// The kind of an annotated span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RangeKind {
    Addition,
    Deletion,
    Substitution,
    Highlight,
    Comment,
}

impl RangeKind {
    /// Every kind, in a stable order.
    pub const ALL: [RangeKind; 5] = [
        RangeKind::Addition,
        RangeKind::Deletion,
        RangeKind::Substitution,
        RangeKind::Highlight,
        RangeKind::Comment,
    ];

    /// Length of an opening or closing bracket.
    pub const BRACKET_LEN: usize = 3;

    /// The substitution separator.
    pub const SEPARATOR: &'static str = "~>";

    /// Terminates a metadata header.
    pub const METADATA_END: &'static str = "@@";

    /// Opening bracket for this kind.
    pub fn open(self) -> &'static str {
        match self {
            RangeKind::Addition => "{++",
            RangeKind::Deletion => "{--",
            RangeKind::Substitution => "{~~",
            RangeKind::Highlight => "{==",
            RangeKind::Comment => "{>>",
        }
    }

    /// Closing bracket for this kind.
    pub fn close(self) -> &'static str {
        match self {
            RangeKind::Addition => "++}",
            RangeKind::Deletion => "--}",
            RangeKind::Substitution => "~~}",
            RangeKind::Highlight => "==}",
            RangeKind::Comment => "<<}",
        }
    }

    /// Number of syntax characters a range of this kind carries, excluding metadata.
    pub fn num_ignore_chars(self) -> usize {
        match self {
            RangeKind::Substitution => 2 * Self::BRACKET_LEN + Self::SEPARATOR.len(),
            _ => 2 * Self::BRACKET_LEN,
        }
    }

    /// True for the kinds that propose a change to the text.
    pub fn is_suggestion(self) -> bool {
        matches!(
            self,
            RangeKind::Addition | RangeKind::Deletion | RangeKind::Substitution
        )
    }
}

impl std::fmt::Display for RangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RangeKind::Addition => "addition",
            RangeKind::Deletion => "deletion",
            RangeKind::Substitution => "substitution",
            RangeKind::Highlight => "highlight",
            RangeKind::Comment => "comment",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_have_fixed_length() {
        for kind in RangeKind::ALL {
            assert_eq!(kind.open().len(), RangeKind::BRACKET_LEN);
            assert_eq!(kind.close().len(), RangeKind::BRACKET_LEN);
        }
    }

    #[test]
    fn ignore_chars() {
        assert_eq!(RangeKind::Addition.num_ignore_chars(), 6);
        assert_eq!(RangeKind::Substitution.num_ignore_chars(), 8);
    }
}
