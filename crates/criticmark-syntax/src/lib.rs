//! # criticmark-syntax
//!
//! A lossless syntax tree for suggestion markup (`{++added++}`,
//! `{--deleted--}`, `{~~old~>new~~}`, `{==highlight==}`, `{>>comment<<}`)
//! using [Rowan] + [Logos], following the [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree → ranges()
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! Tokenizes every bracket, the `~>` separator and the `@@` metadata
//! sentinel. Every byte of input lands in some token.
//!
//! ### 2. Parser ([`parser`] module)
//!
//! Pairs each opening bracket with the first closing bracket of the same
//! kind. Ranges never nest; an opener with no closer is plain text.
//!
//! ### 3. Range extraction ([`ranges`] module)
//!
//! Flattens the tree to [`ParsedRange`] values with byte offsets, which is
//! what the engine builds its range collection from.
//!
//! ## Module Structure
//!
//! ```text
//! criticmark-syntax/
//! ├── lib.rs           # This file - public API and tree snapshots
//! ├── kinds.rs         # RangeKind and the bracket constants
//! ├── syntax_kind.rs   # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs         # Logos-based tokenizer
//! ├── ranges.rs        # Tree → ParsedRange extraction
//! └── parser/
//!     ├── mod.rs       # Parser struct, Marker system, public parse() function
//!     ├── event.rs     # Event enum (Start, Token, Finish, Placeholder)
//!     ├── sink.rs      # Converts events to Rowan GreenNode
//!     └── grammar/
//!         ├── mod.rs   # Root loop
//!         └── range.rs # One bracketed range
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use criticmark_syntax::{ranges, RangeKind};
//!
//! let found = ranges("Hello {++big ++}world");
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].kind, RangeKind::Addition);
//! assert_eq!((found[0].from, found[0].to), (6, 16));
//! ```

pub mod kinds;
pub mod lexer;
pub mod parser;
pub mod ranges;
pub mod syntax_kind;

pub use kinds::RangeKind;
pub use parser::parse;
pub use ranges::{ParsedRange, ranges, ranges_from_tree};
pub use syntax_kind::{CriticLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
