//! Concrete Syntax Tree (CST) for Kotlin sources
//!
//! This module implements a lossless syntax tree using the Rowan library.
//! Every byte of the input, whitespace and comments included, is kept in the
//! tree so that `parse(source).text() == source` always holds.
//!
//! ## Architecture
//!
//! - [`lex_with_trivia`] turns source text into [`CstToken`]s. A run of
//!   spaces, tabs and line breaks is one `Whitespace` token.
//! - [`parse_kotlin`] builds a rowan green tree whose node layout follows
//!   the Kotlin PSI (dot-qualified chains, binary expressions with an
//!   operation reference, blocks that own their braces, and so on).
//! - [`KotlinLanguage`] connects [`KtSyntaxKind`] to rowan.
//!
//! Rules do not walk rowan nodes directly; they work on the index-based
//! [`crate::tree::SyntaxTree`] built from the rowan root.
//!
//! ## Example
//!
//! ```rust,ignore
//! use klint_core::cst::{KtSyntaxKind, parse_kotlin};
//!
//! let (cst, errors) = parse_kotlin("val a = b.c()\n");
//! assert!(errors.is_empty());
//! assert!(cst
//!     .descendants()
//!     .any(|node| node.kind() == KtSyntaxKind::DotQualifiedExpression));
//! ```

mod language;
mod lexer;
mod parser;
mod syntax_kind;

pub use language::{KotlinLanguage, KtSyntaxElement, KtSyntaxNode, KtSyntaxToken};
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use parser::{ParseError, parse_kotlin};
pub use syntax_kind::KtSyntaxKind;
