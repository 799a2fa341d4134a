//! Indentation rule
//!
//! Expected indentation is derived from the scopes enclosing each line break:
//! braces, brackets and parentheses left open at the end of a line, property
//! and function initializers that start on the next line, and property
//! accessors each add one `indent_size`; multi-line call chains and binary
//! expressions add one `continuation_indent_size`.
//!
//! ```kotlin
//! fun main() {
//!     val total =
//!         items
//!             .map { it.price }
//!             .sum()
//! }
//! ```
//!
//! Tabs in indentation are reported separately and, in format mode, replaced
//! by `indent_size` spaces. Indentation mismatches are never corrected.

mod emitter;
pub mod scope;
mod walker;

use klint_core::{Diagnostic, EditorConfig, Result, SyntaxTree};

use crate::engine::Rule;
use emitter::Emitter;

pub use scope::{SCOPES, Scope};
pub use walker::Depth;

pub const RULE_ID: &str = "indent";

/// Checks indentation against `indent_size` / `continuation_indent_size`
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentationRule;

impl IndentationRule {
    /// Check a tree; with `autocorrect`, tabs are rewritten in place
    ///
    /// Diagnostic offsets always refer to the text the tree held on entry.
    pub fn check(
        &self,
        tree: &mut SyntaxTree,
        config: &EditorConfig,
        autocorrect: bool,
    ) -> Vec<Diagnostic> {
        if !config.is_enabled() {
            tracing::debug!(
                "Skipping '{}': indent_size {:?} disables the rule",
                RULE_ID,
                config.indent_size
            );
            return Vec::new();
        }

        let source = tree.text();
        let mut emitter = Emitter::new(&source, config);
        walker::walk(tree, &mut emitter, autocorrect);
        emitter.finish()
    }
}

impl Rule for IndentationRule {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn visit(
        &self,
        tree: &mut SyntaxTree,
        config: &EditorConfig,
        autocorrect: bool,
    ) -> Result<Vec<Diagnostic>> {
        Ok(self.check(tree, config, autocorrect))
    }
}
