//! Built-in rules and rule engine for klint
//!
//! The engine parses Kotlin sources into [`klint_core::SyntaxTree`]s and runs
//! rules over them, either reporting violations ([`RuleEngine::lint`]) or
//! reporting and fixing what can be fixed ([`RuleEngine::format`]).

pub mod builtin;
pub mod engine;

pub use builtin::IndentationRule;
pub use engine::{FormatReport, LintReport, Rule, RuleEngine};
