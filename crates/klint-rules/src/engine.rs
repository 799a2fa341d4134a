//! Rule engine implementation

use klint_core::{
    Diagnostic, EditorConfig, KlintError, ParseError, Result, ResultExt, SyntaxTree,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

use crate::builtin;

/// A lint rule that inspects (and may correct) a syntax tree
///
/// Rules are shared across threads by [`RuleEngine::lint_batch`]; any state a
/// rule needs while visiting a tree lives in the `visit` call itself.
pub trait Rule: Send + Sync {
    /// Stable identifier reported on every diagnostic
    fn id(&self) -> &'static str;

    /// Check a tree, rewriting it in place when `autocorrect` is set
    fn visit(
        &self,
        tree: &mut SyntaxTree,
        config: &EditorConfig,
        autocorrect: bool,
    ) -> Result<Vec<Diagnostic>>;
}

/// Outcome of linting one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintReport {
    /// Diagnostics of all rules, ordered by offset
    pub diagnostics: Vec<Diagnostic>,
    /// Problems the parser recovered from
    #[serde(skip)]
    pub parse_errors: Vec<ParseError>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Outcome of formatting one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatReport {
    /// Source text after all corrections
    pub output: String,
    /// Diagnostics found while formatting, corrected or not
    pub diagnostics: Vec<Diagnostic>,
    pub parse_errors: Vec<ParseError>,
}

impl FormatReport {
    pub fn changed(&self, source: &str) -> bool {
        self.output != source
    }
}

/// Runs a fixed set of rules over Kotlin sources
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    /// Engine with every built-in rule
    pub fn new() -> Self {
        Self {
            rules: builtin::builtin_rules(),
        }
    }

    /// Engine with an explicit rule set; rule ids must be unique
    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id()) {
                return Err(KlintError::rule_error(
                    rule.id(),
                    "Rule with this id is already registered",
                ));
            }
        }
        Ok(Self { rules })
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Lint one source without modifying it
    pub fn lint(&self, source: &str, config: &EditorConfig) -> LintReport {
        let (mut tree, parse_errors) = SyntaxTree::parse(source);
        let diagnostics = self.run(&mut tree, config, false);
        LintReport {
            diagnostics,
            parse_errors,
        }
    }

    /// Lint one source and apply every available correction
    pub fn format(&self, source: &str, config: &EditorConfig) -> FormatReport {
        let (mut tree, parse_errors) = SyntaxTree::parse(source);
        let diagnostics = self.run(&mut tree, config, true);
        FormatReport {
            output: tree.text(),
            diagnostics,
            parse_errors,
        }
    }

    /// Lint many sources in parallel
    ///
    /// Each source gets its own tree and diagnostics; reports come back in
    /// input order.
    pub fn lint_batch<S>(&self, sources: &[S], config: &EditorConfig) -> Vec<LintReport>
    where
        S: AsRef<str> + Sync,
    {
        tracing::debug!("Linting {} sources in parallel", sources.len());
        sources
            .par_iter()
            .map(|source| self.lint(source.as_ref(), config))
            .collect()
    }

    /// Run every rule over a tree and order the combined diagnostics
    pub fn run(
        &self,
        tree: &mut SyntaxTree,
        config: &EditorConfig,
        autocorrect: bool,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for rule in &self.rules {
            match rule.visit(tree, config, autocorrect).log_and_continue() {
                Ok(Some(mut rule_diagnostics)) => {
                    tracing::trace!(
                        "Rule '{}' produced {} diagnostic(s)",
                        rule.id(),
                        rule_diagnostics.len()
                    );
                    diagnostics.append(&mut rule_diagnostics);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Failed to execute rule '{}': {}", rule.id(), e);
                    // Continue with other rules even if one fails
                }
            }
        }

        diagnostics.sort_by_key(|diagnostic| diagnostic.location.offset);
        diagnostics
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::IndentationRule;

    struct FailingRule;

    impl Rule for FailingRule {
        fn id(&self) -> &'static str {
            "failing"
        }

        fn visit(
            &self,
            _tree: &mut SyntaxTree,
            _config: &EditorConfig,
            _autocorrect: bool,
        ) -> Result<Vec<Diagnostic>> {
            Err(KlintError::rule_error("failing", "always fails"))
        }
    }

    #[test]
    fn test_default_engine_has_indent_rule() {
        assert_eq!(RuleEngine::new().rule_ids(), vec!["indent"]);
    }

    #[test]
    fn test_duplicate_rule_ids_are_rejected() {
        let result = RuleEngine::with_rules(vec![
            Box::new(IndentationRule),
            Box::new(IndentationRule),
        ]);
        assert!(matches!(result, Err(KlintError::Rule { .. })));
    }

    #[test]
    fn test_failing_rule_does_not_stop_others() {
        let engine =
            RuleEngine::with_rules(vec![Box::new(FailingRule), Box::new(IndentationRule)])
                .expect("engine");
        let report = engine.lint("fun f() {\n  g()\n}\n", &EditorConfig::default());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].rule_id, "indent");
    }

    #[test]
    fn test_clean_source() {
        let engine = RuleEngine::new();
        let source = "fun f() {\n    g()\n}\n";
        let report = engine.lint(source, &EditorConfig::default());
        assert!(report.is_clean());
        assert!(report.parse_errors.is_empty());

        let formatted = engine.format(source, &EditorConfig::default());
        assert!(!formatted.changed(source));
    }
}
