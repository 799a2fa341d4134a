//! Turns measured whitespace into diagnostics and tab corrections

use klint_core::{
    Diagnostic, EditorConfig, KtSyntaxKind, NodeId, Severity, SourceMap, SyntaxTree,
};

use super::RULE_ID;
use super::walker::Depth;

/// Collects the diagnostics of one rule invocation
pub struct Emitter<'a> {
    source: &'a str,
    source_map: SourceMap,
    indent_size: usize,
    continuation_indent_size: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Emitter<'a> {
    /// `source` is the tree text before any correction; offsets refer to it
    pub fn new(source: &'a str, config: &EditorConfig) -> Self {
        Self {
            source,
            source_map: SourceMap::new(source),
            indent_size: config.indent_size(),
            continuation_indent_size: config.continuation_indent_size(),
            diagnostics: Vec::new(),
        }
    }

    pub fn check_whitespace(
        &mut self,
        tree: &mut SyntaxTree,
        leaf: NodeId,
        depth: Depth,
        autocorrect: bool,
    ) {
        let Some(text) = tree.leaf_text(leaf) else {
            return;
        };
        let text = text.to_owned();
        let offset = tree.offset(leaf);

        let in_parameter_list = tree
            .ancestors(leaf)
            .any(|ancestor| tree.kind(ancestor) == KtSyntaxKind::ValueParameterList);
        self.check_lines(&text, offset, depth, in_parameter_list);

        if let Some(tab) = text.find('\t') {
            self.push(
                offset + tab,
                "Unexpected Tab character(s)".to_string(),
                true,
            );
            if autocorrect {
                let spaces = " ".repeat(self.indent_size);
                tree.replace_leaf_text(leaf, text.replace('\t', &spaces));
            }
        }
    }

    /// Sorted diagnostics; equal offsets keep emission order
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|diagnostic| diagnostic.location.offset);
        self.diagnostics
    }

    fn check_lines(&mut self, text: &str, offset: usize, depth: Depth, in_parameter_list: bool) {
        let lines: Vec<&str> = text.split('\n').collect();
        let Some((last, leading)) = lines.split_last() else {
            return;
        };
        if leading.is_empty() {
            return;
        }

        let mut line_start = offset;
        for line in leading {
            // `\r` belongs to the line break itself
            let content = line.strip_suffix('\r').unwrap_or(line);
            if !content.is_empty() {
                self.push(
                    line_start,
                    format!(
                        "Unexpected indentation ({}) (it should be 0)",
                        content.chars().count()
                    ),
                    false,
                );
            }
            line_start += line.len() + 1;
        }

        let actual = last.chars().count();
        let expected =
            depth.normal * self.indent_size + depth.continuation * self.continuation_indent_size;
        if actual != expected && !in_parameter_list {
            self.push(
                line_start,
                format!("Unexpected indentation ({actual}) (it should be {expected})"),
                false,
            );
        }
    }

    fn push(&mut self, offset: usize, message: String, auto_correctable: bool) {
        let location = self.source_map.location(offset, self.source);
        tracing::debug!("{}:{} {}", location.line, location.column, message);
        self.diagnostics.push(
            Diagnostic::new(RULE_ID, Severity::Error, message, location)
                .with_auto_correct(auto_correctable),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(source: &str, depth: Depth, autocorrect: bool) -> (Vec<Diagnostic>, String) {
        let (mut tree, _) = SyntaxTree::parse(source);
        let leaf = tree
            .descendants(tree.root())
            .find(|&id| {
                tree.kind(id) == KtSyntaxKind::Whitespace
                    && tree.leaf_text(id).is_some_and(|text| text.contains('\n'))
            })
            .expect("line break");
        let original = tree.text();
        let mut emitter = Emitter::new(&original, &EditorConfig::new(4, 4));
        emitter.check_whitespace(&mut tree, leaf, depth, autocorrect);
        let diagnostics = emitter.finish();
        (diagnostics, tree.text())
    }

    fn one_level() -> Depth {
        Depth {
            normal: 1,
            continuation: 0,
        }
    }

    #[test]
    fn test_matching_indentation() {
        let (diagnostics, _) = emit("fun f() {\n    g()\n}", one_level(), false);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_mismatch_points_at_last_line() {
        let (diagnostics, _) = emit("fun f() {\n  g()\n}", one_level(), false);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Unexpected indentation (2) (it should be 4)"
        );
        assert_eq!((diagnostics[0].line(), diagnostics[0].column()), (2, 1));
        assert!(!diagnostics[0].auto_correctable);
    }

    #[test]
    fn test_blank_lines_must_be_empty() {
        let (diagnostics, _) = emit("fun f() {\n  \n    g()\n}", one_level(), false);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Unexpected indentation (2) (it should be 0)"
        );
        assert_eq!(diagnostics[0].line(), 2);
    }

    #[test]
    fn test_crlf_line_breaks() {
        let (diagnostics, _) = emit("fun f() {\r\n    g()\r\n}", one_level(), false);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_tabs_reported_and_replaced() {
        let source = "fun f() {\n\tg()\n}";
        let (diagnostics, _) = emit(source, one_level(), false);
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Unexpected indentation (1) (it should be 4)",
                "Unexpected Tab character(s)"
            ]
        );
        assert!(diagnostics[1].auto_correctable);

        let (_, fixed) = emit(source, one_level(), true);
        assert_eq!(fixed, "fun f() {\n    g()\n}");
    }
}
