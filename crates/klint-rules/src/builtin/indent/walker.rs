//! Pre-order traversal maintaining the stack of open scopes

use std::collections::HashSet;

use klint_core::{KtSyntaxKind, NodeId, SyntaxTree};

use super::emitter::Emitter;
use super::scope::{SCOPES, Scope};

/// Indentation levels contributed by the open scopes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Depth {
    pub normal: usize,
    pub continuation: usize,
}

impl Depth {
    pub fn of(scopes: &[Scope]) -> Self {
        let continuation = scopes.iter().filter(|scope| scope.is_continuation()).count();
        Self {
            normal: scopes.len() - continuation,
            continuation,
        }
    }
}

/// Walk the whole tree, handing every checked whitespace leaf to the emitter
pub fn walk(tree: &mut SyntaxTree, emitter: &mut Emitter<'_>, autocorrect: bool) {
    let mut scopes: Vec<Scope> = Vec::new();
    let mut pending = vec![tree.root()];

    while let Some(node) = pending.pop() {
        // A scope closed here is never closed twice in the same visit
        let mut popped = HashSet::new();
        while let Some(&top) = scopes.last() {
            if popped.contains(&top) || !top.closes_before(tree, node) {
                break;
            }
            tracing::trace!("Closing {:?} before {:?}", top, tree.kind(node));
            popped.insert(top);
            scopes.pop();
        }

        for scope in SCOPES {
            if scope.opens_here(tree, node) {
                tracing::trace!("Opening {:?} at {:?}", scope, tree.kind(node));
                scopes.push(scope);
            }
        }

        if tree.is_leaf(node) {
            if is_checked_whitespace(tree, node) {
                emitter.check_whitespace(tree, node, Depth::of(&scopes), autocorrect);
            }
        } else {
            pending.extend(tree.children(node).iter().rev().copied());
        }
    }
}

/// Whitespace whose indentation is meaningful
///
/// Whitespace in front of comments and `where` clauses, and whitespace
/// within comments or type constraints, is left alone.
fn is_checked_whitespace(tree: &SyntaxTree, node: NodeId) -> bool {
    if tree.kind(node) != KtSyntaxKind::Whitespace {
        return false;
    }

    if let Some(next) = tree.next_sibling(node) {
        let next_kind = tree.kind(next);
        let starts_with_comment = tree
            .first_child(next)
            .is_some_and(|child| tree.kind(child).is_comment());
        if next_kind.is_comment() || starts_with_comment || next_kind == KtSyntaxKind::WhereKw {
            return false;
        }
    }

    !tree.ancestors(node).any(|ancestor| {
        let kind = tree.kind(ancestor);
        kind.is_comment() || kind == KtSyntaxKind::TypeConstraintList
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whitespace(tree: &SyntaxTree) -> Vec<NodeId> {
        tree.descendants(tree.root())
            .filter(|&id| tree.kind(id) == KtSyntaxKind::Whitespace)
            .collect()
    }

    #[test]
    fn test_depth_counts_kinds_separately() {
        let depth = Depth::of(&[SCOPES[4], SCOPES[0], SCOPES[6], SCOPES[1]]);
        assert_eq!(
            depth,
            Depth {
                normal: 2,
                continuation: 2
            }
        );
        assert_eq!(Depth::of(&[]), Depth::default());
    }

    #[test]
    fn test_whitespace_before_comment_is_skipped() {
        let (tree, _) = SyntaxTree::parse("fun f() {\n  // note\n    g()\n}\n");
        let checked: Vec<bool> = whitespace(&tree)
            .into_iter()
            .map(|id| is_checked_whitespace(&tree, id))
            .collect();
        // `fun f`, `f() {`, before the comment, before `g`, before `}`, trailing
        assert_eq!(checked, vec![true, true, false, true, true, true]);
    }

    #[test]
    fn test_where_clause_is_skipped() {
        let (tree, _) =
            SyntaxTree::parse("fun <T> f(t: T)\n    where T : A,\n          T : B {\n}\n");
        for id in whitespace(&tree) {
            let inside_constraints = tree
                .ancestors(id)
                .any(|ancestor| tree.kind(ancestor) == KtSyntaxKind::TypeConstraintList);
            let before_where = tree
                .next_sibling(id)
                .is_some_and(|next| tree.kind(next) == KtSyntaxKind::WhereKw);
            if inside_constraints || before_where {
                assert!(!is_checked_whitespace(&tree, id));
            }
        }
    }

    #[test]
    fn test_non_whitespace_is_never_checked() {
        let (tree, _) = SyntaxTree::parse("val a = 1\n");
        assert!(!is_checked_whitespace(&tree, tree.root()));
    }
}
