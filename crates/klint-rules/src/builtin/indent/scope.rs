//! Scopes that contribute indentation, and where they open and close

use klint_core::{KtSyntaxKind, NodeId, SyntaxTree};

use KtSyntaxKind::*;

/// A construct that indents everything nested inside it by one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Multi-line expression such as a call chain; adds a continuation indent
    Expression {
        members: &'static [KtSyntaxKind],
        chaining: &'static [KtSyntaxKind],
    },
    /// Declaration whose `trigger` token is followed by a line break,
    /// e.g. `val a =` with the initializer on the next line
    Triggered {
        owner: KtSyntaxKind,
        trigger: KtSyntaxKind,
    },
    /// Bracket pair left open at the end of a line
    Delimiter {
        open: KtSyntaxKind,
        close: KtSyntaxKind,
    },
    /// Getter/setter block following a property declaration
    AccessorPair,
}

/// Every scope, in the order they are tested at each node
pub const SCOPES: [Scope; 9] = [
    Scope::Expression {
        members: &[DotQualifiedExpression, SafeAccessExpression],
        chaining: &[Dot, SafeAccess],
    },
    Scope::Expression {
        members: &[BinaryExpression],
        chaining: &[OperationReference],
    },
    Scope::Triggered {
        owner: Property,
        trigger: Eq,
    },
    Scope::Triggered {
        owner: Fun,
        trigger: Eq,
    },
    Scope::Delimiter {
        open: LBrace,
        close: RBrace,
    },
    Scope::Delimiter {
        open: LBracket,
        close: RBracket,
    },
    Scope::Delimiter {
        open: LParen,
        close: RParen,
    },
    Scope::Delimiter { open: Lt, close: Gt },
    Scope::AccessorPair,
];

const BRACKET_FAMILIES: [(KtSyntaxKind, KtSyntaxKind); 3] =
    [(LParen, RParen), (LBracket, RBracket), (LBrace, RBrace)];

impl Scope {
    /// Continuation scopes count towards `continuation_indent_size`
    pub fn is_continuation(self) -> bool {
        matches!(self, Scope::Expression { .. })
    }

    /// Whether this scope begins at `node`
    pub fn opens_here(self, tree: &SyntaxTree, node: NodeId) -> bool {
        let kind = tree.kind(node);
        match self {
            Scope::Expression { members, .. } => {
                members.contains(&kind)
                    && !tree
                        .parent(node)
                        .is_some_and(|parent| members.contains(&tree.kind(parent)))
            }
            Scope::Triggered { owner, trigger } => {
                kind == owner
                    && tree.children(node).windows(2).any(|pair| {
                        tree.kind(pair[0]) == trigger && is_line_break(tree, pair[1])
                    })
            }
            Scope::Delimiter { open, .. } => {
                kind == open && !is_comparison(tree, node) && balanced_until_eol(tree, node)
            }
            Scope::AccessorPair => first_accessor(tree, node)
                .is_some_and(|accessor| tree.next_sibling(node) == Some(accessor)),
        }
    }

    /// Whether this scope ends right before `node` is visited
    pub fn closes_before(self, tree: &SyntaxTree, node: NodeId) -> bool {
        let prev = tree.prev_sibling(node);
        match self {
            Scope::Expression { members, chaining } => {
                let Some(prev) = prev else {
                    return false;
                };
                if members.contains(&tree.kind(prev)) {
                    let chained = chaining.contains(&tree.kind(node))
                        || tree
                            .next_sibling(node)
                            .is_some_and(|next| chaining.contains(&tree.kind(next)));
                    !chained
                } else {
                    tree.descendants(prev)
                        .skip(1)
                        .any(|inner| members.contains(&tree.kind(inner)))
                }
            }
            Scope::Triggered { owner, .. } => prev.is_some_and(|prev| tree.kind(prev) == owner),
            Scope::Delimiter { close, .. } => {
                if is_comparison(tree, node) {
                    return false;
                }
                if is_line_break(tree, node) {
                    tree.next_sibling(node)
                        .is_some_and(|next| tree.kind(next) == close)
                } else {
                    tree.kind(node) == close
                        && !prev.is_some_and(|prev| is_line_break(tree, prev))
                }
            }
            Scope::AccessorPair => prev.is_some_and(|prev| tree.kind(prev) == Property),
        }
    }
}

/// Whitespace leaf holding at least one line break
pub fn is_line_break(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.kind(node) == Whitespace
        && tree
            .leaf_text(node)
            .is_some_and(|text| text.contains('\n'))
}

/// `<` and `>` used as binary operators rather than type brackets
fn is_comparison(tree: &SyntaxTree, node: NodeId) -> bool {
    matches!(tree.kind(node), Lt | Gt)
        && tree
            .parent(node)
            .is_some_and(|parent| tree.kind(parent) == OperationReference)
}

/// Each bracket family opened on the rest of the line is also closed on it
fn balanced_until_eol(tree: &SyntaxTree, node: NodeId) -> bool {
    let mut opened = [false; BRACKET_FAMILIES.len()];
    let mut closed = [false; BRACKET_FAMILIES.len()];

    for leaf in tree
        .next_leaves(node)
        .take_while(|&leaf| !is_line_break(tree, leaf))
    {
        let kind = tree.kind(leaf);
        for (family, (open, close)) in BRACKET_FAMILIES.iter().enumerate() {
            opened[family] |= kind == *open;
            closed[family] |= kind == *close;
        }
        // Every family is satisfied once each has been closed
        if closed.iter().all(|&seen| seen) {
            return true;
        }
    }

    opened.iter().zip(closed).all(|(&open, close)| !open || close)
}

/// First accessor of the outermost run of nested properties around `node`
fn first_accessor(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    let outermost = tree
        .ancestors(node)
        .skip_while(|&ancestor| tree.kind(ancestor) != Property)
        .take_while(|&ancestor| tree.kind(ancestor) == Property)
        .last()?;

    tree.children(outermost)
        .iter()
        .copied()
        .find(|&child| tree.kind(child) == PropertyAccessor)
}
