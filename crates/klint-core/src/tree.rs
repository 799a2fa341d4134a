//! Index-based syntax tree
//!
//! Rules walk a flattened copy of the rowan tree: nodes live in a single
//! vector, refer to each other through [`NodeId`]s, and carry their kind,
//! parent link, child list and start offset. Navigation never panics on
//! missing structure; absent parents or siblings come back as `None`.
//!
//! The only mutation supported is rewriting the text of a leaf. Offsets are
//! recorded once at construction and are not shifted by such rewrites.

use rowan::NodeOrToken;

use crate::cst::{KtSyntaxElement, KtSyntaxKind, KtSyntaxNode, ParseError, parse_kotlin};

/// Handle to a node inside a [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: KtSyntaxKind,
    parent: Option<NodeId>,
    /// Position in the parent's child list
    slot: usize,
    children: Vec<NodeId>,
    offset: usize,
    /// Token text; `None` for interior nodes
    text: Option<String>,
}

/// Arena syntax tree with parent and sibling navigation
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Parse Kotlin source straight into an arena tree
    pub fn parse(source: &str) -> (Self, Vec<ParseError>) {
        let (root, errors) = parse_kotlin(source);
        (Self::from_rowan(&root), errors)
    }

    /// Flatten a rowan tree
    ///
    /// Uses an explicit work stack, so arbitrarily deep trees do not grow
    /// the call stack.
    pub fn from_rowan(root: &KtSyntaxNode) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let mut stack: Vec<(KtSyntaxElement, Option<NodeId>)> =
            vec![(NodeOrToken::Node(root.clone()), None)];

        while let Some((element, parent)) = stack.pop() {
            let offset = u32::from(element.text_range().start()) as usize;
            match element {
                NodeOrToken::Node(node) => {
                    let id = tree.push(node.kind(), parent, offset, None);
                    let children: Vec<_> = node.children_with_tokens().collect();
                    stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
                }
                NodeOrToken::Token(token) => {
                    tree.push(token.kind(), parent, offset, Some(token.text().to_string()));
                }
            }
        }

        tree
    }

    fn push(
        &mut self,
        kind: KtSyntaxKind,
        parent: Option<NodeId>,
        offset: usize,
        text: Option<String>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let slot = match parent {
            Some(parent) => {
                let siblings = &mut self.nodes[parent.index()].children;
                siblings.push(id);
                siblings.len() - 1
            }
            None => 0,
        };
        self.nodes.push(NodeData {
            kind,
            parent,
            slot,
            children: Vec::new(),
            offset,
            text,
        });
        id
    }

    fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index())
    }

    /// The root node (the `File`)
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Kind of a node; unknown handles report [`KtSyntaxKind::Error`]
    pub fn kind(&self, id: NodeId) -> KtSyntaxKind {
        self.data(id).map_or(KtSyntaxKind::Error, |node| node.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.data(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.data(id)?;
        let slot = node.slot.checked_sub(1)?;
        self.children(node.parent?).get(slot).copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.data(id)?;
        self.children(node.parent?).get(node.slot + 1).copied()
    }

    /// A node without children (tokens, and empty interior nodes)
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.children(id).is_empty()
    }

    /// Text of a token; `None` for interior nodes
    pub fn leaf_text(&self, id: NodeId) -> Option<&str> {
        self.data(id)?.text.as_deref()
    }

    /// Start offset recorded when the tree was built
    pub fn offset(&self, id: NodeId) -> usize {
        self.data(id).map_or(0, |node| node.offset)
    }

    /// Source text covered by a node, reflecting any leaf rewrites
    pub fn node_text(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| self.leaf_text(node))
            .collect()
    }

    /// The whole source text, reflecting any leaf rewrites
    pub fn text(&self) -> String {
        self.node_text(self.root())
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    /// The node and everything below it, in pre-order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = if self.data(id).is_some() {
            vec![id]
        } else {
            Vec::new()
        };
        Descendants { tree: self, stack }
    }

    /// Leaves that follow the node in document order, outside its subtree
    pub fn next_leaves(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.next_leaf(id), move |&leaf| self.next_leaf(leaf))
    }

    fn next_leaf(&self, id: NodeId) -> Option<NodeId> {
        let mut node = id;
        loop {
            if let Some(next) = self.next_sibling(node) {
                return Some(self.first_leaf(next));
            }
            node = self.parent(node)?;
        }
    }

    fn first_leaf(&self, id: NodeId) -> NodeId {
        let mut node = id;
        while let Some(child) = self.first_child(node) {
            node = child;
        }
        node
    }

    /// Replace the text of a leaf, returning the previous text
    ///
    /// Interior nodes are left untouched and yield `None`.
    pub fn replace_leaf_text(&mut self, id: NodeId, text: impl Into<String>) -> Option<String> {
        let node = self.nodes.get_mut(id.index())?;
        let slot = node.text.as_mut()?;
        Some(std::mem::replace(slot, text.into()))
    }
}

/// Pre-order iterator returned by [`SyntaxTree::descendants`]
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(node).iter().rev().copied());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::GreenNodeBuilder;

    fn find(tree: &SyntaxTree, kind: KtSyntaxKind) -> NodeId {
        tree.descendants(tree.root())
            .find(|&id| tree.kind(id) == kind)
            .unwrap_or_else(|| panic!("no {kind:?}"))
    }

    #[test]
    fn test_lossless_text() {
        let source = "fun main() {\n\tval a = listOf(1, 2)\n}\n";
        let (tree, errors) = SyntaxTree::parse(source);
        assert!(errors.is_empty());
        assert_eq!(tree.text(), source);
        assert_eq!(tree.kind(tree.root()), KtSyntaxKind::File);
    }

    #[test]
    fn test_navigation() {
        let (tree, _) = SyntaxTree::parse("val a = b.c\n");
        let dot = find(&tree, KtSyntaxKind::Dot);
        let chain = tree.parent(dot).expect("chain");
        assert_eq!(tree.kind(chain), KtSyntaxKind::DotQualifiedExpression);

        let receiver = tree.prev_sibling(dot).expect("receiver");
        assert_eq!(tree.kind(receiver), KtSyntaxKind::ReferenceExpression);
        assert_eq!(tree.node_text(receiver), "b");
        let selector = tree.next_sibling(dot).expect("selector");
        assert_eq!(tree.node_text(selector), "c");
        assert_eq!(tree.prev_sibling(receiver), None);
        assert_eq!(tree.next_sibling(selector), None);

        assert_eq!(tree.offset(dot), 9);
        assert_eq!(tree.leaf_text(dot), Some("."));
        assert_eq!(tree.leaf_text(chain), None);

        let ancestors: Vec<_> = tree.ancestors(dot).map(|id| tree.kind(id)).collect();
        assert_eq!(
            ancestors,
            vec![
                KtSyntaxKind::DotQualifiedExpression,
                KtSyntaxKind::Property,
                KtSyntaxKind::File,
            ]
        );
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(tree.next_sibling(tree.root()), None);
    }

    #[test]
    fn test_next_leaves_skip_own_subtree() {
        let (tree, _) = SyntaxTree::parse("f(a)(b)");
        let first_args = find(&tree, KtSyntaxKind::ValueArgumentList);
        let texts: Vec<_> = tree
            .next_leaves(first_args)
            .filter_map(|id| tree.leaf_text(id))
            .collect();
        // The outer call holds `f(a)` and the second argument list
        assert_eq!(texts, vec!["(", "b", ")"]);
    }

    #[test]
    fn test_replace_leaf_text_keeps_offsets() {
        let (mut tree, _) = SyntaxTree::parse("fun f() {\n\tg()\n}");
        let whitespace = tree
            .descendants(tree.root())
            .find(|&id| tree.leaf_text(id) == Some("\n\t"))
            .expect("indent");
        let call = find(&tree, KtSyntaxKind::CallExpression);
        let before = tree.offset(call);

        assert_eq!(
            tree.replace_leaf_text(whitespace, "\n    ").as_deref(),
            Some("\n\t")
        );
        assert_eq!(tree.text(), "fun f() {\n    g()\n}");
        assert_eq!(tree.offset(call), before);

        let block = find(&tree, KtSyntaxKind::Block);
        assert_eq!(tree.replace_leaf_text(block, "x"), None);
    }

    #[test]
    fn test_hand_built_tree_with_missing_structure() {
        let mut builder = GreenNodeBuilder::new();
        builder.start_node(KtSyntaxKind::File.into());
        builder.start_node(KtSyntaxKind::DotQualifiedExpression.into());
        builder.finish_node();
        builder.token(rowan::SyntaxKind(4_000), "?");
        builder.finish_node();

        let tree = SyntaxTree::from_rowan(&KtSyntaxNode::new_root(builder.finish()));
        assert_eq!(tree.len(), 3);
        let chain = tree.first_child(tree.root()).expect("chain");
        assert!(tree.is_leaf(chain));
        assert_eq!(tree.first_child(chain), None);
        let unknown = tree.next_sibling(chain).expect("unknown token");
        assert_eq!(tree.kind(unknown), KtSyntaxKind::Error);
        assert_eq!(tree.next_leaves(chain).count(), 1);
    }
}
