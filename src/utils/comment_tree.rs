// src/utils/comment_tree.rs

use std::collections::HashMap;

use serde::Serialize;

/// Anything that can be placed in a reply tree.
///
/// Implemented by comment rows fetched from the database; tests implement it
/// for lightweight stand-ins.
pub trait Threaded {
    fn id(&self) -> i64;
    fn parent_id(&self) -> Option<i64>;
}

/// One comment in the rendered reply tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode<C> {
    pub comment: C,
    /// Nesting depth, 0 for top-level comments.
    pub indent: usize,
    pub child_comments: Vec<CommentNode<C>>,
}

impl<C> CommentNode<C> {
    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        1 + self.child_comments.iter().map(CommentNode::subtree_size).sum::<usize>()
    }

    /// Pre-order walk yielding `(indent, comment)` in display order.
    pub fn flatten(&self) -> Vec<(usize, &C)> {
        let mut out = Vec::with_capacity(self.subtree_size());
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<(usize, &'a C)>) {
        out.push((self.indent, &self.comment));
        for child in &self.child_comments {
            child.flatten_into(out);
        }
    }
}

/// Deepest indent a comment is displayed at. Replies below it are listed
/// flat under the ancestor at `MAX_INDENT - 1`, in display order.
pub const MAX_INDENT: usize = 16;

/// Builds the reply tree for a single post.
///
/// The input order is kept for roots and for the children of every node.
/// Comments whose parent is missing from `comments` (or point at
/// themselves) are promoted to roots in place. Comments caught in a parent
/// cycle are never reachable from a root; they are promoted after the main
/// pass so that each input comment appears exactly once in the output.
///
/// Neither the walk nor the assembly recurses, and the result is never
/// nested deeper than [`MAX_INDENT`], however long a reply chain is.
pub fn build_comment_tree<C: Threaded>(comments: Vec<C>) -> Vec<CommentNode<C>> {
    let n = comments.len();
    let mut position: HashMap<i64, usize> = HashMap::with_capacity(n);
    for (idx, comment) in comments.iter().enumerate() {
        position.entry(comment.id()).or_insert(idx);
    }

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (idx, comment) in comments.iter().enumerate() {
        match comment
            .parent_id()
            .and_then(|pid| position.get(&pid).copied())
            .filter(|&parent| parent != idx)
        {
            Some(parent) => children[parent].push(idx),
            None => roots.push(idx),
        }
    }

    let mut walk = Walk {
        placed: vec![false; n],
        indent: vec![0; n],
        shown_under: vec![Vec::new(); n],
        visited: Vec::with_capacity(n),
        top: Vec::new(),
    };
    for idx in roots {
        walk.run(idx, &children);
    }
    // Whatever is left sits on a parent cycle.
    for idx in 0..n {
        if !walk.placed[idx] {
            tracing::warn!(
                comment_id = comments[idx].id(),
                "comment is part of a parent cycle, promoted to top level"
            );
            walk.run(idx, &children);
        }
    }

    // Pre-order puts every node before its descendants, so assembling in
    // reverse finds all children already built.
    let mut arena: Vec<Option<C>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentNode<C>>> = (0..n).map(|_| None).collect();
    for &idx in walk.visited.iter().rev() {
        let child_comments = walk.shown_under[idx]
            .iter()
            .filter_map(|&kid| built[kid].take())
            .collect();
        if let Some(comment) = arena[idx].take() {
            built[idx] = Some(CommentNode {
                comment,
                indent: walk.indent[idx],
                child_comments,
            });
        }
    }

    walk.top
        .into_iter()
        .filter_map(|idx| built[idx].take())
        .collect()
}

/// Depth-first placement state shared by every root.
struct Walk {
    placed: Vec<bool>,
    indent: Vec<usize>,
    /// Display children per node, after depth capping.
    shown_under: Vec<Vec<usize>>,
    /// Pre-order of every placed node.
    visited: Vec<usize>,
    top: Vec<usize>,
}

impl Walk {
    fn run(&mut self, root: usize, children: &[Vec<usize>]) {
        self.top.push(root);
        // (node, indent, node it is displayed under)
        let mut stack = vec![(root, 0usize, None::<usize>)];
        while let Some((idx, indent, shown_under)) = stack.pop() {
            if self.placed[idx] {
                continue;
            }
            self.placed[idx] = true;
            self.indent[idx] = indent;
            self.visited.push(idx);
            if let Some(parent) = shown_under {
                self.shown_under[parent].push(idx);
            }

            let (kid_indent, kid_parent) = if indent < MAX_INDENT {
                (indent + 1, idx)
            } else {
                // at the cap: siblings of this node instead of children
                (indent, shown_under.unwrap_or(idx))
            };
            for &kid in children[idx].iter().rev() {
                if !self.placed[kid] {
                    stack.push((kid, kid_indent, Some(kid_parent)));
                }
            }
        }
    }
}
