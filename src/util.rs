//! Traversal, rotation and rendering helpers shared by the trees.
//!
//! The boxed trees (everything but the arena based [`RedBlackTree`][crate::RedBlackTree])
//! expose their nodes through [`Branch`] so searching, rotating and printing are
//! written once. The rendering helpers only need a way to get from a node handle
//! to its children, so they work for arena indices too.

use std::fmt;

/// An owned, possibly empty, subtree.
pub(crate) type Link<N> = Option<Box<N>>;

/// A node of a boxed binary search tree.
pub(crate) trait Branch: Sized {
    type Key: Ord;

    fn key(&self) -> &Self::Key;
    fn left(&self) -> Option<&Self>;
    fn right(&self) -> Option<&Self>;
    fn left_link(&mut self) -> &mut Link<Self>;
    fn right_link(&mut self) -> &mut Link<Self>;

    /// Called on both nodes after a rotation relinks them, lower node first.
    /// Trees caching subtree metadata (e.g. heights) recompute it here.
    fn refresh(&mut self) {}
}

pub(crate) fn children<N: Branch>(node: &N) -> (Option<&N>, Option<&N>) {
    (node.left(), node.right())
}

pub(crate) fn find<'a, N: Branch>(mut node: Option<&'a N>, key: &N::Key) -> Option<&'a N> {
    while let Some(n) = node {
        node = match key.cmp(n.key()) {
            std::cmp::Ordering::Less => n.left(),
            std::cmp::Ordering::Equal => return Some(n),
            std::cmp::Ordering::Greater => n.right(),
        };
    }
    None
}

pub(crate) fn leftmost<N: Branch>(mut node: &N) -> &N {
    while let Some(left) = node.left() {
        node = left;
    }
    node
}

pub(crate) fn rightmost<N: Branch>(mut node: &N) -> &N {
    while let Some(right) = node.right() {
        node = right;
    }
    node
}

/// Rotate the subtree in `link` to the right. This moves the left child up vertically and the
/// current root down vertically.
///
/// ## Panics
///
/// When called on a node without a left child.
///
/// # Diagram
///
/// ```text
///      old_root               new_root
///       /     \               /     \
///   new_root   z   rotate -> x    old_root
///    /   \                          /   \
///   x     y                        y     z
/// ```
pub(crate) fn rotate_right<N: Branch>(link: &mut Box<N>) {
    let mut new_root = link
        .left_link()
        .take()
        .expect("Rotate right => left child");
    *link.left_link() = new_root.right_link().take();
    std::mem::swap(link, &mut new_root);

    // `new_root` now holds the old root.
    let mut old_root = new_root;
    old_root.refresh();
    *link.right_link() = Some(old_root);
    link.refresh();
}

/// Mirror image of [`rotate_right`]: the right child moves up.
///
/// ## Panics
///
/// When called on a node without a right child.
pub(crate) fn rotate_left<N: Branch>(link: &mut Box<N>) {
    let mut new_root = link
        .right_link()
        .take()
        .expect("Rotate left => right child");
    *link.right_link() = new_root.left_link().take();
    std::mem::swap(link, &mut new_root);

    let mut old_root = new_root;
    old_root.refresh();
    *link.left_link() = Some(old_root);
    link.refresh();
}

/// Collects the keys reachable from `root` in ascending order without recursing, so
/// degenerate (list shaped) trees don't blow the stack.
pub(crate) fn in_order<'a, N, K, C, F>(root: Option<N>, children: C, key: F) -> Vec<&'a K>
where
    N: Copy,
    K: 'a,
    C: Fn(N) -> (Option<N>, Option<N>),
    F: Fn(N) -> &'a K,
{
    let mut keys = Vec::new();
    let mut stack = Vec::new();
    let mut current = root;
    loop {
        while let Some(node) = current {
            stack.push(node);
            current = children(node).0;
        }
        let Some(node) = stack.pop() else {
            return keys;
        };
        keys.push(key(node));
        current = children(node).1;
    }
}

/// [`in_order`] for boxed trees.
pub(crate) fn keys<N: Branch>(root: Option<&N>) -> Vec<&N::Key> {
    in_order(root, |n| (n.left(), n.right()), |n| n.key())
}

/// Writes the canonical `(label,left,right)` form. An empty subtree is `()`.
///
/// Uses an explicit stack, like [`in_order`].
pub(crate) fn fmt_preorder<N, C, L>(
    f: &mut fmt::Formatter<'_>,
    node: Option<N>,
    children: &C,
    label: &L,
) -> fmt::Result
where
    N: Copy,
    C: Fn(N) -> (Option<N>, Option<N>),
    L: Fn(N, &mut fmt::Formatter<'_>) -> fmt::Result,
{
    enum Step<N> {
        Subtree(Option<N>),
        Text(&'static str),
    }

    let mut stack = vec![Step::Subtree(node)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => f.write_str(text)?,
            Step::Subtree(None) => f.write_str("()")?,
            Step::Subtree(Some(node)) => {
                f.write_str("(")?;
                label(node, f)?;
                f.write_str(",")?;
                let (left, right) = children(node);
                stack.extend([
                    Step::Text(")"),
                    Step::Subtree(right),
                    Step::Text(","),
                    Step::Subtree(left),
                ]);
            }
        }
    }
    Ok(())
}

/// Deep-copies the tree below `root` without recursing. `copy` clones one node and
/// hangs the given (already copied) children off it.
pub(crate) fn clone_tree<N, C, F>(root: Option<&N>, children: C, copy: F) -> Link<N>
where
    C: Fn(&N) -> (Option<&N>, Option<&N>),
    F: Fn(&N, Link<N>, Link<N>) -> N,
{
    // Pre-order: every node is followed by its left subtree, then its right one.
    let mut order = Vec::new();
    let mut pending: Vec<&N> = root.into_iter().collect();
    while let Some(node) = pending.pop() {
        order.push(node);
        let (left, right) = children(node);
        pending.extend(right);
        pending.extend(left);
    }

    // Backwards, both subtrees of a node are finished before it, the left one on top.
    let mut built: Vec<Box<N>> = Vec::new();
    for node in order.into_iter().rev() {
        let (left, right) = children(node);
        let left = left.and_then(|_| built.pop());
        let right = right.and_then(|_| built.pop());
        built.push(Box::new(copy(node, left, right)));
    }
    built.pop()
}

/// Frees a tree one node at a time. Dropping a `Box` chain directly recurses once per
/// level, which overflows the stack on list shaped trees.
pub(crate) fn drop_tree<N, D>(root: Link<N>, detach: D)
where
    D: Fn(&mut N) -> (Link<N>, Link<N>),
{
    let mut stack: Vec<Box<N>> = root.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        let (left, right) = detach(&mut node);
        stack.extend(left);
        stack.extend(right);
    }
}

/// Renders a binary tree as a Graphviz `digraph`, one `rank=same` group per depth.
///
/// `name` gives the node's identifier (its key) and `attrs` the contents of its
/// `[...]` attribute list. Every missing child is drawn as its own `nullN` point.
pub(crate) fn dot<N, C, I, A>(root: Option<N>, children: C, name: I, attrs: A) -> String
where
    N: Copy,
    C: Fn(N) -> (Option<N>, Option<N>),
    I: Fn(N) -> String,
    A: Fn(N) -> String,
{
    let mut out = String::from("digraph {\n");
    let mut nulls = 0;
    let mut level: Vec<N> = root.into_iter().collect();

    while !level.is_empty() {
        out.push_str(" { rank=same; ");
        for &node in &level {
            out.push_str(&name(node));
            out.push_str("; ");
        }
        out.push_str("}\n");

        let mut next_level = Vec::with_capacity(level.len() * 2);
        for &node in &level {
            let id = name(node);
            out.push_str(&format!("{id} [{}];\n", attrs(node)));

            let (left, right) = children(node);
            for child in [left, right] {
                match child {
                    Some(child) => {
                        out.push_str(&format!("{id}->{}\n", name(child)));
                        next_level.push(child);
                    }
                    None => {
                        out.push_str(&format!("null{nulls} [shape=point];\n{id}->null{nulls}\n"));
                        nulls += 1;
                    }
                }
            }
        }
        level = next_level;
    }

    out.push_str("}\n");
    out
}
