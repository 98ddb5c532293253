//! A self-balancing Binary Search Tree where every node is colored red or black.
//!
//! The colors bound the height of the tree:
//!
//! 1. The root is black and missing children count as black leaves.
//! 2. A red node never has a red child.
//! 3. Every path from a node down to a missing child passes the same number of
//!    black nodes (the "black height").
//!
//! Together these mean the longest path is at most twice the shortest one.
//! Inserts and deletes restore the rules with recoloring and rotations.
//!
//! Fixing the tree up after an insert or delete walks from the changed node
//! toward the root, so nodes need a way to reach their parent. Rather than
//! aliasing pointers, nodes live in an arena and refer to each other by index;
//! every rotation keeps the parent indices in sync.
//!
//! # Examples
//!
//! ```
//! use ordset::{OrderedSet, RedBlackTree};
//!
//! let mut tree = RedBlackTree::new();
//! for key in [10, 15, 5, 13, 12, 11] {
//!     tree.insert(key);
//! }
//! tree.remove(&5);
//!
//! assert_eq!(
//!     tree.to_string(),
//!     "([B]13,([R]11,([B]10,(),()),([B]12,(),())),([B]15,(),()))"
//! );
//! assert_eq!(tree.black_height(), 2);
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::util;
use crate::OrderedSet;

type Idx = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Clone)]
struct Node<K> {
    key: K,
    color: Color,
    parent: Option<Idx>,
    left: Option<Idx>,
    right: Option<Idx>,
}

/// A red-black tree. See the [module documentation][self] for the invariants it keeps.
#[derive(Clone)]
pub struct RedBlackTree<K> {
    /// Slots for every node ever allocated. Removed nodes leave a `None` that `free` recycles.
    nodes: Vec<Option<Node<K>>>,
    free: Vec<Idx>,
    root: Option<Idx>,
    len: usize,
}

impl<K> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RedBlackTree<K> {
    /// Generates a new, empty `RedBlackTree`.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// The number of black nodes on any path from the root to a missing child. Every path has
    /// the same count, so this follows the leftmost one. An empty tree has a black height of 0.
    pub fn black_height(&self) -> usize {
        let mut count = 0;
        let mut node = self.root;
        while let Some(i) = node {
            if self.node(i).color == Color::Black {
                count += 1;
            }
            node = self.node(i).left;
        }
        count
    }

    fn node(&self, i: Idx) -> &Node<K> {
        self.nodes[i]
            .as_ref()
            .expect("Indices reachable from the root point at live nodes")
    }

    fn node_mut(&mut self, i: Idx) -> &mut Node<K> {
        self.nodes[i]
            .as_mut()
            .expect("Indices reachable from the root point at live nodes")
    }

    fn alloc(&mut self, node: Node<K>) -> Idx {
        match self.free.pop() {
            Some(i) => {
                self.nodes[i] = Some(node);
                i
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, i: Idx) {
        self.nodes[i] = None;
        self.free.push(i);
    }

    fn parent(&self, i: Idx) -> Option<Idx> {
        self.node(i).parent
    }

    fn left(&self, i: Idx) -> Option<Idx> {
        self.node(i).left
    }

    fn right(&self, i: Idx) -> Option<Idx> {
        self.node(i).right
    }

    fn child(&self, i: Idx, side: Side) -> Option<Idx> {
        match side {
            Side::Left => self.left(i),
            Side::Right => self.right(i),
        }
    }

    /// Missing children are black.
    fn color(&self, i: Option<Idx>) -> Color {
        i.map_or(Color::Black, |i| self.node(i).color)
    }

    fn set_color(&mut self, i: Idx, color: Color) {
        self.node_mut(i).color = color;
    }

    fn side_of(&self, parent: Idx, child: Idx) -> Side {
        if self.left(parent) == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Points whatever referenced `old` (its parent, or the root) at `new` instead.
    fn replace_child(&mut self, parent: Option<Idx>, old: Idx, new: Option<Idx>) {
        if let Some(new) = new {
            self.node_mut(new).parent = parent;
        }
        match parent {
            None => self.root = new,
            Some(p) => match self.side_of(p, old) {
                Side::Left => self.node_mut(p).left = new,
                Side::Right => self.node_mut(p).right = new,
            },
        }
    }

    /// Rotate `x` to the left. This moves its right child up vertically and `x` down vertically.
    ///
    /// ## Panics
    ///
    /// When called on a node without a right child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///     parent                parent
    ///       |                     |
    ///       x                     y
    ///      / \                   / \
    ///     a   y      rotate ->  x   c
    ///        / \               / \
    ///       b   c             a   b
    /// ```
    fn rotate_left(&mut self, x: Idx) {
        let y = self.right(x).expect("Rotate left => right child");
        let b = self.left(y);
        let parent = self.parent(x);

        self.node_mut(x).right = b;
        if let Some(b) = b {
            self.node_mut(b).parent = Some(x);
        }
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);
    }

    /// Mirror image of [`rotate_left`][Self::rotate_left].
    fn rotate_right(&mut self, x: Idx) {
        let y = self.left(x).expect("Rotate right => left child");
        let b = self.right(y);
        let parent = self.parent(x);

        self.node_mut(x).left = b;
        if let Some(b) = b {
            self.node_mut(b).parent = Some(x);
        }
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);
    }

    fn rotate(&mut self, x: Idx, side: Side) {
        match side {
            Side::Left => self.rotate_left(x),
            Side::Right => self.rotate_right(x),
        }
    }

    /// Restores the invariants after `x` was inserted as a red leaf. The only rule that can be
    /// broken is "no red node has a red child", between `x` and its parent.
    fn insert_fixup(&mut self, mut x: Idx) {
        while let Some(mut parent) = self.parent(x) {
            if self.node(parent).color == Color::Black {
                break;
            }
            let grandparent = self
                .parent(parent)
                .expect("A red parent is never the root");
            let side = self.side_of(grandparent, parent);
            let far = match side {
                Side::Left => Side::Right,
                Side::Right => Side::Left,
            };
            let uncle = self.child(grandparent, far);

            if self.color(uncle) == Color::Red {
                // Push the grandparent's blackness down a level and retry from there.
                self.set_color(parent, Color::Black);
                self.set_color(uncle.expect("Red => present"), Color::Black);
                self.set_color(grandparent, Color::Red);
                x = grandparent;
                continue;
            }

            // Bent line: straighten it so x, parent and grandparent lie on one side.
            if self.side_of(parent, x) != side {
                self.rotate(parent, side);
                parent = x;
            }
            // Straight line: one rotation at the grandparent and a recolor.
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, far);
            break;
        }

        let root = self.root.expect("Fixing up an insert => non-empty tree");
        self.set_color(root, Color::Black);
    }

    /// Restores the black height after a black node was spliced out from `parent`'s `side`,
    /// leaving `x` (possibly missing) one black short: "double black".
    fn remove_fixup(&mut self, mut x: Option<Idx>, mut parent: Option<Idx>, mut side: Side) {
        while let Some(p) = parent {
            if self.color(x) == Color::Red {
                break;
            }
            #[cfg(feature = "tracing")]
            tracing::trace!(parent = p, ?side, "red-black: double black");

            let far = match side {
                Side::Left => Side::Right,
                Side::Right => Side::Left,
            };
            // The other side is a black node taller than `x`, so the sibling exists.
            let mut sibling = self.child(p, far).expect("Double black => sibling");

            if self.node(sibling).color == Color::Red {
                // Make the sibling black by rotating the red one above the parent.
                self.set_color(sibling, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, side);
                sibling = self.child(p, far).expect("Double black => sibling");
            }

            let near_child = self.child(sibling, side);
            let far_child = self.child(sibling, far);
            if self.color(near_child) == Color::Black && self.color(far_child) == Color::Black {
                // Take one black away from both sides and push the problem up.
                self.set_color(sibling, Color::Red);
                x = Some(p);
                parent = self.parent(p);
                if let Some(grandparent) = parent {
                    side = self.side_of(grandparent, p);
                }
                continue;
            }

            if self.color(far_child) == Color::Black {
                // Only the near child is red: rotate it up so the far child is the red one.
                self.set_color(near_child.expect("Red => present"), Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, far);
                sibling = self.child(p, far).expect("Double black => sibling");
            }

            let parent_color = self.node(p).color;
            self.set_color(sibling, parent_color);
            self.set_color(p, Color::Black);
            let far_child = self.child(sibling, far).expect("Red far child => present");
            self.set_color(far_child, Color::Black);
            self.rotate(p, side);
            x = self.root;
            break;
        }

        if let Some(x) = x {
            self.set_color(x, Color::Black);
        }
    }

    fn locate(&self, key: &K) -> Option<Idx>
    where
        K: Ord,
    {
        let mut node = self.root;
        while let Some(i) = node {
            node = match key.cmp(&self.node(i).key) {
                Ordering::Less => self.left(i),
                Ordering::Equal => return Some(i),
                Ordering::Greater => self.right(i),
            };
        }
        None
    }

    fn rightmost(&self, mut i: Idx) -> Idx {
        while let Some(right) = self.right(i) {
            i = right;
        }
        i
    }

    fn leftmost(&self, mut i: Idx) -> Idx {
        while let Some(left) = self.left(i) {
            i = left;
        }
        i
    }

    fn swap_keys(&mut self, a: Idx, b: Idx) {
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.nodes.split_at_mut(high);
        let low = head[low].as_mut().expect("Live node");
        let high = tail[0].as_mut().expect("Live node");
        std::mem::swap(&mut low.key, &mut high.key);
    }

    /// Picks the node to physically unlink when deleting `target`: the node itself if it has at
    /// most one child, otherwise its predecessor after taking over the predecessor's key.
    /// Returns the node to unlink and its only (possibly missing) child.
    fn detach_candidate(&mut self, target: Idx) -> (Idx, Option<Idx>) {
        match (self.left(target), self.right(target)) {
            (Some(left), Some(_)) => {
                let predecessor = self.rightmost(left);
                self.swap_keys(target, predecessor);
                (predecessor, self.left(predecessor))
            }
            (left, right) => (target, left.or(right)),
        }
    }

    fn children(&self, i: Idx) -> (Option<Idx>, Option<Idx>) {
        (self.left(i), self.right(i))
    }
}

impl<K: Ord> OrderedSet<K> for RedBlackTree<K> {
    fn find(&mut self, key: &K) -> Option<&K> {
        self.locate(key).map(|i| &self.node(i).key)
    }

    fn insert(&mut self, key: K) {
        let mut parent = None;
        let mut node = self.root;
        let mut side = Side::Left;
        while let Some(i) = node {
            parent = Some(i);
            (node, side) = match key.cmp(&self.node(i).key) {
                Ordering::Less => (self.left(i), Side::Left),
                Ordering::Equal => return,
                Ordering::Greater => (self.right(i), Side::Right),
            };
        }

        let new = self.alloc(Node {
            key,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        });
        match (parent, side) {
            (None, _) => self.root = Some(new),
            (Some(p), Side::Left) => self.node_mut(p).left = Some(new),
            (Some(p), Side::Right) => self.node_mut(p).right = Some(new),
        }
        self.len += 1;
        self.insert_fixup(new);
    }

    fn remove(&mut self, key: &K) {
        let Some(target) = self.locate(key) else {
            return;
        };
        let (removed, child) = self.detach_candidate(target);
        let parent = self.parent(removed);
        let removed_color = self.node(removed).color;

        match parent {
            // The root is being removed: its child (if any) becomes the new, black, root.
            None => {
                self.replace_child(None, removed, child);
                if let Some(child) = child {
                    self.set_color(child, Color::Black);
                }
            }
            Some(p) => {
                let side = self.side_of(p, removed);
                self.replace_child(parent, removed, child);
                if removed_color == Color::Red || self.color(child) == Color::Red {
                    if let Some(child) = child {
                        self.set_color(child, Color::Black);
                    }
                } else {
                    self.remove_fixup(child, parent, side);
                }
            }
        }

        self.release(removed);
        self.len -= 1;
    }

    fn min(&self) -> Option<&K> {
        self.root.map(|i| &self.node(self.leftmost(i)).key)
    }

    fn max(&self) -> Option<&K> {
        self.root.map(|i| &self.node(self.rightmost(i)).key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn keys(&self) -> Vec<&K> {
        util::in_order(self.root, |i| self.children(i), |i| &self.node(i).key)
    }

    fn to_dot(&self) -> String
    where
        K: fmt::Display,
    {
        util::dot(
            self.root,
            |i| self.children(i),
            |i| self.node(i).key.to_string(),
            |i| match self.node(i).color {
                Color::Red => "shape=circle, style=filled, fillcolor=red".to_string(),
                Color::Black => {
                    "shape=circle, style=filled, fillcolor=black, fontcolor=white".to_string()
                }
            },
        )
    }
}

/// Each node is prefixed with its color, e.g. `([B]10,([R]5,(),()),())`.
impl<K: Ord + fmt::Display> fmt::Display for RedBlackTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        util::fmt_preorder(
            f,
            self.root,
            &|i| self.children(i),
            &|i: Idx, f: &mut fmt::Formatter<'_>| {
                let node = self.node(i);
                let color = match node.color {
                    Color::Red => 'R',
                    Color::Black => 'B',
                };
                write!(f, "[{color}]{}", node.key)
            },
        )
    }
}
