//! A self-balancing Binary Search Tree (specifically, an AVL tree).
//!
//! Every node caches the height of its subtree. After an insert or delete, the
//! nodes on the path back to the root recompute their height and, if their two
//! subtrees differ in height by more than one, rotate to fix it.
//!
//! # Examples
//!
//! ```
//! use ordset::{AvlTree, OrderedSet};
//!
//! let mut tree = AvlTree::new();
//! for key in 1..=7 {
//!     tree.insert(key);
//! }
//!
//! // Sorted inserts still produce a perfectly balanced tree.
//! assert_eq!(tree.height(), 3);
//! assert_eq!(tree.find(&6), Some(&6));
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::util::{self, Branch, Link};
use crate::OrderedSet;

/// A self-balancing Binary Search Tree (specifically, an AVL tree).
#[derive(Clone)]
pub struct AvlTree<K> {
    root: Link<Node<K>>,
    len: usize,
}

#[derive(Clone)]
struct Node<K> {
    key: K,
    left: Link<Node<K>>,
    right: Link<Node<K>>,

    /// How many levels are in the subtree rooted at this node.
    /// A node with no children has a height of 1.
    height: usize,
}

fn height<K>(link: &Link<Node<K>>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

impl<K> Node<K> {
    fn new(key: K) -> Self {
        Self {
            key,
            left: None,
            right: None,
            height: 1,
        }
    }

    /// Adjusts the height of `self` to be the max of its children's heights + 1.
    fn fix_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    /// The difference in height between the left and right subtrees. See [the Wikipedia
    /// page][wiki] for more details.
    ///
    /// [wiki]: https://en.wikipedia.org/wiki/AVL_tree#Balance_factor
    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

impl<K: Ord> Branch for Node<K> {
    type Key = K;

    fn key(&self) -> &K {
        &self.key
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    fn left_link(&mut self) -> &mut Link<Self> {
        &mut self.left
    }

    fn right_link(&mut self) -> &mut Link<Self> {
        &mut self.right
    }

    fn refresh(&mut self) {
        self.fix_height();
    }
}

/// Recomputes the height of the subtree root in `link` and rotates if it is out of balance.
///
/// See <https://en.wikipedia.org/wiki/AVL_tree#Rebalancing> for terminology.
fn rebalance<K: Ord>(link: &mut Link<Node<K>>) {
    let Some(node) = link else {
        return;
    };
    node.fix_height();

    match node.balance_factor() {
        2 => {
            let left = node.left.as_mut().expect("Left heavy => left child");
            // Left-Right: straighten the bend first.
            if left.balance_factor() < 0 {
                util::rotate_left(left);
            }
            util::rotate_right(node);
        }
        -2 => {
            let right = node.right.as_mut().expect("Right heavy => right child");
            // Right-Left
            if right.balance_factor() > 0 {
                util::rotate_right(right);
            }
            util::rotate_left(node);
        }
        -1..=1 => {}
        n => unreachable!("AVL node reached balance factor {n}"),
    }

    if cfg!(debug_assertions) {
        let node = link.as_ref().expect("Rebalancing keeps the subtree non-empty");
        assert_eq!(
            node.height,
            height(&node.left).max(height(&node.right)) + 1
        );
        assert!(node.balance_factor().abs() <= 1);
    }
}

fn insert<K: Ord>(link: &mut Link<Node<K>>, key: K) -> bool {
    let inserted = match link {
        None => {
            *link = Some(Box::new(Node::new(key)));
            return true;
        }
        Some(node) => match key.cmp(&node.key) {
            Ordering::Less => insert(&mut node.left, key),
            Ordering::Equal => false,
            Ordering::Greater => insert(&mut node.right, key),
        },
    };
    if inserted {
        rebalance(link);
    }
    inserted
}

fn remove<K: Ord>(link: &mut Link<Node<K>>, key: &K) -> bool {
    let Some(node) = link else {
        return false;
    };
    let removed = match key.cmp(&node.key) {
        Ordering::Less => remove(&mut node.left, key),
        Ordering::Greater => remove(&mut node.right, key),
        Ordering::Equal => {
            match (node.left.is_some(), node.right.is_some()) {
                (false, false) => *link = None,
                (true, false) => *link = node.left.take(),
                (false, true) => *link = node.right.take(),
                // Promote the predecessor: the largest key of the left subtree.
                (true, true) => node.key = take_largest(&mut node.left),
            }
            true
        }
    };
    if removed {
        rebalance(link);
    }
    removed
}

/// Detaches the largest node of a non-empty subtree, rebalancing on the way back up, and
/// returns its key.
fn take_largest<K: Ord>(link: &mut Link<Node<K>>) -> K {
    let node = link.as_mut().expect("Taking the largest key => non-empty subtree");
    if node.right.is_some() {
        let key = take_largest(&mut node.right);
        rebalance(link);
        return key;
    }
    let node = link.take().expect("Checked above");
    let Node { key, left, .. } = *node;
    *link = left;
    key
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> AvlTree<K> {
    /// Generates a new, empty `AvlTree`.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// The number of levels in the tree. An empty tree has a height of 0.
    pub fn height(&self) -> usize {
        height(&self.root)
    }
}

impl<K: Ord> OrderedSet<K> for AvlTree<K> {
    fn find(&mut self, key: &K) -> Option<&K> {
        util::find(self.root.as_deref(), key).map(|n| &n.key)
    }

    fn insert(&mut self, key: K) {
        if insert(&mut self.root, key) {
            self.len += 1;
        }
    }

    fn remove(&mut self, key: &K) {
        if remove(&mut self.root, key) {
            self.len -= 1;
        }
    }

    fn min(&self) -> Option<&K> {
        self.root.as_deref().map(|n| &util::leftmost(n).key)
    }

    fn max(&self) -> Option<&K> {
        self.root.as_deref().map(|n| &util::rightmost(n).key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn keys(&self) -> Vec<&K> {
        util::keys(self.root.as_deref())
    }

    /// Nodes are triangles tilted toward their taller subtree.
    fn to_dot(&self) -> String
    where
        K: fmt::Display,
    {
        util::dot(
            self.root.as_deref(),
            util::children,
            |n| n.key.to_string(),
            |n| match n.balance_factor() {
                b if b > 0 => "shape=triangle, orientation=20".to_string(),
                b if b < 0 => "shape=triangle, orientation=-20".to_string(),
                _ => "shape=triangle".to_string(),
            },
        )
    }
}

/// Each node is prefixed with its balance factor, e.g. `([-1]4,(),([0]7,(),()))`.
impl<K: Ord + fmt::Display> fmt::Display for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        util::fmt_preorder(
            f,
            self.root.as_deref(),
            &util::children,
            &|n: &Node<K>, f: &mut fmt::Formatter<'_>| {
                write!(f, "[{}]{}", n.balance_factor(), n.key)
            },
        )
    }
}
