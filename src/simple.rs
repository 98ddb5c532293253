//! An unbalanced Binary Search Tree. This is the reference the balanced trees are
//! checked against: it orders keys exactly like they do but never restructures
//! itself, so inserting sorted keys degrades it into a linked list.
//!
//! # Examples
//!
//! ```
//! use ordset::{OrderedSet, SimpleBst};
//!
//! let mut tree = SimpleBst::new();
//! for key in [4, 7, 10, 6, 2, 5] {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.to_string(), "(4,(2,(),()),(7,(6,(5,(),()),()),(10,(),())))");
//!
//! // Removing a node with two children promotes its predecessor.
//! tree.remove(&7);
//! assert_eq!(tree.to_string(), "(4,(2,(),()),(6,(5,(),()),(10,(),())))");
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::util::{self, Branch, Link};
use crate::OrderedSet;

/// An unbalanced Binary Search Tree.
pub struct SimpleBst<K> {
    root: Link<Node<K>>,
    len: usize,
}

struct Node<K> {
    key: K,
    left: Link<Node<K>>,
    right: Link<Node<K>>,
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
}

impl<K> Default for SimpleBst<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SimpleBst<K> {
    /// Generates a new, empty `SimpleBst`.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }
}

/// Inserts `key` below `link`, returning whether a node was created.
fn insert<K: Ord>(mut link: &mut Link<Node<K>>, key: K) -> bool {
    while let Some(node) = link {
        link = match key.cmp(&node.key) {
            Ordering::Less => &mut node.left,
            Ordering::Equal => return false,
            Ordering::Greater => &mut node.right,
        };
    }
    *link = Some(Box::new(Node {
        key,
        left: None,
        right: None,
    }));
    true
}

/// Removes `key` from below `link`, returning whether a node was removed.
fn remove<K: Ord>(mut link: &mut Link<Node<K>>, key: &K) -> bool {
    loop {
        match link.as_deref().map(|node| key.cmp(&node.key)) {
            None => return false,
            Some(Ordering::Equal) => break,
            Some(Ordering::Less) => link = &mut link.as_mut().expect("Checked above").left,
            Some(Ordering::Greater) => link = &mut link.as_mut().expect("Checked above").right,
        }
    }

    let node = link.as_mut().expect("Stopped at the key");
    match (node.left.is_some(), node.right.is_some()) {
        (false, false) => *link = None,
        (true, false) => *link = node.left.take(),
        (false, true) => *link = node.right.take(),
        (true, true) => node.key = take_largest(&mut node.left),
    }
    true
}

/// Detaches the largest node of a non-empty subtree and returns its key.
fn take_largest<K>(mut link: &mut Link<Node<K>>) -> K {
    while link.as_ref().is_some_and(|node| node.right.is_some()) {
        link = &mut link.as_mut().expect("Checked above").right;
    }
    let node = link
        .take()
        .expect("Taking the largest key => non-empty subtree");
    let Node { key, left, .. } = *node;
    *link = left;
    key
}

fn children<K>(node: &Node<K>) -> (Option<&Node<K>>, Option<&Node<K>>) {
    (node.left.as_deref(), node.right.as_deref())
}

impl<K: Clone> Clone for SimpleBst<K> {
    fn clone(&self) -> Self {
        let root = util::clone_tree(self.root.as_deref(), children, |n, left, right| Node {
            key: n.key.clone(),
            left,
            right,
        });
        Self {
            root,
            len: self.len,
        }
    }
}

impl<K> Drop for SimpleBst<K> {
    fn drop(&mut self) {
        util::drop_tree(self.root.take(), |n| (n.left.take(), n.right.take()));
    }
}

impl<K: Ord> OrderedSet<K> for SimpleBst<K> {
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

    fn to_dot(&self) -> String
    where
        K: fmt::Display,
    {
        util::dot(
            self.root.as_deref(),
            util::children,
            |n| n.key.to_string(),
            |_| "shape=circle".to_string(),
        )
    }
}

impl<K: Ord + fmt::Display> fmt::Display for SimpleBst<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        util::fmt_preorder(
            f,
            self.root.as_deref(),
            &util::children,
            &|n: &Node<K>, f: &mut fmt::Formatter<'_>| write!(f, "{}", n.key),
        )
    }
}
