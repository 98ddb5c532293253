//! A randomized Binary Search Tree (treap).
//!
//! Every node gets a random priority when it is created, and the tree is kept in
//! BST order by key and in max-heap order by priority: no node has a child with
//! a higher priority. For a given set of keys and priorities there is exactly one
//! such tree, the one you'd get by inserting the keys from highest to lowest
//! priority into an unbalanced BST. Since priorities are independent of the keys,
//! that is a random insertion order and the expected depth is `O(lg N)`.
//!
//! Priorities come from a [`rand::Rng`], which can be seeded for reproducible shapes.
//!
//! # Examples
//!
//! ```
//! use ordset::{OrderedSet, Treap};
//!
//! let mut a = Treap::with_seed(7);
//! let mut b = Treap::with_seed(7);
//! for key in 0..32 {
//!     a.insert(key);
//!     b.insert(key);
//! }
//!
//! // Same seed, same priorities, same shape.
//! assert_eq!(a.to_string(), b.to_string());
//! assert_eq!(a.priority_of(&3), b.priority_of(&3));
//! assert_eq!(a.priority_of(&32), None);
//! ```

use std::cmp::Ordering;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::util::{self, Branch, Link};
use crate::OrderedSet;

/// Priorities are sampled from `0..PRIORITY_LIMIT`.
pub const PRIORITY_LIMIT: u32 = 10_000;

/// A treap whose priorities are drawn from `R`.
#[derive(Clone)]
pub struct Treap<K, R = StdRng> {
    root: Link<Node<K>>,
    len: usize,
    rng: R,
}

#[derive(Clone)]
struct Node<K> {
    key: K,
    priority: u32,
    left: Link<Node<K>>,
    right: Link<Node<K>>,
}

impl<K> Node<K> {
    fn new(key: K, priority: u32) -> Self {
        Self {
            key,
            priority,
            left: None,
            right: None,
        }
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
}

impl<K> Default for Treap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Treap<K> {
    /// Generates a new, empty `Treap` with priorities seeded from system entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Generates a new, empty `Treap` whose priorities (and so its shapes) are determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<K, R: Rng> Treap<K, R> {
    /// Generates a new, empty `Treap` drawing priorities from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            root: None,
            len: 0,
            rng,
        }
    }

    /// The priority `key` was given when it was inserted, if it is present.
    pub fn priority_of(&self, key: &K) -> Option<u32>
    where
        K: Ord,
    {
        util::find(self.root.as_deref(), key).map(|n| n.priority)
    }
}

/// Inserts `key` with `priority` below `link`, rotating it up past lower priority ancestors.
/// Returns whether a node was created.
fn insert<K: Ord>(link: &mut Link<Node<K>>, key: K, priority: u32) -> bool {
    let Some(node) = link else {
        *link = Some(Box::new(Node::new(key, priority)));
        return true;
    };
    match key.cmp(&node.key) {
        Ordering::Less => {
            let inserted = insert(&mut node.left, key, priority);
            if node.left.as_ref().is_some_and(|l| l.priority > node.priority) {
                util::rotate_right(node);
            }
            inserted
        }
        Ordering::Equal => false,
        Ordering::Greater => {
            let inserted = insert(&mut node.right, key, priority);
            if node.right.as_ref().is_some_and(|r| r.priority > node.priority) {
                util::rotate_left(node);
            }
            inserted
        }
    }
}

/// Removes `key` from below `link`, returning whether a node was removed.
fn remove<K: Ord>(link: &mut Link<Node<K>>, key: &K) -> bool {
    let Some(node) = link else {
        return false;
    };
    match key.cmp(&node.key) {
        Ordering::Less => remove(&mut node.left, key),
        Ordering::Greater => remove(&mut node.right, key),
        Ordering::Equal => {
            sink(link);
            true
        }
    }
}

/// Rotates the node in `link` down, always lifting its higher priority child, until it is a
/// leaf, then drops it.
fn sink<K: Ord>(link: &mut Link<Node<K>>) {
    let node = link.as_mut().expect("Sinking => node to sink");
    let left = node.left.as_ref().map(|n| n.priority);
    let right = node.right.as_ref().map(|n| n.priority);
    match (left, right) {
        (None, None) => *link = None,
        (Some(_), None) => {
            util::rotate_right(node);
            sink(&mut node.right);
        }
        (Some(left), Some(right)) if left > right => {
            util::rotate_right(node);
            sink(&mut node.right);
        }
        _ => {
            util::rotate_left(node);
            sink(&mut node.left);
        }
    }
}

impl<K: Ord, R: Rng> OrderedSet<K> for Treap<K, R> {
    fn find(&mut self, key: &K) -> Option<&K> {
        util::find(self.root.as_deref(), key).map(|n| &n.key)
    }

    fn insert(&mut self, key: K) {
        // Duplicates don't consume a priority, so equal seeds give equal shapes.
        if util::find(self.root.as_deref(), &key).is_some() {
            return;
        }
        let priority = self.rng.gen_range(0..PRIORITY_LIMIT);
        if insert(&mut self.root, key, priority) {
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

    /// Nodes are filled with a hue picked by their priority and labeled with both their key and
    /// their priority.
    fn to_dot(&self) -> String
    where
        K: fmt::Display,
    {
        util::dot(
            self.root.as_deref(),
            util::children,
            |n| n.key.to_string(),
            |n| {
                let hue = f64::from(n.priority) / f64::from(PRIORITY_LIMIT);
                format!(
                    "shape=circle, style=filled, fillcolor=\"{hue:.3} 0.400 1.000\", \
                     label=<{}<BR /><FONT POINT-SIZE=\"10\">{}</FONT>>",
                    n.key, n.priority
                )
            },
        )
    }
}

/// Each node is prefixed with its priority, e.g. `([9120]4,(),([77]6,(),()))`.
impl<K: Ord + fmt::Display, R> fmt::Display for Treap<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        util::fmt_preorder(
            f,
            self.root.as_deref(),
            &util::children,
            &|n: &Node<K>, f: &mut fmt::Formatter<'_>| write!(f, "[{}]{}", n.priority, n.key),
        )
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;

    use super::tests::assert_treap;
    use super::*;
    use crate::test::quick::Op;

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(seed: u64, ops: Vec<Op<i8>>) -> bool {
            let mut treap = Treap::with_seed(seed);
            let mut set = BTreeSet::new();

            for op in &ops {
                op.apply(&mut treap, &mut set);
                assert_treap(&treap);
            }
            treap.keys().into_iter().eq(set.iter())
        }
    }
}
