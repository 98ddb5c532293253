//! This crate exposes various choices for ordered sets, each one backed by a
//! different balancing strategy, mostly for educational purposes.
//!
//! ## Ordered sets
//!
//! An ordered set stores unique keys and supports finding, inserting and
//! removing them, as well as asking for the smallest and largest key. Every
//! structure in this crate implements the same [`OrderedSet`] trait so they can
//! be swapped for one another (and compared against one another).
//!
//! Most of the structures are Binary Search Trees (BSTs). The most important
//! invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! Searching takes `O(height)`, so what separates the trees below is how they
//! keep the height close to `O(lg N)`:
//!
//! | Structure | Strategy | Cost |
//! |---|---|---|
//! | [`SimpleBst`] | none | `O(N)` worst case |
//! | [`AvlTree`] | subtree heights differ by at most one, fixed with rotations | `O(lg N)` |
//! | [`RedBlackTree`] | node colors bound the longest path, fixed with rotations and recoloring | `O(lg N)` |
//! | [`ScapegoatTree`] | depth bound enforced by rebuilding whole subtrees | amortized `O(lg N)` |
//! | [`SplayTree`] | every access rotates the accessed node to the root | amortized `O(lg N)` |
//! | [`Treap`] | random priorities kept in max-heap order with rotations | expected `O(lg N)` |
//! | [`SkipList`] | random levels on a layered linked list | expected `O(lg N)` |
//!
//! # Examples
//!
//! ```
//! use ordset::{AvlTree, OrderedSet};
//!
//! let mut set = AvlTree::new();
//! for key in [4, 7, 10] {
//!     set.insert(key);
//! }
//!
//! assert_eq!(set.find(&7), Some(&7));
//! assert_eq!(set.find(&8), None);
//! assert_eq!(set.min(), Some(&4));
//! assert_eq!(set.max(), Some(&10));
//!
//! // The canonical form shows the shape (and the balance factor of each node).
//! assert_eq!(set.to_string(), "([0]7,([0]4,(),()),([0]10,(),()))");
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod avl;
pub mod error;
pub mod red_black;
pub mod scapegoat;
pub mod simple;
pub mod skip_list;
pub mod splay;
pub mod treap;

mod util;


use std::fmt;

pub use avl::AvlTree;
pub use error::{Error, Result};
pub use red_black::RedBlackTree;
pub use scapegoat::ScapegoatTree;
pub use simple::SimpleBst;
pub use skip_list::SkipList;
pub use splay::SplayTree;
pub use treap::Treap;

/// The operations shared by every set in this crate.
///
/// Inserting a key that is already present and removing a key that is absent
/// are both no-ops. Missing keys (and empty sets) are reported with `None`.
///
/// Every implementor also implements [`Display`](fmt::Display) (for displayable
/// keys), rendering the structure as a deterministic pre-order string like
/// `(key,left,right)` that tests can compare against exactly.
pub trait OrderedSet<K: Ord> {
    /// Looks up `key`, returning the stored key if it is present.
    ///
    /// This takes `&mut self` because some structures (see [`SplayTree`])
    /// restructure themselves on every lookup.
    fn find(&mut self, key: &K) -> Option<&K>;

    /// Inserts `key` if it isn't already present.
    fn insert(&mut self, key: K);

    /// Removes `key` if it is present.
    fn remove(&mut self, key: &K);

    /// The smallest key in the set.
    fn min(&self) -> Option<&K>;

    /// The largest key in the set.
    fn max(&self) -> Option<&K>;

    /// The number of keys in the set.
    fn len(&self) -> usize;

    /// All keys in ascending order.
    fn keys(&self) -> Vec<&K>;

    /// Renders the current shape as a Graphviz `digraph`, with an explicit
    /// `null` point for every missing child.
    fn to_dot(&self) -> String
    where
        K: fmt::Display;

    /// Whether `key` is in the set. See [`find`][OrderedSet::find].
    fn contains(&mut self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Whether the set has no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
