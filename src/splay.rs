//! A self-adjusting Binary Search Tree: every access moves the accessed key to the root.
//!
//! Splaying is done top-down. While searching, the nodes left behind are split into a
//! "left" tree (everything smaller than the key) and a "right" tree (everything larger),
//! and at the end they are hung off the node the search stopped at. When the search
//! goes the same direction twice in a row the grandparent is rotated first (zig-zig),
//! which is what roughly halves the depth of the nodes on the path.
//!
//! Frequently used keys end up near the root, and any sequence of `m` operations costs
//! `O(m lg N)` in total even though a single operation can be `O(N)`.
//!
//! # Examples
//!
//! ```
//! use ordset::{OrderedSet, SplayTree};
//!
//! let mut tree = SplayTree::new();
//! for key in [1, 2, 3] {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.to_string(), "(3,(2,(1,(),()),()),())");
//!
//! assert_eq!(tree.find(&1), Some(&1));
//! assert_eq!(tree.to_string(), "(1,(),(2,(),(3,(),())))");
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::util::{self, Branch, Link};
use crate::OrderedSet;

/// A top-down splay tree.
pub struct SplayTree<K> {
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

impl<K> Default for SplayTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SplayTree<K> {
    /// Generates a new, empty `SplayTree`.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }
}

fn children<K>(node: &Node<K>) -> (Option<&Node<K>>, Option<&Node<K>>) {
    (node.left.as_deref(), node.right.as_deref())
}

// Sorted inserts leave a path as long as the tree, so cloning and dropping walk it
// with an explicit stack.
impl<K: Clone> Clone for SplayTree<K> {
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

impl<K> Drop for SplayTree<K> {
    fn drop(&mut self) {
        util::drop_tree(self.root.take(), |n| (n.left.take(), n.right.take()));
    }
}

/// What a splay is looking for.
enum Target<'a, K> {
    /// An existing key. A miss splays the last node on the search path.
    Key(&'a K),
    /// A new node. A miss hangs it where the search ran off the tree and splays it.
    Leaf(Box<Node<K>>),
}

impl<K> Target<'_, K> {
    fn key(&self) -> &K {
        match self {
            Target::Key(key) => key,
            Target::Leaf(node) => &node.key,
        }
    }
}

/// Parks `node` on the side of the search it was left behind on.
fn park<K>(
    node: Box<Node<K>>,
    direction: Ordering,
    smaller: &mut Vec<Box<Node<K>>>,
    larger: &mut Vec<Box<Node<K>>>,
) {
    match direction {
        Ordering::Less => larger.push(node),
        Ordering::Greater => smaller.push(node),
        Ordering::Equal => unreachable!("The search stops at an equal key"),
    }
}

/// Brings the target key to the root of the subtree if it is present. Otherwise this brings up
/// the last node on its search path or, for [`Target::Leaf`], the newly attached leaf.
/// Returns the new root and whether a leaf was attached.
fn splay<K: Ord>(mut root: Box<Node<K>>, target: Target<'_, K>) -> (Box<Node<K>>, bool) {
    // Roots of the pieces split off to the left/right, from the top of the tree down. Every
    // piece in `smaller` is missing its right child, every piece in `larger` its left child.
    let mut smaller: Vec<Box<Node<K>>> = Vec::new();
    let mut larger: Vec<Box<Node<K>>> = Vec::new();
    let mut attached = false;

    loop {
        let direction = target.key().cmp(&root.key);
        let child = match direction {
            Ordering::Equal => break,
            Ordering::Less => root.left.take(),
            Ordering::Greater => root.right.take(),
        };
        let Some(mut child) = child else {
            if let Target::Leaf(leaf) = target {
                park(root, direction, &mut smaller, &mut larger);
                root = leaf;
                attached = true;
            }
            break;
        };

        if target.key().cmp(&child.key) != direction {
            // Zig (or the first half of a zig-zag).
            park(root, direction, &mut smaller, &mut larger);
            root = child;
            continue;
        }

        // Zig-zig: rotate the child above the root before moving down.
        let next = match direction {
            Ordering::Less => {
                root.left = child.right.take();
                child.right = Some(root);
                child.left.take()
            }
            _ => {
                root.right = child.left.take();
                child.left = Some(root);
                child.right.take()
            }
        };
        root = child;
        let Some(next) = next else {
            if let Target::Leaf(leaf) = target {
                park(root, direction, &mut smaller, &mut larger);
                root = leaf;
                attached = true;
            }
            break;
        };
        park(root, direction, &mut smaller, &mut larger);
        root = next;
    }

    let mut left = root.left.take();
    for mut node in smaller.into_iter().rev() {
        node.right = left;
        left = Some(node);
    }
    let mut right = root.right.take();
    for mut node in larger.into_iter().rev() {
        node.left = right;
        right = Some(node);
    }
    root.left = left;
    root.right = right;
    (root, attached)
}

impl<K: Ord> SplayTree<K> {
    fn splay(&mut self, key: &K) {
        if let Some(root) = self.root.take() {
            self.root = Some(splay(root, Target::Key(key)).0);
        }
    }
}

impl<K: Ord> OrderedSet<K> for SplayTree<K> {
    /// Splays `key` (or the last node on its search path) to the root, hit or miss.
    fn find(&mut self, key: &K) -> Option<&K> {
        self.splay(key);
        self.root
            .as_deref()
            .filter(|root| root.key == *key)
            .map(|root| &root.key)
    }

    /// Inserts `key` as a leaf (if it is new) and splays it to the root.
    fn insert(&mut self, key: K) {
        let leaf = Box::new(Node {
            key,
            left: None,
            right: None,
        });
        let (root, attached) = match self.root.take() {
            None => (leaf, true),
            Some(root) => splay(root, Target::Leaf(leaf)),
        };
        self.root = Some(root);
        if attached {
            self.len += 1;
        }
    }

    fn remove(&mut self, key: &K) {
        self.splay(key);
        let Some(mut root) = self.root.take() else {
            return;
        };
        if root.key != *key {
            self.root = Some(root);
            return;
        }

        let right = root.right.take();
        self.root = match root.left.take() {
            None => right,
            Some(left) => {
                // Everything on the left is smaller than `key`, so this brings the largest
                // of them up and leaves its right side free.
                let (mut left, _) = splay(left, Target::Key(key));
                left.right = right;
                Some(left)
            }
        };
        self.len -= 1;
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

impl<K: Ord + fmt::Display> fmt::Display for SplayTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        util::fmt_preorder(
            f,
            self.root.as_deref(),
            &util::children,
            &|n: &Node<K>, f: &mut fmt::Formatter<'_>| write!(f, "{}", n.key),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[i32]) -> SplayTree<i32> {
        let mut tree = SplayTree::new();
        for &key in keys {
            tree.insert(key);
            assert_eq!(tree.root.as_ref().map(|r| r.key), Some(key));
        }
        tree
    }

    #[test]
    fn empty() {
        let mut tree = SplayTree::<i32>::new();
        assert_eq!(tree.find(&1), None);
        tree.remove(&1);
        assert_eq!(tree.to_string(), "()");
        assert_eq!(tree.min(), None);
    }

    #[test]
    fn insert_splays_new_key() {
        let mut tree = tree_of(&[4]);
        assert_eq!(tree.find(&4), Some(&4));

        tree.insert(7);
        assert_eq!(tree.to_string(), "(7,(4,(),()),())");
    }

    #[test]
    fn zig_zig_halves_the_path() {
        let mut tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.to_string(), "(3,(2,(1,(),()),()),())");

        assert_eq!(tree.find(&1), Some(&1));
        assert_eq!(tree.to_string(), "(1,(),(2,(),(3,(),())))");
    }

    #[test]
    fn miss_splays_last_visited() {
        let mut tree = tree_of(&[1, 2, 3]);
        tree.find(&1);

        assert_eq!(tree.find(&4), None);
        assert_eq!(tree.to_string(), "(3,(2,(1,(),()),()),())");
    }

    #[test]
    fn zig_zag() {
        let mut tree = tree_of(&[10, 5, 20, 15]);
        assert_eq!(tree.to_string(), "(15,(10,(5,(),()),()),(20,(),()))");

        assert_eq!(tree.find(&12), None);
        assert_eq!(tree.to_string(), "(10,(5,(),()),(15,(),(20,(),())))");
    }

    #[test]
    fn remove_joins_subtrees() {
        let mut tree = tree_of(&[1, 2, 3]);
        tree.remove(&3);
        assert_eq!(tree.to_string(), "(2,(1,(),()),())");

        tree.remove(&7);
        assert_eq!(tree.to_string(), "(2,(1,(),()),())");
        assert_eq!(tree.len(), 2);

        tree.remove(&1);
        assert_eq!(tree.to_string(), "(2,(),())");
        tree.remove(&2);
        assert!(tree.is_empty());
        assert_eq!(tree.to_string(), "()");
    }

    #[test]
    fn remove_with_both_children_promotes_predecessor() {
        let mut tree = tree_of(&[10, 5, 20, 15]);
        tree.remove(&15);

        assert_eq!(tree.to_string(), "(10,(5,(),()),(20,(),()))");
        assert_eq!(tree.keys(), vec![&5, &10, &20]);
    }

    #[test]
    fn min_and_max_do_not_restructure() {
        let tree = tree_of(&[1, 2, 3]);

        assert_eq!(tree.min(), Some(&1));
        assert_eq!(tree.max(), Some(&3));
        assert_eq!(tree.to_string(), "(3,(2,(1,(),()),()),())");
    }

    #[test]
    fn duplicate_insert_splays_existing_key() {
        let mut tree = tree_of(&[1, 2, 3]);
        tree.insert(1);

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.to_string(), "(1,(),(2,(),(3,(),())))");
    }

    #[test]
    fn sorted_inserts_build_a_long_path() {
        const N: u32 = 500_000;
        let mut tree = SplayTree::new();
        for key in 0..N {
            tree.insert(key);
        }
        assert_eq!(tree.len(), N as usize);
        assert_eq!(tree.min(), Some(&0));

        let copy = tree.clone();
        let text = copy.to_string();
        assert!(text.starts_with("(499999,(499998,(499997,"));
        assert!(text.ends_with(",()),())"));
        drop(copy);

        // Splaying the deepest key walks the whole path once.
        assert_eq!(tree.find(&0), Some(&0));
        assert_eq!(tree.keys().len(), N as usize);
        drop(tree);
    }
}
