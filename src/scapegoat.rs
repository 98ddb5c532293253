//! A Binary Search Tree that stays shallow by rebuilding subtrees instead of rotating.
//!
//! Nodes carry no balancing metadata. The tree is configured with a balance
//! factor `α` in `[0.5, 1)` and keeps the depth of every node below
//! `h_α(n) = ⌊log_{1/α}(n)⌋` after each insert. When a new node lands deeper than
//! that, the insert walks back up towards the root until it finds an ancestor
//! (the "scapegoat") whose subtree is too tall for its size, and rebuilds that
//! subtree into a perfectly balanced one.
//!
//! Removals never rebuild locally. Instead the tree remembers the largest size it
//! reached since the last full rebuild and rebuilds everything once it shrinks
//! below `α` times that.
//!
//! Smaller values of `α` keep the tree flatter at the cost of more frequent rebuilds.
//!
//! # Examples
//!
//! ```
//! use ordset::{OrderedSet, ScapegoatTree};
//!
//! let mut tree = ScapegoatTree::new(0.57)?;
//! for key in [8, 1, 13, 10, 20, 19, 22] {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.to_string(), "(8,(1,(),()),(13,(10,(),()),(20,(19,(),()),(22,(),()))))");
//!
//! // 29 would land at depth 4, which is too deep for 8 nodes: the root is the scapegoat.
//! tree.insert(29);
//! assert_eq!(
//!     tree.to_string(),
//!     "(19,(10,(8,(1,(),()),()),(13,(),())),(22,(20,(),()),(29,(),())))"
//! );
//!
//! assert!(ScapegoatTree::<i32>::new(0.4).is_err());
//! # Ok::<(), ordset::Error>(())
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};
use crate::util::{self, Branch, Link};
use crate::OrderedSet;

/// A scapegoat tree. See the [module documentation][self] for how it balances itself.
#[derive(Clone)]
pub struct ScapegoatTree<K> {
    root: Link<Node<K>>,
    len: usize,
    /// The largest `len` since the whole tree was last rebuilt.
    max_len: usize,
    alpha: f64,
}

#[derive(Clone)]
struct Node<K> {
    key: K,
    left: Link<Node<K>>,
    right: Link<Node<K>>,
}

impl<K> Node<K> {
    fn new(key: K) -> Self {
        Self {
            key,
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

/// What an insert below some node did, as seen from that node.
enum Inserted {
    /// The key was already present.
    Duplicate,
    /// The key was placed and the tree needs no further attention.
    Placed,
    /// The new node is too deep and no scapegoat has been found yet. `height` is the distance
    /// from the new node up to the current subtree's root and `size` that subtree's size.
    Unbalanced { height: usize, size: usize },
}

impl<K> ScapegoatTree<K> {
    /// Generates a new, empty `ScapegoatTree` with balance factor `alpha`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAlpha`] when `alpha` is not in `[0.5, 1)`.
    pub fn new(alpha: f64) -> Result<Self> {
        if !(0.5..1.0).contains(&alpha) {
            return Err(Error::InvalidAlpha(alpha));
        }
        Ok(Self {
            root: None,
            len: 0,
            max_len: 0,
            alpha,
        })
    }

    /// The balance factor this tree was created with.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The largest number of keys the tree has held since it was last rebuilt as a whole.
    pub fn max_size(&self) -> usize {
        self.max_len
    }

    /// The number of levels in the tree. An empty tree has a height of 0.
    pub fn height(&self) -> usize {
        fn height<K>(link: &Link<Node<K>>) -> usize {
            link.as_ref()
                .map_or(0, |n| 1 + height(&n.left).max(height(&n.right)))
        }
        height(&self.root)
    }
}

/// `⌊log_{1/α}(n)⌋`: the deepest a node may sit in a tree of `n` nodes right after an insert.
fn depth_bound(n: usize, alpha: f64) -> usize {
    (-(n as f64).ln() / alpha.ln()).floor() as usize
}

fn count<K>(link: &Link<Node<K>>) -> usize {
    link.as_ref()
        .map_or(0, |n| 1 + count(&n.left) + count(&n.right))
}

/// Inserts `key` below `link`, which sits at `depth`. `max_depth` is the depth bound for the
/// tree once the key is added.
fn insert<K: Ord>(
    link: &mut Link<Node<K>>,
    key: K,
    depth: usize,
    max_depth: usize,
    alpha: f64,
) -> Inserted {
    let Some(node) = link else {
        *link = Some(Box::new(Node::new(key)));
        return if depth > max_depth {
            Inserted::Unbalanced { height: 0, size: 1 }
        } else {
            Inserted::Placed
        };
    };

    let (inserted, sibling) = match key.cmp(&node.key) {
        Ordering::Less => (
            insert(&mut node.left, key, depth + 1, max_depth, alpha),
            &node.right,
        ),
        Ordering::Equal => return Inserted::Duplicate,
        Ordering::Greater => (
            insert(&mut node.right, key, depth + 1, max_depth, alpha),
            &node.left,
        ),
    };

    let Inserted::Unbalanced { height, size: child_size } = inserted else {
        return inserted;
    };
    let height = height + 1;
    let size = child_size + 1 + count(sibling);
    if height > depth_bound(size, alpha) {
        #[cfg(feature = "tracing")]
        tracing::debug!(depth, height, size, "scapegoat: rebuilding subtree");
        rebuild(link);
        Inserted::Placed
    } else {
        Inserted::Unbalanced { height, size }
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
            match (node.left.is_some(), node.right.is_some()) {
                (false, false) => *link = None,
                (true, false) => *link = node.left.take(),
                (false, true) => *link = node.right.take(),
                (true, true) => node.key = take_largest(&mut node.left),
            }
            true
        }
    }
}

/// Detaches the largest node of a non-empty subtree and returns its key.
fn take_largest<K>(link: &mut Link<Node<K>>) -> K {
    let node = link.as_mut().expect("Taking the largest key => non-empty subtree");
    if node.right.is_some() {
        return take_largest(&mut node.right);
    }
    let node = link.take().expect("Checked above");
    let Node { key, left, .. } = *node;
    *link = left;
    key
}

/// Replaces the subtree in `link` with a perfectly balanced one holding the same nodes.
fn rebuild<K>(link: &mut Link<Node<K>>) {
    let mut nodes = flatten(link.take());
    *link = build(&mut nodes);
}

/// Detaches every node of the subtree, in order. Iterative so degenerate subtrees are fine.
fn flatten<K>(root: Link<Node<K>>) -> Vec<Option<Box<Node<K>>>> {
    let mut nodes = Vec::new();
    let mut stack = Vec::new();
    let mut current = root;
    loop {
        while let Some(mut node) = current {
            current = node.left.take();
            stack.push(node);
        }
        let Some(mut node) = stack.pop() else {
            return nodes;
        };
        current = node.right.take();
        nodes.push(Some(node));
    }
}

/// Builds a balanced subtree from sorted, childless nodes. The middle node (`len / 2`, so the
/// upper one for even lengths) becomes the root.
fn build<K>(nodes: &mut [Option<Box<Node<K>>>]) -> Link<Node<K>> {
    if nodes.is_empty() {
        return None;
    }
    let middle = nodes.len() / 2;
    let (left, rest) = nodes.split_at_mut(middle);
    let (root, right) = rest.split_at_mut(1);
    let mut root = root[0].take().expect("Each node is used once");
    root.left = build(left);
    root.right = build(right);
    Some(root)
}

impl<K: Ord> OrderedSet<K> for ScapegoatTree<K> {
    fn find(&mut self, key: &K) -> Option<&K> {
        util::find(self.root.as_deref(), key).map(|n| &n.key)
    }

    fn insert(&mut self, key: K) {
        let max_depth = depth_bound(self.len + 1, self.alpha);
        match insert(&mut self.root, key, 0, max_depth, self.alpha) {
            Inserted::Duplicate => {}
            Inserted::Placed | Inserted::Unbalanced { .. } => {
                self.len += 1;
                self.max_len = self.max_len.max(self.len);
            }
        }
    }

    fn remove(&mut self, key: &K) {
        if !remove(&mut self.root, key) {
            return;
        }
        self.len -= 1;
        if (self.len as f64) < self.alpha * self.max_len as f64 {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                len = self.len,
                max_len = self.max_len,
                "scapegoat: rebuilding whole tree"
            );
            rebuild(&mut self.root);
            self.max_len = self.len;
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

impl<K: Ord + fmt::Display> fmt::Display for ScapegoatTree<K> {
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

    fn tree_of(alpha: f64, keys: &[i32]) -> ScapegoatTree<i32> {
        let mut tree = ScapegoatTree::new(alpha).unwrap();
        for &key in keys {
            tree.insert(key);
        }
        tree
    }

    #[test]
    fn rejects_invalid_alpha() {
        for alpha in [0.0, 0.49, 1.0, 1.5, -0.7] {
            assert_eq!(
                ScapegoatTree::<i32>::new(alpha).err(),
                Some(Error::InvalidAlpha(alpha))
            );
        }
        assert!(matches!(
            ScapegoatTree::<i32>::new(f64::NAN),
            Err(Error::InvalidAlpha(a)) if a.is_nan()
        ));

        let tree = ScapegoatTree::<i32>::new(0.5).unwrap();
        assert_eq!(tree.alpha(), 0.5);
    }

    #[test]
    fn error_message_names_the_range() {
        let err = ScapegoatTree::<i32>::new(2.0).err().unwrap();
        assert_eq!(err.to_string(), "alpha must be in the range [0.5, 1), but was 2");
    }

    #[test]
    fn depth_bound_matches_log() {
        assert_eq!(depth_bound(1, 0.57), 0);
        assert_eq!(depth_bound(2, 0.57), 1);
        assert_eq!(depth_bound(4, 0.57), 2);
        assert_eq!(depth_bound(8, 0.57), 3);
        assert_eq!(depth_bound(10, 0.57), 4);
        assert_eq!(depth_bound(8, 0.5), 3);
    }

    #[test]
    fn insert_rebuilds_whole_tree() {
        let mut tree = tree_of(0.57, &[8, 1, 13, 10, 20, 19, 22]);
        assert_eq!(
            tree.to_string(),
            "(8,(1,(),()),(13,(10,(),()),(20,(19,(),()),(22,(),()))))"
        );

        tree.insert(29);
        assert_eq!(
            tree.to_string(),
            "(19,(10,(8,(1,(),()),()),(13,(),())),(22,(20,(),()),(29,(),())))"
        );

        // Reinserting doesn't change anything.
        tree.insert(29);
        assert_eq!(
            tree.to_string(),
            "(19,(10,(8,(1,(),()),()),(13,(),())),(22,(20,(),()),(29,(),())))"
        );
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.max_size(), 8);
    }

    #[test]
    fn insert_rebuilds_only_the_scapegoat() {
        let mut tree = tree_of(0.57, &[5, 1, 7, 6, 9, 10]);
        assert_eq!(
            tree.to_string(),
            "(5,(1,(),()),(7,(6,(),()),(9,(),(10,(),()))))"
        );

        tree.insert(12);
        assert_eq!(
            tree.to_string(),
            "(5,(1,(),()),(7,(6,(),()),(10,(9,(),()),(12,(),()))))"
        );
    }

    #[test]
    fn remove_with_two_children_promotes_predecessor() {
        let mut tree = ScapegoatTree::new(0.75).unwrap();
        for key in [5, 3, 8, 2, 4, 9] {
            tree.insert(key);
        }

        tree.remove(&5);
        assert_eq!(
            tree.to_string(),
            "(4,(3,(2,(),()),()),(8,(),(9,(),())))"
        );
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn remove() {
        let mut tree = ScapegoatTree::new(0.57).unwrap();
        tree.remove(&5);
        assert_eq!(tree.to_string(), "()");

        tree.insert(5);
        tree.remove(&5);
        assert_eq!(tree.to_string(), "()");

        tree.insert(5);
        tree.insert(1);
        tree.remove(&5);
        assert_eq!(tree.to_string(), "(1,(),())");
        tree.remove(&1);
        assert_eq!(tree.to_string(), "()");

        for key in [5, 1, 13, 10, 19, 9, 16, 22] {
            tree.insert(key);
        }
        assert_eq!(
            tree.to_string(),
            "(5,(1,(),()),(13,(10,(9,(),()),()),(19,(16,(),()),(22,(),()))))"
        );

        tree.remove(&9);
        assert_eq!(
            tree.to_string(),
            "(5,(1,(),()),(13,(10,(),()),(19,(16,(),()),(22,(),()))))"
        );

        tree.remove(&10);
        assert_eq!(
            tree.to_string(),
            "(5,(1,(),()),(13,(),(19,(16,(),()),(22,(),()))))"
        );

        tree.remove(&16);
        assert_eq!(tree.to_string(), "(5,(1,(),()),(13,(),(19,(),(22,(),()))))");
        assert_eq!(tree.max_size(), 8);

        // Down to 4 of 8 keys, below 0.57 * 8: everything is rebuilt.
        tree.remove(&1);
        assert_eq!(tree.to_string(), "(19,(13,(5,(),()),()),(22,(),()))");
        assert_eq!(tree.max_size(), 4);

        tree.remove(&1);
        tree.remove(&10);
        assert_eq!(tree.to_string(), "(19,(13,(5,(),()),()),(22,(),()))");
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn sorted_inserts_stay_shallow() {
        let tree = tree_of(0.6, &(0..1000).collect::<Vec<_>>());

        assert!(tree.height() <= depth_bound(1000, 0.6) + 1);
        assert_eq!(tree.min(), Some(&0));
        assert_eq!(tree.max(), Some(&999));
    }

    #[test]
    fn build_picks_upper_middle() {
        let mut tree = tree_of(0.99, &[1, 2, 3, 4]);
        rebuild(&mut tree.root);

        assert_eq!(tree.to_string(), "(3,(2,(1,(),()),()),(4,(),()))");
    }
}

#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test::quick::Op;

    quickcheck::quickcheck! {
        fn inserts_respect_depth_bound(keys: Vec<u8>) -> bool {
            let mut tree = ScapegoatTree::new(0.6).unwrap();
            for key in keys {
                tree.insert(key);
                assert!(tree.height() <= depth_bound(tree.len(), 0.6) + 1);
            }
            true
        }

        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
            let mut tree = ScapegoatTree::new(0.7).unwrap();
            let mut set = BTreeSet::new();

            for op in &ops {
                op.apply(&mut tree, &mut set);
                assert!(tree.max_size() >= tree.len());
            }
            tree.keys().into_iter().eq(set.iter()) && tree.len() == set.len()
        }
    }
}
