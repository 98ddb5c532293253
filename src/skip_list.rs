//! A probabilistic alternative to balanced trees (William Pugh's skip list).
//!
//! Keys are kept in a sorted linked list (level 0). Every node is also promoted
//! to higher levels by repeated coin flips, and each level is a sorted linked
//! list of the nodes promoted that far. A search starts on the highest level
//! and drops down a level whenever the next key would overshoot, so it skips
//! over most of the nodes below and takes expected `O(lg N)` steps.
//!
//! ```text
//! level 2: HEAD------------------ -> 25 -> NIL
//! level 1: HEAD -> 13------------ -> 25 -> NIL
//! level 0: HEAD -> 13 -> 15 -> 20 -> 25 -> NIL
//! ```
//!
//! Nodes live in an arena and link to each other by index. The head is not a
//! node: it is just the array of first links, one per level in use.
//!
//! # Examples
//!
//! ```
//! use ordset::{OrderedSet, SkipList};
//!
//! let mut list = SkipList::with_seed(5);
//! for key in [13, 20, 15, 25] {
//!     list.insert(key);
//! }
//!
//! assert_eq!(list.keys(), vec![&13, &15, &20, &25]);
//! assert_eq!(list.find(&50), None);
//! assert!(list.to_string().ends_with("HEAD -> 13 -> 15 -> 20 -> 25 -> NIL\n"));
//! ```

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::OrderedSet;

/// The number of levels a skip list can ever have.
pub const MAX_LEVEL: usize = 32;

/// The default chance of promoting a node one more level.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

type Idx = usize;

#[derive(Clone)]
struct Node<K> {
    key: K,
    /// The following node on each level this node is part of. `next.len() - 1` is its level.
    next: Vec<Option<Idx>>,
}

/// A skip list whose levels are drawn from `R`.
#[derive(Clone)]
pub struct SkipList<K, R = StdRng> {
    nodes: Vec<Option<Node<K>>>,
    free: Vec<Idx>,
    /// The first node on each level in use. Never empty: level 0 always exists.
    head: Vec<Option<Idx>>,
    len: usize,
    probability: f64,
    rng: R,
}

impl<K> Default for SkipList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SkipList<K> {
    /// Generates a new, empty `SkipList` seeded from system entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Generates a new, empty `SkipList` whose levels are determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<K, R: Rng> SkipList<K, R> {
    /// Generates a new, empty `SkipList` drawing levels from `rng` with the
    /// [default probability][DEFAULT_PROBABILITY].
    pub fn with_rng(rng: R) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: vec![None],
            len: 0,
            probability: DEFAULT_PROBABILITY,
            rng,
        }
    }

    /// Generates a new, empty `SkipList` promoting nodes with chance `probability`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidProbability`] when `probability` is not in `(0, 1)`.
    pub fn with_probability(probability: f64, rng: R) -> Result<Self> {
        if !(probability > 0.0 && probability < 1.0) {
            return Err(Error::InvalidProbability(probability));
        }
        Ok(Self {
            probability,
            ..Self::with_rng(rng)
        })
    }

    /// The chance of promoting a node one more level.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// The highest level in use. An empty list only has level 0.
    pub fn level(&self) -> usize {
        self.head.len() - 1
    }

    /// The highest level `key` is part of, if it is present.
    pub fn level_of(&self, key: &K) -> Option<usize>
    where
        K: Ord,
    {
        self.locate(key).map(|i| self.node(i).next.len() - 1)
    }

    /// The node after `at` (`None` being the head) on `level`.
    fn next(&self, at: Option<Idx>, level: usize) -> Option<Idx> {
        match at {
            None => self.head[level],
            Some(i) => self.node(i).next[level],
        }
    }

    fn set_next(&mut self, at: Option<Idx>, level: usize, to: Option<Idx>) {
        let link = match at {
            None => &mut self.head[level],
            Some(i) => {
                &mut self.nodes[i]
                    .as_mut()
                    .expect("Linked indices point at live nodes")
                    .next[level]
            }
        };
        *link = to;
    }

    /// The last node before `key` on every level, bottom level first. `None` is the head.
    fn predecessors(&self, key: &K) -> Vec<Option<Idx>>
    where
        K: Ord,
    {
        let mut update = vec![None; self.head.len()];
        let mut at = None;
        for level in (0..self.head.len()).rev() {
            while let Some(next) = self.next(at, level) {
                if self.node(next).key >= *key {
                    break;
                }
                at = Some(next);
            }
            update[level] = at;
        }
        update
    }

    fn locate(&self, key: &K) -> Option<Idx>
    where
        K: Ord,
    {
        let update = self.predecessors(key);
        self.next(update[0], 0)
            .filter(|&i| self.node(i).key == *key)
    }

    /// Flips coins until one comes up tails. Nodes are promoted at most one level above the
    /// current top level.
    fn random_level(&mut self) -> usize {
        let cap = (self.level() + 1).min(MAX_LEVEL - 1);
        let mut level = 0;
        while level < cap && self.rng.gen_bool(self.probability) {
            level += 1;
        }
        level
    }

    /// Splices a new node holding `key` into levels `0..=level`, right after `update`.
    fn link(&mut self, key: K, level: usize, mut update: Vec<Option<Idx>>) {
        if level > self.level() {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = self.level(), to = level, "skip list: adding levels");
            self.head.resize(level + 1, None);
            update.resize(level + 1, None);
        }

        let next = (0..=level).map(|l| self.next(update[l], l)).collect();
        let node = Node { key, next };
        let new = match self.free.pop() {
            Some(i) => {
                self.nodes[i] = Some(node);
                i
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        for (l, &before) in update.iter().enumerate().take(level + 1) {
            self.set_next(before, l, Some(new));
        }
        self.len += 1;
    }
}

impl<K, R> SkipList<K, R> {
    fn node(&self, i: Idx) -> &Node<K> {
        self.nodes[i]
            .as_ref()
            .expect("Linked indices point at live nodes")
    }

    /// Keys on level 0, in order, along with their levels.
    fn columns(&self) -> Vec<(&K, usize)> {
        let mut columns = Vec::with_capacity(self.len);
        let mut at = self.head[0];
        while let Some(i) = at {
            let node = self.node(i);
            columns.push((&node.key, node.next.len() - 1));
            at = node.next[0];
        }
        columns
    }
}

impl<K: Ord, R: Rng> OrderedSet<K> for SkipList<K, R> {
    fn find(&mut self, key: &K) -> Option<&K> {
        self.locate(key).map(|i| &self.node(i).key)
    }

    fn insert(&mut self, key: K) {
        let update = self.predecessors(&key);
        if let Some(i) = self.next(update[0], 0) {
            if self.node(i).key == key {
                return;
            }
        }
        let level = self.random_level();
        self.link(key, level, update);
    }

    fn remove(&mut self, key: &K) {
        let update = self.predecessors(key);
        let Some(target) = self.next(update[0], 0) else {
            return;
        };
        if self.node(target).key != *key {
            return;
        }

        let next = self.nodes[target]
            .take()
            .expect("Linked indices point at live nodes")
            .next;
        for (level, after) in next.into_iter().enumerate() {
            self.set_next(update[level], level, after);
        }
        self.free.push(target);
        self.len -= 1;

        while self.level() > 0 && self.head[self.level()].is_none() {
            #[cfg(feature = "tracing")]
            tracing::debug!(level = self.level(), "skip list: dropping empty level");
            self.head.pop();
        }
    }

    fn min(&self) -> Option<&K> {
        self.head[0].map(|i| &self.node(i).key)
    }

    fn max(&self) -> Option<&K> {
        let mut at = None;
        for level in (0..self.head.len()).rev() {
            while let Some(next) = self.next(at, level) {
                at = Some(next);
            }
        }
        at.map(|i| &self.node(i).key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn keys(&self) -> Vec<&K> {
        self.columns().into_iter().map(|(key, _)| key).collect()
    }

    /// One chain per level, laid out left to right, with each node's tower stacked in a column.
    fn to_dot(&self) -> String
    where
        K: fmt::Display,
    {
        let columns = self.columns();
        let levels = self.head.len();
        let mut out = String::from("digraph {\nrankdir=LR;\nnode [shape=box];\n");

        let mut column = |id: &str, label: &str, height: usize| {
            out.push_str(" { rank=same; ");
            for level in (0..height).rev() {
                out.push_str(&format!("{id}_{level}; "));
            }
            out.push_str("}\n");
            for level in (0..height).rev() {
                out.push_str(&format!("{id}_{level} [label=\"{label}\"];\n"));
            }
        };
        column("HEAD", "HEAD", levels);
        for (col, (key, level)) in columns.iter().enumerate() {
            column(&format!("k{col}"), &key.to_string(), level + 1);
        }
        column("NIL", "NIL", levels);

        for level in (0..levels).rev() {
            let mut from = format!("HEAD_{level}");
            for (col, &(_, height)) in columns.iter().enumerate() {
                if height >= level {
                    let to = format!("k{col}_{level}");
                    out.push_str(&format!("{from}->{to}\n"));
                    from = to;
                }
            }
            out.push_str(&format!("{from}->NIL_{level}\n"));
        }

        out.push_str("}\n");
        out
    }
}

/// One line per level, top level first. A node missing from a level is drawn as dashes as wide
/// as its ` -> key` segment, so every column lines up with level 0.
impl<K: fmt::Display, R> fmt::Display for SkipList<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<(String, usize)> = self
            .columns()
            .into_iter()
            .map(|(key, level)| (key.to_string(), level))
            .collect();

        for level in (0..self.head.len()).rev() {
            f.write_str("HEAD")?;
            for (key, height) in &columns {
                if *height >= level {
                    write!(f, " -> {key}")?;
                } else {
                    f.write_str(&"-".repeat(key.len() + 4))?;
                }
            }
            f.write_str(" -> NIL\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Checks every level is sorted, a subsequence of the level below, and not empty unless
    /// it is level 0.
    pub(super) fn assert_skip_list<K: Ord, R: Rng>(list: &SkipList<K, R>) {
        let mut below: Vec<Idx> = Vec::new();
        for level in 0..list.head.len() {
            let mut chain = Vec::new();
            let mut at = list.head[level];
            while let Some(i) = at {
                assert!(list.node(i).next.len() > level, "linked above its level");
                chain.push(i);
                at = list.node(i).next[level];
            }
            assert!(
                chain.windows(2).all(|w| list.node(w[0]).key < list.node(w[1]).key),
                "level {level} out of order"
            );
            if level == 0 {
                assert_eq!(chain.len(), list.len());
            } else {
                assert!(!chain.is_empty(), "empty level {level} kept around");
                assert!(chain.iter().all(|i| below.contains(i)));
            }
            below = chain;
        }
    }

    /// A list with hand-picked levels.
    fn list_of(entries: &[(i32, usize)]) -> SkipList<i32> {
        let mut list = SkipList::with_seed(0);
        for &(key, level) in entries {
            let update = list.predecessors(&key);
            list.link(key, level, update);
            assert_skip_list(&list);
        }
        list
    }

    #[test]
    fn empty() {
        let mut list = SkipList::<i32>::with_seed(1);

        assert_eq!(list.find(&10), None);
        assert_eq!(list.min(), None);
        assert_eq!(list.max(), None);
        assert_eq!(list.level(), 0);
        assert_eq!(list.to_string(), "HEAD -> NIL\n");
    }

    #[test]
    fn display_aligns_levels() {
        let list = list_of(&[(13, 1), (20, 0), (15, 0), (25, 2)]);

        assert_eq!(list.level(), 2);
        assert_eq!(
            list.to_string(),
            "HEAD------------------ -> 25 -> NIL\n\
             HEAD -> 13------------ -> 25 -> NIL\n\
             HEAD -> 13 -> 15 -> 20 -> 25 -> NIL\n"
        );
    }

    #[test]
    fn display_needs_no_rng() {
        // Printing only reads the links, whatever the level source is.
        fn render<K: fmt::Display, R>(list: &SkipList<K, R>) -> String {
            list.to_string()
        }

        let list = list_of(&[(1, 0), (2, 1)]);
        assert_eq!(render(&list), "HEAD----- -> 2 -> NIL\nHEAD -> 1 -> 2 -> NIL\n");
    }

    #[test]
    fn missed_find_changes_nothing() {
        let mut list = SkipList::with_seed(11);
        for key in [13, 20, 15, 25] {
            list.insert(key);
        }
        let before = list.to_string();

        assert_eq!(list.find(&50), None);
        assert_eq!(list.find(&14), None);
        assert_eq!(list.to_string(), before);
        assert_eq!(list.find(&15), Some(&15));
    }

    #[test]
    fn insert_and_lookup() {
        let mut list = SkipList::with_seed(3);
        assert_eq!(list.find(&10), None);
        for key in [13, 20, 15, 25, 50, 62, 85, 94, 72, 95] {
            list.insert(key);
            assert_skip_list(&list);
        }

        assert_eq!(list.find(&10), None);
        assert_eq!(list.find(&1000), None);
        assert_eq!(list.min(), Some(&13));
        assert_eq!(list.max(), Some(&95));
        for key in [13, 62, 72, 94, 95] {
            assert_eq!(list.find(&key), Some(&key));
        }
    }

    #[test]
    fn remove_unlinks_every_level_and_drops_empty_ones() {
        let mut list = list_of(&[(10, 0), (40, 3), (30, 1)]);
        assert_eq!(list.level(), 3);

        list.remove(&40);
        assert_skip_list(&list);
        assert_eq!(list.find(&40), None);
        assert_eq!(list.level(), 1);
        assert_eq!(
            list.to_string(),
            "HEAD------ -> 30 -> NIL\nHEAD -> 10 -> 30 -> NIL\n"
        );

        list.remove(&30);
        list.remove(&10);
        list.remove(&10);
        assert_eq!(list.level(), 0);
        assert!(list.is_empty());
        assert_eq!(list.to_string(), "HEAD -> NIL\n");
    }

    #[test]
    fn slots_are_recycled() {
        let mut list = list_of(&[(1, 0), (2, 0)]);
        list.remove(&1);
        list.insert(3);

        assert_eq!(list.nodes.len(), 2);
        assert_eq!(list.keys(), vec![&2, &3]);
    }

    #[test]
    fn levels_grow_one_at_a_time() {
        let mut list = SkipList::with_probability(0.99, StdRng::seed_from_u64(8)).unwrap();
        for key in 0..10 {
            let before = list.level();
            list.insert(key);
            assert!(list.level() <= before + 1);
        }
    }

    #[test]
    fn rejects_invalid_probability() {
        for p in [0.0, 1.0, -0.5, 2.0] {
            assert_eq!(
                SkipList::<i32, _>::with_probability(p, StdRng::seed_from_u64(0)).err(),
                Some(Error::InvalidProbability(p))
            );
        }
        assert!(SkipList::<i32, _>::with_probability(f64::NAN, StdRng::seed_from_u64(0)).is_err());

        let list = SkipList::<i32, _>::with_probability(0.25, StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(list.probability(), 0.25);
    }

    #[test]
    fn levels_are_geometric() {
        const N: i32 = 20_000;

        for p in [0.5, 0.25] {
            let mut list = SkipList::with_probability(p, StdRng::seed_from_u64(2024)).unwrap();
            for key in 0..N {
                list.insert(key);
            }
            assert_skip_list(&list);

            for k in 1..=3 {
                let promoted = (0..N)
                    .filter(|key| list.level_of(key).is_some_and(|l| l >= k))
                    .count();
                let observed = promoted as f64 / f64::from(N);
                let expected = p.powi(k as i32);
                assert!(
                    (observed - expected).abs() < 0.03,
                    "p = {p}, level {k}: observed {observed}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn dot_chains_each_level() {
        let list = list_of(&[(1, 1), (2, 0)]);
        let dot = list.to_dot();

        assert!(dot.starts_with("digraph {\nrankdir=LR;\n"));
        assert!(dot.contains(" { rank=same; k0_1; k0_0; }\n"));
        assert!(dot.contains("k1_0 [label=\"2\"];\n"));
        assert!(dot.contains("HEAD_1->k0_1\nk0_1->NIL_1\n"));
        assert!(dot.contains("HEAD_0->k0_0\nk0_0->k1_0\nk1_0->NIL_0\n"));
        assert!(dot.ends_with("}\n"));
    }
}
