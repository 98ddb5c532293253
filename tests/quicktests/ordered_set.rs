use std::collections::{BTreeSet, HashSet};

use ordset::OrderedSet;

use crate::Op;

/// Applies a set of operations to a set and to a `BTreeSet`.
/// This way we can ensure that after a random smattering of inserts
/// and removes we have the same keys in both.
fn do_ops<K, S>(ops: &[Op<K>], set: &mut S, model: &mut BTreeSet<K>)
where
    K: Ord + Clone,
    S: OrderedSet<K>,
{
    for op in ops {
        match op {
            Op::Insert(k) => {
                set.insert(k.clone());
                model.insert(k.clone());
            }
            Op::Remove(k) => {
                set.remove(k);
                model.remove(k);
            }
        }
    }
}

pub(crate) fn fuzz_multiple_operations<S: OrderedSet<i8>>(mut set: S, ops: Vec<Op<i8>>) -> bool {
    let mut model = BTreeSet::new();
    do_ops(&ops, &mut set, &mut model);

    set.keys().into_iter().eq(model.iter())
        && set.len() == model.len()
        && set.min() == model.first()
        && set.max() == model.last()
        && model.iter().all(|k| set.find(k) == Some(k))
}

pub(crate) fn contains<S: OrderedSet<i8>>(mut set: S, xs: Vec<i8>) -> bool {
    for x in &xs {
        set.insert(*x);
    }

    xs.iter().all(|x| set.find(x) == Some(x))
}

pub(crate) fn contains_not<S: OrderedSet<i8>>(mut set: S, xs: Vec<i8>, nots: Vec<i8>) -> bool {
    for x in &xs {
        set.insert(*x);
    }
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| set.find(x).is_none())
}

pub(crate) fn with_deletions<S: OrderedSet<i8>>(mut set: S, xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    for x in &xs {
        set.insert(*x);
    }
    for delete in &deletes {
        set.remove(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    still_present.iter().all(|x| set.find(x) == Some(x))
        && deletes.iter().all(|x| set.find(x).is_none())
}

/// Inserting twice, or removing twice, is the same as doing it once.
pub(crate) fn idempotent<S: OrderedSet<i8>>(mut once: S, mut twice: S, xs: Vec<i8>) -> bool {
    for x in &xs {
        once.insert(*x);
        twice.insert(*x);
        twice.insert(*x);
    }
    let inserted = once.keys() == twice.keys() && once.len() == twice.len();

    for x in xs.iter().step_by(2) {
        once.remove(x);
        twice.remove(x);
        twice.remove(x);
    }
    inserted && once.keys() == twice.keys() && once.len() == twice.len()
}

/// Inserting a new key and removing it again leaves the same keys behind.
pub(crate) fn round_trip<S: OrderedSet<i8>>(mut set: S, xs: Vec<i8>, extra: i8) -> bool {
    for x in &xs {
        set.insert(*x);
    }
    if xs.contains(&extra) {
        return true;
    }
    let before: Vec<i8> = set.keys().into_iter().copied().collect();

    set.insert(extra);
    let found = set.find(&extra) == Some(&extra);
    set.remove(&extra);
    let after: Vec<i8> = set.keys().into_iter().copied().collect();

    found && before == after && set.find(&extra).is_none()
}

macro_rules! ordered_set_tests {
    ($name:ident, $new:expr) => {
        mod $name {
            use quickcheck_macros::quickcheck;

            use crate::Op;

            #[quickcheck]
            fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
                super::fuzz_multiple_operations($new, ops)
            }

            #[quickcheck]
            fn contains(xs: Vec<i8>) -> bool {
                super::contains($new, xs)
            }

            #[quickcheck]
            fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
                super::contains_not($new, xs, nots)
            }

            #[quickcheck]
            fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
                super::with_deletions($new, xs, deletes)
            }

            #[quickcheck]
            fn idempotent(xs: Vec<i8>) -> bool {
                super::idempotent($new, $new, xs)
            }

            #[quickcheck]
            fn round_trip(xs: Vec<i8>, extra: i8) -> bool {
                super::round_trip($new, xs, extra)
            }
        }
    };
}

ordered_set_tests!(simple, ordset::SimpleBst::new());
ordered_set_tests!(avl, ordset::AvlTree::new());
ordered_set_tests!(red_black, ordset::RedBlackTree::new());
ordered_set_tests!(scapegoat, ordset::ScapegoatTree::new(0.57).unwrap());
ordered_set_tests!(splay, ordset::SplayTree::new());
ordered_set_tests!(treap, ordset::Treap::with_seed(17));
ordered_set_tests!(skip_list, ordset::SkipList::with_seed(17));
