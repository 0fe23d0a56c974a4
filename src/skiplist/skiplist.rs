use std::fmt;

use tracing::{
    instrument,
    trace,
};

use crate::skiplist::{
    coin::{
        CoinSource,
        RngCoin,
    },
    skipnode::{
        NodeArena,
        NodeId,
    },
};

/// A probabilistic multi-level ordered index over keys of type `K`.
///
/// Level 0 is a doubly linked list holding every key in ascending order.
/// Each level above it holds a random subset of the level below, decided one
/// coin flip at a time while an insertion climbs back up its own search path.
/// Membership tests, insertions, and deletions all run in expected
/// O(log n) without any rebalancing step.
///
/// There is no negative-infinity sentinel. Instead, every per-level head node
/// holds the current global minimum, so a search can enter at the top head
/// and only ever move right or down. Whenever the minimum changes, one
/// routine rewrites every head value.
///
/// Duplicate keys are accepted; callers wanting set semantics check with
/// [`contains`](SkipList::contains) before inserting. A duplicate lands after
/// every pre-existing exact match, and [`remove`](SkipList::remove) unlinks
/// the most recently inserted duplicate first.
pub struct SkipList<K, C = RngCoin> {
    arena: NodeArena<K>,
    /// One head per level; `levels[0]` is the full bottom level, the last
    /// entry is the entry point of every search. Empty means an empty index.
    levels: Vec<NodeId>,
    len: usize,
    coin: C,
}

impl<K: Ord + Clone> SkipList<K, RngCoin> {
    pub fn new() -> Self {
        SkipList::with_coin(RngCoin::new())
    }
}

impl<K: Ord + Clone> Default for SkipList<K, RngCoin> {
    fn default() -> Self {
        SkipList::new()
    }
}

impl<K, C> SkipList<K, C>
where
    K: Ord + Clone,
    C: CoinSource,
{
    /// Build an index driven by a caller-supplied coin. Pass a seeded
    /// [`RngCoin`](crate::skiplist::coin::RngCoin) or a
    /// [`ScriptedCoin`](crate::skiplist::coin::ScriptedCoin) to make the
    /// level structure deterministic.
    pub fn with_coin(coin: C) -> Self {
        SkipList {
            arena: NodeArena::new(),
            levels: Vec::new(),
            len: 0,
            coin,
        }
    }

    /// Number of keys currently held, duplicates counted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of levels currently allocated. Grows only by successful
    /// promotion and never shrinks while at least one key remains, even if
    /// deletions leave the top level holding nothing but its head.
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Whether `key` is present. Expected O(log n).
    #[instrument(level = "debug", skip_all)]
    pub fn contains(&self, key: &K) -> bool {
        let Some(&top) = self.levels.last() else {
            return false;
        };
        // The top head holds the minimum, so anything below it misses.
        if *key < self.arena[top].value {
            return false;
        }
        let (landing, _) = self.arena.seek(top, key);
        self.arena[landing].value == *key
    }

    /// Insert `key`, keeping level 0 sorted and promoting the new tower
    /// level-by-level along the descent path of its own search.
    #[instrument(level = "debug", skip_all)]
    pub fn insert(&mut self, key: K) {
        self.len += 1;
        let Some(&top) = self.levels.last() else {
            // First key: it is its own level-0 head.
            let head = self.arena.alloc(key);
            self.levels.push(head);
            return;
        };
        let head = self.levels[0];
        if key < self.arena[head].value {
            self.insert_minimum(key, head);
            return;
        }

        let (pred, descents) = self.arena.seek(top, &key);
        let mut last = self.arena.insert_after(pred, key.clone());
        // Climb the recorded descent points bottom-to-top, one flip per
        // level; the first tails ends the tower.
        for &at in &descents {
            if !self.coin.flip() {
                return;
            }
            let promoted = self.arena.insert_after(at, key.clone());
            self.arena[promoted].down = Some(last);
            self.arena[last].up = Some(promoted);
            last = promoted;
        }
        // The tower reached the old top; each further heads opens a fresh
        // level holding only the anchor and this key.
        while self.coin.flip() {
            let old_top = self.levels[self.levels.len() - 1];
            let anchor = self.arena.insert_above(old_top);
            let promoted = self.arena.insert_above(last);
            self.arena[anchor].next = Some(promoted);
            self.arena[promoted].prev = Some(anchor);
            self.levels.push(anchor);
            last = promoted;
            trace!(height = self.levels.len(), "grew a new top level");
        }
    }

    /// Remove one occurrence of `key`, reporting whether anything was
    /// removed. With duplicates present the most recently inserted one goes
    /// first and the key stays searchable until the last copy is gone.
    #[instrument(level = "debug", skip_all)]
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(&top) = self.levels.last() else {
            return false;
        };
        let head = self.levels[0];
        if *key < self.arena[head].value {
            return false;
        }
        if *key == self.arena[head].value {
            self.remove_minimum(head);
            return true;
        }
        let (landing, _) = self.arena.seek(top, key);
        if self.arena[landing].value != *key {
            return false;
        }
        self.arena.unlink_tower(landing);
        self.len -= 1;
        true
    }

    /// Ascending iterator over every key at level 0.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            arena: &self.arena,
            cur: self.levels.first().copied(),
        }
    }

    /// Render the index as a grid: one row per level, top level first,
    /// tab-separated columns aligned with level-0 positions. A blank cell
    /// marks a key that was never promoted to that row's level.
    pub fn render(&self) -> String
    where
        K: fmt::Display,
    {
        let mut columns = Vec::new();
        let mut cur = self.levels.first().copied();
        while let Some(id) = cur {
            columns.push(id);
            cur = self.arena[id].next;
        }
        let mut rows = vec![vec![None; columns.len()]; self.levels.len()];
        for (col, &id) in columns.iter().enumerate() {
            let mut tower = Some(id);
            for row in rows.iter_mut() {
                match tower {
                    | Some(node) => {
                        row[col] = Some(self.arena[node].value.to_string());
                        tower = self.arena[node].up;
                    },
                    | None => break,
                }
            }
        }
        let mut grid = String::new();
        for row in rows.iter().rev() {
            let cells: Vec<&str> = row.iter().map(|cell| cell.as_deref().unwrap_or("")).collect();
            grid.push_str(&cells.join("\t"));
            grid.push('\n');
        }
        grid
    }

    /// A key below the current minimum replaces the level-0 head: it is
    /// linked in front, the anchor tower is re-homed onto it, and every head
    /// value is rewritten. No promotion runs on this path.
    fn insert_minimum(&mut self, key: K, old_head: NodeId) {
        let head = self.arena.alloc(key);
        self.arena[head].next = Some(old_head);
        self.arena[old_head].prev = Some(head);
        self.arena[old_head].up = None;
        if self.levels.len() > 1 {
            let above = self.levels[1];
            self.arena[head].up = Some(above);
            self.arena[above].down = Some(head);
        }
        self.levels[0] = head;
        self.rewrite_anchors();
    }

    /// The head is structurally special: its tower is the anchor tower,
    /// which is re-valued rather than deleted. The successor takes over as
    /// head; the successor's own old tower, now shadowed by the anchors, is
    /// the one that goes away.
    fn remove_minimum(&mut self, head: NodeId) {
        self.len -= 1;
        let Some(successor) = self.arena[head].next else {
            // Last key out: the whole structure goes with it, anchor towers
            // included.
            self.levels.clear();
            self.arena.clear();
            trace!("index emptied");
            return;
        };
        let orphan = self.arena[successor].up;
        // Detach the anchor tower before unlinking, so only the head node
        // itself is released.
        self.arena[head].up = None;
        self.arena.unlink_tower(head);
        self.arena[successor].up = None;
        if self.levels.len() > 1 {
            let above = self.levels[1];
            self.arena[successor].up = Some(above);
            self.arena[above].down = Some(successor);
        }
        self.levels[0] = successor;
        self.rewrite_anchors();
        if let Some(orphan) = orphan {
            self.arena.unlink_tower(orphan);
        }
    }

    /// The anchor rule: every head holds the current global minimum. This is
    /// the single place head values are rewritten.
    fn rewrite_anchors(&mut self) {
        let min = self.arena[self.levels[0]].value.clone();
        for level in 1..self.levels.len() {
            let head = self.levels[level];
            self.arena[head].value = min.clone();
        }
    }
}

/// Borrowing iterator over level 0, ascending.
pub struct Iter<'a, K> {
    arena: &'a NodeArena<K>,
    cur: Option<NodeId>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let node = &self.arena[id];
        self.cur = node.next;
        Some(&node.value)
    }
}

impl<'a, K, C> IntoIterator for &'a SkipList<K, C>
where
    K: Ord + Clone,
    C: CoinSource,
{
    type IntoIter = Iter<'a, K>;
    type Item = &'a K;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

#[cfg(test)]
impl<K, C> SkipList<K, C>
where
    K: Ord + Clone + fmt::Debug,
    C: CoinSource,
{
    /// Keys along one level, walked via `next`.
    fn level_values(&self, level: usize) -> Vec<K> {
        let mut out = Vec::new();
        let mut cur = self.levels.get(level).copied();
        while let Some(id) = cur {
            out.push(self.arena[id].value.clone());
            cur = self.arena[id].next;
        }
        out
    }

    /// Panics if any structural invariant is broken.
    fn check_invariants(&self) {
        if self.levels.is_empty() {
            assert_eq!(self.len, 0, "empty index with a nonzero length");
            assert_eq!(self.arena.live(), 0, "empty index holding live nodes");
            return;
        }
        let bottom = self.level_values(0);
        assert_eq!(bottom.len(), self.len, "level 0 must hold every key");
        assert!(
            bottom.windows(2).all(|pair| pair[0] <= pair[1]),
            "level 0 out of order: {:?}",
            bottom
        );
        for (level, &head) in self.levels.iter().enumerate() {
            assert_eq!(
                self.arena[head].value, bottom[0],
                "head of level {} does not hold the minimum",
                level
            );
        }
        for level in 1..self.levels.len() {
            let upper = self.level_values(level);
            let lower = self.level_values(level - 1);
            assert!(
                is_subsequence(&upper, &lower),
                "level {} = {:?} is not a subsequence of {:?}",
                level,
                upper,
                lower
            );
        }
        for (level, &head) in self.levels.iter().enumerate() {
            let mut cur = Some(head);
            while let Some(id) = cur {
                let node = &self.arena[id];
                if let Some(next) = node.next {
                    assert_eq!(self.arena[next].prev, Some(id), "broken back-link");
                }
                if level == 0 {
                    assert!(node.down.is_none(), "level 0 node with a down link");
                } else {
                    let down = node.down.expect("upper node without a down link");
                    assert_eq!(self.arena[down].up, Some(id), "broken tower link");
                    assert_eq!(self.arena[down].value, node.value, "tower value mismatch");
                }
                cur = node.next;
            }
        }
    }
}

#[cfg(test)]
fn is_subsequence<K: PartialEq>(upper: &[K], lower: &[K]) -> bool {
    let mut lower_iter = lower.iter();
    upper.iter().all(|item| lower_iter.any(|candidate| candidate == item))
}
