//! A skiplist implementation which allows faster random access than a
//! standard linked list.
//!
//! SkipLists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level `n > 0` will contain a random subset of the nodes on level `n - 1`.
//! Rather than pre-rolling a height for each node, promotion here is decided
//! one coin flip at a time while an insertion climbs back up its own search
//! path, which yields the same geometric distribution (about half the keys
//! reach level 1, a quarter reach level 2, and so on).
//!
//! Two details differ from the textbook structure. There is no
//! negative-infinity sentinel: every per-level head holds the current global
//! minimum and is rewritten whenever the minimum changes, so a search can
//! always enter at the top head. And nodes live in an id-addressed arena
//! rather than behind raw pointers, so unlinking can never dangle.
//!
//! The coin itself is injectable; see [`coin`] for the seeded and scripted
//! sources used to pin down the structure in tests.

pub mod coin;
pub mod skiplist;
mod skipnode;
