/// A probabilistic multi-level ordered index: search, insert, and delete in
/// expected O(log n) with no rebalancing step.
pub mod skiplist;

pub use skiplist::{
    coin::{
        CoinSource,
        RngCoin,
        ScriptedCoin,
    },
    skiplist::{
        Iter,
        SkipList,
    },
};
