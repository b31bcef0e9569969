//! # detmap
//!
//! A deterministic ordered map for consensus-critical code.
//!
//! ## Overview
//!
//! Independent processes that build the same logical mapping must observe it
//! in the same iteration order, or anything driven by that iteration
//! (serializing state, hashing it, distributing rewards pro-rata) diverges
//! between nodes. This crate provides:
//!
//! - **Ordered Map**: [`OrderedMap`], a hash map with a cached, strategy-defined
//!   key order and lazy ordered traversal
//! - **Key Orders**: pluggable [`KeyOrder`] strategies for string, composite and
//!   custom keys
//! - **Asset Pairs**: the [`AssetPair`] composite key and its [`PairMap`] alias
//!
//! ## Feature Flags
//!
//! - `serde`: Serialize maps in deterministic key order
//! - `rayon`: Parallel rebuild of the key order
//! - `async`: Ordered keys as a `futures::Stream`
//! - `fxhash`: Use `FxHash` for the backing store
//! - `ahash`: Use `AHash` for the backing store
//! - `full`: Enable `serde`, `rayon` and `async`
//!
//! ## Example
//!
//! ```rust
//! use detmap::prelude::*;
//!
//! let mut rewards: StringMap<u64> = StringMap::new();
//! rewards.insert("validator-c".to_string(), 30);
//! rewards.insert("validator-a".to_string(), 10);
//! rewards.insert("validator-b".to_string(), 20);
//!
//! let payout_order: Vec<&String> = rewards.iter().collect();
//! assert_eq!(payout_order, ["validator-a", "validator-b", "validator-c"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use detmap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::asset::{AssetPair, PairError, PairMap};
    pub use crate::map::{Maintenance, OrderedMap, StringMap};
    pub use crate::order::{
        Composite, CompositeKey, FnOrder, KeyOrder, Lexicographic, Natural, Reversed,
    };
}

pub mod asset;
pub mod map;
pub mod order;

pub use asset::{AssetPair, PairError, PairMap};
pub use map::{Maintenance, OrderedMap, StringMap};
pub use order::KeyOrder;
