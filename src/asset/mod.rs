//! Asset pair keys.
//!
//! [`AssetPair`] is the composite key used when state is keyed by trading
//! pair, for example exchange-rate votes tallied per pair. [`PairMap`] keeps
//! such state in a deterministic order.
//!
//! Only the shape of a pair (`base:quote`, both sides non-empty) is checked
//! here. Validating the individual denominations is the caller's concern.
//!
//! # Examples
//!
//! ```rust
//! use detmap::asset::{AssetPair, PairMap};
//!
//! let mut votes: PairMap<u64> = PairMap::new();
//! votes.insert("uusd:ubtc".parse().unwrap(), 7);
//! votes.insert("ubtc:uusd".parse().unwrap(), 3);
//! votes.insert("ubtc:uatom".parse().unwrap(), 5);
//!
//! let order: Vec<String> = votes.iter().map(AssetPair::to_string).collect();
//! assert_eq!(order, vec!["ubtc:uatom", "ubtc:uusd", "uusd:ubtc"]);
//! ```

mod error;
mod pair;

pub use error::PairError;
pub use pair::AssetPair;

use crate::map::{DefaultHashBuilder, OrderedMap};
use crate::order::Composite;

/// An [`OrderedMap`] keyed by [`AssetPair`], ordered by base then quote.
pub type PairMap<V, S = DefaultHashBuilder> = OrderedMap<AssetPair, V, Composite, S>;
