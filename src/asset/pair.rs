//! Trading pair keys.

use super::PairError;
use crate::order::CompositeKey;
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = ':';

/// A `base:quote` trading pair, such as `ubtc:uusd`.
///
/// Pairs order by base asset first and quote asset second, both through the
/// derived [`Ord`] and through [`Composite`](crate::order::Composite).
///
/// # Examples
///
/// ```rust
/// use detmap::asset::AssetPair;
///
/// let pair: AssetPair = "ubtc:uusd".parse().unwrap();
/// assert_eq!(pair.base(), "ubtc");
/// assert_eq!(pair.quote(), "uusd");
/// assert_eq!(pair.inverse().to_string(), "uusd:ubtc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetPair {
    base: String,
    quote: String,
}

impl AssetPair {
    /// Creates a pair from its two assets.
    ///
    /// Accepts exactly the pairs whose `base:quote` form parses back to the
    /// same assets, so every pair survives a string round trip.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::EmptyAsset`] when either asset is empty and
    /// [`PairError::TooManyParts`] when either asset contains `:`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use detmap::asset::{AssetPair, PairError};
    ///
    /// let pair = AssetPair::try_new("ubtc", "uusd").unwrap();
    /// assert_eq!(pair.to_string(), "ubtc:uusd");
    ///
    /// assert!(matches!(
    ///     AssetPair::try_new("ibc:x", "uusd"),
    ///     Err(PairError::TooManyParts { parts: 3, .. })
    /// ));
    /// ```
    pub fn try_new(base: impl AsRef<str>, quote: impl AsRef<str>) -> Result<Self, PairError> {
        format!("{}{SEPARATOR}{}", base.as_ref(), quote.as_ref()).parse()
    }

    /// Returns the base asset.
    #[inline]
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the quote asset.
    #[inline]
    #[must_use]
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Returns the pair with base and quote swapped.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }
}

impl FromStr for AssetPair {
    type Err = PairError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.split(SEPARATOR).collect();
        match parts.as_slice() {
            [_] => Err(PairError::MissingSeparator {
                input: input.to_string(),
            }),
            [base, quote] if base.is_empty() || quote.is_empty() => Err(PairError::EmptyAsset {
                input: input.to_string(),
            }),
            [base, quote] => Ok(Self {
                base: (*base).to_string(),
                quote: (*quote).to_string(),
            }),
            _ => Err(PairError::TooManyParts {
                input: input.to_string(),
                parts: parts.len(),
            }),
        }
    }
}

impl TryFrom<&str> for AssetPair {
    type Error = PairError;

    fn try_from(input: &str) -> Result<Self, Self::Error> {
        input.parse()
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}{SEPARATOR}{}", self.base, self.quote)
    }
}

impl CompositeKey for AssetPair {
    type Primary = str;
    type Secondary = str;

    #[inline]
    fn primary(&self) -> &str {
        &self.base
    }

    #[inline]
    fn secondary(&self) -> &str {
        &self.quote
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for AssetPair {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AssetPair {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let input = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        input.parse().map_err(serde::de::Error::custom)
    }
}
