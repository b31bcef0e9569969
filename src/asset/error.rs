//! Error types for asset pair parsing.

/// Represents a malformed `base:quote` asset pair string.
///
/// # Examples
///
/// ```rust
/// use detmap::asset::{AssetPair, PairError};
///
/// let error = "ubtc".parse::<AssetPair>().unwrap_err();
/// assert_eq!(
///     error,
///     PairError::MissingSeparator {
///         input: "ubtc".to_string()
///     }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairError {
    /// The input contains no `:` separator.
    MissingSeparator {
        /// The rejected input.
        input: String,
    },
    /// The input splits into more than two assets.
    TooManyParts {
        /// The rejected input.
        input: String,
        /// How many `:`-separated parts were found.
        parts: usize,
    },
    /// One side of the separator is empty.
    EmptyAsset {
        /// The rejected input.
        input: String,
    },
}

impl std::fmt::Display for PairError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSeparator { input } => {
                write!(formatter, "invalid asset pair {input:?}: missing ':' separator")
            }
            Self::TooManyParts { input, parts } => write!(
                formatter,
                "invalid asset pair {input:?}: expected exactly two assets, found {parts}"
            ),
            Self::EmptyAsset { input } => {
                write!(formatter, "invalid asset pair {input:?}: empty asset identifier")
            }
        }
    }
}

impl std::error::Error for PairError {}
