//! Configuration for abtree: default fanout bounds and the validated
//! [`TreeConfig`] pair.

use std::fmt;

use crate::common::{Error, Result};

/// Smallest lower bound `a` a tree accepts.
///
/// With `a = 2` every non-root node holds at least one key, so a node that
/// is not the root always has a sibling through its parent.
pub const MIN_LOWER_BOUND: usize = 2;

/// Default lower bound (2-3 tree).
pub const DEFAULT_LOWER_BOUND: usize = 2;

/// Default upper bound (2-3 tree).
pub const DEFAULT_UPPER_BOUND: usize = 3;

/// The two fanout parameters of an (a,b)-tree.
///
/// Every non-root node holds between `a - 1` and `b - 1` keys, i.e. it has
/// between `a` and `b` children when internal. A `TreeConfig` can only be
/// built through [`TreeConfig::new`], so holding one means `b >= 2a - 1`
/// already holds.
///
/// # Example
/// ```
/// use abtree::TreeConfig;
///
/// let config = TreeConfig::new(2, 4).unwrap();
/// assert_eq!(config.max_keys(), 3);
/// assert_eq!(config.min_keys(), 1);
///
/// assert!(TreeConfig::new(3, 4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeConfig {
    lower: usize,
    upper: usize,
}

impl TreeConfig {
    /// Validate and build a config.
    ///
    /// # Errors
    /// `Error::InvalidBounds` if `a < 2` or `b < 2a - 1`.
    pub fn new(lower: usize, upper: usize) -> Result<Self> {
        if lower < MIN_LOWER_BOUND {
            return Err(Error::InvalidBounds { lower, upper });
        }

        // 2a - 1 may not fit in a usize for absurd lower bounds.
        match lower.checked_mul(2) {
            Some(doubled) if upper >= doubled - 1 => Ok(Self { lower, upper }),
            _ => Err(Error::InvalidBounds { lower, upper }),
        }
    }

    /// The lower bound `a`.
    #[inline]
    pub fn lower(&self) -> usize {
        self.lower
    }

    /// The upper bound `b`.
    #[inline]
    pub fn upper(&self) -> usize {
        self.upper
    }

    /// Fewest keys a non-root node may hold (`a - 1`).
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.lower - 1
    }

    /// Most keys any node may hold between operations (`b - 1`).
    #[inline]
    pub fn max_keys(&self) -> usize {
        self.upper - 1
    }

    /// Index of the key promoted when an overflowing node splits (`b / 2`).
    #[inline]
    pub fn split_index(&self) -> usize {
        self.upper / 2
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            lower: DEFAULT_LOWER_BOUND,
            upper: DEFAULT_UPPER_BOUND,
        }
    }
}

impl fmt::Display for TreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-tree", self.lower, self.upper)
    }
}
