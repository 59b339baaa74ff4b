//! # Part Kinds
//!
//! The closed set of categories an inventory unit can be.
//!
//! A complete unit needs exactly one of each kind:
//!
//! ```text
//! ┌──────┐ ┌───────┐ ┌──────┐ ┌──────┐
//! │ Head │+│ Torso │+│ Hand │+│ Feet │ = 1 complete set
//! └──────┘ └───────┘ └──────┘ └──────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four part categories.
///
/// The declaration order is the stable order exposed by [`PartKind::ALL`]
/// and [`PartKind::index`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PartKind {
    /// Kind A.
    Head = 0,
    /// Kind B.
    Torso = 1,
    /// Kind C.
    Hand = 2,
    /// Kind D.
    Feet = 3,
}

impl PartKind {
    /// Number of distinct kinds.
    pub const COUNT: usize = 4;

    /// All kinds, in stable order.
    pub const ALL: [Self; Self::COUNT] = [Self::Head, Self::Torso, Self::Hand, Self::Feet];

    /// Stable position of this kind (0..4).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`PartKind::index`].
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Head),
            1 => Some(Self::Torso),
            2 => Some(Self::Hand),
            3 => Some(Self::Feet),
            _ => None,
        }
    }

    /// Lowercase name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Torso => "torso",
            Self::Hand => "hand",
            Self::Feet => "feet",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-kind occurrence counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartTally {
    counts: [usize; PartKind::COUNT],
}

impl PartTally {
    /// Creates an all-zero tally.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: [0; PartKind::COUNT],
        }
    }

    /// Counts every part yielded by `parts`.
    #[must_use]
    pub fn from_parts<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a PartKind>,
    {
        let mut tally = Self::new();
        for &part in parts {
            tally.add(part);
        }
        tally
    }

    /// Records one more part of `kind`.
    #[inline]
    pub fn add(&mut self, kind: PartKind) {
        self.counts[kind.index()] += 1;
    }

    /// Count for a single kind.
    #[inline]
    #[must_use]
    pub const fn count(&self, kind: PartKind) -> usize {
        self.counts[kind.index()]
    }

    /// Sum over all kinds.
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Raw counts in [`PartKind::ALL`] order.
    #[inline]
    #[must_use]
    pub const fn as_array(&self) -> [usize; PartKind::COUNT] {
        self.counts
    }

    /// Number of complete sets (one of every kind) these parts can build.
    ///
    /// Zero if any kind is missing, otherwise the smallest per-kind count.
    #[must_use]
    pub fn complete_sets(&self) -> usize {
        self.counts.iter().copied().min().unwrap_or(0)
    }
}
