#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Tri-state literals and the canonical key derived from a literal vector.
//!
//! Every input variable of a product term is in one of three states: it must be
//! true, it must be false, or it has been eliminated by a merge and no longer
//! appears in the term. A literal vector is indexed by bit position, so index `0`
//! is the least-significant variable of a minterm.
//!
//! `ImplicantKey` packs a literal vector into two masks so that duplicate terms
//! within a merge generation can be detected with a hash lookup instead of a
//! linear scan.

use std::fmt::{Display, Formatter};

/// A minterm (or don't-care) index. Bit `i` is the value of variable `i`.
pub type Minterm = u32;

/// Largest supported number of input variables.
///
/// Variables are rendered as the letters `A` through `Z`, so the width is capped at 26.
pub const MAX_WIDTH: usize = 26;

/// The state of a single variable within a product term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LiteralState {
    /// The variable must be false (complemented literal).
    #[default]
    False,
    /// The variable must be true (uncomplemented literal).
    True,
    /// The variable has been merged away and does not constrain the term.
    Eliminated,
}

impl LiteralState {
    /// Returns the state of bit `position` of `value`.
    #[must_use]
    pub const fn from_bit(value: Minterm, position: usize) -> Self {
        if (value >> position) & 1 == 1 {
            Self::True
        } else {
            Self::False
        }
    }

    /// Returns `true` if the variable has been eliminated.
    #[must_use]
    pub const fn is_eliminated(self) -> bool {
        matches!(self, Self::Eliminated)
    }

    /// Returns `true` if the variable is constrained to a value.
    #[must_use]
    pub const fn is_fixed(self) -> bool {
        !self.is_eliminated()
    }

    /// Checks whether a concrete variable value satisfies this literal.
    #[must_use]
    pub const fn accepts(self, value: bool) -> bool {
        match self {
            Self::True => value,
            Self::False => !value,
            Self::Eliminated => true,
        }
    }

    /// Character used in bit-string renderings (`1`, `0`, `-`).
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::True => '1',
            Self::False => '0',
            Self::Eliminated => '-',
        }
    }
}

impl Display for LiteralState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Canonical, hashable encoding of a literal vector.
///
/// `care` has bit `i` set when variable `i` is fixed; `value` has bit `i` set when
/// variable `i` is fixed to true. Two implicants of the same width have equal keys
/// exactly when they are structurally equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ImplicantKey {
    care: u32,
    value: u32,
}

impl ImplicantKey {
    /// Packs a literal vector into a key.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the vector is longer than [`MAX_WIDTH`].
    #[must_use]
    pub fn from_literals(literals: &[LiteralState]) -> Self {
        debug_assert!(literals.len() <= MAX_WIDTH, "literal vector too wide");
        literals
            .iter()
            .enumerate()
            .fold(Self::default(), |key, (i, &lit)| match lit {
                LiteralState::True => Self {
                    care: key.care | (1 << i),
                    value: key.value | (1 << i),
                },
                LiteralState::False => Self {
                    care: key.care | (1 << i),
                    value: key.value,
                },
                LiteralState::Eliminated => key,
            })
    }

    /// Mask of the fixed (non-eliminated) variables.
    #[must_use]
    pub const fn care(self) -> u32 {
        self.care
    }

    /// Values of the fixed variables; eliminated positions are always zero.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.value
    }

    /// Checks whether the term described by this key contains `minterm`.
    #[must_use]
    pub const fn contains(self, minterm: Minterm) -> bool {
        minterm & self.care == self.value
    }
}
