#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Product terms over a fixed number of input variables.
//!
//! An `Implicant` pairs a tri-state literal vector with the sorted set of minterm
//! indices it was built from. Implicants are created once per minterm and every
//! merge produces a new value; nothing is mutated after construction except the
//! prime marker set by the generator when it promotes a term.

use crate::qm::literal::{ImplicantKey, LiteralState, MAX_WIDTH, Minterm};
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Inline storage for literal vectors; most problems have at most eight variables.
pub type Literals = SmallVec<[LiteralState; 8]>;

/// Reasons a pair of implicants cannot be merged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The implicants have literal vectors of different lengths.
    #[error("cannot merge implicants of width {left} and {right}")]
    WidthMismatch {
        /// Width of the left operand.
        left: usize,
        /// Width of the right operand.
        right: usize,
    },

    /// The implicants do not differ in exactly the given position, or that
    /// position is not a true/false pair.
    #[error("implicants are not adjacent at position {position}")]
    NotAdjacent {
        /// The requested merge position.
        position: usize,
    },
}

/// A product term: one literal per input variable plus the minterms it covers.
///
/// `==` compares every field. Use [`Implicant::structurally_eq`] to compare
/// literal patterns only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Implicant {
    literals: Literals,
    coverage: Vec<Minterm>,
    bit_count: usize,
    eliminated_count: usize,
    prime: bool,
}

impl Implicant {
    /// Builds the implicant for a single minterm over `width` variables.
    ///
    /// # Arguments
    /// * `width` - The number of input variables.
    /// * `value` - The minterm; bit `i` becomes literal `i`.
    ///
    /// # Panics
    /// Panics if `width` exceeds [`MAX_WIDTH`].
    #[must_use]
    pub fn new(width: usize, value: Minterm) -> Self {
        assert!(
            width <= MAX_WIDTH,
            "width {width} exceeds the maximum of {MAX_WIDTH}"
        );
        let literals: Literals = (0..width)
            .map(|i| LiteralState::from_bit(value, i))
            .collect();
        let bit_count = literals
            .iter()
            .filter(|&&lit| lit == LiteralState::True)
            .count();

        Self {
            literals,
            coverage: vec![value],
            bit_count,
            eliminated_count: 0,
            prime: false,
        }
    }

    /// Merges two adjacent implicants at `position`.
    ///
    /// The result is a copy of `a` with `position` eliminated, one more eliminated
    /// literal, and the sorted union of both coverage sets.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::WidthMismatch`] if the widths differ and
    /// [`MergeError::NotAdjacent`] unless `a` and `b` agree everywhere except at
    /// `position`, where one is true and the other false.
    pub fn merge(a: &Self, b: &Self, position: usize) -> Result<Self, MergeError> {
        if a.width() != b.width() {
            return Err(MergeError::WidthMismatch {
                left: a.width(),
                right: b.width(),
            });
        }
        if a.differing_position(b) != Some(position) {
            return Err(MergeError::NotAdjacent { position });
        }

        let mut literals = a.literals.clone();
        literals[position] = LiteralState::Eliminated;

        Ok(Self {
            literals,
            coverage: a
                .coverage
                .iter()
                .merge(b.coverage.iter())
                .dedup()
                .copied()
                .collect(),
            bit_count: a.bit_count,
            eliminated_count: a.eliminated_count + 1,
            prime: false,
        })
    }

    /// Finds the single position at which `self` and `other` hold opposite fixed
    /// values.
    ///
    /// Returns `None` if the widths differ, if the vectors are identical, if they
    /// differ in more than one position, or if the only difference involves an
    /// eliminated literal.
    #[must_use]
    pub fn differing_position(&self, other: &Self) -> Option<usize> {
        if self.width() != other.width() {
            return None;
        }

        let mut differing = self
            .literals
            .iter()
            .zip(other.literals.iter())
            .positions(|(a, b)| a != b);

        let position = differing.next()?;
        if differing.next().is_some() {
            return None;
        }

        let (a, b) = (self.literals[position], other.literals[position]);
        (a.is_fixed() && b.is_fixed()).then_some(position)
    }

    /// Literal-vector equality, ignoring coverage, counts and the prime marker.
    #[must_use]
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.literals == other.literals
    }

    /// Canonical key of the literal vector.
    #[must_use]
    pub fn key(&self) -> ImplicantKey {
        ImplicantKey::from_literals(&self.literals)
    }

    /// Checks whether the literal pattern of this term contains `minterm`.
    ///
    /// Unlike [`Implicant::coverage`], this answers for any minterm, including
    /// don't-cares and terms that never took part in the merge.
    #[must_use]
    pub fn covers(&self, minterm: Minterm) -> bool {
        self.literals
            .iter()
            .enumerate()
            .all(|(i, lit)| lit.accepts((minterm >> i) & 1 == 1))
    }

    /// Renders the product term, most-significant variable first.
    ///
    /// Variables are lettered `A, B, C, ...` from the most-significant bit down.
    /// A false literal renders as `X'`, a true literal as `X` and an eliminated
    /// literal renders nothing, so a term with every literal eliminated (the
    /// constant 1) renders as the empty string.
    #[must_use]
    pub fn render(&self) -> String {
        let width = self.width();
        let mut result = String::with_capacity(width * 2);
        for i in (0..width).rev() {
            #[allow(clippy::cast_possible_truncation)]
            let letter = char::from(b'A' + (width - i - 1) as u8);
            match self.literals[i] {
                LiteralState::False => {
                    result.push(letter);
                    result.push('\'');
                }
                LiteralState::True => result.push(letter),
                LiteralState::Eliminated => {}
            }
        }
        result
    }

    /// Renders the literal vector as `1`/`0`/`-`, most-significant bit first,
    /// with a trailing `*` on prime implicants.
    #[must_use]
    pub fn to_bit_string(&self) -> String {
        let mut result: String = self.literals.iter().rev().map(|lit| lit.to_char()).collect();
        if self.prime {
            result.push('*');
        }
        result
    }

    /// Number of input variables.
    #[must_use]
    pub fn width(&self) -> usize {
        self.literals.len()
    }

    /// The literal vector, indexed by bit position.
    #[must_use]
    pub fn literals(&self) -> &[LiteralState] {
        &self.literals
    }

    /// The covered minterms, sorted ascending and de-duplicated.
    #[must_use]
    pub fn coverage(&self) -> &[Minterm] {
        &self.coverage
    }

    /// Number of true literals in the originating minterm.
    #[must_use]
    pub const fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Number of eliminated literals.
    #[must_use]
    pub const fn eliminated_count(&self) -> usize {
        self.eliminated_count
    }

    /// Number of literals that appear in the rendered term.
    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.width() - self.eliminated_count
    }

    /// Whether the generator promoted this term to a prime implicant.
    #[must_use]
    pub const fn is_prime(&self) -> bool {
        self.prime
    }

    pub(crate) fn into_prime(mut self) -> Self {
        self.prime = true;
        self
    }
}

impl Display for Implicant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged(width: usize, a: Minterm, b: Minterm) -> Implicant {
        let a = Implicant::new(width, a);
        let b = Implicant::new(width, b);
        let position = a.differing_position(&b).unwrap();
        Implicant::merge(&a, &b, position).unwrap()
    }

    #[test]
    fn test_new() {
        let imp = Implicant::new(3, 0b101);
        assert_eq!(imp.width(), 3);
        assert_eq!(imp.bit_count(), 2);
        assert_eq!(imp.eliminated_count(), 0);
        assert_eq!(imp.coverage(), &[5]);
        assert_eq!(
            imp.literals(),
            &[LiteralState::True, LiteralState::False, LiteralState::True]
        );
        assert!(!imp.is_prime());
    }

    #[test]
    fn test_render_at_max_width() {
        let rendered = Implicant::new(MAX_WIDTH, 0).render();
        assert!(rendered.starts_with("A'"));
        assert!(rendered.ends_with("Z'"));
    }

    #[test]
    #[should_panic(expected = "exceeds the maximum")]
    fn test_new_rejects_wide_terms() {
        let _ = Implicant::new(40, 1);
    }

    #[test]
    fn test_render_msb_first() {
        assert_eq!(Implicant::new(3, 0b101).render(), "AB'C");
        assert_eq!(Implicant::new(3, 0b001).render(), "A'B'C");
        assert_eq!(Implicant::new(1, 0).render(), "A'");
        assert_eq!(Implicant::new(1, 1).render(), "A");
    }

    #[test]
    fn test_merge() {
        let imp = merged(3, 0b000, 0b001);
        assert_eq!(imp.render(), "A'B'");
        assert_eq!(imp.coverage(), &[0, 1]);
        assert_eq!(imp.eliminated_count(), 1);
        assert_eq!(imp.bit_count(), 0);
        assert_eq!(imp.to_bit_string(), "00-");
    }

    #[test]
    fn test_merge_unions_coverage_sorted() {
        let low = merged(3, 0b100, 0b101);
        let high = merged(3, 0b110, 0b111);
        let position = low.differing_position(&high).unwrap();
        assert_eq!(position, 1);
        let imp = Implicant::merge(&high, &low, position).unwrap();
        assert_eq!(imp.coverage(), &[4, 5, 6, 7]);
        assert_eq!(imp.render(), "A");
        assert_eq!(imp.eliminated_count(), 2);
    }

    #[test]
    fn test_all_eliminated_renders_empty() {
        let left = merged(2, 0, 1);
        let right = merged(2, 2, 3);
        let position = left.differing_position(&right).unwrap();
        let one = Implicant::merge(&left, &right, position).unwrap();
        assert_eq!(one.render(), "");
        assert_eq!(one.to_bit_string(), "--");
        assert_eq!(one.coverage(), &[0, 1, 2, 3]);
        assert_eq!(one.literal_count(), 0);
    }

    #[test]
    fn test_differing_position() {
        let a = Implicant::new(3, 0b000);
        assert_eq!(a.differing_position(&Implicant::new(3, 0b010)), Some(1));
        assert_eq!(a.differing_position(&Implicant::new(3, 0b011)), None);
        assert_eq!(a.differing_position(&Implicant::new(3, 0b000)), None);
        assert_eq!(a.differing_position(&Implicant::new(4, 0b010)), None);
    }

    #[test]
    fn test_differing_position_rejects_eliminated_mismatch() {
        // 00- and 0-0 differ in two positions.
        let a = merged(3, 0b000, 0b001);
        let b = merged(3, 0b000, 0b010);
        assert_eq!(a.differing_position(&b), None);

        // 0- against a plain 00 differs only where one side is eliminated.
        let c = merged(2, 0b00, 0b01);
        let d = Implicant::new(2, 0b00);
        assert_eq!(c.differing_position(&d), None);
    }

    #[test]
    fn test_merge_errors() {
        let a = Implicant::new(3, 0b000);
        assert_eq!(
            Implicant::merge(&a, &Implicant::new(2, 0b00), 0),
            Err(MergeError::WidthMismatch { left: 3, right: 2 })
        );
        assert_eq!(
            Implicant::merge(&a, &Implicant::new(3, 0b011), 0),
            Err(MergeError::NotAdjacent { position: 0 })
        );
        assert_eq!(
            Implicant::merge(&a, &Implicant::new(3, 0b001), 2),
            Err(MergeError::NotAdjacent { position: 2 })
        );
    }

    #[test]
    fn test_structural_equality_ignores_coverage() {
        let via_low = Implicant::merge(&merged(3, 0, 1), &merged(3, 2, 3), 1).unwrap();
        let via_mid = Implicant::merge(&merged(3, 0, 2), &merged(3, 1, 3), 0).unwrap();
        assert!(via_low.structurally_eq(&via_mid));
        assert_eq!(via_low.key(), via_mid.key());
        assert_eq!(via_low.render(), via_mid.render());
        assert!(!via_low.structurally_eq(&Implicant::new(3, 0)));
    }

    #[test]
    fn test_covers() {
        let imp = merged(3, 0b100, 0b110);
        assert!(imp.covers(0b100));
        assert!(imp.covers(0b110));
        assert!(!imp.covers(0b101));
        assert!(!imp.covers(0b000));
        for m in 0..8 {
            assert_eq!(imp.covers(m), imp.key().contains(m));
        }
    }

    #[test]
    fn test_prime_marker_in_bit_string() {
        let imp = Implicant::new(2, 0b10).into_prime();
        assert!(imp.is_prime());
        assert_eq!(imp.to_bit_string(), "10*");
    }
}
