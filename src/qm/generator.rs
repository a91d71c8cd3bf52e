#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Prime implicant generation.
//!
//! The generator buckets the initial minterm implicants by popcount and then
//! repeatedly merges every implicant in bucket `i` with every implicant in bucket
//! `i + 1` of the same generation. Two terms that differ in a single fixed literal
//! always sit in adjacent buckets, so only those pairs need to be compared.
//!
//! Each pass produces a fresh snapshot of which implicants took part in at least
//! one merge. Every implicant left out of that snapshot is prime and is retired;
//! the merge results form the next generation. The loop stops once a generation
//! is empty.
//!
//! Merge results are de-duplicated per generation through their
//! [`ImplicantKey`], since the same reduced term is usually reachable from several
//! parent pairs (e.g. `0,1 + 2,3` and `0,2 + 1,3`).

use crate::qm::implicant::Implicant;
use crate::qm::literal::{ImplicantKey, MAX_WIDTH, Minterm};
use bit_vec::BitVec;
use log::{debug, trace};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Counters collected while generating prime implicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationStats {
    /// Number of merge passes run, including the final pass that produced nothing.
    pub generations: usize,
    /// Number of implicant pairs compared.
    pub comparisons: usize,
    /// Number of successful merges, duplicates included.
    pub merges: usize,
    /// Number of merge results dropped because the generation already held an
    /// equal term.
    pub duplicates_skipped: usize,
    /// Number of prime implicants produced.
    pub prime_implicants: usize,
}

/// One generation of implicants, bucketed by the number of true literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    buckets: Vec<Vec<Implicant>>,
}

impl Generation {
    /// Builds generation 0: one implicant per minterm, bucketed by popcount.
    ///
    /// # Arguments
    /// * `width` - The number of input variables.
    /// * `minterms` - The terms to bucket, visited in ascending order.
    #[must_use]
    pub fn from_minterms(width: usize, minterms: &BTreeSet<Minterm>) -> Self {
        let mut generation = Self::empty(width);
        for &minterm in minterms {
            let implicant = Implicant::new(width, minterm);
            generation.buckets[implicant.bit_count()].push(implicant);
        }
        generation
    }

    fn empty(width: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); width + 1],
        }
    }

    /// Returns `true` if no bucket holds an implicant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Total number of implicants across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// The bucket holding implicants with `index` true literals.
    #[must_use]
    pub fn bucket(&self, index: usize) -> &[Implicant] {
        self.buckets.get(index).map_or(&[], Vec::as_slice)
    }

    /// Runs one merge pass over this generation.
    ///
    /// # Returns
    /// A tuple of the next generation and the implicants of this generation that
    /// took part in no merge, already marked prime, in bucket order.
    pub fn advance(self, stats: &mut GenerationStats) -> (Self, Vec<Implicant>) {
        let Some(width) = self.buckets.len().checked_sub(1) else {
            return (self, Vec::new());
        };
        let mut next = Self::empty(width);
        let mut seen: FxHashSet<ImplicantKey> = FxHashSet::default();

        let mut merged: Vec<BitVec> = self
            .buckets
            .iter()
            .map(|bucket| BitVec::from_elem(bucket.len(), false))
            .collect();

        for i in 0..width {
            let (current, upper) = (&self.buckets[i], &self.buckets[i + 1]);
            for (a_idx, a) in current.iter().enumerate() {
                for (b_idx, b) in upper.iter().enumerate() {
                    stats.comparisons += 1;
                    let Some(position) = a.differing_position(b) else {
                        continue;
                    };
                    let Ok(combined) = Implicant::merge(a, b, position) else {
                        continue;
                    };

                    stats.merges += 1;
                    merged[i].set(a_idx, true);
                    merged[i + 1].set(b_idx, true);

                    if seen.insert(combined.key()) {
                        trace!(
                            "Merged {} and {} into {}",
                            a.to_bit_string(),
                            b.to_bit_string(),
                            combined.to_bit_string()
                        );
                        next.buckets[i].push(combined);
                    } else {
                        stats.duplicates_skipped += 1;
                    }
                }
            }
        }

        let primes = self
            .buckets
            .into_iter()
            .zip(merged)
            .flat_map(|(bucket, flags)| {
                bucket
                    .into_iter()
                    .zip(flags.into_iter())
                    .filter(|(_, was_merged)| !was_merged)
                    .map(|(implicant, _)| implicant.into_prime())
            })
            .collect();

        (next, primes)
    }
}

/// Generates the complete set of prime implicants of a boolean function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimeImplicantGenerator {
    width: usize,
}

impl PrimeImplicantGenerator {
    /// Creates a generator for functions of `width` variables.
    ///
    /// # Panics
    /// Panics if `width` exceeds [`MAX_WIDTH`].
    #[must_use]
    pub const fn new(width: usize) -> Self {
        assert!(width <= MAX_WIDTH, "width exceeds MAX_WIDTH");
        Self { width }
    }

    /// Number of input variables.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Computes every prime implicant of the terms.
    ///
    /// `terms` should contain both the minterms and the don't-cares, since
    /// don't-cares may take part in merges.
    ///
    /// # Returns
    /// The prime implicants, each structurally distinct and marked prime, ordered
    /// by generation and then by bucket, together with the collected counters.
    #[must_use]
    pub fn generate(&self, terms: &BTreeSet<Minterm>) -> (Vec<Implicant>, GenerationStats) {
        let mut stats = GenerationStats::default();
        let mut primes = Vec::new();
        let mut generation = Generation::from_minterms(self.width, terms);

        while !generation.is_empty() {
            let size = generation.len();
            let (next, promoted) = generation.advance(&mut stats);
            stats.generations += 1;
            debug!(
                "Generation {}: {} implicants, {} promoted to prime",
                stats.generations - 1,
                size,
                promoted.len()
            );
            primes.extend(promoted);
            generation = next;
        }

        stats.prime_implicants = primes.len();
        (primes, stats)
    }
}

/// Convenience wrapper around [`PrimeImplicantGenerator::generate`] that drops
/// the statistics.
#[must_use]
pub fn prime_implicants(width: usize, terms: &BTreeSet<Minterm>) -> Vec<Implicant> {
    PrimeImplicantGenerator::new(width).generate(terms).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn terms(values: &[Minterm]) -> BTreeSet<Minterm> {
        values.iter().copied().collect()
    }

    fn rendered(primes: &[Implicant]) -> Vec<String> {
        primes.iter().map(Implicant::render).sorted().collect()
    }

    #[test]
    fn test_generation_zero_buckets_by_popcount() {
        let generation = Generation::from_minterms(3, &terms(&[0, 3, 5, 6, 7, 1]));
        assert_eq!(generation.len(), 6);
        assert_eq!(generation.bucket(0).len(), 1);
        assert_eq!(generation.bucket(1).len(), 1);
        assert_eq!(generation.bucket(2).len(), 3);
        assert_eq!(generation.bucket(3).len(), 1);
        assert!(generation.bucket(4).is_empty());
    }

    #[test]
    fn test_advance_without_buckets() {
        let mut stats = GenerationStats::default();
        let (next, primes) = Generation { buckets: Vec::new() }.advance(&mut stats);
        assert!(next.is_empty());
        assert!(primes.is_empty());
        assert_eq!(stats.comparisons, 0);
    }

    #[test]
    #[should_panic(expected = "width exceeds MAX_WIDTH")]
    fn test_generator_rejects_wide_functions() {
        let _ = PrimeImplicantGenerator::new(MAX_WIDTH + 1);
    }

    #[test]
    fn test_generator_accepts_max_width() {
        let (primes, _) = PrimeImplicantGenerator::new(MAX_WIDTH).generate(&terms(&[1]));
        assert_eq!(primes.len(), 1);
        assert_eq!(primes[0].literal_count(), MAX_WIDTH);
    }

    #[test]
    fn test_empty_input() {
        let (primes, stats) = PrimeImplicantGenerator::new(3).generate(&BTreeSet::new());
        assert!(primes.is_empty());
        assert_eq!(stats.generations, 0);
        assert_eq!(stats.prime_implicants, 0);
    }

    #[test]
    fn test_single_minterm_is_prime() {
        let primes = prime_implicants(1, &terms(&[0]));
        assert_eq!(primes.len(), 1);
        assert!(primes[0].is_prime());
        assert_eq!(primes[0].render(), "A'");
    }

    #[test]
    fn test_lone_all_ones_minterm_is_prime() {
        // The top bucket never acts as the lower side of a comparison.
        let primes = prime_implicants(3, &terms(&[7, 0]));
        assert_eq!(rendered(&primes), vec!["A'B'C'", "ABC"]);
    }

    #[test]
    fn test_full_space_collapses_to_constant_one() {
        let (primes, stats) = PrimeImplicantGenerator::new(2).generate(&terms(&[0, 1, 2, 3]));
        assert_eq!(primes.len(), 1);
        assert_eq!(primes[0].render(), "");
        assert_eq!(primes[0].coverage(), &[0, 1, 2, 3]);
        assert_eq!(stats.generations, 3);
        // 0-1/2-3 and 0-2/1-3 both yield "--".
        assert_eq!(stats.duplicates_skipped, 1);
    }

    #[test]
    fn test_cyclic_function_primes() {
        let primes = prime_implicants(3, &terms(&[0, 1, 2, 5, 6, 7]));
        assert_eq!(
            rendered(&primes),
            vec!["A'B'", "A'C'", "AB", "AC", "B'C", "BC'"]
        );
        assert!(primes.iter().all(|p| p.eliminated_count() == 1));
    }

    #[test]
    fn test_primes_survive_at_different_generations() {
        // m(0,1,2,3,7): A' covers 0-3, BC covers 3,7.
        let primes = prime_implicants(3, &terms(&[0, 1, 2, 3, 7]));
        assert_eq!(rendered(&primes), vec!["A'", "BC"]);
        let bc = primes.iter().find(|p| p.render() == "BC").unwrap();
        assert_eq!(bc.coverage(), &[3, 7]);
    }

    #[test]
    fn test_primes_are_structurally_distinct() {
        let primes = prime_implicants(4, &terms(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]));
        for (a, b) in primes.iter().tuple_combinations() {
            assert!(!a.structurally_eq(b));
        }
        assert_eq!(rendered(&primes), vec!["A'", "B'"]);
    }

    #[test]
    fn test_classic_four_variable_example() {
        // f = m(4,8,10,11,12,15) + d(9,14)
        let primes = prime_implicants(4, &terms(&[4, 8, 9, 10, 11, 12, 14, 15]));
        assert_eq!(rendered(&primes), vec!["AB'", "AC", "AD'", "BC'D'"]);
    }
}
