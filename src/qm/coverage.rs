#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Prime implicant chart reduction.
//!
//! The chart has one row per prime implicant and one column per required minterm.
//! Don't-cares are stripped from each row up front: they never have to be covered,
//! though the merges that produced the primes may already have used them.
//!
//! Rows are sorted once by a fixed total order (see [`ChartRow::priority_cmp`]) and
//! keep their relative order for the whole run. Each iteration of the solver:
//!
//! 1. Drops every row whose columns are a subset of another row's columns (rows
//!    with no columns left are always dropped). Of two rows with equal columns, the
//!    earlier one is kept.
//! 2. Counts, per column, how many rows still cover it.
//! 3. Selects the first row, in order, that covers a column with a count of one.
//!    That row is essential.
//! 4. If no row is essential the chart is cyclic, and the configured
//!    [`CyclicResolver`] chooses rows to force into the cover.
//!
//! Selected rows leave the chart and their columns are removed from every other
//! row. Every iteration removes at least one row, so the loop runs at most once
//! per prime implicant.

use crate::qm::cyclic::{CyclicResolver, FirstInOrder};
use crate::qm::implicant::Implicant;
use crate::qm::literal::Minterm;
use bit_vec::BitVec;
use itertools::Itertools;
use log::{debug, trace};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// One row of the chart: a prime implicant and the required minterms it still covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRow {
    implicant: Implicant,
    columns: Vec<Minterm>,
}

impl ChartRow {
    /// Builds a row from a prime implicant, dropping the don't-cares from its coverage.
    #[must_use]
    pub fn new(implicant: Implicant, dont_cares: &BTreeSet<Minterm>) -> Self {
        let columns = implicant
            .coverage()
            .iter()
            .copied()
            .filter(|m| !dont_cares.contains(m))
            .collect();
        Self { implicant, columns }
    }

    /// Builds a row with explicit columns. The columns are sorted and de-duplicated.
    #[must_use]
    pub fn from_parts(implicant: Implicant, columns: Vec<Minterm>) -> Self {
        let columns = columns.into_iter().sorted_unstable().dedup().collect();
        Self { implicant, columns }
    }

    /// The implicant behind this row, with its original coverage.
    #[must_use]
    pub const fn implicant(&self) -> &Implicant {
        &self.implicant
    }

    /// The required minterms this row still covers, ascending.
    #[must_use]
    pub fn columns(&self) -> &[Minterm] {
        &self.columns
    }

    /// Returns `true` once every column of this row has been covered elsewhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Checks whether every column of this row is also a column of `other`.
    #[must_use]
    pub fn is_dominated_by(&self, other: &Self) -> bool {
        is_sorted_subset(&self.columns, &other.columns)
    }

    /// The fixed total order used for every selection scan.
    ///
    /// Rows compare by number of columns (descending), then eliminated literals
    /// (descending), then the column lists themselves (ascending, lexicographic),
    /// and finally the implicant key (ascending).
    #[must_use]
    pub fn priority_cmp(a: &Self, b: &Self) -> Ordering {
        b.columns
            .len()
            .cmp(&a.columns.len())
            .then_with(|| {
                b.implicant
                    .eliminated_count()
                    .cmp(&a.implicant.eliminated_count())
            })
            .then_with(|| a.columns.cmp(&b.columns))
            .then_with(|| a.implicant.key().cmp(&b.implicant.key()))
    }

    fn remove_columns(&mut self, covered: &BTreeSet<Minterm>) {
        self.columns.retain(|c| !covered.contains(c));
    }

    fn into_implicant(self) -> Implicant {
        self.implicant
    }
}

impl Display for ChartRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:?}",
            self.implicant.to_bit_string(),
            self.columns
        )
    }
}

/// Checks whether `small` is a subset of `large`; both must be sorted ascending.
fn is_sorted_subset(small: &[Minterm], large: &[Minterm]) -> bool {
    if small.len() > large.len() {
        return false;
    }
    let mut large = large.iter();
    small.iter().all(|x| large.by_ref().any(|y| y == x))
}

/// Why a row entered the cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionReason {
    /// The row was the only one covering `column`.
    Essential {
        /// The column that only this row covered.
        column: Minterm,
    },
    /// The chart was cyclic and the resolver chose this row.
    Forced,
}

/// An implicant in the cover, with the reason it was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverEntry {
    /// The selected prime implicant, with its coverage before don't-care stripping.
    pub implicant: Implicant,
    /// Why it was selected.
    pub reason: SelectionReason,
}

/// The selected implicants, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cover {
    entries: Vec<CoverEntry>,
}

impl Cover {
    /// The selected entries in selection order.
    #[must_use]
    pub fn entries(&self) -> &[CoverEntry] {
        &self.entries
    }

    /// Iterates over the selected implicants in selection order.
    pub fn implicants(&self) -> impl Iterator<Item = &Implicant> {
        self.entries.iter().map(|entry| &entry.implicant)
    }

    /// Number of product terms in the cover.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cover has no terms (the constant 0).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of literals over all terms.
    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.implicants().map(Implicant::literal_count).sum()
    }

    fn push(&mut self, implicant: Implicant, reason: SelectionReason) {
        self.entries.push(CoverEntry { implicant, reason });
    }
}

/// Counters collected while solving the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoverageStats {
    /// Number of reduction iterations.
    pub iterations: usize,
    /// Number of rows dropped by dominance, empty rows included.
    pub dominated_removed: usize,
    /// Number of essential rows selected.
    pub essential_selections: usize,
    /// Number of rows forced by the cyclic resolver.
    pub forced_selections: usize,
}

/// The mutable prime implicant chart of a single solve.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chart {
    rows: Vec<ChartRow>,
}

impl Chart {
    /// Builds the chart from prime implicants and sorts it into its fixed order.
    #[must_use]
    pub fn new(primes: &[Implicant], dont_cares: &BTreeSet<Minterm>) -> Self {
        let mut rows: Vec<ChartRow> = primes
            .iter()
            .cloned()
            .map(|p| ChartRow::new(p, dont_cares))
            .collect();
        rows.sort_by(ChartRow::priority_cmp);
        Self { rows }
    }

    /// The remaining rows, in order.
    #[must_use]
    pub fn rows(&self) -> &[ChartRow] {
        &self.rows
    }

    /// Returns `true` once every row has been selected or dropped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drops empty and dominated rows.
    ///
    /// # Returns
    /// The number of rows dropped.
    pub fn remove_dominated(&mut self) -> usize {
        let n = self.rows.len();
        let mut dominated = BitVec::from_elem(n, false);

        for i in 0..n {
            if dominated[i] {
                continue;
            }
            if self.rows[i].is_empty() {
                dominated.set(i, true);
                continue;
            }
            for j in (i + 1)..n {
                if dominated[j] {
                    continue;
                }
                if self.rows[j].is_dominated_by(&self.rows[i]) {
                    dominated.set(j, true);
                } else if self.rows[i].is_dominated_by(&self.rows[j]) {
                    dominated.set(i, true);
                    break;
                }
            }
        }

        let mut flags = dominated.iter();
        self.rows.retain(|row| {
            let drop = flags.next().unwrap_or(false);
            if drop {
                trace!("Removing {row}");
            }
            !drop
        });

        n - self.rows.len()
    }

    /// Counts, for every column, the rows that still cover it.
    #[must_use]
    pub fn column_counts(&self) -> FxHashMap<Minterm, usize> {
        let mut counts = FxHashMap::default();
        for &column in self.rows.iter().flat_map(|row| row.columns.iter()) {
            *counts.entry(column).or_insert(0) += 1;
        }
        counts
    }

    /// Finds the first row that is the only one covering some column.
    ///
    /// # Returns
    /// The row index and the column it alone covers, or `None` if the chart is cyclic.
    #[must_use]
    pub fn find_essential(&self, counts: &FxHashMap<Minterm, usize>) -> Option<(usize, Minterm)> {
        self.rows.iter().enumerate().find_map(|(idx, row)| {
            row.columns
                .iter()
                .find(|c| counts.get(c) == Some(&1))
                .map(|&column| (idx, column))
        })
    }

    /// Moves the rows at `picks` into `cover` and strikes their columns from the chart.
    fn select(&mut self, mut picks: Vec<(usize, SelectionReason)>, cover: &mut Cover) {
        picks.sort_unstable_by_key(|&(idx, _)| idx);
        picks.dedup_by_key(|&mut (idx, _)| idx);

        let mut covered = BTreeSet::new();
        let mut selected = Vec::with_capacity(picks.len());
        for &(idx, reason) in picks.iter().rev() {
            let row = self.rows.remove(idx);
            covered.extend(row.columns.iter().copied());
            selected.push((row, reason));
        }

        for (row, reason) in selected.into_iter().rev() {
            cover.push(row.into_implicant(), reason);
        }

        for row in &mut self.rows {
            row.remove_columns(&covered);
        }
    }
}

impl Display for Chart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Selects a cover of the required minterms from a set of prime implicants.
#[derive(Debug, Clone, Default)]
pub struct CoverageSolver<R: CyclicResolver = FirstInOrder> {
    resolver: R,
}

impl CoverageSolver<FirstInOrder> {
    /// Creates a solver using the first-in-order cyclic fallback.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            resolver: FirstInOrder,
        }
    }
}

impl<R: CyclicResolver> CoverageSolver<R> {
    /// Creates a solver with a specific cyclic-chart resolver.
    #[must_use]
    pub const fn with_resolver(resolver: R) -> Self {
        Self { resolver }
    }

    /// The configured cyclic-chart resolver.
    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Reduces the chart until every required minterm is covered.
    ///
    /// # Arguments
    /// * `primes` - The prime implicants, with don't-cares still in their coverage.
    /// * `dont_cares` - Minterms that never have to be covered.
    ///
    /// # Returns
    /// The cover in selection order, and the collected counters.
    ///
    /// # Panics
    /// Panics if the resolver returns no rows or an out-of-bounds row index for a
    /// non-empty chart.
    #[must_use]
    pub fn solve(
        &self,
        primes: &[Implicant],
        dont_cares: &BTreeSet<Minterm>,
    ) -> (Cover, CoverageStats) {
        let mut chart = Chart::new(primes, dont_cares);
        let mut cover = Cover::default();
        let mut stats = CoverageStats::default();

        while !chart.is_empty() {
            stats.iterations += 1;
            stats.dominated_removed += chart.remove_dominated();
            if chart.is_empty() {
                break;
            }

            let counts = chart.column_counts();
            let picks = if let Some((idx, column)) = chart.find_essential(&counts) {
                debug!(
                    "{} is the only implicant covering {column}",
                    chart.rows[idx].implicant.to_bit_string()
                );
                stats.essential_selections += 1;
                vec![(idx, SelectionReason::Essential { column })]
            } else {
                let picked = self.resolver.resolve(chart.rows());
                assert!(
                    !picked.is_empty() && picked.iter().all(|&idx| idx < chart.rows.len()),
                    "cyclic resolver returned an invalid selection: {picked:?}"
                );
                debug!(
                    "Cyclic chart with {} rows, forcing {}",
                    chart.rows.len(),
                    picked
                        .iter()
                        .map(|&idx| chart.rows[idx].implicant.to_bit_string())
                        .join(", ")
                );
                stats.forced_selections += picked.len();
                picked
                    .into_iter()
                    .map(|idx| (idx, SelectionReason::Forced))
                    .collect()
            };

            chart.select(picks, &mut cover);
        }

        (cover, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qm::cyclic::Exhaustive;
    use crate::qm::generator::prime_implicants;

    fn set(values: &[Minterm]) -> BTreeSet<Minterm> {
        values.iter().copied().collect()
    }

    fn solve(width: usize, minterms: &[Minterm], dont_cares: &[Minterm]) -> (Cover, CoverageStats) {
        let terms: BTreeSet<Minterm> = minterms.iter().chain(dont_cares).copied().collect();
        let primes = prime_implicants(width, &terms);
        CoverageSolver::new().solve(&primes, &set(dont_cares))
    }

    fn terms(cover: &Cover) -> Vec<String> {
        cover.implicants().map(Implicant::render).collect()
    }

    #[test]
    fn test_is_sorted_subset() {
        assert!(is_sorted_subset(&[], &[1, 2]));
        assert!(is_sorted_subset(&[2], &[1, 2]));
        assert!(is_sorted_subset(&[1, 2], &[1, 2]));
        assert!(!is_sorted_subset(&[0], &[1, 2]));
        assert!(!is_sorted_subset(&[1, 3], &[1, 2, 4]));
        assert!(!is_sorted_subset(&[1, 2, 3], &[1, 2]));
    }

    #[test]
    fn test_row_strips_dont_cares() {
        let a = Implicant::new(2, 0);
        let b = Implicant::new(2, 1);
        let imp = Implicant::merge(&a, &b, 0).unwrap();
        let row = ChartRow::new(imp, &set(&[1]));
        assert_eq!(row.columns(), &[0]);
        assert_eq!(row.implicant().coverage(), &[0, 1]);
    }

    #[test]
    fn test_remove_dominated_keeps_earlier_on_tie() {
        let low = ChartRow::from_parts(Implicant::new(3, 1), vec![1, 2]);
        let high = ChartRow::from_parts(Implicant::new(3, 2), vec![2, 1]);
        let small = ChartRow::from_parts(Implicant::new(3, 3), vec![2]);
        let empty = ChartRow::from_parts(Implicant::new(3, 4), vec![]);
        let mut chart = Chart {
            rows: vec![low.clone(), small, high, empty],
        };
        assert_eq!(chart.remove_dominated(), 3);
        assert_eq!(chart.rows(), &[low]);
    }

    #[test]
    fn test_constant_one() {
        let (cover, stats) = solve(2, &[0, 1, 2, 3], &[]);
        assert_eq!(terms(&cover), vec![""]);
        assert_eq!(stats.essential_selections, 1);
        assert_eq!(stats.forced_selections, 0);
    }

    #[test]
    fn test_single_minterm() {
        let (cover, _) = solve(1, &[0], &[]);
        assert_eq!(terms(&cover), vec!["A'"]);
        assert_eq!(
            cover.entries()[0].reason,
            SelectionReason::Essential { column: 0 }
        );
    }

    #[test]
    fn test_empty_input() {
        let (cover, stats) = solve(3, &[], &[]);
        assert!(cover.is_empty());
        assert_eq!(stats.iterations, 0);
    }

    #[test]
    fn test_only_dont_cares() {
        let (cover, stats) = solve(2, &[], &[1, 3]);
        assert!(cover.is_empty());
        assert_eq!(stats.dominated_removed, 1);
    }

    #[test]
    fn test_cyclic_three_variable() {
        let (cover, stats) = solve(3, &[0, 1, 2, 5, 6, 7], &[]);
        assert_eq!(terms(&cover), vec!["A'B'", "BC'", "AC"]);
        assert_eq!(cover.entries()[0].reason, SelectionReason::Forced);
        assert_eq!(
            cover.entries()[1].reason,
            SelectionReason::Essential { column: 2 }
        );
        assert_eq!(
            cover.entries()[2].reason,
            SelectionReason::Essential { column: 5 }
        );
        assert_eq!(stats.iterations, 3);
        assert_eq!(stats.forced_selections, 1);
        assert_eq!(stats.essential_selections, 2);
        assert_eq!(stats.dominated_removed, 3);
    }

    #[test]
    fn test_dont_cares_widen_terms() {
        // f = m(4,8,10,11,12,15) + d(9,14). AC alone covers 15, and once it is
        // taken AB' is dominated by AD'.
        let (cover, stats) = solve(4, &[4, 8, 10, 11, 12, 15], &[9, 14]);
        assert_eq!(terms(&cover), vec!["AC", "AD'", "BC'D'"]);
        assert_eq!(stats.dominated_removed, 1);
        assert_eq!(stats.forced_selections, 0);
        assert_eq!(cover.literal_count(), 7);
    }

    #[test]
    fn test_essential_rows_come_first_in_order() {
        // f = m(0,1,2,3,7): A' is essential for 0, BC for 7.
        let (cover, _) = solve(3, &[0, 1, 2, 3, 7], &[]);
        assert_eq!(terms(&cover), vec!["A'", "BC"]);
    }

    #[test]
    fn test_exhaustive_resolver_on_cyclic_chart() {
        let minterms = [0, 1, 2, 5, 6, 7, 8, 9, 10, 13, 14, 15];
        let primes = prime_implicants(4, &set(&minterms));
        let (first, _) = CoverageSolver::new().solve(&primes, &BTreeSet::new());
        let (exact, stats) =
            CoverageSolver::with_resolver(Exhaustive).solve(&primes, &BTreeSet::new());

        assert_eq!(exact.len(), 3);
        assert!(exact.len() <= first.len());
        assert_eq!(stats.forced_selections, 3);
        for m in minterms {
            assert!(exact.implicants().any(|imp| imp.covers(m)));
        }
    }
}
