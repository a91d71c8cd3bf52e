#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Resolution strategies for cyclic prime implicant charts.
//!
//! A chart is cyclic when, after dominance reduction, every remaining column is
//! covered by at least two rows, so no essential row can be extracted. The
//! coverage solver then asks a `CyclicResolver` which rows to force into the
//! cover.
//!
//! This module provides:
//! - The `CyclicResolver` trait.
//! - `FirstInOrder`: forces the first row of the chart. Always terminates quickly
//!   and always yields a valid cover, but the cover may not be minimum.
//! - `Exhaustive`: a branch-and-bound search for a smallest set of rows covering
//!   every remaining column, preferring fewer literals on ties. Exact on the
//!   cyclic core, exponential in the worst case.
//! - `CyclicStrategy`, the command-line selector, and `CyclicResolverImpls`, its
//!   runtime counterpart.

use crate::qm::coverage::ChartRow;
use crate::qm::literal::Minterm;
use bit_vec::BitVec;
use clap::ValueEnum;
use itertools::Itertools;
use std::fmt::{Debug, Display};

/// Chooses which rows of a cyclic chart are forced into the cover.
pub trait CyclicResolver: Debug {
    /// Returns the indices of the rows to select, in ascending order.
    ///
    /// `rows` is non-empty, in the solver's fixed total order, and every row has at
    /// least one column. The returned indices must be non-empty, in bounds, and
    /// must not repeat.
    fn resolve(&self, rows: &[ChartRow]) -> Vec<usize>;
}

/// Forces the first row of the chart.
///
/// Rows are kept in a fixed total order (largest coverage first), so this picks the
/// largest, most reduced remaining implicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FirstInOrder;

impl CyclicResolver for FirstInOrder {
    fn resolve(&self, _rows: &[ChartRow]) -> Vec<usize> {
        vec![0]
    }
}

/// Exact branch-and-bound cover of the remaining chart.
///
/// Minimises the number of rows, then the number of literals. Every search node is
/// reduced before branching: a row that alone covers a column is taken, a column
/// whose candidate rows all cover another column makes that other column redundant,
/// and a row whose columns are covered by a row with no more literals is dropped.
/// A node is pruned once the rows taken plus a lower bound on the rows still needed
/// cannot beat the best cover found. The bound counts columns that share no
/// candidate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Exhaustive;

/// Best cover found so far: selected rows and their literal cost.
type Best = Option<(Vec<usize>, usize)>;

/// One node of the search tree.
#[derive(Debug, Clone)]
struct Node {
    /// Rows that may still be taken.
    active: BitVec,
    /// Columns that still have to be covered.
    required: BitVec,
    chosen: Vec<usize>,
    cost: usize,
}

/// The chart as bit sets over a dense numbering of its columns.
#[derive(Debug)]
struct CoverSearch {
    rows: Vec<BitVec>,
    costs: Vec<usize>,
    columns: usize,
    best: Best,
}

fn is_subset(a: &BitVec, b: &BitVec) -> bool {
    a.blocks().zip(b.blocks()).all(|(x, y)| x & !y == 0)
}

fn is_disjoint(a: &BitVec, b: &BitVec) -> bool {
    a.blocks().zip(b.blocks()).all(|(x, y)| x & y == 0)
}

fn set_bits(bits: &BitVec) -> impl Iterator<Item = usize> + '_ {
    bits.iter().enumerate().filter_map(|(i, bit)| bit.then_some(i))
}

impl CoverSearch {
    fn new(rows: &[ChartRow]) -> Self {
        let columns: Vec<Minterm> = rows
            .iter()
            .flat_map(|row| row.columns().iter().copied())
            .sorted_unstable()
            .dedup()
            .collect();

        let bits = rows
            .iter()
            .map(|row| {
                let mut bits = BitVec::from_elem(columns.len(), false);
                for column in row.columns() {
                    if let Ok(i) = columns.binary_search(column) {
                        bits.set(i, true);
                    }
                }
                bits
            })
            .collect();

        Self {
            rows: bits,
            costs: rows.iter().map(|row| row.implicant().literal_count()).collect(),
            columns: columns.len(),
            best: None,
        }
    }

    fn root(&self) -> Node {
        let mut required = BitVec::from_elem(self.columns, false);
        for row in &self.rows {
            required.or(row);
        }
        Node {
            active: BitVec::from_elem(self.rows.len(), true),
            required,
            chosen: Vec::new(),
            cost: 0,
        }
    }

    /// Active rows covering `column`.
    fn candidates(&self, node: &Node, column: usize) -> BitVec {
        let mut candidates = BitVec::from_elem(self.rows.len(), false);
        for (r, row) in self.rows.iter().enumerate() {
            if node.active[r] && row[column] {
                candidates.set(r, true);
            }
        }
        candidates
    }

    fn take(&self, node: &mut Node, row: usize) {
        node.chosen.push(row);
        node.cost += self.costs[row];
        node.required.difference(&self.rows[row]);
        node.active.set(row, false);
    }

    fn improves(&self, rows: usize, cost: usize) -> bool {
        self.best
            .as_ref()
            .is_none_or(|(picked, best_cost)| (rows, cost) < (picked.len(), *best_cost))
    }

    /// Applies essential rows, row dominance and column dominance until nothing changes.
    ///
    /// Returns `false` if some required column has no candidate row left.
    fn reduce(&self, node: &mut Node) -> bool {
        loop {
            let mut changed = false;

            for column in 0..self.columns {
                if !node.required[column] {
                    continue;
                }
                let candidates = self.candidates(node, column);
                match candidates.count_ones() {
                    0 => return false,
                    1 => {
                        if let Some(row) = set_bits(&candidates).next() {
                            self.take(node, row);
                            changed = true;
                        }
                    }
                    _ => {}
                }
            }

            let restricted: Vec<Option<BitVec>> = self
                .rows
                .iter()
                .enumerate()
                .map(|(r, row)| {
                    node.active[r].then(|| {
                        let mut bits = row.clone();
                        bits.and(&node.required);
                        bits
                    })
                })
                .collect();

            for (r, columns) in restricted.iter().enumerate() {
                let Some(columns) = columns else { continue };
                if columns.none() {
                    node.active.set(r, false);
                    changed = true;
                    continue;
                }
                let dominated = restricted.iter().enumerate().any(|(s, other)| {
                    s != r
                        && node.active[s]
                        && other.as_ref().is_some_and(|other| {
                            is_subset(columns, other)
                                && self.costs[s] <= self.costs[r]
                                && (columns != other || self.costs[s] < self.costs[r] || s < r)
                        })
                });
                if dominated {
                    node.active.set(r, false);
                    changed = true;
                }
            }

            let required: Vec<usize> = set_bits(&node.required).collect();
            let candidates: Vec<BitVec> = required
                .iter()
                .map(|&column| self.candidates(node, column))
                .collect();

            for (i, &column) in required.iter().enumerate() {
                // Any row covering a column with fewer candidates covers this one too.
                let implied = required.iter().enumerate().any(|(j, &other)| {
                    j != i
                        && node.required[other]
                        && is_subset(&candidates[j], &candidates[i])
                        && (candidates[j] != candidates[i] || j < i)
                });
                if implied {
                    node.required.set(column, false);
                    changed = true;
                }
            }

            if !changed {
                return true;
            }
        }
    }

    /// Number of required columns that pairwise share no candidate row.
    fn lower_bound(&self, node: &Node) -> usize {
        let columns = set_bits(&node.required)
            .map(|column| self.candidates(node, column))
            .sorted_by_key(BitVec::count_ones);

        let mut used = BitVec::from_elem(self.rows.len(), false);
        let mut bound = 0;
        for candidates in columns {
            if is_disjoint(&candidates, &used) {
                used.or(&candidates);
                bound += 1;
            }
        }
        bound
    }

    fn search(&mut self, mut node: Node) {
        if !self.reduce(&mut node) {
            return;
        }

        if node.required.none() {
            if self.improves(node.chosen.len(), node.cost) {
                let mut picked = node.chosen;
                picked.sort_unstable();
                self.best = Some((picked, node.cost));
            }
            return;
        }

        let bound = self.lower_bound(&node);
        let cheapest = set_bits(&node.active)
            .map(|r| self.costs[r])
            .min()
            .unwrap_or(0);
        if !self.improves(node.chosen.len() + bound, node.cost + bound * cheapest) {
            return;
        }

        // Branch on the column with the fewest candidates. The i-th branch takes the
        // i-th candidate and excludes the earlier ones.
        let Some(candidates) = set_bits(&node.required)
            .map(|column| self.candidates(&node, column))
            .min_by_key(BitVec::count_ones)
        else {
            return;
        };

        let mut base = node;
        for row in set_bits(&candidates).collect_vec() {
            let mut child = base.clone();
            self.take(&mut child, row);
            self.search(child);
            base.active.set(row, false);
        }
    }
}

impl CyclicResolver for Exhaustive {
    fn resolve(&self, rows: &[ChartRow]) -> Vec<usize> {
        let mut search = CoverSearch::new(rows);
        let root = search.root();
        search.search(root);

        search.best.map_or_else(|| vec![0], |(picked, _)| picked)
    }
}

/// Runtime choice between the available resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclicResolverImpls {
    /// See [`FirstInOrder`].
    FirstInOrder(FirstInOrder),
    /// See [`Exhaustive`].
    Exhaustive(Exhaustive),
}

impl Default for CyclicResolverImpls {
    fn default() -> Self {
        Self::FirstInOrder(FirstInOrder)
    }
}

impl CyclicResolver for CyclicResolverImpls {
    fn resolve(&self, rows: &[ChartRow]) -> Vec<usize> {
        match self {
            Self::FirstInOrder(r) => r.resolve(rows),
            Self::Exhaustive(r) => r.resolve(rows),
        }
    }
}

/// Enum representing the cyclic-chart strategy to use, selectable on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash, Default, ValueEnum)]
pub enum CyclicStrategy {
    /// Force the first row in chart order (fast, possibly non-minimal)
    #[default]
    First,
    /// Branch-and-bound exact cover of the cyclic chart
    Exhaustive,
}

impl Display for CyclicStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

impl CyclicStrategy {
    /// Converts the `CyclicStrategy` to a concrete `CyclicResolverImpls`.
    #[must_use]
    pub const fn to_impl(self) -> CyclicResolverImpls {
        match self {
            Self::First => CyclicResolverImpls::FirstInOrder(FirstInOrder),
            Self::Exhaustive => CyclicResolverImpls::Exhaustive(Exhaustive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qm::generator::prime_implicants;
    use crate::qm::implicant::Implicant;
    use crate::qm::problem::Problem;
    use crate::qm::solver::Minimizer;
    use std::collections::BTreeSet;
    use std::time::{Duration, Instant};

    fn chart(width: usize, minterms: &[Minterm]) -> Vec<ChartRow> {
        let terms = minterms.iter().copied().collect();
        let mut rows: Vec<ChartRow> = prime_implicants(width, &terms)
            .into_iter()
            .map(|p| ChartRow::new(p, &BTreeSet::new()))
            .collect();
        rows.sort_by(ChartRow::priority_cmp);
        rows
    }

    #[test]
    fn test_first_in_order() {
        let rows = chart(3, &[0, 1, 2, 5, 6, 7]);
        assert_eq!(FirstInOrder.resolve(&rows), vec![0]);
    }

    #[test]
    fn test_exhaustive_finds_minimum_cyclic_cover() {
        let rows = chart(3, &[0, 1, 2, 5, 6, 7]);
        let picked = Exhaustive.resolve(&rows);
        assert_eq!(picked.len(), 3);

        let covered: BTreeSet<Minterm> = picked
            .iter()
            .flat_map(|&i| rows[i].columns().iter().copied())
            .collect();
        assert_eq!(covered, [0, 1, 2, 5, 6, 7].into_iter().collect());
    }

    #[test]
    fn test_exhaustive_prefers_fewer_literals() {
        // Column 0 can be covered by a two-literal or a one-literal row.
        let big = ChartRow::from_parts(Implicant::new(2, 0), vec![0]);
        let small = {
            let a = Implicant::new(2, 0);
            let b = Implicant::new(2, 1);
            ChartRow::from_parts(Implicant::merge(&a, &b, 0).unwrap(), vec![0])
        };
        assert_eq!(Exhaustive.resolve(&[big, small]), vec![1]);
    }

    #[test]
    fn test_exhaustive_takes_cheaper_row_of_equal_coverage() {
        // Two rows cover {0, 1}; the merged one has fewer literals.
        let a = Implicant::new(2, 0);
        let b = Implicant::new(2, 1);
        let merged = ChartRow::from_parts(Implicant::merge(&a, &b, 0).unwrap(), vec![0, 1]);
        let wide = ChartRow::from_parts(Implicant::new(2, 3), vec![0, 1]);
        let other = ChartRow::from_parts(Implicant::new(2, 2), vec![2]);
        assert_eq!(Exhaustive.resolve(&[wide, merged, other]), vec![1, 2]);
    }

    #[test]
    fn test_lower_bound_counts_disjoint_columns() {
        let rows = chart(3, &[0, 1, 2, 5, 6, 7]);
        let search = CoverSearch::new(&rows);
        let root = search.root();
        // Minterms 0, 5 and 6 share no covering prime, so three rows are needed.
        assert_eq!(search.lower_bound(&root), 3);
    }

    #[test]
    fn test_exhaustive_finishes_on_random_width_eight() {
        for seed in [0x5eed, 3] {
            let problem =
                Problem::random(8, 0.5, 0.1, &mut fastrand::Rng::with_seed(seed)).unwrap();

            let start = Instant::now();
            let (exact, _) = Minimizer::with_resolver(Exhaustive).solve(&problem);
            let elapsed = start.elapsed();

            let (first, _) = Minimizer::new().solve(&problem);
            assert!(exact.verify(&problem));
            assert!(exact.len() <= first.len());
            assert!(
                elapsed < Duration::from_secs(30),
                "seed {seed}: exhaustive cover took {elapsed:?}"
            );
        }
    }

    #[test]
    fn test_strategy_to_impl() {
        assert_eq!(
            CyclicStrategy::First.to_impl(),
            CyclicResolverImpls::FirstInOrder(FirstInOrder)
        );
        assert_eq!(
            CyclicStrategy::Exhaustive.to_impl(),
            CyclicResolverImpls::Exhaustive(Exhaustive)
        );
        assert_eq!(CyclicStrategy::default().to_string(), "first");
    }
}
