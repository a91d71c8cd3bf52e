#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! End-to-end minimization: prime implicant generation followed by cover selection.

use crate::qm::coverage::{Cover, CoverageSolver, CoverageStats};
use crate::qm::cyclic::{CyclicResolver, FirstInOrder};
use crate::qm::generator::{GenerationStats, PrimeImplicantGenerator};
use crate::qm::implicant::Implicant;
use crate::qm::problem::Problem;
use log::debug;

/// Counters from both stages of a minimization, plus the size of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinimizationStats {
    /// Prime implicant generation counters.
    pub generation: GenerationStats,
    /// Cover selection counters.
    pub coverage: CoverageStats,
    /// Number of product terms in the cover.
    pub terms: usize,
    /// Number of literals over all product terms.
    pub literals: usize,
}

/// Quine-McCluskey minimizer, parameterised by the cyclic-chart strategy.
#[derive(Debug, Clone, Default)]
pub struct Minimizer<R: CyclicResolver = FirstInOrder> {
    coverage: CoverageSolver<R>,
}

impl Minimizer<FirstInOrder> {
    /// Creates a minimizer that resolves cyclic charts by taking the first row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            coverage: CoverageSolver::new(),
        }
    }
}

impl<R: CyclicResolver> Minimizer<R> {
    /// Creates a minimizer with a specific cyclic-chart resolver.
    #[must_use]
    pub const fn with_resolver(resolver: R) -> Self {
        Self {
            coverage: CoverageSolver::with_resolver(resolver),
        }
    }

    /// Generates the prime implicants of `problem`, don't-cares included.
    #[must_use]
    pub fn primes(&self, problem: &Problem) -> (Vec<Implicant>, GenerationStats) {
        PrimeImplicantGenerator::new(problem.width()).generate(&problem.terms())
    }

    /// Minimizes `problem`.
    ///
    /// # Returns
    /// The cover in selection order and the collected statistics.
    #[must_use]
    pub fn solve(&self, problem: &Problem) -> (Cover, MinimizationStats) {
        let (_, cover, stats) = self.solve_with_primes(problem);
        (cover, stats)
    }

    /// Minimizes `problem` and also returns the prime implicants the cover was
    /// chosen from.
    #[must_use]
    pub fn solve_with_primes(&self, problem: &Problem) -> (Vec<Implicant>, Cover, MinimizationStats) {
        let (primes, generation) = self.primes(problem);
        debug!(
            "{} prime implicants over {} variables",
            primes.len(),
            problem.width()
        );

        let (cover, coverage) = self.coverage.solve(&primes, problem.dont_cares());
        let stats = MinimizationStats {
            generation,
            coverage,
            terms: cover.len(),
            literals: cover.literal_count(),
        };

        (primes, cover, stats)
    }
}
