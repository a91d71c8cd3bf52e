#![deny(missing_docs)]
//! Two-level minimization of single-output boolean functions with the
//! Quine-McCluskey procedure.
//!
//! ```
//! use qm_minimizer::qm::problem::parse_str;
//! use qm_minimizer::qm::solver::Minimizer;
//!
//! let problem = parse_str("3 0 1 2 5 6 7").unwrap();
//! let (cover, _) = Minimizer::new().solve(&problem);
//! assert_eq!(cover.to_string(), "F = A'B' + BC' + AC");
//! ```

/// The `qm` module implements prime implicant generation, cover selection over the
/// prime implicant chart, and the problem model they operate on.
pub mod qm;
