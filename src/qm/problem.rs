#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The input model of a minimization problem, and a parser for its token format.
//!
//! A problem is written as a whitespace-separated token stream:
//!
//! ```text
//! # optional comment lines
//! 4 4 8 10 11 12 15 d 9 14
//! ```
//!
//! The first token is the number of variables. Every following integer is a
//! minterm until a `d` token is seen; integers after it are don't-cares. Tokens
//! may be spread over several lines, and a repeated `d` is accepted.

use crate::qm::literal::{MAX_WIDTH, Minterm};
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

/// Token that switches the parser from minterms to don't-cares.
pub const DONT_CARE_MARKER: &str = "d";

/// Errors raised while building or parsing a problem.
#[derive(Error, Debug)]
pub enum ProblemError {
    /// The input could not be read.
    #[error("failed to read problem: {0}")]
    Io(#[from] io::Error),

    /// The input holds no tokens at all.
    #[error("missing variable count")]
    MissingWidth,

    /// A token is neither an integer nor the don't-care marker.
    #[error("invalid token '{token}' at position {position}")]
    InvalidToken {
        /// The offending token.
        token: String,
        /// Zero-based index of the token in the stream (the width is token 0).
        position: usize,
    },

    /// The variable count is outside `1..=MAX_WIDTH`.
    #[error("invalid variable count {0}, expected 1 to {MAX_WIDTH}")]
    InvalidWidth(usize),

    /// A term does not fit in the given number of variables.
    #[error("term {term} does not fit in {width} variables")]
    OutOfRange {
        /// The offending term.
        term: Minterm,
        /// The problem width.
        width: usize,
    },

    /// A term is listed both as a minterm and as a don't-care.
    #[error("term {0} is both a minterm and a don't-care")]
    Overlap(Minterm),
}

/// A validated single-output minimization problem.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Problem {
    width: usize,
    minterms: BTreeSet<Minterm>,
    dont_cares: BTreeSet<Minterm>,
}

impl Problem {
    /// Builds a problem, collapsing duplicate terms.
    ///
    /// # Errors
    ///
    /// - [`ProblemError::InvalidWidth`] unless `1 <= width <= MAX_WIDTH`.
    /// - [`ProblemError::OutOfRange`] if a term is not below `2^width`.
    /// - [`ProblemError::Overlap`] if a term is both a minterm and a don't-care.
    pub fn new(
        width: usize,
        minterms: &[Minterm],
        dont_cares: &[Minterm],
    ) -> Result<Self, ProblemError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(ProblemError::InvalidWidth(width));
        }

        let limit = 1u64 << width;
        if let Some(&term) = minterms
            .iter()
            .chain(dont_cares)
            .find(|&&term| u64::from(term) >= limit)
        {
            return Err(ProblemError::OutOfRange { term, width });
        }

        let minterms: BTreeSet<Minterm> = minterms.iter().copied().collect();
        let dont_cares: BTreeSet<Minterm> = dont_cares.iter().copied().collect();
        if let Some(&term) = minterms.intersection(&dont_cares).next() {
            return Err(ProblemError::Overlap(term));
        }

        Ok(Self {
            width,
            minterms,
            dont_cares,
        })
    }

    /// Builds a random problem.
    ///
    /// Every one of the `2^width` terms independently becomes a minterm with
    /// probability `density`, otherwise a don't-care with probability
    /// `dont_care_density`, otherwise part of the off-set.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::InvalidWidth`] unless `1 <= width <= MAX_WIDTH`.
    pub fn random(
        width: usize,
        density: f64,
        dont_care_density: f64,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, ProblemError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(ProblemError::InvalidWidth(width));
        }

        let mut minterms = BTreeSet::new();
        let mut dont_cares = BTreeSet::new();
        for term in 0..(1 << width) {
            let roll = rng.f64();
            if roll < density {
                minterms.insert(term);
            } else if roll < density + dont_care_density {
                dont_cares.insert(term);
            }
        }

        Ok(Self {
            width,
            minterms,
            dont_cares,
        })
    }

    /// Number of input variables.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// The terms that must be covered.
    #[must_use]
    pub const fn minterms(&self) -> &BTreeSet<Minterm> {
        &self.minterms
    }

    /// The terms that may be covered.
    #[must_use]
    pub const fn dont_cares(&self) -> &BTreeSet<Minterm> {
        &self.dont_cares
    }

    /// Minterms and don't-cares together: the input of prime implicant generation.
    #[must_use]
    pub fn terms(&self) -> BTreeSet<Minterm> {
        self.minterms.union(&self.dont_cares).copied().collect()
    }
}

/// Writes the problem back out in its token format.
impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.width)?;
        for term in &self.minterms {
            write!(f, " {term}")?;
        }
        if !self.dont_cares.is_empty() {
            write!(f, " {DONT_CARE_MARKER} {}", self.dont_cares.iter().join(" "))?;
        }
        Ok(())
    }
}

/// Parses a problem from a `BufRead` source.
///
/// Lines whose first non-blank character is `#` are skipped.
///
/// # Errors
///
/// Returns an error if reading fails, if the stream is empty, if a token is not
/// an integer or `d`, or if the resulting problem is invalid (see [`Problem::new`]).
pub fn parse_problem<R: BufRead>(reader: R) -> Result<Problem, ProblemError> {
    let mut tokens = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim_start().starts_with('#') {
            continue;
        }
        tokens.extend(line.split_whitespace().map(str::to_owned));
    }

    let mut tokens = tokens.into_iter().enumerate();
    let (_, width_token) = tokens.next().ok_or(ProblemError::MissingWidth)?;
    let width = width_token
        .parse::<usize>()
        .map_err(|_| ProblemError::InvalidToken {
            token: width_token.clone(),
            position: 0,
        })?;

    let mut minterms = Vec::new();
    let mut dont_cares = Vec::new();
    let mut in_dont_cares = false;

    for (position, token) in tokens {
        if token == DONT_CARE_MARKER {
            in_dont_cares = true;
            continue;
        }
        let term = token
            .parse::<Minterm>()
            .map_err(|_| ProblemError::InvalidToken {
                token: token.clone(),
                position,
            })?;
        if in_dont_cares {
            dont_cares.push(term);
        } else {
            minterms.push(term);
        }
    }

    Problem::new(width, &minterms, &dont_cares)
}

/// Parses a problem from a string.
///
/// # Errors
///
/// See [`parse_problem`].
pub fn parse_str(input: &str) -> Result<Problem, ProblemError> {
    parse_problem(input.as_bytes())
}

/// Parses a problem file.
///
/// # Errors
///
/// Returns [`ProblemError::Io`] if the file cannot be opened, otherwise see
/// [`parse_problem`].
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Problem, ProblemError> {
    let file = std::fs::File::open(path)?;
    parse_problem(io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minterms_and_dont_cares() {
        let problem = parse_str("4 4 8 10 11 12 15 d 9 14").unwrap();
        assert_eq!(problem.width(), 4);
        assert_eq!(
            problem.minterms().iter().copied().collect_vec(),
            vec![4, 8, 10, 11, 12, 15]
        );
        assert_eq!(problem.dont_cares().iter().copied().collect_vec(), vec![9, 14]);
        assert_eq!(problem.terms().len(), 8);
    }

    #[test]
    fn test_parse_multiline_with_comments() {
        let input = "# three variables\n3\n0 1\n  # cyclic\n2 5 6 7\n";
        let problem = parse_str(input).unwrap();
        assert_eq!(problem.width(), 3);
        assert_eq!(problem.minterms().len(), 6);
        assert!(problem.dont_cares().is_empty());
    }

    #[test]
    fn test_parse_width_only() {
        let problem = parse_str("5").unwrap();
        assert!(problem.minterms().is_empty());
        assert!(problem.dont_cares().is_empty());
    }

    #[test]
    fn test_repeated_marker_and_duplicates() {
        let problem = parse_str("3 1 1 d 2 d 4 4").unwrap();
        assert_eq!(problem.minterms().len(), 1);
        assert_eq!(problem.dont_cares().iter().copied().collect_vec(), vec![2, 4]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_str(""), Err(ProblemError::MissingWidth)));
        assert!(matches!(
            parse_str("# nothing\n"),
            Err(ProblemError::MissingWidth)
        ));
        assert!(matches!(
            parse_str("x 1"),
            Err(ProblemError::InvalidToken { position: 0, .. })
        ));
        assert!(matches!(
            parse_str("3 1 -2"),
            Err(ProblemError::InvalidToken { ref token, position: 2 }) if token == "-2"
        ));
        assert!(matches!(parse_str("0"), Err(ProblemError::InvalidWidth(0))));
        assert!(matches!(parse_str("27 1"), Err(ProblemError::InvalidWidth(27))));
        assert!(matches!(
            parse_str("2 1 4"),
            Err(ProblemError::OutOfRange { term: 4, width: 2 })
        ));
        assert!(matches!(parse_str("2 1 d 1"), Err(ProblemError::Overlap(1))));
    }

    #[test]
    fn test_parse_missing_file() {
        assert!(matches!(
            parse_file("/nonexistent/problem.qm"),
            Err(ProblemError::Io(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        let problem = parse_str("4 15 4 d 14 9").unwrap();
        assert_eq!(problem.to_string(), "4 4 15 d 9 14");
        assert_eq!(parse_str(&problem.to_string()).unwrap(), problem);
    }

    #[test]
    fn test_random_is_valid_and_seeded() {
        let a = Problem::random(6, 0.4, 0.2, &mut fastrand::Rng::with_seed(7)).unwrap();
        let b = Problem::random(6, 0.4, 0.2, &mut fastrand::Rng::with_seed(7)).unwrap();
        assert_eq!(a, b);
        assert!(a.minterms().is_disjoint(a.dont_cares()));
        assert!(a.terms().iter().all(|&t| t < 64));

        let full = Problem::random(3, 1.0, 0.0, &mut fastrand::Rng::with_seed(1)).unwrap();
        assert_eq!(full.minterms().len(), 8);

        assert!(matches!(
            Problem::random(0, 0.5, 0.0, &mut fastrand::Rng::new()),
            Err(ProblemError::InvalidWidth(0))
        ));
    }
}
