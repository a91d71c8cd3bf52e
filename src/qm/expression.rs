#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Rendering of a cover as a sum-of-products expression, and checks that a cover
//! actually implements its problem.
//!
//! The textual form is `F = t1 + t2 + ...`, each term being
//! [`Implicant::render`]. An empty cover (the constant 0) renders as `F = `, and the
//! constant-1 term renders as the empty string, so a cover holding only that term
//! also renders as `F = `.

use crate::qm::coverage::Cover;
use crate::qm::implicant::Implicant;
use crate::qm::literal::Minterm;
use crate::qm::problem::Problem;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Prefix of every rendered expression.
pub const EXPRESSION_PREFIX: &str = "F = ";

/// Separator between rendered product terms.
pub const TERM_SEPARATOR: &str = " + ";

/// Renders product terms as a sum-of-products expression.
///
/// # Arguments
/// * `terms` - The implicants to render, in output order.
///
/// # Returns
/// `"F = "` followed by the rendered terms joined with `" + "`.
pub fn render_expression<'a, I>(terms: I) -> String
where
    I: IntoIterator<Item = &'a Implicant>,
{
    format!(
        "{EXPRESSION_PREFIX}{}",
        terms.into_iter().map(Implicant::render).join(TERM_SEPARATOR)
    )
}

/// Enumerates every minterm matched by the literal pattern of `implicant`.
///
/// This works from the literals alone and ignores the stored coverage list.
pub fn pattern_minterms(implicant: &Implicant) -> impl Iterator<Item = Minterm> {
    let key = implicant.key();
    let mask = if implicant.width() >= 32 {
        u32::MAX
    } else {
        (1u32 << implicant.width()) - 1
    };
    let free = !key.care() & mask;
    let mut next = Some(free);

    std::iter::from_fn(move || {
        let subset = next?;
        next = (subset != 0).then(|| (subset - 1) & free);
        Some(key.value() | subset)
    })
}

impl Display for Cover {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", render_expression(self.implicants()))
    }
}

impl Cover {
    /// Renders the cover as `F = t1 + t2 + ...`.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Lists the given minterms that no implicant of the cover includes.
    pub fn uncovered<'a, I>(&self, minterms: I) -> Vec<Minterm>
    where
        I: IntoIterator<Item = &'a Minterm>,
    {
        minterms
            .into_iter()
            .copied()
            .filter(|&m| !self.implicants().any(|imp| imp.covers(m)))
            .collect()
    }

    /// Lists the minterms outside both the on-set and the don't-cares of `problem`
    /// that the cover's literal patterns include, ascending and without repeats.
    #[must_use]
    pub fn covers_off_set(&self, problem: &Problem) -> Vec<Minterm> {
        self.implicants()
            .flat_map(pattern_minterms)
            .filter(|m| !problem.minterms().contains(m) && !problem.dont_cares().contains(m))
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Checks that the cover includes every minterm of `problem` and nothing
    /// outside its minterms and don't-cares.
    #[must_use]
    pub fn verify(&self, problem: &Problem) -> bool {
        self.uncovered(problem.minterms()).is_empty() && self.covers_off_set(problem).is_empty()
    }
}
