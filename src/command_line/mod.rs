//! Command-line driver: argument definitions, problem loading and result reporting.
pub(crate) mod cli;
