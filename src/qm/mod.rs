#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod coverage;
pub mod cyclic;
pub mod expression;
pub mod generator;
pub mod implicant;
pub mod literal;
pub mod problem;
pub mod solver;
