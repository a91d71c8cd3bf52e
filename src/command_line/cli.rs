#![allow(clippy::cast_precision_loss)]

use qm_minimizer::qm::cyclic::CyclicStrategy;
use qm_minimizer::qm::implicant::Implicant;
use qm_minimizer::qm::problem::{Problem, parse_file, parse_str};
use qm_minimizer::qm::solver::{MinimizationStats, Minimizer};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tikv_jemalloc_ctl::{epoch, stats};

/// File extension of problem files picked up when solving a directory.
const PROBLEM_EXTENSION: &str = "qm";

/// Defines the command-line interface for the minimizer.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "qm",
    version,
    about = "Quine-McCluskey minimizer for single-output boolean functions"
)]
pub(crate) struct Cli {
    /// An optional global path argument. If provided without a subcommand, it's
    /// treated as a problem file, or as a directory searched for `.qm` files.
    #[arg(global = true)]
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `text`, `random`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Minimize a problem file.
    File {
        /// Path to the problem file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Minimize a problem given as text.
    Text {
        /// The problem tokens, e.g. "3 0 1 2 5 6 7" or "4 4 8 10 11 12 15 d 9 14".
        /// The first token is the number of variables, `d` starts the don't-cares.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Minimize a randomly generated problem.
    Random {
        /// Number of variables.
        #[arg(short, long, default_value_t = 8)]
        width: usize,

        /// Probability of a term being a minterm.
        #[arg(long, default_value_t = 0.5)]
        density: f64,

        /// Probability of a remaining term being a don't-care.
        #[arg(long, default_value_t = 0.0)]
        dont_cares: f64,

        /// Seed for the random generator. A fresh seed is used if omitted.
        #[arg(long)]
        seed: Option<u64>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug output, logging every generation and selection to stderr.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check that the cover includes every minterm and nothing from the off-set.
    #[arg(short, long, default_value_t = false)]
    pub(crate) verify: bool,

    /// Enable printing of problem and minimization statistics.
    #[arg(short, long, default_value_t = false)]
    pub(crate) stats: bool,

    /// Print the prime implicants before the result.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_primes: bool,

    /// Strategy used when the prime implicant chart is cyclic.
    #[arg(long, default_value_t = CyclicStrategy::First)]
    pub(crate) cyclic: CyclicStrategy,
}

/// Solves every `.qm` file below a directory.
///
/// # Errors
///
/// If the path is not a directory, or if a problem file cannot be parsed or
/// fails verification.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!(
            "Provided path is not a directory: {}",
            path.display()
        ));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }

        if file_path
            .extension()
            .is_none_or(|ext| ext != PROBLEM_EXTENSION)
        {
            log::warn!("Skipping non-problem file: {}", file_path.display());
            continue;
        }

        solve_file(file_path, common)?;
    }

    Ok(())
}

/// Solves a problem file, or every problem file in a directory.
///
/// # Errors
///
/// If the file does not exist, cannot be parsed, or fails verification.
pub(crate) fn solve_path(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if path.is_dir() {
        solve_dir(path, common)
    } else {
        solve_file(path, common)
    }
}

/// Solves a single problem file.
///
/// # Errors
///
/// If the file does not exist, cannot be parsed, or fails verification.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("Problem file does not exist: {}", path.display()));
    }

    let time = std::time::Instant::now();
    let problem = parse_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let parse_time = time.elapsed();

    solve_and_report(&problem, common, Some(path), parse_time)
}

/// Solves a problem given as text.
///
/// # Errors
///
/// If the text cannot be parsed or the cover fails verification.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<(), String> {
    let time = std::time::Instant::now();
    let problem = parse_str(input).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();

    solve_and_report(&problem, common, None, parse_time)
}

/// Solves a randomly generated problem.
///
/// # Errors
///
/// If the width is invalid or the cover fails verification.
pub(crate) fn solve_random(
    width: usize,
    density: f64,
    dont_cares: f64,
    seed: Option<u64>,
    common: &CommonOptions,
) -> Result<(), String> {
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

    let time = std::time::Instant::now();
    let problem =
        Problem::random(width, density, dont_cares, &mut rng).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();

    println!("Problem: {problem}");
    solve_and_report(&problem, common, None, parse_time)
}

/// Minimizes a problem.
///
/// # Returns
/// The prime implicants, the rendered expression, whether it passed verification
/// (`None` if verification was not requested), the solve time, and the statistics.
pub(crate) fn solve(
    problem: &Problem,
    common: &CommonOptions,
) -> (Vec<Implicant>, String, Option<bool>, Duration, MinimizationStats) {
    let minimizer = Minimizer::with_resolver(common.cyclic.to_impl());

    let time = std::time::Instant::now();
    let (primes, cover, stats) = minimizer.solve_with_primes(problem);
    let elapsed = time.elapsed();

    let verified = common.verify.then(|| cover.verify(problem));
    (primes, cover.to_string(), verified, elapsed, stats)
}

/// Parses, solves and reports a problem: the expression, optionally the prime
/// implicants, the verification result and statistics.
///
/// # Errors
///
/// If verification was requested and failed, or if memory statistics cannot be read.
pub(crate) fn solve_and_report(
    problem: &Problem,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<(), String> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }

    epoch::advance().map_err(|e| e.to_string())?;

    let (primes, expression, verified, elapsed, minimization_stats) = solve(problem, common);

    let (allocated_mib, resident_mib) = memory_usage()?;

    if common.print_primes {
        print_primes(&primes);
    }

    println!("{expression}");

    if let Some(ok) = verified {
        println!("Verified: {ok:?}");
        if !ok {
            return Err(format!("Cover failed verification: {expression}"));
        }
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            problem,
            &minimization_stats,
            allocated_mib,
            resident_mib,
        );
    }

    Ok(())
}

/// Reads allocated and resident memory from jemalloc, in MiB.
fn memory_usage() -> Result<(f64, f64), String> {
    epoch::advance().map_err(|e| e.to_string())?;

    let allocated_bytes = stats::allocated::read().map_err(|e| e.to_string())?;
    let resident_bytes = stats::resident::read().map_err(|e| e.to_string())?;

    Ok((
        allocated_bytes as f64 / (1024.0 * 1024.0),
        resident_bytes as f64 / (1024.0 * 1024.0),
    ))
}

/// Prints the prime implicant table: bit pattern (`*` marks a prime), term and coverage.
pub(crate) fn print_primes(primes: &[Implicant]) {
    println!("Prime implicants:");
    for prime in primes {
        let term = prime.render();
        let term = if term.is_empty() { "1" } else { term.as_str() };
        println!("  {:<12} {:<12} {:?}", prime.to_bit_string(), term, prime.coverage());
    }
}

/// Helper function to print a single statistic line in a formatted table row.
///
/// # Arguments
/// * `label` - The description of the statistic.
/// * `value` - The value of the statistic, implementing `std::fmt::Display`.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
///
/// # Arguments
/// * `label` - The description of the statistic.
/// * `value` - The raw count for the statistic.
/// * `elapsed` - The elapsed time in seconds, used to calculate the rate.
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and minimization statistics.
///
/// # Arguments
/// * `parse_time` - Duration spent parsing or generating the input.
/// * `elapsed` - Duration spent minimizing.
/// * `problem` - The minimized problem.
/// * `s` - `MinimizationStats` collected by the minimizer.
/// * `allocated` - Allocated memory in MiB.
/// * `resident` - Resident memory in MiB.
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    problem: &Problem,
    s: &MinimizationStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", problem.width());
    stat_line("Minterms", problem.minterms().len());
    stat_line("Don't-cares", problem.dont_cares().len());

    println!("=====================[ Generation Statistics ]=======================");
    stat_line("Generations", s.generation.generations);
    stat_line_with_rate("Comparisons", s.generation.comparisons, elapsed_secs);
    stat_line_with_rate("Merges", s.generation.merges, elapsed_secs);
    stat_line("Duplicates skipped", s.generation.duplicates_skipped);
    stat_line("Prime implicants", s.generation.prime_implicants);

    println!("======================[ Coverage Statistics ]========================");
    stat_line("Iterations", s.coverage.iterations);
    stat_line("Dominated rows removed", s.coverage.dominated_removed);
    stat_line("Essential selections", s.coverage.essential_selections);
    stat_line("Forced selections", s.coverage.forced_selections);
    stat_line("Terms", s.terms);
    stat_line("Literals", s.literals);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}
