//! # qm
//!
//! `qm` is a command-line minimizer for single-output boolean functions. It reads
//! a function as a list of minterms and don't-cares and prints a minimal
//! sum-of-products expression, computed with the Quine-McCluskey procedure:
//!
//! 1.  **Prime implicant generation**: minterms are bucketed by the number of true
//!     bits and adjacent buckets are merged pass by pass until nothing merges.
//! 2.  **Cover selection**: a prime implicant chart is reduced by row dominance and
//!     essential-row extraction. Cyclic charts are resolved either by taking the
//!     first row in a fixed order or by an exact branch-and-bound search.
//!
//! ## Input format
//!
//! A whitespace-separated token stream, possibly over several lines. The first
//! token is the number of variables, the following integers are minterms, and
//! integers after a `d` token are don't-cares. Lines starting with `#` are comments.
//!
//! ```text
//! 4 4 8 10 11 12 15 d 9 14
//! ```
//!
//! ## Usage
//!
//! ```sh
//! qm [OPTIONS] [PATH] [SUBCOMMAND]
//! ```
//!
//! -   `PATH`: a problem file, or a directory searched recursively for `.qm` files.
//!
//! ### Subcommands
//!
//! 1.  **`file`**: `qm file --path problem.qm`
//! 2.  **`text`**: `qm text --input "3 0 1 2 5 6 7"`
//! 3.  **`random`**: `qm random --width 10 --density 0.4 --dont-cares 0.1 --seed 42`
//! 4.  **`completions`**: `qm completions bash`
//!
//! ### Common options
//!
//! -   `-d, --debug`: log generation passes and chart selections to stderr.
//! -   `-v, --verify`: check the cover against the problem.
//! -   `-s, --stats`: print statistics, including jemalloc memory figures.
//! -   `-p, --print-primes`: print the prime implicant table.
//! -   `--cyclic <first|exhaustive>`: cyclic chart strategy (default: `first`).
//!
//! The output is a single line `F = t1 + t2 + ...`, where each term lists its
//! variables from `A` (most significant) onwards and a `'` marks a complement.

use crate::command_line::cli::{
    Cli, Commands, CommonOptions, solve_path, solve_random, solve_text,
};
use clap::{CommandFactory, Parser};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

mod command_line;

/// Global allocator using `tikv-jemallocator` for memory usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Installs the terminal logger on stderr: `Debug` when `--debug` is given,
/// `Warn` otherwise.
fn init_logger(common: &CommonOptions) {
    let level = if common.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialise logging: {e}");
    }
}

/// Main entry point.
///
/// Parses command-line arguments, dispatches to the appropriate command handler,
/// and exits non-zero if it reports an error.
fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => match cli.path {
            Some(path) => {
                init_logger(&cli.common);
                solve_path(&path, &cli.common)
            }
            None => Err("No command provided. Use --help for more information.".to_string()),
        },
        Some(Commands::File { path, common }) => {
            init_logger(&common);
            solve_path(&path, &common)
        }
        Some(Commands::Text { input, common }) => {
            init_logger(&common);
            solve_text(&input, &common)
        }
        Some(Commands::Random {
            width,
            density,
            dont_cares,
            seed,
            common,
        }) => {
            init_logger(&common);
            solve_random(width, density, dont_cares, seed, &common)
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
