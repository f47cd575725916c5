//! Benchmark driver for the threshold synthesis solvers.
//!
//! Reads a file of LPBs (one per line in the textual `a1 … an d` form),
//! expands each into its minimal DNF, and measures how long converting the
//! DNFs back into LPBs takes. The conversion of the whole file is repeated
//! `-N` times per round, the rounds `-R` times, and the best round's average
//! wins. With `--verify` every produced LPB is expanded again and compared
//! against the input DNF.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{eyre, Result};
use log::info;

use lpb_rs::clause::ClauseSet;
use lpb_rs::lp::{LinearProgram, TightenMode};
use lpb_rs::lpb::Lpb;
use lpb_rs::solve::{min_solver, TreeSolver};
use lpb_rs::split::SplittingTree;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SolverKind {
    /// The (incomplete) minimum-policy combinatorial solver.
    MinComb,
    /// The integer-LP solver over MTPs and MFPs.
    Lp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Tighten {
    None,
    Neighbours,
    All,
}

impl From<Tighten> for TightenMode {
    fn from(value: Tighten) -> Self {
        match value {
            Tighten::None => TightenMode::None,
            Tighten::Neighbours => TightenMode::Neighbours,
            Tighten::All => TightenMode::All,
        }
    }
}

#[derive(Parser)]
#[command(name = "benchlpb")]
#[command(about = "Benchmark DNF → LPB conversion on a file of LPBs")]
struct Args {
    /// Path to the file containing one LPB per line
    #[arg(long)]
    lpb: PathBuf,

    /// Also verify that every produced LPB represents its input DNF
    #[arg(long)]
    verify: bool,

    /// The solver to benchmark
    #[arg(long, value_enum, default_value_t = SolverKind::MinComb)]
    solver: SolverKind,

    /// How many times to repeat each conversion within a round
    #[arg(short = 'N', long = "inner", default_value_t = 5)]
    inner: usize,

    /// How many rounds to run; the best average wins
    #[arg(short = 'R', long = "rounds", default_value_t = 3)]
    rounds: usize,

    /// Winder tightening for the LP solver (ignored by min-comb)
    #[arg(long, value_enum, default_value_t = Tighten::None)]
    tighten: Tighten,
}

/// Iteratively updated running average: feed sample `t` (0-based) into the
/// average of the first `t` samples.
fn iterative_average(t: usize, value: f64, current: f64) -> f64 {
    (t as f64 / (t + 1) as f64) * current + value / (t + 1) as f64
}

fn parse_lpbs(path: &PathBuf) -> Result<(Vec<Lpb>, Vec<ClauseSet>)> {
    let file = File::open(path)?;
    let mut lpbs = Vec::new();
    let mut dnfs = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let lpb: Lpb = line.parse()?;
        dnfs.push(lpb.to_dnf());
        lpbs.push(lpb);
    }
    Ok((lpbs, dnfs))
}

fn convert(solver: SolverKind, tighten: TightenMode, phi: &ClauseSet, nbvar: usize) -> lpb_rs::error::Result<Lpb> {
    match solver {
        SolverKind::MinComb => {
            let mut tree = SplittingTree::new(phi, nbvar, true, true);
            min_solver().solve(&mut tree)
        }
        SolverKind::Lp => LinearProgram::new(phi, nbvar, true, true).solve(tighten, true),
    }
}

struct RoundResult {
    average: f64,
    failed: usize,
    not_equal: usize,
}

fn run_round(args: &Args, lpbs: &[Lpb], dnfs: &[ClauseSet]) -> RoundResult {
    let tighten = args.tighten.into();
    let mut average = 0.0;
    let mut t = 0;
    let mut failed = 0;
    let mut not_equal = 0;
    for _ in 0..args.inner {
        failed = 0;
        not_equal = 0;
        for (lpb, phi) in lpbs.iter().zip(dnfs) {
            let start = Instant::now();
            let converted = convert(args.solver, tighten, phi, lpb.nbvar());
            let elapsed = start.elapsed();
            let mut ok = true;
            match converted {
                Err(_) => {
                    ok = false;
                    failed += 1;
                }
                Ok(computed) => {
                    if args.verify && !computed.to_dnf().deep_sorted_equals(phi) {
                        ok = false;
                        not_equal += 1;
                    }
                }
            }
            if ok {
                average = iterative_average(t, elapsed.as_nanos() as f64, average);
                t += 1;
            }
        }
    }
    RoundResult {
        average,
        failed,
        not_equal,
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    let args = Args::parse();
    if args.inner == 0 {
        return Err(eyre!("N must be > 0"));
    }
    if args.rounds == 0 {
        return Err(eyre!("R must be > 0"));
    }

    let (lpbs, dnfs) = parse_lpbs(&args.lpb)?;
    info!("loaded {} LPBs from {}", lpbs.len(), args.lpb.display());

    let mut best: Option<RoundResult> = None;
    for _ in 0..args.rounds {
        let round = run_round(&args, &lpbs, &dnfs);
        let is_better = best.as_ref().map_or(true, |b| round.average < b.average);
        if is_better {
            best = Some(round);
        }
    }
    let best = best.expect("at least one round ran");

    println!(
        "Ran tests {} times, showing best average of {} repeats",
        args.inner, args.rounds
    );
    let fail_rate = best.failed as f64 / lpbs.len() as f64 * 100.0;
    println!(
        "Conversion failed on {} of {} tests ({:.2}%)",
        best.failed,
        lpbs.len(),
        fail_rate
    );
    if args.verify {
        let succeeded = lpbs.len() - best.failed;
        let error_rate = if succeeded == 0 {
            0.0
        } else {
            best.not_equal as f64 / succeeded as f64 * 100.0
        };
        println!(
            "From the times the conversion was successful the output was wrong in {} cases ({:.2}%)",
            best.not_equal, error_rate
        );
    }
    println!(
        "One (single) conversion took {:?} on average",
        Duration::from_nanos(best.average as u64)
    );
    Ok(())
}
