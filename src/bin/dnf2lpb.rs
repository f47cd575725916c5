//! One-shot DNF solver: read a positive DNF in DIMACS format, synthesize an
//! LPB, print it.
//!
//! The LPB is printed in the textual `a1 … an d` form on stdout; the pretty
//! rendering and the optional round-trip check go to the log.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result;
use log::{info, warn};

use lpb_rs::dimacs::parse_positive_dimacs;
use lpb_rs::lp::{LinearProgram, TightenMode};
use lpb_rs::solve::{min_solver, TreeSolver};
use lpb_rs::split::SplittingTree;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SolverKind {
    MinComb,
    Lp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Tighten {
    None,
    Neighbours,
    All,
}

#[derive(Parser)]
#[command(name = "dnf2lpb")]
#[command(about = "Convert a positive DNF in DIMACS format into an LPB")]
struct Args {
    /// The DIMACS file holding the DNF
    input: PathBuf,

    /// The solver to use
    #[arg(long, value_enum, default_value_t = SolverKind::MinComb)]
    solver: SolverKind,

    /// Winder tightening for the LP solver (ignored by min-comb)
    #[arg(long, value_enum, default_value_t = Tighten::None)]
    tighten: Tighten,

    /// Skip the regularity test of the LP solver
    #[arg(long)]
    no_reg_test: bool,

    /// Expand the produced LPB again and compare it with the input
    #[arg(long)]
    verify: bool,
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

    let file = File::open(&args.input)?;
    let (name, nbvar, phi) = parse_positive_dimacs(BufReader::new(file))?;
    info!("parsed problem {:?}: {} variables, {} clauses", name, nbvar, phi.len());

    let lpb = match args.solver {
        SolverKind::MinComb => {
            let mut tree = SplittingTree::new(&phi, nbvar, true, true);
            min_solver().solve(&mut tree)?
        }
        SolverKind::Lp => {
            let tighten = match args.tighten {
                Tighten::None => TightenMode::None,
                Tighten::Neighbours => TightenMode::Neighbours,
                Tighten::All => TightenMode::All,
            };
            LinearProgram::new(&phi, nbvar, true, true).solve(tighten, !args.no_reg_test)?
        }
    };

    info!("synthesized {}", lpb);
    if args.verify {
        let mut sorted = phi.clone();
        sorted.sort_all();
        if lpb.to_dnf().deep_sorted_equals(&sorted) {
            info!("round trip matches the input DNF");
        } else {
            warn!("round trip does NOT match the input DNF");
        }
    }

    let mut tokens: Vec<String> = lpb.coefficients.iter().map(|c| c.to_string()).collect();
    tokens.push(lpb.threshold.to_string());
    println!("{}", tokens.join(" "));
    Ok(())
}
