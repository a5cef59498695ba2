//! Command-line front end of the solver.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use loaders::solution::RawSolution;
use loaders::{Format, parse_instance};
use setcov::callback::{GapOutput, NoOpCallback, SolverHooks};
use setcov::interface::{
    apply_unit_costs, solution_from_file, solution_from_idxs, solution_to_raw,
};
use setcov::stop::Stopper;
use setcov::{Environment, Instance, Solution, refinement, vprint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ParserArg {
    #[value(name = "RAIL")]
    Rail,
    #[value(name = "SCP")]
    Scp,
    #[value(name = "CVRP")]
    Cvrp,
    #[value(name = "MPS")]
    Mps,
}

impl ParserArg {
    fn name(self) -> &'static str {
        match self {
            ParserArg::Rail => "RAIL",
            ParserArg::Scp => "SCP",
            ParserArg::Cvrp => "CVRP",
            ParserArg::Mps => "MPS",
        }
    }
}

impl From<ParserArg> for Format {
    fn from(arg: ParserArg) -> Self {
        match arg {
            ParserArg::Rail => Format::Rail,
            ParserArg::Scp => Format::Scp,
            ParserArg::Cvrp => Format::Cvrp,
            ParserArg::Mps => Format::Mps,
        }
    }
}

/// Set covering heuristic (Caprara-Fischetti-Toth refinement scheme).
#[derive(Debug, Parser)]
#[command(name = "setcov", version, about)]
struct Cli {
    /// Instance file path.
    #[arg(value_name = "INST")]
    inst: Option<PathBuf>,

    /// Instance file path (alternative to the positional argument).
    #[arg(short = 'i', long = "inst", value_name = "PATH")]
    inst_flag: Option<PathBuf>,

    /// Parser to use.
    #[arg(long, value_enum, default_value_t = ParserArg::Rail, ignore_case = true)]
    parser: ParserArg,

    /// Seed for the random number generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Time limit in seconds.
    #[arg(long = "timelimit", default_value_t = f64::INFINITY)]
    time_limit: f64,

    /// Verbosity level (0-5).
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(0..=5))]
    verbose: u64,

    /// Epsilon value for objective comparisons.
    #[arg(long, default_value_t = 0.999)]
    epsilon: f64,

    /// Number of iterations for the heuristic phase.
    #[arg(long = "heur-iters", default_value_t = 250)]
    heur_iters: u64,

    /// Relative cutoff value to terminate the refinement.
    #[arg(long, default_value_t = 1.0)]
    beta: f64,

    /// Minimum lower-bound delta to trigger subgradient termination.
    #[arg(long = "abs-subg-exit", default_value_t = 1.0)]
    abs_subg_exit: f64,

    /// Minimum lower-bound gap to trigger subgradient termination.
    #[arg(long = "rel-subg-exit", default_value_t = 0.001)]
    rel_subg_exit: f64,

    /// Solution file path (default: instance basename + ".sol").
    #[arg(long = "out-sol", value_name = "PATH")]
    out_sol: Option<PathBuf>,

    /// Initial solution file path.
    #[arg(long = "init-sol", value_name = "PATH")]
    init_sol: Option<PathBuf>,

    /// Solve the given instance setting column costs to one.
    #[arg(short = 'U', long = "use-unit-costs")]
    use_unit_costs: bool,

    /// Store the heuristic-phase multipliers of the best greedy primal
    /// instead of the best dual bound.
    #[arg(long = "heur-mults-from-greedy")]
    heur_mults_from_greedy: bool,
}

impl Cli {
    fn environment(&self) -> Environment {
        let mut env = Environment::new(self.time_limit);
        env.verbose = self.verbose;
        env.epsilon = self.epsilon;
        env.heur_iters = self.heur_iters as usize;
        env.beta = self.beta;
        env.abs_subgrad_exit = self.abs_subg_exit;
        env.rel_subgrad_exit = self.rel_subg_exit;
        env.seed = self.seed;
        env.use_unit_costs = self.use_unit_costs;
        env.heur_mults_from_greedy = self.heur_mults_from_greedy;
        env
    }

    fn print_arg_values(&self, env: &Environment) {
        vprint!(env, 3, "Running with parameters set to:");
        vprint!(env, 3, " {:20} = {}", "--parser", self.parser.name());
        vprint!(env, 3, " {:20} = {}", "--seed", env.seed);
        vprint!(env, 3, " {:20} = {}", "--timelimit", env.time_limit);
        vprint!(env, 3, " {:20} = {}", "--verbose", env.verbose);
        vprint!(env, 3, " {:20} = {}", "--epsilon", env.epsilon);
        vprint!(env, 3, " {:20} = {}", "--heur-iters", env.heur_iters);
        vprint!(env, 3, " {:20} = {}", "--beta", env.beta);
        vprint!(env, 3, " {:20} = {}", "--abs-subg-exit", env.abs_subgrad_exit);
        vprint!(env, 3, " {:20} = {}", "--rel-subg-exit", env.rel_subgrad_exit);
        vprint!(env, 3, " {:20} = {}", "--use-unit-costs", env.use_unit_costs);
    }
}

/// Instance file stem + ".sol", mirroring where the incumbent is written
/// when no `--out-sol` is given.
fn default_sol_path(inst_path: &Path) -> PathBuf {
    let stem = inst_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "solution".to_string());
    PathBuf::from(format!("{stem}.sol"))
}

fn solve(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let env = cli.environment();
    let inst_path = cli
        .inst
        .as_ref()
        .or(cli.inst_flag.as_ref())
        .ok_or("no instance file given (positional or -i/--inst)")?;

    cli.print_arg_values(&env);
    vprint!(
        env,
        1,
        "CFT> Parsing {} instance from {}",
        cli.parser.name(),
        inst_path.display()
    );
    let raw = parse_instance(inst_path, cli.parser.into())?;
    let embedded_warmstart = raw.warmstart.clone();
    let mut inst = Instance::try_from(raw)?;
    if env.use_unit_costs {
        apply_unit_costs(&mut inst);
    }
    vprint!(
        env,
        1,
        "CFT> Instance size: {} x {}.",
        inst.rows.len(),
        inst.cols.size()
    );

    let warmstart = load_warmstart(&env, &inst, &embedded_warmstart, cli.init_sol.as_deref())?;

    let callback: Box<dyn setcov::callback::Callback> = if env.verbose >= 2 {
        Box::new(GapOutput {})
    } else {
        Box::new(NoOpCallback {})
    };
    let mut hooks = SolverHooks::new(callback, Stopper::with_ctrlc());

    let result = refinement::run(&env, &inst, &warmstart, &mut hooks);

    let out_path = cli
        .out_sol
        .clone()
        .unwrap_or_else(|| default_sol_path(inst_path));
    loaders::solution::write(&out_path, &solution_to_raw(&result.sol))?;
    vprint!(env, 1, "CFT> Solution written to {}", out_path.display());
    Ok(())
}

/// Builds the starting incumbent from `--init-sol` or the instance-embedded
/// warm start (CVRP), whichever is present.
fn load_warmstart(
    env: &Environment,
    inst: &Instance,
    embedded: &[usize],
    init_sol: Option<&Path>,
) -> Result<Solution, Box<dyn std::error::Error>> {
    if let Some(path) = init_sol {
        let raw: RawSolution = loaders::solution::read(path)?;
        let sol = if env.use_unit_costs {
            // Costs changed under the file's feet; only feasibility and the
            // index range still mean anything.
            solution_from_idxs(inst, &raw.idxs)?
        } else {
            solution_from_file(inst, &raw)?
        };
        return Ok(sol);
    }
    if !embedded.is_empty() {
        return Ok(solution_from_idxs(inst, embedded)?);
    }
    Ok(Solution::default())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match solve(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("CFT> ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_the_environment_defaults() {
        let cli = Cli::parse_from(["setcov", "inst.rail"]);
        let env = cli.environment();
        assert_eq!(env.epsilon, 0.999);
        assert_eq!(env.heur_iters, 250);
        assert_eq!(env.beta, 1.0);
        assert_eq!(env.verbose, 4);
        assert!(!env.use_unit_costs);
        assert_eq!(cli.parser, ParserArg::Rail);
    }

    #[test]
    fn positional_and_flag_paths_are_both_accepted() {
        let cli = Cli::parse_from(["setcov", "a.scp", "--parser", "SCP"]);
        assert_eq!(cli.inst, Some(PathBuf::from("a.scp")));

        let cli = Cli::parse_from(["setcov", "-i", "b.scp", "--parser", "scp"]);
        assert_eq!(cli.inst_flag, Some(PathBuf::from("b.scp")));
        assert_eq!(cli.parser, ParserArg::Scp);
    }

    #[test]
    fn default_sol_path_uses_the_stem() {
        assert_eq!(
            default_sol_path(Path::new("/data/rail507.txt")),
            PathBuf::from("rail507.sol")
        );
        assert_eq!(
            default_sol_path(Path::new("scp41")),
            PathBuf::from("scp41.sol")
        );
    }

    #[test]
    fn unknown_parser_is_rejected() {
        assert!(Cli::try_parse_from(["setcov", "x", "--parser", "LP"]).is_err());
    }
}
