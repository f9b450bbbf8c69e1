//! Command-line definition.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use cft_algo::{FormationCriterion, PayoffRule};

#[derive(Parser, Debug)]
#[command(author, version, about = "Game-theoretic analysis of cloud provider federations", long_about = None)]
pub struct Cli {
    /// Scenario file describing providers, resources, prices and workload
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Export the per-coalition payoff table to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Partition-selection criterion
    #[arg(long, value_enum, default_value_t = FormationArg::Nash)]
    pub formation: FormationArg,

    /// Payoff division rule
    #[arg(long, value_enum, default_value_t = PayoffArg::Shapley)]
    pub payoff: PayoffArg,

    /// Relative MIP gap tolerance in [0,1]; 0 demands proven optima
    #[arg(long = "opt-relgap", default_value_t = 0.0)]
    pub opt_relgap: f64,

    /// Per-coalition solver time limit in seconds; negative disables it
    #[arg(long = "opt-tilim", default_value_t = -1.0, allow_negative_numbers = true)]
    pub opt_tilim: f64,

    /// Redraw per-provider VM counts each iteration
    #[arg(long = "rnd-genvms")]
    pub rnd_genvms: bool,

    /// Redraw initial PM power states each iteration
    #[arg(long = "rnd-genpmsonoff")]
    pub rnd_genpmsonoff: bool,

    /// Redraw PM switch-on/off costs each iteration
    #[arg(long = "rnd-genpmsonoffcosts")]
    pub rnd_genpmsonoffcosts: bool,

    /// Redraw inter-provider VM migration costs each iteration
    #[arg(long = "rnd-genvmsmigrcosts")]
    pub rnd_genvmsmigrcosts: bool,

    /// Number of analysis iterations
    #[arg(long = "rnd-numit", default_value_t = 1)]
    pub rnd_numit: usize,

    /// Seed for the perturbation generator
    #[arg(long = "rnd-seed", default_value_t = 5489)]
    pub rnd_seed: u64,

    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormationArg {
    MergeSplit,
    Nash,
    Pareto,
    Social,
}

impl From<FormationArg> for FormationCriterion {
    fn from(arg: FormationArg) -> Self {
        match arg {
            FormationArg::MergeSplit => FormationCriterion::MergeSplit,
            FormationArg::Nash => FormationCriterion::Nash,
            FormationArg::Pareto => FormationCriterion::Pareto,
            FormationArg::Social => FormationCriterion::SocialOptimum,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PayoffArg {
    Banzhaf,
    NormBanzhaf,
    Shapley,
}

impl From<PayoffArg> for PayoffRule {
    fn from(arg: PayoffArg) -> Self {
        match arg {
            PayoffArg::Banzhaf => PayoffRule::Banzhaf,
            PayoffArg::NormBanzhaf => PayoffRule::NormalizedBanzhaf,
            PayoffArg::Shapley => PayoffRule::Shapley,
        }
    }
}
