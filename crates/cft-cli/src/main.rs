use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use cft_algo::{append_coalition_csv, evaluate_game, select_partitions, EvaluatorConfig};
use cft_io::load_scenario;

mod cli;
mod perturb;
mod report;

use cli::Cli;
use perturb::{perturb_scenario, PerturbFlags};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // help and version render on stdout and are not failures
            process::exit(if err.use_stderr() { -1 } else { 0 });
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    if let Err(err) = run(&cli) {
        eprintln!("{err:#}");
        process::exit(-1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let scenario_path = match &cli.scenario {
        Some(path) => path,
        None => bail!("missing --scenario FILE (see --help)"),
    };
    if !(0.0..=1.0).contains(&cli.opt_relgap) {
        bail!("--opt-relgap must lie in [0, 1], got {}", cli.opt_relgap);
    }
    if cli.rnd_numit == 0 {
        bail!("--rnd-numit must be at least 1");
    }

    let base = load_scenario(scenario_path)
        .with_context(|| format!("loading scenario {}", scenario_path.display()))?;

    let config = EvaluatorConfig {
        relative_gap: cli.opt_relgap,
        time_limit: (cli.opt_tilim >= 0.0).then_some(cli.opt_tilim),
        payoff_rule: cli.payoff.into(),
    };
    let flags = PerturbFlags {
        vm_counts: cli.rnd_genvms,
        pm_power_states: cli.rnd_genpmsonoff,
        transition_costs: cli.rnd_genpmsonoffcosts,
        migration_costs: cli.rnd_genvmsmigrcosts,
    };
    let mut rng = StdRng::seed_from_u64(cli.rnd_seed);

    for iteration in 0..cli.rnd_numit {
        let mut scenario = base.clone();
        perturb_scenario(&mut scenario, &mut rng, &flags);

        info!(
            "iteration {}/{}: analyzing {} providers ({} coalitions)",
            iteration + 1,
            cli.rnd_numit,
            scenario.num_cips,
            (1u64 << scenario.num_cips) - 1,
        );
        let evaluation = evaluate_game(&scenario, &config)?;

        if let Some(csv_path) = &cli.csv {
            append_coalition_csv(csv_path, &evaluation, iteration == 0)
                .with_context(|| format!("exporting CSV to {}", csv_path.display()))?;
        }

        let best = select_partitions(&evaluation, cli.formation.into());
        report::print_report(
            &evaluation,
            &best,
            cli.formation.into(),
            cli.payoff.into(),
            iteration,
            cli.rnd_numit,
        );
    }

    Ok(())
}
