//! Human-readable analysis report.
//!
//! Prints the retained partitions with their payoffs, value, energy and
//! per-coalition core status, then the grand coalition's own payoffs and
//! core status, then the singleton partition as a baseline.

use cft_algo::partition::outcome;
use cft_algo::{Evaluation, FormationCriterion, PartitionOutcome, PayoffRule};
use cft_core::{approx, CipId, CoalitionId, CoalitionInfo};

pub fn print_report(
    eval: &Evaluation,
    best: &[PartitionOutcome],
    criterion: FormationCriterion,
    rule: PayoffRule,
    iteration: usize,
    total_iterations: usize,
) {
    let n = eval.num_players();
    let grand = eval.info(CoalitionId::grand(n));
    let grand_outcome = outcome(eval, vec![grand.id]);
    let singleton_blocks: Vec<CoalitionId> =
        (0..n).map(|p| CoalitionId::singleton(CipId(p))).collect();
    let singletons = outcome(eval, singleton_blocks);

    println!(
        "=== Federation analysis (formation: {}, payoff: {}) ===",
        criterion.as_str(),
        rule.as_str()
    );
    if total_iterations > 1 {
        println!("Iteration: {}/{}", iteration + 1, total_iterations);
    }

    println!("Best partitions: {}", best.len());
    for (index, partition) in best.iter().enumerate() {
        println!("-- Partition {}: {}", index + 1, blocks_label(&partition.blocks));
        println!("   Value: {}", format_value(partition.value));
        println!("   Energy: {:.6} kWh", partition.kwh);
        for &block in &partition.blocks {
            println!("   Coalition {}: {}", block, core_label(eval.info(block)));
        }
        println!("   Payoffs: {}", payoff_list(&partition.payoffs));
        println!(
            "   Payoff delta vs grand coalition: {}",
            delta_list(&partition.payoffs, &grand_outcome.payoffs)
        );
        println!(
            "   Payoff delta vs singletons: {}",
            delta_list(&partition.payoffs, &singletons.payoffs)
        );
    }

    println!("Grand coalition {}:", grand.id);
    if grand.solved {
        println!("   Value: {}", format_value(grand.value));
    } else {
        println!("   Value: infeasible");
    }
    println!("   Payoffs: {}", payoff_list(&grand_outcome.payoffs));
    println!("   Core: {}", core_label(grand));

    println!("Singleton partition:");
    println!("   Value: {}", format_value(singletons.value));
    println!("   Payoffs: {}", payoff_list(&singletons.payoffs));
    println!("   Energy: {:.6} kWh", singletons.kwh);
}

fn format_value(value: f64) -> String {
    format!("{value:.6} $")
}

fn blocks_label(blocks: &[CoalitionId]) -> String {
    let parts: Vec<String> = blocks.iter().map(|b| b.to_string()).collect();
    format!("{{{}}}", parts.join(", "))
}

fn core_label(info: &CoalitionInfo) -> String {
    if !info.solved {
        return "infeasible; empty core".to_string();
    }
    format!(
        "core {}; payoffs {} the core",
        if info.core_non_empty { "non-empty" } else { "empty" },
        if info.payoff_in_core { "inside" } else { "outside" },
    )
}

fn payoff_list(payoffs: &[f64]) -> String {
    let parts: Vec<String> = payoffs
        .iter()
        .enumerate()
        .map(|(p, x)| format!("CIP {p}: {x:.6}"))
        .collect();
    format!("[{}]", parts.join(", "))
}

/// Per-player percentage deltas against a reference payoff vector.
fn delta_list(payoffs: &[f64], reference: &[f64]) -> String {
    let parts: Vec<String> = payoffs
        .iter()
        .zip(reference)
        .enumerate()
        .map(|(p, (&x, &r))| format!("CIP {p}: {}", percent_delta(x, r)))
        .collect();
    format!("[{}]", parts.join(", "))
}

fn percent_delta(x: f64, reference: f64) -> String {
    if approx::essentially_equal(reference, 0.0) {
        "n/a".to_string()
    } else {
        format!("{:+.2}%", (x - reference) / reference.abs() * 100.0)
    }
}
