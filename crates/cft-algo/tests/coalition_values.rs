//! End-to-end coalition evaluation tests.

use std::collections::BTreeMap;

use cft_algo::{
    append_coalition_csv, evaluate_game, select_partitions, EvaluatorConfig, FormationCriterion,
    PayoffRule,
};
use cft_core::approx::essentially_equal;
use cft_core::{CipId, CoalitionId, PmSpec, Scenario, INFEASIBLE_VALUE};

/// Two symmetric providers with consolidation head-room (one VM each at
/// half a PM), electricity 1 $/kWh, revenue 1 $/h, no frictions.
fn symmetric_pair() -> Scenario {
    let mut sc = Scenario::empty(2, 1, 1);
    sc.pm_specs[0] = PmSpec {
        min_power_w: 100.0,
        max_power_w: 200.0,
    };
    sc.num_pms = vec![vec![1], vec![1]];
    sc.num_vms = vec![vec![1], vec![1]];
    sc.pm_power_states = vec![vec![true], vec![true]];
    sc.electricity_costs = vec![1.0, 1.0];
    sc.revenues = vec![vec![1.0], vec![1.0]];
    sc.vm_cpu_shares = vec![vec![0.5]];
    sc.vm_ram_shares = vec![vec![0.5]];
    sc
}

/// Three symmetric providers whose VMs each fill a whole PM, so pooling
/// never helps: the game is additive with v(S) = 2·|S|.
fn additive_triple() -> Scenario {
    let mut sc = Scenario::empty(3, 1, 1);
    sc.pm_specs[0] = PmSpec {
        min_power_w: 100.0,
        max_power_w: 200.0,
    };
    sc.num_pms = vec![vec![1]; 3];
    sc.num_vms = vec![vec![1]; 3];
    sc.pm_power_states = vec![vec![true]; 3];
    sc.electricity_costs = vec![1.0; 3];
    // v({p}) = 2.2 − 200 W · 1e-3 = 2 for every singleton
    sc.revenues = vec![vec![2.2]; 3];
    sc.vm_cpu_shares = vec![vec![1.0]];
    sc.vm_ram_shares = vec![vec![1.0]];
    sc
}

#[test]
fn consolidation_makes_the_grand_coalition_superadditive() {
    let sc = symmetric_pair();
    let eval = evaluate_game(&sc, &EvaluatorConfig::default()).unwrap();

    let v0 = eval.game.value(CoalitionId::new(0b01));
    let v1 = eval.game.value(CoalitionId::new(0b10));
    let v01 = eval.game.value(CoalitionId::grand(2));
    assert!(essentially_equal(v0, 0.85));
    assert!(essentially_equal(v1, 0.85));
    assert!(essentially_equal(v01, 1.8));
    assert!(v01 > v0 + v1);

    // Shapley payoffs equal by symmetry and exhaust the value
    let grand = eval.info(CoalitionId::grand(2));
    assert!(essentially_equal(grand.payoffs[0], 0.9));
    assert!(essentially_equal(grand.payoffs[1], 0.9));
    assert!(grand.core_non_empty);
    assert!(grand.payoff_in_core);

    // Nash-stable partition is the grand coalition alone
    let stable = select_partitions(&eval, FormationCriterion::Nash);
    assert_eq!(stable.len(), 1);
    assert_eq!(stable[0].blocks, vec![CoalitionId::grand(2)]);
}

#[test]
fn migration_costs_leave_singletons_stable() {
    let mut sc = symmetric_pair();
    sc.migration_costs[0][1][0] = 10.0;
    sc.migration_costs[1][0][0] = 10.0;
    let eval = evaluate_game(&sc, &EvaluatorConfig::default()).unwrap();

    // consolidation no longer pays: the grand coalition keeps VMs home
    let v01 = eval.game.value(CoalitionId::grand(2));
    assert!(essentially_equal(v01, 1.7));

    let stable = select_partitions(&eval, FormationCriterion::Nash);
    let singleton_partition = vec![
        CoalitionId::singleton(CipId(0)),
        CoalitionId::singleton(CipId(1)),
    ];
    assert!(
        stable.iter().any(|p| p.blocks == singleton_partition),
        "the singleton partition must be Nash-stable"
    );
    for partition in &stable {
        assert!(essentially_equal(partition.payoffs[0], 0.85));
        assert!(essentially_equal(partition.payoffs[1], 0.85));
    }
}

#[test]
fn additive_game_keeps_everyone_at_their_standalone_value() {
    let sc = additive_triple();
    let eval = evaluate_game(&sc, &EvaluatorConfig::default()).unwrap();

    for id in 1u64..8 {
        let s = CoalitionId::new(id);
        assert!(
            essentially_equal(eval.game.value(s), 2.0 * s.len() as f64),
            "v({s}) should be 2·|S|"
        );
    }

    let grand = eval.info(CoalitionId::grand(3));
    for payoff in &grand.payoffs {
        assert!(essentially_equal(*payoff, 2.0));
    }
    assert!(grand.core_non_empty);
    assert!(grand.payoff_in_core);

    // the grand coalition is Nash-stable (ties are accepted)
    let stable = select_partitions(&eval, FormationCriterion::Nash);
    assert!(stable
        .iter()
        .any(|p| p.blocks == vec![CoalitionId::grand(3)]));
}

#[test]
fn every_nonempty_coalition_gets_exactly_one_entry() {
    let sc = additive_triple();
    let eval = evaluate_game(&sc, &EvaluatorConfig::default()).unwrap();
    assert_eq!(eval.infos.len(), 7);
    let ids: Vec<u64> = eval.infos.keys().map(|id| id.value()).collect();
    assert_eq!(ids, (1..8).collect::<Vec<u64>>());
}

#[test]
fn payoff_budget_holds_for_shapley_and_normalized_banzhaf() {
    let sc = symmetric_pair();
    for rule in [PayoffRule::Shapley, PayoffRule::NormalizedBanzhaf] {
        let config = EvaluatorConfig {
            payoff_rule: rule,
            ..Default::default()
        };
        let eval = evaluate_game(&sc, &config).unwrap();
        for info in eval.infos.values() {
            let total: f64 = info.payoffs.iter().sum();
            assert!(
                essentially_equal(total, info.value),
                "{:?}: Σ payoffs = {total}, v = {}",
                rule,
                info.value
            );
        }
    }
}

#[test]
fn infeasible_coalitions_get_the_sentinel_and_empty_cores() {
    let mut sc = symmetric_pair();
    // each VM needs a full PM and provider 1 owns no machines
    sc.vm_cpu_shares = vec![vec![1.0]];
    sc.num_pms = vec![vec![1], vec![0]];
    sc.pm_power_states = vec![vec![true], vec![]];
    let eval = evaluate_game(&sc, &EvaluatorConfig::default()).unwrap();

    let lone = eval.info(CoalitionId::new(0b10));
    assert!(!lone.solved);
    assert_eq!(lone.value, INFEASIBLE_VALUE);
    assert!(!lone.core_non_empty);
    assert!(!lone.payoff_in_core);

    let grand = eval.info(CoalitionId::grand(2));
    assert!(!grand.solved, "two full-PM VMs cannot share one PM");
    assert!(!grand.core_non_empty);

    // the feasible singleton is still analyzed: v = 1 − 0.2
    let solo = eval.info(CoalitionId::new(0b01));
    assert!(solo.solved);
    assert!(essentially_equal(solo.value, 0.8));
}

#[test]
fn single_player_boundary() {
    let mut sc = symmetric_pair();
    sc.num_cips = 1;
    sc.revenues.truncate(1);
    sc.num_pms.truncate(1);
    sc.num_vms.truncate(1);
    sc.pm_power_states.truncate(1);
    sc.electricity_costs.truncate(1);
    sc.pm_asleep_costs.truncate(1);
    sc.pm_awake_costs.truncate(1);
    sc.migration_costs = vec![vec![vec![0.0]]];

    let eval = evaluate_game(&sc, &EvaluatorConfig::default()).unwrap();
    assert_eq!(eval.infos.len(), 1);
    assert!(essentially_equal(
        eval.game.value(CoalitionId::grand(1)),
        0.85
    ));
    for criterion in [
        FormationCriterion::MergeSplit,
        FormationCriterion::Nash,
        FormationCriterion::Pareto,
        FormationCriterion::SocialOptimum,
    ] {
        let best = select_partitions(&eval, criterion);
        assert_eq!(best.len(), 1, "{criterion:?}");
        assert_eq!(best[0].blocks, vec![CoalitionId::grand(1)]);
    }
}

#[test]
fn tiny_time_limit_still_completes_the_sweep() {
    let sc = additive_triple();
    let config = EvaluatorConfig {
        time_limit: Some(0.001),
        ..Default::default()
    };
    // regardless of which coalitions time out, the run must not abort and
    // the table must stay complete
    let eval = evaluate_game(&sc, &config).unwrap();
    assert_eq!(eval.infos.len(), 7);
    for info in eval.infos.values() {
        assert!(info.solved || info.value == INFEASIBLE_VALUE);
    }
    let _ = select_partitions(&eval, FormationCriterion::Nash);
}

#[test]
fn csv_roundtrip_recovers_the_payoff_table() {
    let sc = symmetric_pair();
    let eval = evaluate_game(&sc, &EvaluatorConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coalitions.csv");
    append_coalition_csv(&path, &eval, true).unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(&path)
        .unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("Coalition ID"));
    assert_eq!(headers.get(1), Some("Payoff(CIP 0)"));
    assert_eq!(headers.get(3), Some("Value(Coalition)"));

    let mut parsed: BTreeMap<u64, (Vec<f64>, f64)> = BTreeMap::new();
    for record in reader.records() {
        let record = record.unwrap();
        let id: u64 = record.get(0).unwrap().parse().unwrap();
        let payoffs: Vec<f64> = (1..=2)
            .map(|i| record.get(i).unwrap().parse().unwrap())
            .collect();
        let value: f64 = record.get(3).unwrap().parse().unwrap();
        parsed.insert(id, (payoffs, value));
    }

    assert_eq!(parsed.len(), eval.infos.len());
    for (id, info) in &eval.infos {
        let (payoffs, value) = &parsed[&id.value()];
        assert!(essentially_equal(*value, info.value));
        for p in 0..2 {
            let expected = info.payoff_of(CipId(p)).unwrap_or(0.0);
            assert!(essentially_equal(payoffs[p], expected));
        }
    }
}

#[test]
fn appended_blocks_separate_with_a_blank_row() {
    let sc = symmetric_pair();
    let eval = evaluate_game(&sc, &EvaluatorConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coalitions.csv");
    append_coalition_csv(&path, &eval, true).unwrap();
    append_coalition_csv(&path, &eval, false).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    // header + 3 rows + separator + 3 rows
    assert_eq!(lines.len(), 8);
    assert!(lines[0].starts_with("Coalition ID"));
    assert_eq!(lines[4], ",,");
    assert_eq!(lines[1], lines[5]);
}
