//! End-to-end CLI tests.

use assert_cmd::Command;
use predicates::prelude::*;

const TWO_CIPS: &str = "
num_cips = 2
num_pm_types = 1
num_vm_types = 1
cip_revenues = [[1] [1]]
pm_spec_min_powers = [100]
pm_spec_max_powers = [200]
cip_num_pms = [[1] [1]]
cip_num_vms = [[2] [2]]
cip_pm_power_states = [[1] [1]]
cip_electricity_costs = [1 1]
vm_spec_cpus = [[0.25]]
vm_spec_rams = [[0.25]]
";

fn cft() -> Command {
    Command::cargo_bin("cft").unwrap()
}

fn sample_scenario_path() -> String {
    format!(
        "{}/../../scenarios/federation3.txt",
        env!("CARGO_MANIFEST_DIR")
    )
}

#[test]
fn missing_scenario_flag_exits_nonzero() {
    cft()
        .assert()
        .failure()
        .code(255)
        .stderr(predicate::str::contains("--scenario"));
}

#[test]
fn unknown_formation_tag_is_rejected() {
    cft()
        .args(["--scenario", "whatever.txt", "--formation", "bogus"])
        .assert()
        .failure()
        .code(255)
        .stderr(predicate::str::contains("formation"));
}

#[test]
fn unreadable_scenario_file_exits_nonzero() {
    cft()
        .args(["--scenario", "/definitely/not/here.txt"])
        .assert()
        .failure()
        .code(255)
        .stderr(predicate::str::contains("scenario"));
}

#[test]
fn malformed_scenario_reports_the_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.txt");
    std::fs::write(&path, "num_cips 2\n").unwrap();
    cft()
        .args(["--scenario", path.to_str().unwrap()])
        .assert()
        .failure()
        .code(255)
        .stderr(predicate::str::contains("missing '='"));
}

#[test]
fn sample_scenario_federates_all_three_providers() {
    cft()
        .args(["--scenario", &sample_scenario_path()])
        .args(["--formation", "nash", "--payoff", "shapley"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Best partitions: 1"))
        .stdout(predicate::str::contains("{0,1,2}"))
        .stdout(predicate::str::contains("Grand coalition"))
        .stdout(predicate::str::contains("Singleton partition"));
}

#[test]
fn csv_export_writes_header_and_all_coalitions() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("scenario.txt");
    std::fs::write(&scenario, TWO_CIPS).unwrap();
    let csv = dir.path().join("out.csv");

    cft()
        .args(["--scenario", scenario.to_str().unwrap()])
        .args(["--csv", csv.to_str().unwrap()])
        .assert()
        .success();

    let content = std::fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "Coalition ID,Payoff(CIP 0),Payoff(CIP 1),Value(Coalition)"
    );
    // header + one row per non-empty coalition
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("1,"));
    assert!(lines[3].starts_with("3,"));
}

#[test]
fn perturbed_runs_with_the_same_seed_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("scenario.txt");
    std::fs::write(&scenario, TWO_CIPS).unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    for csv in [&first, &second] {
        cft()
            .args(["--scenario", scenario.to_str().unwrap()])
            .args(["--csv", csv.to_str().unwrap()])
            .args(["--rnd-genvms", "--rnd-numit", "3", "--rnd-seed", "5489"])
            .assert()
            .success();
    }

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b);
    // three blocks: one header block plus two separator-prefixed blocks
    let content = String::from_utf8(a).unwrap();
    assert_eq!(content.lines().filter(|line| *line == ",,").count(), 2);
}

#[test]
fn norm_banzhaf_and_merge_split_tags_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("scenario.txt");
    std::fs::write(&scenario, TWO_CIPS).unwrap();

    cft()
        .args(["--scenario", scenario.to_str().unwrap()])
        .args(["--formation", "merge-split", "--payoff", "norm-banzhaf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("merge-split"))
        .stdout(predicate::str::contains("norm-banzhaf"));
}
