//! Scenario file parser.
//!
//! The format is text and line-oriented. Blank lines and lines whose first
//! non-whitespace character is `#` are comments. Every other line is a
//! record `key = value`, where the value is a scalar, a 1-D vector
//! `[a b c]`, a 2-D array `[[…] […]]` or a 3-D array `[[[…] […]] …]`.
//! Keys are matched case-insensitively.
//!
//! Mandatory keys are the three counts (`num_cips`, `num_pm_types`,
//! `num_vm_types`); every other array defaults to zeros / all-off when
//! missing. A later record for the same key overrides an earlier one.
//! Shape mismatches fail the parse, including an inconsistent
//! `[N][N][V]` migration table.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use cft_core::{CftError, CftResult, PmSpec, Scenario};
use tracing::warn;

/// Parse the scenario file at `path`.
pub fn load_scenario(path: &Path) -> CftResult<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading scenario file: {}", path.display()))
        .map_err(|err| CftError::Parse(format!("{err:#}")))?;
    parse_scenario(&content).map_err(|err| CftError::Parse(format!("{err:#}")))
}

/// Parse scenario content from a string.
pub fn parse_scenario(content: &str) -> Result<Scenario> {
    let mut records: HashMap<String, RawValue> = HashMap::new();
    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value_text) = line
            .split_once('=')
            .ok_or_else(|| anyhow!("line {}: missing '=' in record '{line}'", index + 1))?;
        let key = key.trim().to_ascii_lowercase();
        let value = parse_value(value_text)
            .with_context(|| format!("line {}: key '{key}'", index + 1))?;
        records.insert(key, value);
    }

    for key in records.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn!("ignoring unknown scenario key '{key}'");
        }
    }

    let num_cips = require_count(&records, "num_cips")?;
    let num_pm_types = require_count(&records, "num_pm_types")?;
    let num_vm_types = require_count(&records, "num_vm_types")?;

    let mut scenario = Scenario::empty(num_cips, num_pm_types, num_vm_types);

    if let Some(value) = records.get("cip_revenues") {
        scenario.revenues = expect_2d(value, "cip_revenues", num_cips, num_vm_types)?;
    }
    let min_powers = match records.get("pm_spec_min_powers") {
        Some(value) => expect_1d(value, "pm_spec_min_powers", num_pm_types)?,
        None => vec![0.0; num_pm_types],
    };
    let max_powers = match records.get("pm_spec_max_powers") {
        Some(value) => expect_1d(value, "pm_spec_max_powers", num_pm_types)?,
        None => min_powers.clone(),
    };
    scenario.pm_specs = min_powers
        .into_iter()
        .zip(max_powers)
        .map(|(min_power_w, max_power_w)| PmSpec {
            min_power_w,
            max_power_w,
        })
        .collect();

    if let Some(value) = records.get("cip_num_pms") {
        scenario.num_pms = expect_2d_counts(value, "cip_num_pms", num_cips, num_pm_types)?;
    }
    if let Some(value) = records.get("cip_num_vms") {
        scenario.num_vms = expect_2d_counts(value, "cip_num_vms", num_cips, num_vm_types)?;
    }

    // Power states are ragged: row i holds one boolean per PM of CIP i.
    scenario.pm_power_states = match records.get("cip_pm_power_states") {
        Some(value) => {
            let rows = value.rows("cip_pm_power_states")?;
            if rows.len() != num_cips {
                bail!(
                    "cip_pm_power_states: expected {num_cips} rows, got {}",
                    rows.len()
                );
            }
            rows.iter()
                .map(|row| {
                    Ok(row
                        .scalars("cip_pm_power_states")?
                        .into_iter()
                        .map(|v| v != 0.0)
                        .collect())
                })
                .collect::<Result<Vec<Vec<bool>>>>()?
        }
        None => (0..num_cips)
            .map(|p| vec![false; scenario.num_pms[p].iter().sum()])
            .collect(),
    };

    let electricity = records
        .get("cip_electricity_costs")
        .or_else(|| records.get("cip_wcosts"));
    if let Some(value) = electricity {
        scenario.electricity_costs = expect_1d(value, "cip_electricity_costs", num_cips)?;
    }
    if let Some(value) = records.get("cip_pm_asleep_costs") {
        scenario.pm_asleep_costs =
            expect_2d(value, "cip_pm_asleep_costs", num_cips, num_pm_types)?;
    }
    if let Some(value) = records.get("cip_pm_awake_costs") {
        scenario.pm_awake_costs = expect_2d(value, "cip_pm_awake_costs", num_cips, num_pm_types)?;
    }
    if let Some(value) = records.get("cip_to_cip_vm_migration_costs") {
        scenario.migration_costs = expect_3d(
            value,
            "cip_to_cip_vm_migration_costs",
            num_cips,
            num_cips,
            num_vm_types,
        )?;
    }
    if let Some(value) = records.get("vm_spec_cpus") {
        scenario.vm_cpu_shares = expect_2d(value, "vm_spec_cpus", num_vm_types, num_pm_types)?;
    }
    if let Some(value) = records.get("vm_spec_rams") {
        scenario.vm_ram_shares = expect_2d(value, "vm_spec_rams", num_vm_types, num_pm_types)?;
    }

    scenario.validate()?;
    Ok(scenario)
}

const KNOWN_KEYS: &[&str] = &[
    "num_cips",
    "num_pm_types",
    "num_vm_types",
    "cip_revenues",
    "pm_spec_min_powers",
    "pm_spec_max_powers",
    "cip_num_pms",
    "cip_num_vms",
    "cip_pm_power_states",
    "cip_electricity_costs",
    "cip_wcosts",
    "cip_pm_asleep_costs",
    "cip_pm_awake_costs",
    "cip_to_cip_vm_migration_costs",
    "vm_spec_cpus",
    "vm_spec_rams",
];

/// A parsed value: a number or an arbitrarily nested bracket list.
#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Scalar(f64),
    List(Vec<RawValue>),
}

impl RawValue {
    fn rows(&self, key: &str) -> Result<&[RawValue]> {
        match self {
            RawValue::List(items) => Ok(items),
            RawValue::Scalar(_) => bail!("{key}: expected an array, got a scalar"),
        }
    }

    fn scalars(&self, key: &str) -> Result<Vec<f64>> {
        self.rows(key)?
            .iter()
            .map(|item| match item {
                RawValue::Scalar(v) => Ok(*v),
                RawValue::List(_) => bail!("{key}: expected a flat vector of numbers"),
            })
            .collect()
    }
}

fn parse_value(text: &str) -> Result<RawValue> {
    let mut pos = 0;
    let value = parse_value_at(text, &mut pos)?;
    skip_whitespace(text, &mut pos);
    if pos != text.len() {
        bail!("trailing characters after value: '{}'", &text[pos..]);
    }
    Ok(value)
}

fn skip_whitespace(text: &str, pos: &mut usize) {
    let bytes = text.as_bytes();
    while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
}

fn parse_value_at(text: &str, pos: &mut usize) -> Result<RawValue> {
    skip_whitespace(text, pos);
    let bytes = text.as_bytes();
    if *pos >= bytes.len() {
        bail!("missing value");
    }
    if bytes[*pos] == b']' {
        bail!("unexpected ']'");
    }
    if bytes[*pos] == b'[' {
        *pos += 1;
        let mut items = Vec::new();
        loop {
            skip_whitespace(text, pos);
            if *pos >= bytes.len() {
                bail!("missing closing ']'");
            }
            if bytes[*pos] == b']' {
                *pos += 1;
                return Ok(RawValue::List(items));
            }
            items.push(parse_value_at(text, pos)?);
        }
    }
    let start = *pos;
    while *pos < bytes.len()
        && !bytes[*pos].is_ascii_whitespace()
        && bytes[*pos] != b'['
        && bytes[*pos] != b']'
    {
        *pos += 1;
    }
    let token = &text[start..*pos];
    token
        .parse::<f64>()
        .map(RawValue::Scalar)
        .map_err(|_| anyhow!("invalid number '{token}'"))
}

fn require_count(records: &HashMap<String, RawValue>, key: &str) -> Result<usize> {
    let value = records
        .get(key)
        .ok_or_else(|| anyhow!("missing mandatory field '{key}'"))?;
    let number = match value {
        RawValue::Scalar(v) => *v,
        RawValue::List(_) => bail!("{key}: expected a scalar"),
    };
    if number < 1.0 || number.fract() != 0.0 {
        bail!("{key} must be a positive integer, got {number}");
    }
    Ok(number as usize)
}

fn expect_1d(value: &RawValue, key: &str, len: usize) -> Result<Vec<f64>> {
    let scalars = value.scalars(key)?;
    if scalars.len() != len {
        bail!("{key}: expected {len} entries, got {}", scalars.len());
    }
    Ok(scalars)
}

fn expect_2d(value: &RawValue, key: &str, rows: usize, cols: usize) -> Result<Vec<Vec<f64>>> {
    let items = value.rows(key)?;
    if items.len() != rows {
        bail!("{key}: expected {rows} rows, got {}", items.len());
    }
    items
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let scalars = row.scalars(key)?;
            if scalars.len() != cols {
                bail!(
                    "{key}[{i}]: expected {cols} entries, got {}",
                    scalars.len()
                );
            }
            Ok(scalars)
        })
        .collect()
}

fn expect_2d_counts(
    value: &RawValue,
    key: &str,
    rows: usize,
    cols: usize,
) -> Result<Vec<Vec<usize>>> {
    expect_2d(value, key, rows, cols)?
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|v| {
                    if v < 0.0 || v.fract() != 0.0 {
                        bail!("{key} entries must be non-negative integers, got {v}");
                    }
                    Ok(v as usize)
                })
                .collect()
        })
        .collect()
}

fn expect_3d(
    value: &RawValue,
    key: &str,
    dim0: usize,
    dim1: usize,
    dim2: usize,
) -> Result<Vec<Vec<Vec<f64>>>> {
    let outer = value.rows(key)?;
    if outer.len() != dim0 {
        bail!("{key}: expected {dim0} outer entries, got {}", outer.len());
    }
    outer
        .iter()
        .enumerate()
        .map(|(i, middle)| {
            let rows = middle.rows(key)?;
            if rows.len() != dim1 {
                bail!("{key}[{i}]: expected {dim1} entries, got {}", rows.len());
            }
            rows.iter()
                .enumerate()
                .map(|(j, inner)| {
                    let scalars = inner.scalars(key)?;
                    if scalars.len() != dim2 {
                        bail!(
                            "{key}[{i}][{j}]: expected {dim2} entries, got {}",
                            scalars.len()
                        );
                    }
                    Ok(scalars)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CIPS: &str = "
# two symmetric providers, one PM type, one VM type
num_cips = 2
num_pm_types = 1
num_vm_types = 1

cip_revenues = [[1] [1]]
pm_spec_min_powers = [100]
pm_spec_max_powers = [200]
cip_num_pms = [[1] [1]]
cip_num_vms = [[1] [1]]
cip_pm_power_states = [[1] [1]]
cip_electricity_costs = [1 1]
vm_spec_cpus = [[0.5]]
vm_spec_rams = [[0.5]]
";

    #[test]
    fn parses_a_complete_scenario() {
        let sc = parse_scenario(TWO_CIPS).unwrap();
        assert_eq!(sc.num_cips, 2);
        assert_eq!(sc.pm_specs[0].min_power_w, 100.0);
        assert_eq!(sc.num_pms, vec![vec![1], vec![1]]);
        assert_eq!(sc.pm_power_states, vec![vec![true], vec![true]]);
        assert_eq!(sc.vm_cpu_shares[0][0], 0.5);
        // untouched optional arrays default to zero
        assert_eq!(sc.pm_awake_costs, vec![vec![0.0], vec![0.0]]);
        assert_eq!(sc.migration_costs[0][1][0], 0.0);
    }

    #[test]
    fn keys_are_case_insensitive_and_wcosts_is_an_alias() {
        let content = TWO_CIPS.replace("cip_electricity_costs", "CIP_WCOSTS");
        let sc = parse_scenario(&content).unwrap();
        assert_eq!(sc.electricity_costs, vec![1.0, 1.0]);
    }

    #[test]
    fn three_dimensional_migration_table() {
        let content = format!(
            "{TWO_CIPS}\ncip_to_cip_vm_migration_costs = [[[0] [10]] [[10] [0]]]\n"
        );
        let sc = parse_scenario(&content).unwrap();
        assert_eq!(sc.migration_costs[0][1][0], 10.0);
        assert_eq!(sc.migration_costs[1][0][0], 10.0);
        assert_eq!(sc.migration_costs[0][0][0], 0.0);
    }

    #[test]
    fn inconsistent_migration_shape_fails() {
        // middle dimension has one destination instead of two
        let content = format!("{TWO_CIPS}\ncip_to_cip_vm_migration_costs = [[[0]] [[10] [0]]]\n");
        let err = parse_scenario(&content).unwrap_err();
        assert!(err.to_string().contains("cip_to_cip_vm_migration_costs"));
    }

    #[test]
    fn missing_equals_sign_is_a_parse_error() {
        let err = parse_scenario("num_cips 2\n").unwrap_err();
        assert!(err.to_string().contains("missing '='"));
    }

    #[test]
    fn missing_bracket_is_a_parse_error() {
        let content = TWO_CIPS.replace("[1 1]", "[1 1");
        assert!(parse_scenario(&content).is_err());
    }

    #[test]
    fn mandatory_counts_must_be_positive_integers() {
        assert!(parse_scenario("num_cips = -1\nnum_pm_types = 1\nnum_vm_types = 1\n").is_err());
        assert!(parse_scenario("num_pm_types = 1\nnum_vm_types = 1\n")
            .unwrap_err()
            .to_string()
            .contains("num_cips"));
        assert!(parse_scenario("num_cips = 1.5\nnum_pm_types = 1\nnum_vm_types = 1\n").is_err());
    }

    #[test]
    fn power_state_rows_must_match_owned_pms() {
        let content = TWO_CIPS.replace("[[1] [1]]\ncip_electricity", "[[1 1] [1]]\ncip_electricity");
        assert!(parse_scenario(&content).is_err());
    }

    #[test]
    fn minimal_scenario_defaults_everything_off() {
        let sc = parse_scenario("num_cips = 1\nnum_pm_types = 2\nnum_vm_types = 1\n").unwrap();
        assert_eq!(sc.num_pms, vec![vec![0, 0]]);
        assert_eq!(sc.pm_power_states, vec![Vec::<bool>::new()]);
        assert_eq!(sc.electricity_costs, vec![0.0]);
    }

    #[test]
    fn load_scenario_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.txt");
        std::fs::write(&path, TWO_CIPS).unwrap();
        let sc = load_scenario(&path).unwrap();
        assert_eq!(sc.num_cips, 2);

        let missing = load_scenario(&dir.path().join("nope.txt"));
        assert!(missing.is_err());
    }
}
