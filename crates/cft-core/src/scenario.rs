//! Scenario data model.
//!
//! A scenario describes a set of Cloud Infrastructure Providers (CIPs): the
//! physical machines (PMs) each owns, the virtual machines (VMs) each
//! serves, revenue and electricity rates, PM switch-on/off costs, and the
//! inter-CIP VM migration cost table. The scenario is immutable over an
//! analysis run; workload perturbation clones it first.

use serde::{Deserialize, Serialize};

use crate::coalition::CipId;
use crate::error::{CftError, CftResult};

/// Power-consumption envelope of one PM type.
///
/// A powered-on PM draws `min_power_w` at idle and ramps linearly to
/// `max_power_w` at full CPU utilization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmSpec {
    pub min_power_w: f64,
    pub max_power_w: f64,
}

impl PmSpec {
    /// Watts drawn at CPU utilization `s ∈ [0,1]`.
    pub fn watts_at(&self, s: f64) -> f64 {
        self.min_power_w + (self.max_power_w - self.min_power_w) * s
    }
}

/// Full description of the providers, resources, prices and workload.
///
/// Array shapes use `N` = number of CIPs, `T` = number of PM types,
/// `V` = number of VM types, `H_i` = total PMs owned by CIP `i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub num_cips: usize,
    pub num_pm_types: usize,
    pub num_vm_types: usize,

    /// `[N][V]` revenue rate in $/h per hosted VM.
    pub revenues: Vec<Vec<f64>>,
    /// `[T]` per-type power envelopes.
    pub pm_specs: Vec<PmSpec>,
    /// `[N][T]` PM counts per CIP per type.
    pub num_pms: Vec<Vec<usize>>,
    /// `[N][V]` VM counts per CIP per type.
    pub num_vms: Vec<Vec<usize>>,
    /// `[N][H_i]` initial on/off state of every individual PM, ordered by
    /// type then unit within the owning CIP.
    pub pm_power_states: Vec<Vec<bool>>,
    /// `[N]` electricity price in $/kWh.
    pub electricity_costs: Vec<f64>,
    /// `[N][T]` cost of switching a powered-on PM off.
    pub pm_asleep_costs: Vec<Vec<f64>>,
    /// `[N][T]` cost of switching a powered-off PM on.
    pub pm_awake_costs: Vec<Vec<f64>>,
    /// `[N][N][V]` migration cost from source CIP to destination CIP per VM
    /// type.
    pub migration_costs: Vec<Vec<Vec<f64>>>,
    /// `[V][T]` CPU share a VM of a given type needs on a PM of a given type.
    pub vm_cpu_shares: Vec<Vec<f64>>,
    /// `[V][T]` RAM share a VM of a given type needs on a PM of a given type.
    pub vm_ram_shares: Vec<Vec<f64>>,
}

impl Scenario {
    /// A scenario with the given counts and everything else zeroed:
    /// no PMs, no VMs, all prices and costs zero, all PMs off.
    pub fn empty(num_cips: usize, num_pm_types: usize, num_vm_types: usize) -> Self {
        Scenario {
            num_cips,
            num_pm_types,
            num_vm_types,
            revenues: vec![vec![0.0; num_vm_types]; num_cips],
            pm_specs: vec![
                PmSpec {
                    min_power_w: 0.0,
                    max_power_w: 0.0
                };
                num_pm_types
            ],
            num_pms: vec![vec![0; num_pm_types]; num_cips],
            num_vms: vec![vec![0; num_vm_types]; num_cips],
            pm_power_states: vec![Vec::new(); num_cips],
            electricity_costs: vec![0.0; num_cips],
            pm_asleep_costs: vec![vec![0.0; num_pm_types]; num_cips],
            pm_awake_costs: vec![vec![0.0; num_pm_types]; num_cips],
            migration_costs: vec![vec![vec![0.0; num_vm_types]; num_cips]; num_cips],
            vm_cpu_shares: vec![vec![0.0; num_pm_types]; num_vm_types],
            vm_ram_shares: vec![vec![0.0; num_pm_types]; num_vm_types],
        }
    }

    /// Total number of PMs owned by CIP `p`.
    pub fn pms_of(&self, p: CipId) -> usize {
        self.num_pms[p.value()].iter().sum()
    }

    /// Total number of VMs served by CIP `p`.
    pub fn vms_of(&self, p: CipId) -> usize {
        self.num_vms[p.value()].iter().sum()
    }

    /// Hourly revenue of CIP `p` over all its hosted VMs.
    pub fn revenue_of(&self, p: CipId) -> f64 {
        self.revenues[p.value()]
            .iter()
            .zip(&self.num_vms[p.value()])
            .map(|(r, &n)| r * n as f64)
            .sum()
    }

    /// Check all array shapes and value ranges.
    ///
    /// The parser produces correctly-shaped defaults for missing arrays, so
    /// a failure here means the file itself was inconsistent.
    pub fn validate(&self) -> CftResult<()> {
        let (n, t, v) = (self.num_cips, self.num_pm_types, self.num_vm_types);
        if n == 0 || n >= 64 {
            return Err(CftError::Validation(format!(
                "num_cips must be in [1, 63], got {n}"
            )));
        }
        if t == 0 {
            return Err(CftError::Validation("num_pm_types must be positive".into()));
        }
        if v == 0 {
            return Err(CftError::Validation("num_vm_types must be positive".into()));
        }

        check_2d("cip_revenues", &self.revenues, n, v)?;
        if self.pm_specs.len() != t {
            return Err(shape_error("pm_spec powers", t, self.pm_specs.len()));
        }
        check_2d_usize("cip_num_pms", &self.num_pms, n, t)?;
        check_2d_usize("cip_num_vms", &self.num_vms, n, v)?;
        if self.electricity_costs.len() != n {
            return Err(shape_error(
                "cip_electricity_costs",
                n,
                self.electricity_costs.len(),
            ));
        }
        check_2d("cip_pm_asleep_costs", &self.pm_asleep_costs, n, t)?;
        check_2d("cip_pm_awake_costs", &self.pm_awake_costs, n, t)?;
        check_2d("vm_spec_cpus", &self.vm_cpu_shares, v, t)?;
        check_2d("vm_spec_rams", &self.vm_ram_shares, v, t)?;

        if self.pm_power_states.len() != n {
            return Err(shape_error(
                "cip_pm_power_states",
                n,
                self.pm_power_states.len(),
            ));
        }
        for p in 0..n {
            let expected = self.pms_of(CipId(p));
            let got = self.pm_power_states[p].len();
            if got != expected {
                return Err(CftError::Validation(format!(
                    "cip_pm_power_states[{p}] has {got} entries, CIP {p} owns {expected} PMs"
                )));
            }
        }

        if self.migration_costs.len() != n {
            return Err(shape_error(
                "cip_to_cip_vm_migration_costs",
                n,
                self.migration_costs.len(),
            ));
        }
        for (src, row) in self.migration_costs.iter().enumerate() {
            if row.len() != n {
                return Err(CftError::Validation(format!(
                    "cip_to_cip_vm_migration_costs[{src}] has {} destinations, expected {n}",
                    row.len()
                )));
            }
            for (dst, costs) in row.iter().enumerate() {
                if costs.len() != v {
                    return Err(CftError::Validation(format!(
                        "cip_to_cip_vm_migration_costs[{src}][{dst}] has {} VM types, expected {v}",
                        costs.len()
                    )));
                }
            }
        }

        for spec in &self.pm_specs {
            if spec.min_power_w < 0.0 || spec.max_power_w < spec.min_power_w {
                return Err(CftError::Validation(format!(
                    "PM power envelope must satisfy 0 <= min <= max, got ({}, {})",
                    spec.min_power_w, spec.max_power_w
                )));
            }
        }
        for shares in self.vm_cpu_shares.iter().chain(&self.vm_ram_shares) {
            for &s in shares {
                if !(0.0..=1.0).contains(&s) {
                    return Err(CftError::Validation(format!(
                        "VM resource shares must lie in [0,1], got {s}"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn shape_error(key: &str, expected: usize, got: usize) -> CftError {
    CftError::Validation(format!("{key}: expected {expected} entries, got {got}"))
}

fn check_2d(key: &str, table: &[Vec<f64>], rows: usize, cols: usize) -> CftResult<()> {
    if table.len() != rows {
        return Err(shape_error(key, rows, table.len()));
    }
    for (i, row) in table.iter().enumerate() {
        if row.len() != cols {
            return Err(CftError::Validation(format!(
                "{key}[{i}]: expected {cols} entries, got {}",
                row.len()
            )));
        }
    }
    Ok(())
}

fn check_2d_usize(key: &str, table: &[Vec<usize>], rows: usize, cols: usize) -> CftResult<()> {
    if table.len() != rows {
        return Err(shape_error(key, rows, table.len()));
    }
    for (i, row) in table.iter().enumerate() {
        if row.len() != cols {
            return Err(CftError::Validation(format!(
                "{key}[{i}]: expected {cols} entries, got {}",
                row.len()
            )));
        }
    }
    Ok(())
}
