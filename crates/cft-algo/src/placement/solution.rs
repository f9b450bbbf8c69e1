//! Placement solution record.

use std::collections::BTreeMap;
use std::time::Duration;

use cft_core::CipId;
use serde::Serialize;

/// Outcome of one placement solve.
///
/// When `solved` is false the allocation vectors are empty and every cost
/// field is zero; the caller marks the coalition non-viable.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementSolution {
    /// A feasible allocation was produced.
    pub solved: bool,
    /// The allocation is proven optimal (no gap tolerance, no time-out).
    pub optimal: bool,
    /// Objective value: monetary cost in min-cost mode, watts in min-power
    /// mode.
    pub objective: f64,
    /// Electricity + transition + migration cost of the allocation, in $.
    pub cost: f64,
    pub electricity_cost: f64,
    pub transition_cost: f64,
    pub migration_cost: f64,
    /// Energy drawn by powered-on PMs over the one-hour window, in kWh.
    pub kwh: f64,
    /// Per-PM on/off decision, indexed like the pooled PM array.
    pub powered_on: Vec<bool>,
    /// Per-VM hosting PM index, indexed like the pooled VM array.
    pub placement: Vec<usize>,
    /// Per-PM CPU utilization in [0,1].
    pub utilization: Vec<f64>,
    /// Per-PM consumed watts (0 for powered-off PMs).
    pub pm_watts: Vec<f64>,
    /// Consumed watts summed per owning player.
    pub player_watts: BTreeMap<CipId, f64>,
    pub solve_time: Duration,
}

impl PlacementSolution {
    /// The non-solution record used for infeasible or timed-out instances.
    pub fn unsolved(solve_time: Duration) -> Self {
        PlacementSolution {
            solved: false,
            optimal: false,
            objective: 0.0,
            cost: 0.0,
            electricity_cost: 0.0,
            transition_cost: 0.0,
            migration_cost: 0.0,
            kwh: 0.0,
            powered_on: Vec::new(),
            placement: Vec::new(),
            utilization: Vec::new(),
            pm_watts: Vec::new(),
            player_watts: BTreeMap::new(),
            solve_time,
        }
    }

    /// Number of powered-on PMs.
    pub fn pms_on(&self) -> usize {
        self.powered_on.iter().filter(|&&on| on).count()
    }

    /// Human-readable single-solve summary.
    pub fn summary(&self) -> String {
        if !self.solved {
            return format!("infeasible (after {:.3}s)", self.solve_time.as_secs_f64());
        }
        format!(
            "{} of {} PMs on, cost {:.6} $ (electricity {:.6}, transitions {:.6}, migrations {:.6}), {:.6} kWh, {:.3}s{}",
            self.pms_on(),
            self.powered_on.len(),
            self.cost,
            self.electricity_cost,
            self.transition_cost,
            self.migration_cost,
            self.kwh,
            self.solve_time.as_secs_f64(),
            if self.optimal { "" } else { " (suboptimal)" },
        )
    }
}
