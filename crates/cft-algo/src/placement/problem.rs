//! Placement problem data structures.

use cft_core::{CftError, CftResult, CipId, CoalitionId, Scenario};

/// One PM in the coalition's pooled machine array.
#[derive(Debug, Clone, Copy)]
pub struct PooledPm {
    pub owner: CipId,
    pub pm_type: usize,
    pub initially_on: bool,
}

/// One VM in the coalition's pooled workload array.
#[derive(Debug, Clone, Copy)]
pub struct PooledVm {
    pub owner: CipId,
    pub vm_type: usize,
}

/// Solver configuration.
#[derive(Debug, Clone, Copy)]
pub struct PlacementConfig {
    /// Relative MIP gap tolerance in [0,1]; 0 demands a proven optimum.
    pub relative_gap: f64,
    /// Wall-clock limit in seconds; `None` lets the solver run to the end.
    pub time_limit: Option<f64>,
    /// Minimize raw watts instead of monetary cost. Unreliable when
    /// transition or migration costs are nonzero (they are monetary and
    /// drop out of the objective); the solver warns and proceeds.
    pub min_power: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            relative_gap: 0.0,
            time_limit: None,
            min_power: false,
        }
    }
}

/// The placement instance for one coalition: the pooled PM and VM arrays
/// plus a borrow of the scenario for prices, specs and cost tables.
#[derive(Debug)]
pub struct PlacementProblem<'a> {
    pub scenario: &'a Scenario,
    pub coalition: CoalitionId,
    /// PMs of all members, lowest player first, grouped by type.
    pub pms: Vec<PooledPm>,
    /// VMs of all members, lowest player first, grouped by type.
    pub vms: Vec<PooledVm>,
    pub config: PlacementConfig,
}

impl<'a> PlacementProblem<'a> {
    /// Pool the PMs and VMs of the coalition's members.
    ///
    /// Ordering is deterministic: members in ascending player index, and
    /// within a member the PMs (resp. VMs) grouped by ascending type, which
    /// matches the per-CIP ordering of the scenario's power-state vectors.
    pub fn for_coalition(
        scenario: &'a Scenario,
        coalition: CoalitionId,
        config: PlacementConfig,
    ) -> Self {
        let mut pms = Vec::new();
        let mut vms = Vec::new();
        for p in coalition.players() {
            let mut unit = 0;
            for pm_type in 0..scenario.num_pm_types {
                for _ in 0..scenario.num_pms[p.value()][pm_type] {
                    pms.push(PooledPm {
                        owner: p,
                        pm_type,
                        initially_on: scenario.pm_power_states[p.value()][unit],
                    });
                    unit += 1;
                }
            }
            for vm_type in 0..scenario.num_vm_types {
                for _ in 0..scenario.num_vms[p.value()][vm_type] {
                    vms.push(PooledVm { owner: p, vm_type });
                }
            }
        }
        PlacementProblem {
            scenario,
            coalition,
            pms,
            vms,
            config,
        }
    }

    /// Start building a placement instance for this scenario.
    pub fn builder(scenario: &'a Scenario) -> PlacementProblemBuilder<'a> {
        PlacementProblemBuilder::new(scenario)
    }

    /// True when any member carries a nonzero transition or migration cost,
    /// i.e. when the min-power objective would mix watts with dollars.
    pub fn has_monetary_frictions(&self) -> bool {
        let sc = self.scenario;
        for p in self.coalition.players() {
            for t in 0..sc.num_pm_types {
                if sc.pm_awake_costs[p.value()][t] != 0.0
                    || sc.pm_asleep_costs[p.value()][t] != 0.0
                {
                    return true;
                }
            }
            for q in self.coalition.players() {
                if sc.migration_costs[p.value()][q.value()]
                    .iter()
                    .any(|&g| g != 0.0)
                {
                    return true;
                }
            }
        }
        false
    }
}

/// Builder for placement instances.
///
/// Defaults to the grand coalition with the default solver configuration;
/// `build()` validates the scenario, the coalition and the solver options
/// before pooling the machine and workload arrays.
///
/// # Example
///
/// ```ignore
/// let problem = PlacementProblemBuilder::new(&scenario)
///     .coalition(CoalitionId::new(0b011))
///     .relative_gap(0.01)
///     .time_limit(30.0)
///     .build()?;
/// let solution = solve_placement(&problem)?;
/// ```
pub struct PlacementProblemBuilder<'a> {
    scenario: &'a Scenario,
    coalition: CoalitionId,
    config: PlacementConfig,
}

impl<'a> PlacementProblemBuilder<'a> {
    /// Start building a placement instance over the whole player set.
    pub fn new(scenario: &'a Scenario) -> Self {
        Self {
            scenario,
            coalition: CoalitionId::grand(scenario.num_cips.min(63)),
            config: PlacementConfig::default(),
        }
    }

    /// Restrict the instance to one coalition.
    pub fn coalition(mut self, coalition: CoalitionId) -> Self {
        self.coalition = coalition;
        self
    }

    /// Set the relative MIP gap tolerance (0 demands a proven optimum).
    pub fn relative_gap(mut self, relative_gap: f64) -> Self {
        self.config.relative_gap = relative_gap;
        self
    }

    /// Set the solver time limit in seconds; a negative value disables it.
    pub fn time_limit(mut self, seconds: f64) -> Self {
        self.config.time_limit = (seconds >= 0.0).then_some(seconds);
        self
    }

    /// Minimize raw watts instead of monetary cost.
    pub fn min_power(mut self, min_power: bool) -> Self {
        self.config.min_power = min_power;
        self
    }

    /// Validate the inputs and pool the coalition's PM and VM arrays.
    pub fn build(self) -> CftResult<PlacementProblem<'a>> {
        self.scenario.validate()?;
        if self.coalition.is_empty() {
            return Err(CftError::Validation(
                "placement needs a non-empty coalition".into(),
            ));
        }
        if self.coalition.value() >> self.scenario.num_cips != 0 {
            return Err(CftError::Validation(format!(
                "coalition {} names players outside the {} in the scenario",
                self.coalition, self.scenario.num_cips
            )));
        }
        if !(0.0..=1.0).contains(&self.config.relative_gap) {
            return Err(CftError::Validation(format!(
                "relative gap must lie in [0, 1], got {}",
                self.config.relative_gap
            )));
        }
        Ok(PlacementProblem::for_coalition(
            self.scenario,
            self.coalition,
            self.config,
        ))
    }
}
