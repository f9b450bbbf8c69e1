//! Placement MILP solver.
//!
//! Builds the mixed-integer model over binary on/off variables `x_h`,
//! binary assignment variables `y_vh` and continuous utilization variables
//! `s_h`, and solves it with HiGHS through `good_lp`.
//!
//! Min-cost objective (all terms in $ over a one-hour window; electricity
//! prices are $/kWh and powers are watts, hence the 1e-3 factor):
//!
//! ```text
//! minimize Σ_h [ (x_h·Pmin_t(h) + (Pmax_t(h) − Pmin_t(h))·s_h) · E_owner(h) · 1e-3
//!               + x_h·(1 − o_h)·L_owner(h),t(h)          switch-on
//!               + (1 − x_h)·o_h·S_owner(h),t(h)          switch-off
//!               + Σ_v y_vh·G_owner(v),owner(h),type(v) ] migration
//!
//! s.t.  Σ_h y_vh = 1                       every VM placed exactly once
//!       s_h = Σ_v y_vh·A_type(v),t(h)      CPU utilization
//!       s_h ≤ x_h                          only lit PMs host CPU load
//!       Σ_v y_vh·M_type(v),t(h) ≤ x_h      RAM capacity
//!       0 ≤ s_h ≤ 1, x and y binary
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use cft_core::{CftError, CftResult, CipId};
use good_lp::solvers::highs::highs;
use good_lp::{constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable};
use tracing::warn;

use super::{PlacementProblem, PlacementSolution};

/// Solve the placement problem for one coalition.
///
/// Infeasibility and a time limit reached without an accepted solution are
/// reported as an unsolved [`PlacementSolution`], not as errors; any other
/// back-end failure is fatal and surfaces the back-end's message.
pub fn solve_placement(problem: &PlacementProblem) -> CftResult<PlacementSolution> {
    let start = Instant::now();
    let sc = problem.scenario;
    let num_pms = problem.pms.len();
    let num_vms = problem.vms.len();

    if problem.config.min_power && problem.has_monetary_frictions() {
        warn!(
            coalition = %problem.coalition,
            "min-power objective drops nonzero transition/migration costs; \
             the reported optimum mixes watts with dollars"
        );
    }

    if num_vms > 0 && num_pms == 0 {
        // Nothing can host the workload; don't bother the back-end.
        return Ok(PlacementSolution::unsolved(start.elapsed()));
    }
    if num_pms == 0 {
        // Empty pool: the trivial allocation, at zero cost.
        let mut empty = PlacementSolution::unsolved(start.elapsed());
        empty.solved = true;
        empty.optimal = true;
        return Ok(empty);
    }

    let mut vars = variables!();
    let x: Vec<Variable> = (0..num_pms).map(|_| vars.add(variable().binary())).collect();
    let s: Vec<Variable> = (0..num_pms)
        .map(|_| vars.add(variable().min(0.0).max(1.0)))
        .collect();
    let y: Vec<Vec<Variable>> = (0..num_vms)
        .map(|_| (0..num_pms).map(|_| vars.add(variable().binary())).collect())
        .collect();

    let mut objective = Expression::from(0.0);
    for (h, pm) in problem.pms.iter().enumerate() {
        let spec = &sc.pm_specs[pm.pm_type];
        let span = spec.max_power_w - spec.min_power_w;
        if problem.config.min_power {
            objective += spec.min_power_w * x[h] + span * s[h];
        } else {
            let owner = pm.owner.value();
            let price = sc.electricity_costs[owner] * 1e-3;
            objective += spec.min_power_w * price * x[h] + span * price * s[h];
            if pm.initially_on {
                // (1 - x)·S: pay the switch-off cost unless the PM stays on
                let off_cost = sc.pm_asleep_costs[owner][pm.pm_type];
                objective += off_cost - off_cost * x[h];
            } else {
                objective += sc.pm_awake_costs[owner][pm.pm_type] * x[h];
            }
        }
    }
    if !problem.config.min_power {
        for (v, vm) in problem.vms.iter().enumerate() {
            for (h, pm) in problem.pms.iter().enumerate() {
                let g = sc.migration_costs[vm.owner.value()][pm.owner.value()][vm.vm_type];
                objective += g * y[v][h];
            }
        }
    }

    let mut model = vars.minimise(objective).using(highs);
    if let Some(limit) = problem.config.time_limit {
        model = model.set_time_limit(limit);
    }
    if problem.config.relative_gap > 0.0 {
        model = model.set_mip_rel_gap(problem.config.relative_gap);
    }

    for v in 0..num_vms {
        let mut placed = Expression::from(0.0);
        for h in 0..num_pms {
            placed += y[v][h];
        }
        model = model.with(constraint!(placed == 1.0));
    }
    for h in 0..num_pms {
        let pm_type = problem.pms[h].pm_type;
        let mut cpu = Expression::from(0.0);
        let mut ram = Expression::from(0.0);
        for (v, vm) in problem.vms.iter().enumerate() {
            cpu += sc.vm_cpu_shares[vm.vm_type][pm_type] * y[v][h];
            ram += sc.vm_ram_shares[vm.vm_type][pm_type] * y[v][h];
            // lit-up linking; capacity alone would not force it for VMs
            // with zero resource shares on this PM type
            model = model.with(constraint!(y[v][h] - x[h] <= 0.0));
        }
        model = model.with(constraint!(cpu - s[h] == 0.0));
        model = model.with(constraint!(s[h] - x[h] <= 0.0));
        model = model.with(constraint!(ram - x[h] <= 0.0));
    }

    let milp_solution = match model.solve() {
        Ok(sol) => sol,
        Err(ResolutionError::Infeasible) | Err(ResolutionError::Unbounded) => {
            return Ok(PlacementSolution::unsolved(start.elapsed()));
        }
        Err(err) => {
            let message = err.to_string();
            if message.to_ascii_lowercase().contains("time") {
                warn!(
                    coalition = %problem.coalition,
                    "time limit reached without an accepted solution: {message}"
                );
                return Ok(PlacementSolution::unsolved(start.elapsed()));
            }
            return Err(CftError::Solver(message));
        }
    };

    // === Extract and post-process ===
    let powered_on: Vec<bool> = x.iter().map(|&v| milp_solution.value(v) > 0.5).collect();
    let mut placement = Vec::with_capacity(num_vms);
    for v in 0..num_vms {
        let mut host = 0;
        let mut best = f64::NEG_INFINITY;
        for h in 0..num_pms {
            let val = milp_solution.value(y[v][h]);
            if val > best {
                best = val;
                host = h;
            }
        }
        placement.push(host);
    }

    // Recompute utilization from the integral assignment so the reported
    // allocation is exactly self-consistent.
    let mut utilization = vec![0.0; num_pms];
    for (v, vm) in problem.vms.iter().enumerate() {
        let pm_type = problem.pms[placement[v]].pm_type;
        utilization[placement[v]] += sc.vm_cpu_shares[vm.vm_type][pm_type];
    }

    let mut electricity_cost = 0.0;
    let mut transition_cost = 0.0;
    let mut migration_cost = 0.0;
    let mut pm_watts = vec![0.0; num_pms];
    let mut player_watts: BTreeMap<CipId, f64> = problem
        .coalition
        .players()
        .map(|p| (p, 0.0))
        .collect();
    for (h, pm) in problem.pms.iter().enumerate() {
        let owner = pm.owner.value();
        if powered_on[h] {
            let watts = sc.pm_specs[pm.pm_type].watts_at(utilization[h]);
            pm_watts[h] = watts;
            *player_watts.get_mut(&pm.owner).expect("owner is a member") += watts;
            electricity_cost += watts * sc.electricity_costs[owner] * 1e-3;
            if !pm.initially_on {
                transition_cost += sc.pm_awake_costs[owner][pm.pm_type];
            }
        } else if pm.initially_on {
            transition_cost += sc.pm_asleep_costs[owner][pm.pm_type];
        }
    }
    for (v, vm) in problem.vms.iter().enumerate() {
        let host = &problem.pms[placement[v]];
        migration_cost += sc.migration_costs[vm.owner.value()][host.owner.value()][vm.vm_type];
    }

    let cost = electricity_cost + transition_cost + migration_cost;
    let total_watts: f64 = pm_watts.iter().sum();

    Ok(PlacementSolution {
        solved: true,
        optimal: problem.config.relative_gap <= 0.0,
        objective: if problem.config.min_power { total_watts } else { cost },
        cost,
        electricity_cost,
        transition_cost,
        migration_cost,
        kwh: total_watts * 1e-3,
        powered_on,
        placement,
        utilization,
        pm_watts,
        player_watts,
        solve_time: start.elapsed(),
    })
}
