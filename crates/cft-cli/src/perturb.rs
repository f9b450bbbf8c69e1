//! Seeded random perturbation of workload parameters.
//!
//! Each enabled flag redraws one family of scenario parameters before an
//! analysis iteration. Draws come from a single seeded generator, so a run
//! with the same seed and flags is reproducible bit for bit.

use cft_core::Scenario;
use rand::rngs::StdRng;
use rand::Rng;

/// Which parameter families to redraw, one flag per `--rnd-gen*` option.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerturbFlags {
    pub vm_counts: bool,
    pub pm_power_states: bool,
    pub transition_costs: bool,
    pub migration_costs: bool,
}

/// Redraw the enabled parameter families in place.
///
/// VM counts are drawn uniformly in `[0, 2·original]`; power states are
/// fair coin flips; costs are drawn uniformly in `[0, 2·original)`, or in
/// `[0, 1)` when the original is zero. Self-migration entries stay zero.
pub fn perturb_scenario(scenario: &mut Scenario, rng: &mut StdRng, flags: &PerturbFlags) {
    if flags.vm_counts {
        for counts in &mut scenario.num_vms {
            for count in counts {
                *count = rng.gen_range(0..=*count * 2);
            }
        }
    }
    if flags.pm_power_states {
        for states in &mut scenario.pm_power_states {
            for state in states {
                *state = rng.gen_bool(0.5);
            }
        }
    }
    if flags.transition_costs {
        for table in [&mut scenario.pm_awake_costs, &mut scenario.pm_asleep_costs] {
            for row in table.iter_mut() {
                for cost in row {
                    *cost = draw_cost(rng, *cost);
                }
            }
        }
    }
    if flags.migration_costs {
        for (src, destinations) in scenario.migration_costs.iter_mut().enumerate() {
            for (dst, costs) in destinations.iter_mut().enumerate() {
                if src == dst {
                    continue;
                }
                for cost in costs {
                    *cost = draw_cost(rng, *cost);
                }
            }
        }
    }
}

fn draw_cost(rng: &mut StdRng, original: f64) -> f64 {
    if original > 0.0 {
        rng.gen_range(0.0..original * 2.0)
    } else {
        rng.gen_range(0.0..1.0)
    }
}
