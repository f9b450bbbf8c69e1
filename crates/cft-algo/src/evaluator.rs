//! Coalition evaluation: characteristic values, payoffs and core tests for
//! every non-empty subset of players.

use std::collections::BTreeMap;

use cft_core::{
    Allocation, CftResult, CipId, CoalitionId, CoalitionInfo, Game, Scenario, INFEASIBLE_VALUE,
};
use tracing::{debug, warn};

use crate::combin::SubsetIter;
use crate::core::{core_is_non_empty, payoffs_in_core};
use crate::payoff::{payoff_vector, PayoffRule};
use crate::placement::{solve_placement, PlacementProblemBuilder};

/// Configuration shared by all coalition solves of one run.
#[derive(Debug, Clone, Copy)]
pub struct EvaluatorConfig {
    /// Relative MIP gap tolerance handed to the placement solver.
    pub relative_gap: f64,
    /// Per-solve time limit in seconds.
    pub time_limit: Option<f64>,
    /// Division rule for per-player payoffs.
    pub payoff_rule: PayoffRule,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            relative_gap: 0.0,
            time_limit: None,
            payoff_rule: PayoffRule::Shapley,
        }
    }
}

/// The filled coalition table: the characteristic-function game plus the
/// per-coalition analysis records, keyed by id in ascending order.
#[derive(Debug)]
pub struct Evaluation {
    pub game: Game,
    pub infos: BTreeMap<CoalitionId, CoalitionInfo>,
}

impl Evaluation {
    pub fn num_players(&self) -> usize {
        self.game.num_players()
    }

    /// Record for a non-empty coalition. The evaluator writes every id in
    /// `[1, 2^N − 1]`, so a miss is a programming error.
    pub fn info(&self, id: CoalitionId) -> &CoalitionInfo {
        self.infos
            .get(&id)
            .expect("coalition table covers every non-empty subset")
    }
}

/// Evaluate every non-empty coalition of the scenario's players.
///
/// Subsets are visited in ascending id order, so when `S` is analyzed the
/// values of all `T ⊆ S` are already in the table; the payoff rules and the
/// core tests read the sub-game straight from it. Infeasible coalitions get
/// the [`INFEASIBLE_VALUE`] sentinel and empty-core flags.
pub fn evaluate_game(scenario: &Scenario, config: &EvaluatorConfig) -> CftResult<Evaluation> {
    scenario.validate()?;
    let n = scenario.num_cips;

    let mut game = Game::new(n);
    let mut infos = BTreeMap::new();

    for id in SubsetIter::new(n, false) {
        let problem = PlacementProblemBuilder::new(scenario)
            .coalition(id)
            .relative_gap(config.relative_gap)
            .time_limit(config.time_limit.unwrap_or(-1.0))
            .build()?;
        let solution = solve_placement(&problem)?;

        let members: Vec<CipId> = id.players().collect();
        let profit: f64 = members.iter().map(|&p| scenario.revenue_of(p)).sum();
        let value = if solution.solved {
            profit - solution.cost
        } else {
            INFEASIBLE_VALUE
        };
        game.set_value(id, value);

        if !solution.solved {
            warn!("coalition {id} has no feasible placement; marked non-viable");
        } else if !solution.optimal {
            warn!(
                "coalition {id} accepted a feasible-suboptimal placement \
                 (relative gap {})",
                config.relative_gap
            );
        } else {
            debug!("coalition {id}: {}", solution.summary());
        }

        let payoffs = payoff_vector(&game, id, config.payoff_rule);
        let (core_non_empty, payoff_in_core) = if solution.solved {
            (
                core_is_non_empty(&game, id)?,
                payoffs_in_core(&game, id, &payoffs),
            )
        } else {
            (false, false)
        };

        let allocation = solution.solved.then(|| Allocation {
            powered_on: solution.powered_on.clone(),
            placement: solution.placement.clone(),
            utilization: solution.utilization.clone(),
        });

        infos.insert(
            id,
            CoalitionInfo {
                id,
                members,
                solved: solution.solved,
                optimal: solution.optimal,
                value,
                cost: solution.cost,
                kwh: solution.kwh,
                allocation,
                payoffs,
                core_non_empty,
                payoff_in_core,
            },
        );
    }

    Ok(Evaluation { game, infos })
}
