//! Characteristic-function game and per-coalition analysis records.

use serde::{Deserialize, Serialize};

use crate::coalition::{CipId, CoalitionId};

/// Sentinel value for coalitions whose placement problem has no feasible
/// solution. The smallest positive normal negated: finite, but below the
/// value of any coalition worth forming.
pub const INFEASIBLE_VALUE: f64 = -f64::MIN_POSITIVE;

/// A transferable-utility cooperative game stored as a flat array of
/// length `2^n` indexed by coalition-id bitmask.
///
/// The empty-coalition slot is fixed at 0. The evaluator fills entries in
/// ascending id order, so when coalition `S` is being analyzed every
/// `T ⊆ S` is already present (a submask never exceeds its mask).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    num_players: usize,
    values: Vec<f64>,
}

impl Game {
    pub fn new(num_players: usize) -> Self {
        debug_assert!(num_players < 64);
        Game {
            num_players,
            values: vec![0.0; 1usize << num_players],
        }
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    pub fn grand(&self) -> CoalitionId {
        CoalitionId::grand(self.num_players)
    }

    /// Characteristic value v(S).
    pub fn value(&self, s: CoalitionId) -> f64 {
        self.values[s.value() as usize]
    }

    pub fn set_value(&mut self, s: CoalitionId, v: f64) {
        debug_assert!(!s.is_empty(), "the empty coalition keeps value 0");
        self.values[s.value() as usize] = v;
    }
}

/// The placement decision for one coalition: which PMs run and where each
/// pooled VM lands. Indices refer to the coalition's pooled PM/VM arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    /// Per-PM on/off decision.
    pub powered_on: Vec<bool>,
    /// Per-VM hosting PM index.
    pub placement: Vec<usize>,
    /// Per-PM CPU utilization in [0,1].
    pub utilization: Vec<f64>,
}

/// Everything the analysis records about one coalition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalitionInfo {
    pub id: CoalitionId,
    /// Member players in ascending index order.
    pub members: Vec<CipId>,
    /// The placement back-end produced a feasible allocation.
    pub solved: bool,
    /// The allocation is proven optimal (no gap, no time-out).
    pub optimal: bool,
    /// Characteristic value v(S); [`INFEASIBLE_VALUE`] when unsolved.
    pub value: f64,
    /// Monetary cost of the optimal allocation (electricity + transitions +
    /// migrations), in $.
    pub cost: f64,
    /// Energy consumed by the coalition's powered-on PMs over the one-hour
    /// window, in kWh.
    pub kwh: f64,
    /// The optimal allocation, when one exists.
    pub allocation: Option<Allocation>,
    /// Per-member payoffs under the configured division rule, aligned with
    /// `members`.
    pub payoffs: Vec<f64>,
    /// The core of the sub-game restricted to this coalition is non-empty.
    pub core_non_empty: bool,
    /// The payoff vector above lies in that core.
    pub payoff_in_core: bool,
}

impl CoalitionInfo {
    /// Payoff of player `p`, or `None` when `p` is not a member.
    pub fn payoff_of(&self, p: CipId) -> Option<f64> {
        self.members
            .iter()
            .position(|&m| m == p)
            .map(|i| self.payoffs[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_table_indexing() {
        let mut game = Game::new(3);
        assert_eq!(game.grand().value(), 7);
        game.set_value(CoalitionId::new(0b101), 4.5);
        assert_eq!(game.value(CoalitionId::new(0b101)), 4.5);
        assert_eq!(game.value(CoalitionId::empty()), 0.0);
        assert_eq!(game.value(CoalitionId::new(0b010)), 0.0);
    }

    #[test]
    fn infeasible_sentinel_is_negative_and_tiny() {
        assert!(INFEASIBLE_VALUE < 0.0);
        assert!(INFEASIBLE_VALUE > -1e-300);
    }

    #[test]
    fn payoff_lookup_by_member() {
        let info = CoalitionInfo {
            id: CoalitionId::new(0b101),
            members: vec![CipId(0), CipId(2)],
            solved: true,
            optimal: true,
            value: 3.0,
            cost: 1.0,
            kwh: 0.2,
            allocation: None,
            payoffs: vec![1.5, 1.5],
            core_non_empty: true,
            payoff_in_core: true,
        };
        assert_eq!(info.payoff_of(CipId(2)), Some(1.5));
        assert_eq!(info.payoff_of(CipId(1)), None);

        // serde round-trip, as the CLI serializes these records
        let json = serde_json::to_string(&info).unwrap();
        let back: CoalitionInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.members, info.members);
        assert_eq!(back.payoffs, info.payoffs);
    }
}
