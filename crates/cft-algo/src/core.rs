//! Core non-emptiness and membership tests for coalition sub-games.
//!
//! The core of the sub-game restricted to `S` is the set of payoff vectors
//! `{x ≥ 0, Σ_{p∈S} x_p = v(S), ∀ T ⊂ S: Σ_{p∈T} x_p ≥ v(T)}`.
//! Non-emptiness is an LP feasibility question; membership of a concrete
//! payoff vector is a direct check with the centralized float predicates.

use cft_core::{approx, CftError, CftResult, CoalitionId, Game};
use good_lp::solvers::clarabel::clarabel;
use good_lp::{constraint, variable, variables, Expression, ResolutionError, SolverModel, Variable};

/// True when the core of the sub-game restricted to `s` is non-empty.
pub fn core_is_non_empty(game: &Game, s: CoalitionId) -> CftResult<bool> {
    let members: Vec<_> = s.players().collect();
    let mut vars = variables!();
    let x: Vec<Variable> = members
        .iter()
        .map(|_| vars.add(variable().min(0.0)))
        .collect();

    let mut budget = Expression::from(0.0);
    for &xi in &x {
        budget += xi;
    }
    let mut model = vars.minimise(budget.clone()).using(clarabel);
    model = model.with(constraint!(budget == game.value(s)));

    let mask = s.value();
    let mut sub = (mask - 1) & mask;
    while sub != 0 {
        let t = CoalitionId::new(sub);
        let mut share = Expression::from(0.0);
        for (i, &p) in members.iter().enumerate() {
            if t.contains(p) {
                share += x[i];
            }
        }
        model = model.with(constraint!(share >= game.value(t)));
        sub = (sub - 1) & mask;
    }

    match model.solve() {
        Ok(_) => Ok(true),
        Err(ResolutionError::Infeasible) | Err(ResolutionError::Unbounded) => Ok(false),
        Err(err) => Err(CftError::Solver(err.to_string())),
    }
}

/// True when the given payoff vector (aligned with `s`'s members in
/// ascending player order) lies in the core of the sub-game.
pub fn payoffs_in_core(game: &Game, s: CoalitionId, payoffs: &[f64]) -> bool {
    let members: Vec<_> = s.players().collect();
    debug_assert_eq!(members.len(), payoffs.len());

    if payoffs.iter().any(|&x| approx::definitely_less(x, 0.0)) {
        return false;
    }
    let total: f64 = payoffs.iter().sum();
    if !approx::essentially_equal(total, game.value(s)) {
        return false;
    }

    let mask = s.value();
    let mut sub = (mask - 1) & mask;
    while sub != 0 {
        let t = CoalitionId::new(sub);
        let share: f64 = members
            .iter()
            .zip(payoffs)
            .filter(|(p, _)| t.contains(**p))
            .map(|(_, &x)| x)
            .sum();
        if approx::definitely_less(share, game.value(t)) {
            return false;
        }
        sub = (sub - 1) & mask;
    }
    true
}
