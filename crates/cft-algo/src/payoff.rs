//! Fair-division payoff rules over the characteristic-function game.
//!
//! Each rule distributes a coalition's value among its members from the
//! marginal contributions recorded in the sub-game. Payoff vectors are
//! always emitted in ascending player-index order, which fixes tie-breaking.

use cft_core::{approx, CoalitionId, Game};

/// Which division rule distributes coalition value among members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoffRule {
    Shapley,
    Banzhaf,
    NormalizedBanzhaf,
}

impl PayoffRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoffRule::Shapley => "shapley",
            PayoffRule::Banzhaf => "banzhaf",
            PayoffRule::NormalizedBanzhaf => "norm-banzhaf",
        }
    }
}

/// Payoffs of `s`'s members under `rule`, ascending player index.
pub fn payoff_vector(game: &Game, s: CoalitionId, rule: PayoffRule) -> Vec<f64> {
    match rule {
        PayoffRule::Shapley => shapley(game, s),
        PayoffRule::Banzhaf => banzhaf(game, s),
        PayoffRule::NormalizedBanzhaf => normalized_banzhaf(game, s),
    }
}

fn factorials(n: usize) -> Vec<f64> {
    let mut fact = vec![1.0; n + 1];
    for i in 1..=n {
        fact[i] = fact[i - 1] * i as f64;
    }
    fact
}

/// Shapley value of the sub-game restricted to `s`:
/// `φ_p = Σ_{T ⊆ S\{p}} |T|!·(|S|−|T|−1)!/|S|! · (v(T∪{p}) − v(T))`.
pub fn shapley(game: &Game, s: CoalitionId) -> Vec<f64> {
    let size = s.len();
    let fact = factorials(size);
    s.players()
        .map(|p| {
            let rest = s.difference(CoalitionId::singleton(p));
            let mut total = 0.0;
            let mut sub = rest.value();
            loop {
                let t = CoalitionId::new(sub);
                let t_size = t.len();
                let weight = fact[t_size] * fact[size - t_size - 1] / fact[size];
                total += weight * (game.value(t.insert(p)) - game.value(t));
                if sub == 0 {
                    break;
                }
                sub = (sub - 1) & rest.value();
            }
            total
        })
        .collect()
}

/// Banzhaf value of the sub-game restricted to `s`:
/// `β_p = 2^(1−|S|) · Σ_{T ⊆ S\{p}} (v(T∪{p}) − v(T))`.
pub fn banzhaf(game: &Game, s: CoalitionId) -> Vec<f64> {
    let scale = 1.0 / (1u64 << (s.len() - 1)) as f64;
    s.players()
        .map(|p| {
            let rest = s.difference(CoalitionId::singleton(p));
            let mut total = 0.0;
            let mut sub = rest.value();
            loop {
                let t = CoalitionId::new(sub);
                total += game.value(t.insert(p)) - game.value(t);
                if sub == 0 {
                    break;
                }
                sub = (sub - 1) & rest.value();
            }
            total * scale
        })
        .collect()
}

/// Banzhaf payoffs rescaled so the members' payoffs sum to v(S). When the
/// raw Banzhaf total is essentially zero the payoffs are kept raw instead
/// of dividing by it.
pub fn normalized_banzhaf(game: &Game, s: CoalitionId) -> Vec<f64> {
    let raw = banzhaf(game, s);
    let total: f64 = raw.iter().sum();
    if approx::essentially_equal(total, 0.0) {
        return raw;
    }
    let scale = game.value(s) / total;
    raw.into_iter().map(|b| b * scale).collect()
}
