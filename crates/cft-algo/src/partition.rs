//! Partition selection: enumerate all set partitions of the players and
//! retain those satisfying the chosen stability or optimality criterion.

use cft_core::{approx, CoalitionId};

use crate::combin::{PartitionIter, SubsetIter};
use crate::evaluator::Evaluation;

/// Which criterion a partition must satisfy to be retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationCriterion {
    /// No block gains by splitting, no family of blocks gains by merging
    /// (D_hp stability).
    MergeSplit,
    /// No player gains by unilaterally moving to another block of the
    /// partition or to the empty coalition.
    Nash,
    /// Monotone running-best filter: a partition is kept when it strictly
    /// dominates the per-player maximum over the partitions seen so far.
    /// This is deliberately weaker than the textbook Pareto frontier.
    Pareto,
    /// Partitions whose total value matches the best Σ v(P_i) seen.
    SocialOptimum,
}

impl FormationCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormationCriterion::MergeSplit => "merge-split",
            FormationCriterion::Nash => "nash",
            FormationCriterion::Pareto => "pareto",
            FormationCriterion::SocialOptimum => "social",
        }
    }
}

/// A retained partition with its coalition-wise inherited payoffs.
#[derive(Debug, Clone)]
pub struct PartitionOutcome {
    pub blocks: Vec<CoalitionId>,
    /// Per-player payoffs, indexed by player, inherited from each player's
    /// block.
    pub payoffs: Vec<f64>,
    /// Σ v(P_i) over the blocks.
    pub value: f64,
    /// Σ kWh over the blocks' optimal allocations.
    pub kwh: f64,
}

/// All partitions of the player set satisfying `criterion`, in the
/// enumeration order of [`PartitionIter`]. May be empty.
pub fn select_partitions(
    eval: &Evaluation,
    criterion: FormationCriterion,
) -> Vec<PartitionOutcome> {
    match criterion {
        FormationCriterion::MergeSplit => retain(eval, |e, blocks| is_merge_split_stable(e, blocks)),
        FormationCriterion::Nash => retain(eval, |e, blocks| is_nash_stable(e, blocks)),
        FormationCriterion::Pareto => pareto_filter(eval),
        FormationCriterion::SocialOptimum => social_optima(eval),
    }
}

/// Materialize the payoffs, value and energy of one partition.
pub fn outcome(eval: &Evaluation, blocks: Vec<CoalitionId>) -> PartitionOutcome {
    let mut payoffs = vec![0.0; eval.num_players()];
    let mut value = 0.0;
    let mut kwh = 0.0;
    for &b in &blocks {
        let info = eval.info(b);
        for (i, &p) in info.members.iter().enumerate() {
            payoffs[p.value()] = info.payoffs[i];
        }
        value += info.value;
        kwh += info.kwh;
    }
    PartitionOutcome {
        blocks,
        payoffs,
        value,
        kwh,
    }
}

fn retain(
    eval: &Evaluation,
    keep: impl Fn(&Evaluation, &[CoalitionId]) -> bool,
) -> Vec<PartitionOutcome> {
    PartitionIter::new(eval.num_players())
        .filter(|blocks| keep(eval, blocks))
        .map(|blocks| outcome(eval, blocks))
        .collect()
}

/// Map a coalition over local member indices back to the global players.
fn remap(local: CoalitionId, members: &[cft_core::CipId]) -> CoalitionId {
    let mut global = CoalitionId::empty();
    for (i, &p) in members.iter().enumerate() {
        if local.value() & (1u64 << i) != 0 {
            global = global.insert(p);
        }
    }
    global
}

fn is_merge_split_stable(eval: &Evaluation, blocks: &[CoalitionId]) -> bool {
    let game = &eval.game;

    // No block wants to split: v(P_i) ≥ Σ_j v(C_j) for every partition
    // {C_j} of P_i.
    for &block in blocks {
        let members: Vec<_> = block.players().collect();
        for sub_blocks in PartitionIter::new(members.len()) {
            if sub_blocks.len() == 1 {
                continue; // the block itself
            }
            let split_total: f64 = sub_blocks
                .iter()
                .map(|&local| game.value(remap(local, &members)))
                .sum();
            if approx::definitely_greater(split_total, game.value(block)) {
                return false;
            }
        }
    }

    // No family of blocks wants to merge: Σ v(P_i) ≥ v(∪ P_i) for every
    // family of two or more blocks.
    for family in SubsetIter::new(blocks.len(), false) {
        if family.len() < 2 {
            continue;
        }
        let mut union = CoalitionId::empty();
        let mut family_total = 0.0;
        for (i, &block) in blocks.iter().enumerate() {
            if family.value() & (1u64 << i) != 0 {
                union = union.union(block);
                family_total += game.value(block);
            }
        }
        if approx::definitely_greater(game.value(union), family_total) {
            return false;
        }
    }

    true
}

fn is_nash_stable(eval: &Evaluation, blocks: &[CoalitionId]) -> bool {
    for (bi, &block) in blocks.iter().enumerate() {
        let info = eval.info(block);
        for (mi, &p) in info.members.iter().enumerate() {
            let staying = info.payoffs[mi];

            // Moving into another block of the partition.
            for (bj, &other) in blocks.iter().enumerate() {
                if bj == bi {
                    continue;
                }
                let joined = eval.info(other.insert(p));
                let moving = joined.payoff_of(p).unwrap_or(f64::MIN);
                if approx::definitely_greater(moving, staying) {
                    return false;
                }
            }

            // Moving to the empty coalition, i.e. going singleton.
            let alone = eval.info(CoalitionId::singleton(p));
            let moving = alone.payoff_of(p).unwrap_or(f64::MIN);
            if approx::definitely_greater(moving, staying) {
                return false;
            }
        }
    }
    true
}

fn pareto_filter(eval: &Evaluation) -> Vec<PartitionOutcome> {
    let n = eval.num_players();
    let mut running_best = vec![f64::MIN; n];
    let mut accepted = Vec::new();

    for blocks in PartitionIter::new(n) {
        let candidate = outcome(eval, blocks);
        let ge_all = candidate
            .payoffs
            .iter()
            .zip(&running_best)
            .all(|(&x, &b)| approx::approx_ge(x, b));
        let gt_any = candidate
            .payoffs
            .iter()
            .zip(&running_best)
            .any(|(&x, &b)| approx::definitely_greater(x, b));

        for (best, &x) in running_best.iter_mut().zip(&candidate.payoffs) {
            if x > *best {
                *best = x;
            }
        }
        if ge_all && gt_any {
            accepted.push(candidate);
        }
    }
    accepted
}

fn social_optima(eval: &Evaluation) -> Vec<PartitionOutcome> {
    let mut best = f64::MIN;
    let mut kept: Vec<PartitionOutcome> = Vec::new();

    for blocks in PartitionIter::new(eval.num_players()) {
        let candidate = outcome(eval, blocks);
        if approx::definitely_greater(candidate.value, best) {
            best = candidate.value;
            kept.clear();
            kept.push(candidate);
        } else if approx::essentially_equal(candidate.value, best) {
            kept.push(candidate);
        }
    }
    kept
}
