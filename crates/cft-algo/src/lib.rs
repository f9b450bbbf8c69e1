//! # cft-algo: Federation Analysis Algorithms
//!
//! The three coupled engines of the federation-formation analysis, plus the
//! combinatorial kernel they share:
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`placement`] | Min-cost MILP placement of a coalition's VMs onto its pooled PMs (HiGHS via `good_lp`). |
//! | [`evaluator`] | Characteristic value v(S), payoffs and core tests for every non-empty coalition. |
//! | [`partition`] | Enumeration and filtering of set partitions by stability/optimality criteria. |
//! | [`combin`]    | Lazy lexicographic subset and set-partition enumerators. |
//!
//! ## Example
//!
//! ```ignore
//! use cft_algo::{evaluate_game, select_partitions, EvaluatorConfig, FormationCriterion};
//!
//! let evaluation = evaluate_game(&scenario, &EvaluatorConfig::default())?;
//! let stable = select_partitions(&evaluation, FormationCriterion::Nash);
//! for partition in &stable {
//!     println!("value {:.4} over {} coalitions", partition.value, partition.blocks.len());
//! }
//! ```

pub mod combin;
pub mod core;
pub mod evaluator;
pub mod export;
pub mod partition;
pub mod payoff;
pub mod placement;

pub use combin::{PartitionIter, SubsetIter};
pub use self::core::{core_is_non_empty, payoffs_in_core};
pub use evaluator::{evaluate_game, Evaluation, EvaluatorConfig};
pub use export::append_coalition_csv;
pub use partition::{select_partitions, FormationCriterion, PartitionOutcome};
pub use payoff::{payoff_vector, PayoffRule};
pub use placement::{
    solve_placement, PlacementConfig, PlacementProblem, PlacementProblemBuilder,
    PlacementSolution, PooledPm, PooledVm,
};
