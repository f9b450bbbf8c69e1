//! Cost-optimal VM placement for a coalition of providers.
//!
//! Given the pooled PMs and VMs of a coalition, decide which PMs run and
//! which PM hosts each VM so that electricity, switch-on/off and inter-CIP
//! migration costs are minimized subject to CPU and RAM packing limits.
//! The decision problem is a MILP with binary on/off and assignment
//! variables and a continuous per-PM utilization variable.

mod problem;
mod solution;
mod solver;

pub use problem::{
    PlacementConfig, PlacementProblem, PlacementProblemBuilder, PooledPm, PooledVm,
};
pub use solution::PlacementSolution;
pub use solver::solve_placement;
