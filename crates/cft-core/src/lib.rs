//! # cft-core: Cloud Federation Modeling Core
//!
//! Fundamental data structures for the federation-formation analysis:
//! the scenario model (providers, PMs, VMs, prices), typed player and
//! coalition identifiers, the characteristic-function game, and the
//! per-coalition analysis records.
//!
//! ## Data model
//!
//! - [`Scenario`]: immutable description of providers, resources, prices
//!   and workload for one run.
//! - [`CipId`] / [`CoalitionId`]: typed identifiers; a coalition id is the
//!   bitmask over its member players, so ids and player sets are in
//!   bijection by construction.
//! - [`Game`]: flat `2^n` characteristic-function table indexed by
//!   coalition id.
//! - [`CoalitionInfo`]: allocation, costs, value, payoffs and core flags
//!   for one coalition.
//!
//! Algorithms (placement MILP, payoff rules, partition criteria) live in
//! `cft-algo`; file formats live in `cft-io`.

pub mod approx;
pub mod coalition;
pub mod error;
pub mod game;
pub mod scenario;

pub use coalition::{CipId, CoalitionId};
pub use error::{CftError, CftResult};
pub use game::{Allocation, CoalitionInfo, Game, INFEASIBLE_VALUE};
pub use scenario::{PmSpec, Scenario};
