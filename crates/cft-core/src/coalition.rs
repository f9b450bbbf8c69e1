//! Typed identifiers for players and coalitions.
//!
//! A coalition is canonically identified by the bitmask `Σ_{p∈S} 2^p` over
//! its member players, so the id ↔ player-set mapping is a bijection by
//! construction. The singleton `{p}` has id `2^p`; the grand coalition over
//! `n` players has id `2^n − 1`.

use serde::{Deserialize, Serialize};

/// Unique identifier for a Cloud Infrastructure Provider (player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CipId(pub usize);

impl CipId {
    pub fn new(id: usize) -> Self {
        CipId(id)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for CipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CIP {}", self.0)
    }
}

/// Bitmask identifier for a coalition of players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoalitionId(pub u64);

impl CoalitionId {
    pub fn new(mask: u64) -> Self {
        CoalitionId(mask)
    }

    /// The empty coalition (id 0). Not a valid key in the coalition table,
    /// but useful as an accumulator.
    pub fn empty() -> Self {
        CoalitionId(0)
    }

    /// The coalition `{p}`.
    pub fn singleton(p: CipId) -> Self {
        CoalitionId(1u64 << p.value())
    }

    /// The coalition of all `n` players.
    pub fn grand(n: usize) -> Self {
        debug_assert!(n < 64);
        CoalitionId((1u64 << n) - 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of member players.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(&self, p: CipId) -> bool {
        self.0 & (1u64 << p.value()) != 0
    }

    pub fn insert(&self, p: CipId) -> CoalitionId {
        CoalitionId(self.0 | (1u64 << p.value()))
    }

    pub fn union(&self, other: CoalitionId) -> CoalitionId {
        CoalitionId(self.0 | other.0)
    }

    /// `self \ other`.
    pub fn difference(&self, other: CoalitionId) -> CoalitionId {
        CoalitionId(self.0 & !other.0)
    }

    /// True when every member of `self` is also in `other`.
    pub fn is_subset_of(&self, other: CoalitionId) -> bool {
        self.0 & !other.0 == 0
    }

    /// Member players in ascending index order.
    pub fn players(&self) -> impl Iterator<Item = CipId> + '_ {
        let mask = self.0;
        (0..64).filter_map(move |p| {
            if mask & (1u64 << p) != 0 {
                Some(CipId(p))
            } else {
                None
            }
        })
    }
}

impl std::fmt::Display for CoalitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, p) in self.players().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", p.value())?;
        }
        write!(f, "}}")
    }
}
