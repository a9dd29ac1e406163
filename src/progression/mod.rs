pub mod evolution;
pub mod growth;
pub mod rewards;

use std::time::SystemTime;

pub use evolution::{find_next_evolution, Evolution, EvolutionTarget};
pub use growth::{level_for_experience, level_from_curve, ExperienceReport, ProgressionEngine};
pub use rewards::{battle_experience, capture_experience, grant_random_supplies, SupplyGrant};

/// Source of "now" for experience timestamps and passive regeneration.
pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}
