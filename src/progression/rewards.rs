use crate::capture::{Inventory, SupplyKind};
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;

// Battle XP is a discounted share of the loser's base experience.
const BATTLE_EXP_MULTIPLIER: f64 = 0.9;

// Supply grants
const BALLS_PER_GRANT: u32 = 10;
const POTIONS_PER_GRANT: u32 = 3;

/// Experience for defeating a creature: `round(0.9 * base)`, at least 1.
/// A creature with no base experience is worth nothing.
pub fn battle_experience(base_experience: u32) -> u32 {
    if base_experience == 0 {
        return 0;
    }
    let gained = (base_experience as f64 * BATTLE_EXP_MULTIPLIER).round() as u32;
    gained.max(1)
}

/// Experience for catching a creature: its full base experience.
pub fn capture_experience(base_experience: u32) -> u32 {
    base_experience
}

/// Items added to the inventory by one grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyGrant {
    pub reason: String,
    pub poke_balls: u32,
    pub great_balls: u32,
    pub ultra_balls: u32,
    pub potions: u32,
}

impl fmt::Display for SupplyGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reward: +{} Pokeballs, +{} Great Balls, +{} Ultra Balls, +{} Potions.",
            self.reason, self.poke_balls, self.great_balls, self.ultra_balls, self.potions
        )
    }
}

/// Hand out a random bundle: ten balls with at least one of each kind, plus
/// three potions.
pub fn grant_random_supplies(
    inventory: &mut Inventory,
    rng: &mut dyn RandomSource,
    reason: &str,
) -> SupplyGrant {
    const KINDS: [SupplyKind; 3] = [SupplyKind::PokeBall, SupplyKind::GreatBall, SupplyKind::UltraBall];

    let mut balls = [1u32; 3];
    for _ in 0..(BALLS_PER_GRANT - KINDS.len() as u32) {
        balls[rng.pick_index(KINDS.len(), "supply ball kind")] += 1;
    }

    for (kind, amount) in KINDS.iter().zip(balls) {
        inventory.add(*kind, amount);
    }
    inventory.add(SupplyKind::Potion, POTIONS_PER_GRANT);

    let label = match reason.trim() {
        "" => "reward",
        trimmed => trimmed,
    };
    let grant = SupplyGrant {
        reason: label.to_string(),
        poke_balls: balls[0],
        great_balls: balls[1],
        ultra_balls: balls[2],
        potions: POTIONS_PER_GRANT,
    };
    log::info!("{}", grant);
    grant
}
