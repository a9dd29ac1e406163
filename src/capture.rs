//! Ball throws: the capture chance model and the inventory it draws from.

use crate::combat::Combatant;
use crate::errors::CaptureError;
use crate::probability::catch_probability;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_CAPTURE_CHANCE: f64 = 0.02;
const MAX_CAPTURE_CHANCE: f64 = 0.95;
const STATUS_BONUS: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallKind {
    PokeBall,
    GreatBall,
    UltraBall,
}

impl BallKind {
    pub const ALL: [BallKind; 3] = [BallKind::PokeBall, BallKind::GreatBall, BallKind::UltraBall];

    pub fn multiplier(self) -> f64 {
        match self {
            BallKind::PokeBall => 0.7,
            BallKind::GreatBall => 1.0,
            BallKind::UltraBall => 1.15,
        }
    }

    pub fn supply(self) -> SupplyKind {
        match self {
            BallKind::PokeBall => SupplyKind::PokeBall,
            BallKind::GreatBall => SupplyKind::GreatBall,
            BallKind::UltraBall => SupplyKind::UltraBall,
        }
    }
}

impl fmt::Display for BallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            BallKind::PokeBall => "Pokeball",
            BallKind::GreatBall => "Great Ball",
            BallKind::UltraBall => "Ultra Ball",
        };
        write!(f, "{}", display_name)
    }
}

/// Every countable item the player carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyKind {
    PokeBall,
    GreatBall,
    UltraBall,
    Potion,
}

impl fmt::Display for SupplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            SupplyKind::PokeBall => "Pokeballs",
            SupplyKind::GreatBall => "Great Balls",
            SupplyKind::UltraBall => "Ultra Balls",
            SupplyKind::Potion => "Potions",
        };
        write!(f, "{}", display_name)
    }
}

/// Status of the wild creature. It only changes capture odds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCondition {
    #[default]
    None,
    Sleep,
    Paralysis,
}

impl StatusCondition {
    pub fn multiplier(self) -> f64 {
        match self {
            StatusCondition::None => 1.0,
            StatusCondition::Sleep | StatusCondition::Paralysis => STATUS_BONUS,
        }
    }
}

impl fmt::Display for StatusCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            StatusCondition::None => "none",
            StatusCondition::Sleep => "asleep",
            StatusCondition::Paralysis => "paralyzed",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub poke_balls: u32,
    pub great_balls: u32,
    pub ultra_balls: u32,
    pub potions: u32,
}

impl Inventory {
    pub fn count(&self, kind: SupplyKind) -> u32 {
        match kind {
            SupplyKind::PokeBall => self.poke_balls,
            SupplyKind::GreatBall => self.great_balls,
            SupplyKind::UltraBall => self.ultra_balls,
            SupplyKind::Potion => self.potions,
        }
    }

    fn slot_mut(&mut self, kind: SupplyKind) -> &mut u32 {
        match kind {
            SupplyKind::PokeBall => &mut self.poke_balls,
            SupplyKind::GreatBall => &mut self.great_balls,
            SupplyKind::UltraBall => &mut self.ultra_balls,
            SupplyKind::Potion => &mut self.potions,
        }
    }

    /// Use one item. Fails without touching the count when none are left.
    pub fn take(&mut self, kind: SupplyKind) -> Result<(), CaptureError> {
        let slot = self.slot_mut(kind);
        if *slot == 0 {
            return Err(CaptureError::OutOfStock(kind));
        }
        *slot -= 1;
        Ok(())
    }

    pub fn add(&mut self, kind: SupplyKind, amount: u32) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(amount);
    }
}

/// Capture chance before the roll:
/// `base(exp) * ball * status * (0.3 + 0.7 * (1 - hp_ratio))`, clamped to [0.02, 0.95].
pub fn capture_chance(
    base_experience: u32,
    ball: BallKind,
    status: StatusCondition,
    health_ratio: f64,
) -> f64 {
    let health_factor = 0.3 + 0.7 * (1.0 - health_ratio.clamp(0.0, 1.0));
    let chance =
        catch_probability(base_experience) * ball.multiplier() * status.multiplier() * health_factor;
    chance.clamp(MIN_CAPTURE_CHANCE, MAX_CAPTURE_CHANCE)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureAttempt {
    pub ball: BallKind,
    pub chance: f64,
    pub roll: f64,
    pub caught: bool,
}

/// Throw one ball at `target`. The ball is spent before the roll; if none are
/// left nothing is spent and no roll is made.
pub fn attempt_capture(
    inventory: &mut Inventory,
    ball: BallKind,
    target: &Combatant,
    status: StatusCondition,
    rng: &mut dyn RandomSource,
) -> Result<CaptureAttempt, CaptureError> {
    inventory.take(ball.supply())?;

    let chance = capture_chance(
        target.creature.base_experience,
        ball,
        status,
        target.health_ratio(),
    );
    let roll = rng.roll_unit("capture roll");
    let caught = roll < chance;
    log::debug!(
        "{} thrown at {}: chance {:.3}, roll {:.3}, caught {}",
        ball,
        target.creature.name,
        chance,
        roll,
        caught
    );
    Ok(CaptureAttempt {
        ball,
        chance,
        roll,
        caught,
    })
}
