use schema::{ResourceRef, StatName, StatValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

pub const MAX_LEVEL: u8 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl BaseStats {
    /// Collect stats from service rows. Unknown stat names are skipped and
    /// missing ones stay at zero.
    pub fn from_values(values: &[StatValue]) -> Self {
        let mut stats = BaseStats::default();
        for value in values {
            match StatName::from_str(&value.stat) {
                Ok(name) => stats.set(name, value.base_stat),
                Err(_) => log::debug!("ignoring unknown stat '{}'", value.stat),
            }
        }
        stats
    }

    pub fn get(&self, stat: StatName) -> u32 {
        match stat {
            StatName::Hp => self.hp,
            StatName::Attack => self.attack,
            StatName::Defense => self.defense,
            StatName::SpecialAttack => self.special_attack,
            StatName::SpecialDefense => self.special_defense,
            StatName::Speed => self.speed,
        }
    }

    pub fn set(&mut self, stat: StatName, value: u32) {
        match stat {
            StatName::Hp => self.hp = value,
            StatName::Attack => self.attack = value,
            StatName::Defense => self.defense = value,
            StatName::SpecialAttack => self.special_attack = value,
            StatName::SpecialDefense => self.special_defense = value,
            StatName::Speed => self.speed = value,
        }
    }
}

/// A move a creature knows, with the battle-relevant numbers resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEntry {
    pub name: String,
    /// 0 means "unset"; damage falls back to a default power.
    pub power: u32,
    /// 0 means the move never misses.
    pub accuracy: u8,
    pub priority: i8,
    pub move_type: String,
}

impl MoveEntry {
    pub fn tackle() -> Self {
        Self {
            name: "tackle".to_string(),
            power: 40,
            accuracy: 100,
            priority: 0,
            move_type: "normal".to_string(),
        }
    }
}

impl fmt::Display for MoveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (power {}, acc {}, prio {}, type {})",
            self.name, self.power, self.accuracy, self.priority, self.move_type
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub is_hidden: bool,
    pub slot: u8,
}

/// The most recent experience gain, used to pace passive regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceGain {
    pub amount: u32,
    pub at: SystemTime,
}

/// A persistent creature record: what lives in the roster between battles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: u32,
    pub name: String,
    pub species: String,
    pub base_experience: u32,
    pub height: u32,
    pub weight: u32,
    pub stats: BaseStats,
    pub types: Vec<String>,
    pub abilities: Vec<Ability>,
    pub held_items: Vec<String>,
    pub moves: Vec<MoveEntry>,

    // Progression fields survive evolution.
    pub level: u8,
    pub experience: u32,
    pub growth_curve: ResourceRef,
    pub evolution_chain: ResourceRef,
    pub last_gain: Option<ExperienceGain>,
    pub date_caught: Option<SystemTime>,
}

impl Creature {
    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    /// Carry the progression fields of `previous` over onto a freshly built
    /// record of a different species.
    pub fn inherit_progression(&mut self, previous: &Creature) {
        self.level = previous.level;
        self.experience = previous.experience;
        self.growth_curve = previous.growth_curve.clone();
        self.evolution_chain = previous.evolution_chain.clone();
        self.last_gain = previous.last_gain;
        self.date_caught = previous.date_caught;
    }
}

impl fmt::Display for Creature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Lv {})", self.name, self.level)?;
        if f.alternate() {
            write!(
                f,
                "\n  HP:{} ATK:{} DEF:{} SP.ATK:{} SP.DEF:{} SPD:{}\n  EXP: {}",
                self.stats.hp,
                self.stats.attack,
                self.stats.defense,
                self.stats.special_attack,
                self.stats.special_defense,
                self.stats.speed,
                self.experience
            )?;
            write!(f, "\n  Types: {}", self.types.join(", "))?;
            let moves: Vec<&str> = self.moves.iter().map(|entry| entry.name.as_str()).collect();
            write!(f, "\n  Moves: {}", moves.join(", "))?;
        }
        Ok(())
    }
}
