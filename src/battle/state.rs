use crate::capture::{BallKind, StatusCondition, SupplyKind};
use crate::combat::Side;
use crate::progression::SupplyGrant;
use serde::{Deserialize, Serialize};

/// Where the round loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    AwaitingAction,
    Fighting,
    Catching,
    Fleeing,
    ItemUse,
    Finished(BattleOutcome),
}

impl BattlePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, BattlePhase::Finished(_))
    }
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    WildFainted,
    PlayerFainted,
    Fled,
    Caught,
    Cancelled,
}

/// Hit point readout for one side at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpStatus {
    pub name: String,
    pub current: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    // Flow
    BattleStarted {
        wild: String,
    },
    RoundStarted {
        round: u32,
        player: Option<HpStatus>,
        wild: HpStatus,
    },
    PlayerSelected {
        name: String,
        level: u8,
    },
    RestExperience {
        name: String,
        gained: u32,
    },

    // Combat
    MoveMissed {
        side: Side,
        attacker: String,
        move_name: String,
    },
    MoveHit {
        side: Side,
        attacker: String,
        move_name: String,
        damage: u32,
        remaining_hp: u32,
    },
    Fainted {
        side: Side,
        name: String,
    },

    // Capture and items
    CaptureAttempted {
        ball: BallKind,
        chance_percent: u32,
    },
    EscapedBall {
        name: String,
    },
    Caught {
        name: String,
    },
    NoSupplies {
        kind: SupplyKind,
    },
    StatusApplied {
        name: String,
        status: StatusCondition,
    },

    // Progression
    ExperienceGained {
        name: String,
        amount: u32,
    },
    LevelUp {
        name: String,
        level: u8,
    },
    Evolved {
        from: String,
        into: String,
    },
    SuppliesGranted(SupplyGrant),

    // Endings
    Fled,
    Cancelled,
}

impl BattleEvent {
    /// Player-facing text for the event, or `None` for silent events.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::BattleStarted { wild } => Some(format!("A wild {} appeared!", wild)),
            BattleEvent::RoundStarted {
                round,
                player,
                wild,
            } => {
                let player_line = match player {
                    Some(hp) => format!("Your {} HP: {}/{}", hp.name, hp.current, hp.max),
                    None => "Your Pokemon: (not selected)".to_string(),
                };
                Some(format!(
                    "\nRound {}\n{}\nWild {} HP: {}/{}",
                    round, player_line, wild.name, wild.current, wild.max
                ))
            }
            BattleEvent::PlayerSelected { name, level } => {
                Some(format!("Go, {} (Lv {})!", name, level))
            }
            BattleEvent::RestExperience { name, gained } => {
                Some(format!("{} gained {} XP while resting.", name, gained))
            }

            BattleEvent::MoveMissed {
                side,
                attacker,
                move_name,
            } => Some(format!(
                "{}{} used {} but missed!",
                Self::side_prefix(*side),
                attacker,
                move_name
            )),
            BattleEvent::MoveHit {
                side,
                attacker,
                move_name,
                damage,
                ..
            } => Some(format!(
                "{}{} used {} for {} damage!",
                Self::side_prefix(*side),
                attacker,
                move_name,
                damage
            )),
            BattleEvent::Fainted { side, name } => {
                Some(format!("{}{} fainted!", Self::side_prefix(*side), name))
            }

            BattleEvent::CaptureAttempted { .. } => None, // Silent, the result follows
            BattleEvent::EscapedBall { name } => Some(format!("{} escaped the ball!", name)),
            BattleEvent::Caught { name } => Some(format!("{} was caught!", name)),
            BattleEvent::NoSupplies { kind } => Some(format!("No {} left", kind)),
            BattleEvent::StatusApplied { name, status } => {
                Some(format!("Wild {} is now {}.", name, status))
            }

            BattleEvent::ExperienceGained { name, amount } => {
                Some(format!("{} gained {} XP.", name, amount))
            }
            BattleEvent::LevelUp { name, level } => {
                Some(format!("{} grew to level {}!", name, level))
            }
            BattleEvent::Evolved { from, into } => Some(format!("{} evolved into {}!", from, into)),
            BattleEvent::SuppliesGranted(grant) => Some(grant.to_string()),

            BattleEvent::Fled => Some("You ran away.".to_string()),
            BattleEvent::Cancelled => Some("Battle cancelled".to_string()),
        }
    }

    fn side_prefix(side: Side) -> &'static str {
        match side {
            Side::Player => "",
            Side::Wild => "Wild ",
        }
    }
}

/// Ordered record of everything that happened in one battle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Formatted text of every non-silent event, in order.
    pub fn formatted(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }
}

impl std::fmt::Display for EventBus {
    /// Debug form of all events, one per line.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}
