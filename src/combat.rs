//! One exchange of blows: move selection, turn order, accuracy and damage.

use crate::creature::{Creature, MoveEntry};
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

const DEFAULT_POWER: i64 = 40;
const DEFAULT_LEVEL: i64 = 5;
const DEFAULT_HP: u32 = 50;
const MAX_USABLE_MOVES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Wild,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Wild,
            Side::Wild => Side::Player,
        }
    }
}

/// A creature as it stands in one encounter. Hit points live here, not on
/// the creature, and are thrown away when the encounter ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub creature: Creature,
    current_hp: u32,
    max_hp: u32,
}

impl Combatant {
    /// Enter the encounter at full health.
    pub fn new(creature: Creature) -> Self {
        let max_hp = max_hp(&creature);
        Self {
            creature,
            current_hp: max_hp,
            max_hp,
        }
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Apply damage, clamping at zero. Returns the hit points left.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        self.current_hp = self.current_hp.saturating_sub(damage);
        self.current_hp
    }

    /// Remaining health as a fraction of maximum; maximum is floored to 1.
    pub fn health_ratio(&self) -> f64 {
        self.current_hp as f64 / self.max_hp.max(1) as f64
    }
}

/// Base hit points (50 when unset) plus two per level.
pub fn max_hp(creature: &Creature) -> u32 {
    let hp = if creature.stats.hp == 0 {
        DEFAULT_HP
    } else {
        creature.stats.hp
    };
    let level = if creature.level == 0 {
        DEFAULT_LEVEL as u32
    } else {
        creature.level as u32
    };
    hp + level * 2
}

/// The moves a creature can pick from: its first four, or tackle if it knows none.
pub fn available_moves(creature: &Creature) -> Vec<MoveEntry> {
    if creature.moves.is_empty() {
        return vec![MoveEntry::tackle()];
    }
    creature
        .moves
        .iter()
        .take(MAX_USABLE_MOVES)
        .cloned()
        .collect()
}

/// The wild side has no strategy: any usable move, uniformly.
pub fn choose_wild_move(creature: &Creature, rng: &mut dyn RandomSource) -> MoveEntry {
    let mut moves = available_moves(creature);
    let index = rng.pick_index(moves.len(), "wild move choice");
    moves.swap_remove(index.min(moves.len() - 1))
}

/// Decide which side acts first: higher priority, then higher speed, then a coin flip.
pub fn decide_first(
    player_move: &MoveEntry,
    wild_move: &MoveEntry,
    player: &Creature,
    wild: &Creature,
    rng: &mut dyn RandomSource,
) -> Side {
    if player_move.priority != wild_move.priority {
        return if player_move.priority > wild_move.priority {
            Side::Player
        } else {
            Side::Wild
        };
    }

    let player_speed = player.stats.speed;
    let wild_speed = wild.stats.speed;
    if player_speed == wild_speed {
        return if rng.coin_flip("speed tie") {
            Side::Player
        } else {
            Side::Wild
        };
    }
    if player_speed > wild_speed {
        Side::Player
    } else {
        Side::Wild
    }
}

/// Damage for one hit, never below 1.
///
/// `floor(power/3) + floor(level/2) + floor(attack/8) - floor(defense/16)`,
/// with power defaulting to 40 and level to 5 when unset.
pub fn calculate_damage(attacker: &Creature, defender: &Creature, move_used: &MoveEntry) -> u32 {
    let power = match move_used.power as i64 {
        p if p <= 0 => DEFAULT_POWER,
        p => p,
    };
    let level = match attacker.level as i64 {
        l if l <= 0 => DEFAULT_LEVEL,
        l => l,
    };
    let attack = attacker.stats.attack as i64;
    let defense = defender.stats.defense as i64;

    let base = power / 3 + level / 2;
    let bonus = attack / 8 - defense / 16;
    (base + bonus).max(1) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The attacker has fainted and cannot act.
    CannotAct,
    Missed,
    Hit { damage: u32, remaining_hp: u32 },
}

/// Resolve one action: roll accuracy, then apply damage to the defender.
pub fn resolve_attack(
    attacker: &Combatant,
    defender: &mut Combatant,
    move_used: &MoveEntry,
    rng: &mut dyn RandomSource,
) -> AttackOutcome {
    if attacker.is_fainted() {
        return AttackOutcome::CannotAct;
    }

    let accuracy = if move_used.accuracy == 0 {
        100
    } else {
        move_used.accuracy as u32
    };
    let roll = rng.roll_percent("accuracy");
    if roll >= accuracy {
        log::debug!(
            "{} missed with {} (roll {} vs {})",
            attacker.creature.name,
            move_used.name,
            roll,
            accuracy
        );
        return AttackOutcome::Missed;
    }

    let damage = calculate_damage(&attacker.creature, &defender.creature, move_used);
    let remaining_hp = defender.take_damage(damage);
    log::debug!(
        "{} hit {} with {} for {} ({} left)",
        attacker.creature.name,
        defender.creature.name,
        move_used.name,
        damage,
        remaining_hp
    );
    AttackOutcome::Hit {
        damage,
        remaining_hp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::BaseStats;
    use crate::rng::{ScriptedRng, SeededRng};
    use schema::ResourceRef;

    fn creature(name: &str, level: u8, stats: BaseStats, moves: Vec<MoveEntry>) -> Creature {
        Creature {
            id: 1,
            name: name.to_string(),
            species: name.to_string(),
            base_experience: 64,
            height: 7,
            weight: 69,
            stats,
            types: vec!["normal".to_string()],
            abilities: vec![],
            held_items: vec![],
            moves,
            level,
            experience: 0,
            growth_curve: ResourceRef::default(),
            evolution_chain: ResourceRef::default(),
            last_gain: None,
            date_caught: None,
        }
    }

    fn named_move(name: &str, priority: i8) -> MoveEntry {
        MoveEntry {
            name: name.to_string(),
            power: 40,
            accuracy: 100,
            priority,
            move_type: "normal".to_string(),
        }
    }

    fn stats(attack: u32, defense: u32, speed: u32) -> BaseStats {
        BaseStats {
            hp: 45,
            attack,
            defense,
            speed,
            ..Default::default()
        }
    }

    #[test]
    fn test_damage_formula() {
        let attacker = creature("a", 10, stats(50, 0, 0), vec![]);
        let defender = creature("d", 10, stats(0, 30, 0), vec![]);
        // base = 13 + 5, bonus = 6 - 1
        assert_eq!(calculate_damage(&attacker, &defender, &MoveEntry::tackle()), 23);
    }

    #[test]
    fn test_damage_defaults_power_and_level() {
        let attacker = creature("a", 0, stats(0, 0, 0), vec![]);
        let defender = creature("d", 5, stats(0, 0, 0), vec![]);
        let mut status_move = MoveEntry::tackle();
        status_move.power = 0;
        // 40/3 + 5/2 = 13 + 2
        assert_eq!(calculate_damage(&attacker, &defender, &status_move), 15);
    }

    #[test]
    fn test_damage_is_at_least_one() {
        let attacker = creature("a", 1, stats(0, 0, 0), vec![]);
        let defender = creature("d", 1, stats(0, 2000, 0), vec![]);
        let mut weak = MoveEntry::tackle();
        weak.power = 1;
        assert_eq!(calculate_damage(&attacker, &defender, &weak), 1);
    }

    #[test]
    fn test_max_hp() {
        let with_hp = creature("a", 5, stats(0, 0, 0), vec![]);
        assert_eq!(max_hp(&with_hp), 55);

        let mut unset = creature("b", 5, stats(0, 0, 0), vec![]);
        unset.stats.hp = 0;
        assert_eq!(max_hp(&unset), 60);
    }

    #[test]
    fn test_combatant_hp_clamps() {
        let mut combatant = Combatant::new(creature("a", 5, stats(0, 0, 0), vec![]));
        assert_eq!(combatant.current_hp(), 55);
        assert_eq!(combatant.take_damage(20), 35);
        assert_eq!(combatant.take_damage(500), 0);
        assert!(combatant.is_fainted());
        assert_eq!(combatant.max_hp(), 55);
    }

    #[test]
    fn test_available_moves_defaults_and_limits() {
        let none = creature("a", 5, stats(0, 0, 0), vec![]);
        assert_eq!(available_moves(&none), vec![MoveEntry::tackle()]);

        let many: Vec<MoveEntry> = (0..6).map(|i| named_move(&format!("m{}", i), 0)).collect();
        let lots = creature("b", 5, stats(0, 0, 0), many);
        let usable = available_moves(&lots);
        assert_eq!(usable.len(), 4);
        assert_eq!(usable[3].name, "m3");
    }

    #[test]
    fn test_wild_move_choice_uses_rng() {
        let moves: Vec<MoveEntry> = (0..4).map(|i| named_move(&format!("m{}", i), 0)).collect();
        let wild = creature("w", 5, stats(0, 0, 0), moves);
        let mut rng = ScriptedRng::new(vec![0.0, 0.6]);
        assert_eq!(choose_wild_move(&wild, &mut rng).name, "m0");
        assert_eq!(choose_wild_move(&wild, &mut rng).name, "m2");
    }

    #[test]
    fn test_priority_dominates_speed() {
        let slow = creature("slow", 5, stats(0, 0, 10), vec![]);
        let fast = creature("fast", 5, stats(0, 0, 200), vec![]);
        let mut rng = ScriptedRng::new(vec![]);
        let quick = named_move("quick-attack", 1);
        let tackle = named_move("tackle", 0);
        assert_eq!(decide_first(&quick, &tackle, &slow, &fast, &mut rng), Side::Player);
        assert_eq!(decide_first(&tackle, &quick, &fast, &slow, &mut rng), Side::Wild);
    }

    #[test]
    fn test_speed_breaks_priority_ties() {
        let slow = creature("slow", 5, stats(0, 0, 10), vec![]);
        let fast = creature("fast", 5, stats(0, 0, 200), vec![]);
        let mut rng = ScriptedRng::new(vec![]);
        let tackle = MoveEntry::tackle();
        assert_eq!(decide_first(&tackle, &tackle, &fast, &slow, &mut rng), Side::Player);
        assert_eq!(decide_first(&tackle, &tackle, &slow, &fast, &mut rng), Side::Wild);
    }

    #[test]
    fn test_full_tie_is_a_fair_coin() {
        let a = creature("a", 5, stats(0, 0, 50), vec![]);
        let b = creature("b", 5, stats(0, 0, 50), vec![]);
        let tackle = MoveEntry::tackle();
        let mut rng = SeededRng::new(2024);
        let trials = 10_000;
        let player_first = (0..trials)
            .filter(|_| decide_first(&tackle, &tackle, &a, &b, &mut rng) == Side::Player)
            .count();
        let share = player_first as f64 / trials as f64;
        assert!((share - 0.5).abs() < 0.03, "player went first {:.3} of the time", share);
    }

    #[test]
    fn test_miss_when_roll_reaches_accuracy() {
        let attacker = Combatant::new(creature("a", 10, stats(50, 0, 0), vec![]));
        let mut defender = Combatant::new(creature("d", 10, stats(0, 30, 0), vec![]));
        let mut shaky = MoveEntry::tackle();
        shaky.accuracy = 70;

        let mut rng = ScriptedRng::new(vec![0.705, 0.695]);
        assert_eq!(
            resolve_attack(&attacker, &mut defender, &shaky, &mut rng),
            AttackOutcome::Missed
        );
        assert_eq!(defender.current_hp(), defender.max_hp());
        assert_eq!(
            resolve_attack(&attacker, &mut defender, &shaky, &mut rng),
            AttackOutcome::Hit {
                damage: 23,
                remaining_hp: 65 - 23
            }
        );
    }

    #[test]
    fn test_zero_accuracy_always_hits() {
        let attacker = Combatant::new(creature("a", 10, stats(50, 0, 0), vec![]));
        let mut defender = Combatant::new(creature("d", 10, stats(0, 30, 0), vec![]));
        let mut swift = MoveEntry::tackle();
        swift.accuracy = 0;
        let mut rng = ScriptedRng::new(vec![0.99]);
        assert!(matches!(
            resolve_attack(&attacker, &mut defender, &swift, &mut rng),
            AttackOutcome::Hit { .. }
        ));
    }

    #[test]
    fn test_fainted_attacker_cannot_act() {
        let mut attacker = Combatant::new(creature("a", 10, stats(50, 0, 0), vec![]));
        attacker.take_damage(1000);
        let mut defender = Combatant::new(creature("d", 10, stats(0, 30, 0), vec![]));
        let mut rng = ScriptedRng::new(vec![]);
        assert_eq!(
            resolve_attack(&attacker, &mut defender, &MoveEntry::tackle(), &mut rng),
            AttackOutcome::CannotAct
        );
    }
}
