use super::evolution::Evolution;
use super::rewards::{battle_experience, capture_experience, grant_random_supplies, SupplyGrant};
use crate::capture::Inventory;
use crate::creature::{Creature, ExperienceGain, MAX_LEVEL};
use crate::data::DataSource;
use crate::errors::DataResult;
use crate::rng::RandomSource;
use schema::{GrowthCurve, ResourceRef};
use std::time::SystemTime;

// Passive regeneration
const REST_RATE_PER_HOUR: f64 = 0.05;
const REST_CAP_MULTIPLIER: u32 = 2;

/// Highest level whose threshold the experience has reached. 1 when nothing
/// matches, never above 100.
pub fn level_from_curve(curve: &GrowthCurve, experience: u32) -> u8 {
    curve
        .levels
        .iter()
        .filter(|entry| entry.experience <= experience)
        .map(|entry| entry.level)
        .max()
        .unwrap_or(1)
        .clamp(1, MAX_LEVEL)
}

/// Level for `experience` on the curve behind `reference`. A blank reference
/// means the species has no curve and sits at level 1.
pub fn level_for_experience(
    source: &dyn DataSource,
    reference: &ResourceRef,
    experience: u32,
) -> DataResult<u8> {
    if reference.is_empty() {
        return Ok(1);
    }
    let curve = source
        .fetch_growth_curve(reference)
        .inspect_err(|err| log::warn!("growth curve lookup failed: {}", err))?;
    Ok(level_from_curve(&curve, experience))
}

/// What one experience gain did to a creature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExperienceReport {
    pub gained: u32,
    pub previous_level: u8,
    pub new_level: u8,
    pub evolution: Option<Evolution>,
    pub supplies: Option<SupplyGrant>,
}

impl ExperienceReport {
    fn unchanged(level: u8) -> Self {
        Self {
            previous_level: level,
            new_level: level,
            ..Default::default()
        }
    }

    pub fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

/// Converts experience into levels and evolutions for one session.
///
/// Holds the collaborators progression needs: the data service for growth
/// curves and evolution chains, the random source and inventory for level-up
/// rewards, and the time of the gain.
pub struct ProgressionEngine<'a> {
    pub data: &'a dyn DataSource,
    pub rng: &'a mut dyn RandomSource,
    pub inventory: &'a mut Inventory,
    pub now: SystemTime,
}

impl<'a> ProgressionEngine<'a> {
    pub fn new(
        data: &'a dyn DataSource,
        rng: &'a mut dyn RandomSource,
        inventory: &'a mut Inventory,
        now: SystemTime,
    ) -> Self {
        Self {
            data,
            rng,
            inventory,
            now,
        }
    }

    /// Add experience, recompute level and evolve on level-up.
    ///
    /// All lookups run against a working copy; `creature` is only replaced
    /// once every fetch has succeeded. The level-up supply grant comes last.
    pub fn apply_experience(
        &mut self,
        creature: &mut Creature,
        gained: u32,
        update_last_gain: bool,
    ) -> DataResult<ExperienceReport> {
        if creature.is_max_level() {
            creature.level = MAX_LEVEL;
            return Ok(ExperienceReport::unchanged(MAX_LEVEL));
        }
        if gained == 0 {
            return Ok(ExperienceReport::unchanged(creature.level));
        }

        let mut updated = creature.clone();
        updated.experience = updated.experience.saturating_add(gained);
        let previous_level = updated.level;
        let level = level_for_experience(self.data, &updated.growth_curve, updated.experience)?;
        updated.level = level.max(previous_level);
        if update_last_gain {
            updated.last_gain = Some(ExperienceGain {
                amount: gained,
                at: self.now,
            });
        }

        let mut report = ExperienceReport {
            gained,
            previous_level,
            new_level: updated.level,
            evolution: None,
            supplies: None,
        };
        if report.leveled_up() {
            report.evolution = self.maybe_evolve(&mut updated)?;
        }

        *creature = updated;

        if report.leveled_up() {
            log::info!(
                "{} grew from level {} to {}",
                creature.name,
                report.previous_level,
                report.new_level
            );
            report.supplies = Some(grant_random_supplies(self.inventory, self.rng, "Level up"));
        }
        Ok(report)
    }

    /// Idle experience since the last recorded gain: 5% of that gain per hour,
    /// capped at twice the gain.
    ///
    /// The gain amount that sets the rate is kept; only its timestamp moves
    /// forward, so repeated rests do not compound.
    pub fn apply_rest_xp(&mut self, creature: &mut Creature) -> DataResult<Option<ExperienceReport>> {
        let Some(last_gain) = creature.last_gain else {
            return Ok(None);
        };
        if last_gain.amount == 0 || creature.is_max_level() {
            return Ok(None);
        }
        let Ok(elapsed) = self.now.duration_since(last_gain.at) else {
            return Ok(None);
        };
        let hours = elapsed.as_secs_f64() / 3600.0;
        if hours <= 0.0 {
            return Ok(None);
        }

        let per_hour = (last_gain.amount as f64 * REST_RATE_PER_HOUR).round();
        if per_hour <= 0.0 {
            return Ok(None);
        }
        let cap = last_gain.amount.saturating_mul(REST_CAP_MULTIPLIER);
        let bonus = ((per_hour * hours) as u32).min(cap);
        if bonus == 0 {
            return Ok(None);
        }

        let report = self.apply_experience(creature, bonus, false)?;
        if report.gained == 0 {
            return Ok(None);
        }
        creature.last_gain = Some(ExperienceGain {
            amount: last_gain.amount,
            at: self.now,
        });
        log::debug!("{} rested for {:.1}h and gained {}", creature.name, hours, bonus);
        Ok(Some(report))
    }

    /// Experience for knocking out a wild creature.
    pub fn award_battle_xp(
        &mut self,
        creature: &mut Creature,
        base_experience: u32,
    ) -> DataResult<ExperienceReport> {
        self.apply_experience(creature, battle_experience(base_experience), true)
    }

    /// Experience for catching a wild creature.
    pub fn award_capture_xp(
        &mut self,
        creature: &mut Creature,
        base_experience: u32,
    ) -> DataResult<ExperienceReport> {
        self.apply_experience(creature, capture_experience(base_experience), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{BaseStats, MoveEntry};
    use crate::data::LocalDataSource;
    use crate::errors::DataError;
    use crate::rng::ScriptedRng;
    use schema::{CreatureData, EvolutionChain, EvolutionDetail, EvolutionLink, LevelThreshold, StatValue};
    use std::time::Duration;

    const SUPPLY_PICKS: [f64; 7] = [0.1; 7];

    fn curve(rows: &[(u8, u32)]) -> GrowthCurve {
        GrowthCurve {
            levels: rows
                .iter()
                .map(|&(level, experience)| LevelThreshold { level, experience })
                .collect(),
        }
    }

    fn species(name: &str, id: u32, hp: u32) -> CreatureData {
        CreatureData {
            id,
            name: name.to_string(),
            species: name.to_string(),
            base_experience: 64,
            height: 7,
            weight: 69,
            stats: vec![StatValue { stat: "hp".to_string(), base_stat: hp }],
            types: vec!["grass".to_string()],
            abilities: vec![],
            held_items: vec![],
            moves: vec![],
            growth_curve: ResourceRef::new("growth/test"),
            evolution_chain: ResourceRef::new("chain/1"),
        }
    }

    fn dex() -> LocalDataSource {
        LocalDataSource::new()
            .with_creature(species("bulbasaur", 1, 45))
            .with_creature(species("ivysaur", 2, 60))
            .with_growth_curve("growth/test", curve(&[(1, 0), (5, 50), (10, 200), (16, 400)]))
            .with_evolution_chain(
                "chain/1",
                EvolutionChain {
                    chain: EvolutionLink {
                        species: "bulbasaur".to_string(),
                        evolution_details: vec![],
                        evolves_to: vec![EvolutionLink {
                            species: "ivysaur".to_string(),
                            evolution_details: vec![EvolutionDetail { min_level: Some(16) }],
                            evolves_to: vec![],
                        }],
                    },
                },
            )
    }

    fn bulbasaur(level: u8, experience: u32) -> Creature {
        Creature {
            id: 1,
            name: "bulbasaur".to_string(),
            species: "bulbasaur".to_string(),
            base_experience: 64,
            height: 7,
            weight: 69,
            stats: BaseStats {
                hp: 45,
                ..Default::default()
            },
            types: vec!["grass".to_string()],
            abilities: vec![],
            held_items: vec![],
            moves: vec![MoveEntry::tackle()],
            level,
            experience,
            growth_curve: ResourceRef::new("growth/test"),
            evolution_chain: ResourceRef::new("chain/1"),
            last_gain: None,
            date_caught: Some(SystemTime::UNIX_EPOCH),
        }
    }

    fn at(hours: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(hours * 3600)
    }

    #[test]
    fn test_level_from_curve() {
        let rows = curve(&[(1, 0), (5, 50), (10, 200)]);
        assert_eq!(level_from_curve(&rows, 120), 5);
        assert_eq!(level_from_curve(&rows, 500), 10);
        assert_eq!(level_from_curve(&rows, 0), 1);
        assert_eq!(level_from_curve(&GrowthCurve::default(), 9999), 1);
    }

    #[test]
    fn test_level_from_curve_caps_at_max() {
        let rows = curve(&[(1, 0), (100, 1000), (120, 2000)]);
        assert_eq!(level_from_curve(&rows, 5000), 100);
    }

    #[test]
    fn test_blank_curve_reference_is_level_one() {
        let source = LocalDataSource::new();
        assert_eq!(level_for_experience(&source, &ResourceRef::default(), 900), Ok(1));
    }

    #[test]
    fn test_gain_without_level_up() {
        let source = dex();
        let mut rng = ScriptedRng::new(vec![]);
        let mut inventory = Inventory::default();
        let mut engine = ProgressionEngine::new(&source, &mut rng, &mut inventory, at(1));

        let mut creature = bulbasaur(5, 60);
        let report = engine.apply_experience(&mut creature, 20, true).unwrap();
        assert_eq!(creature.experience, 80);
        assert_eq!(creature.level, 5);
        assert!(!report.leveled_up());
        assert_eq!(report.supplies, None);
        assert_eq!(creature.last_gain, Some(ExperienceGain { amount: 20, at: at(1) }));
        assert_eq!(inventory, Inventory::default());
    }

    #[test]
    fn test_level_up_grants_supplies() {
        let source = dex();
        let mut rng = ScriptedRng::new(SUPPLY_PICKS.to_vec());
        let mut inventory = Inventory::default();
        let mut engine = ProgressionEngine::new(&source, &mut rng, &mut inventory, at(1));

        let mut creature = bulbasaur(5, 60);
        let report = engine.apply_experience(&mut creature, 150, true).unwrap();
        assert_eq!(creature.level, 10);
        assert!(report.leveled_up());
        assert_eq!(report.evolution, None);
        assert_eq!(report.supplies.as_ref().map(|grant| grant.reason.as_str()), Some("Level up"));
        assert_eq!(inventory.potions, 3);
    }

    #[test]
    fn test_zero_gain_and_max_level_are_noops() {
        let source = dex();
        let mut rng = ScriptedRng::new(vec![]);
        let mut inventory = Inventory::default();
        let mut engine = ProgressionEngine::new(&source, &mut rng, &mut inventory, at(1));

        let mut creature = bulbasaur(5, 60);
        engine.apply_experience(&mut creature, 0, true).unwrap();
        assert_eq!(creature.experience, 60);
        assert_eq!(creature.last_gain, None);

        let mut maxed = bulbasaur(100, 1_000_000);
        let report = engine.apply_experience(&mut maxed, 500, true).unwrap();
        assert_eq!(maxed.experience, 1_000_000);
        assert_eq!(report.new_level, 100);
    }

    #[test]
    fn test_level_up_evolves_and_keeps_progression() {
        let source = dex();
        let mut rng = ScriptedRng::new(SUPPLY_PICKS.to_vec());
        let mut inventory = Inventory::default();
        let mut engine = ProgressionEngine::new(&source, &mut rng, &mut inventory, at(3));

        let mut creature = bulbasaur(10, 390);
        let report = engine.apply_experience(&mut creature, 20, true).unwrap();
        assert_eq!(
            report.evolution,
            Some(Evolution {
                from: "bulbasaur".to_string(),
                into: "ivysaur".to_string()
            })
        );
        assert_eq!(creature.name, "ivysaur");
        assert_eq!(creature.stats.hp, 60);
        assert_eq!(creature.level, 16);
        assert_eq!(creature.experience, 410);
        assert_eq!(creature.growth_curve, ResourceRef::new("growth/test"));
        assert_eq!(creature.date_caught, Some(SystemTime::UNIX_EPOCH));
        assert_eq!(creature.last_gain, Some(ExperienceGain { amount: 20, at: at(3) }));
    }

    #[test]
    fn test_failed_evolution_fetch_leaves_creature_untouched() {
        // Ivysaur is missing from this dex, so the evolution build fails.
        let chain = dex()
            .fetch_evolution_chain(&ResourceRef::new("chain/1"))
            .unwrap();
        let source = LocalDataSource::new()
            .with_creature(species("bulbasaur", 1, 45))
            .with_growth_curve("growth/test", curve(&[(1, 0), (16, 400)]))
            .with_evolution_chain("chain/1", chain);
        let mut rng = ScriptedRng::new(vec![]);
        let mut inventory = Inventory::default();
        let mut engine = ProgressionEngine::new(&source, &mut rng, &mut inventory, at(1));

        let mut creature = bulbasaur(10, 390);
        let before = creature.clone();
        let result = engine.apply_experience(&mut creature, 20, true);
        assert!(matches!(result, Err(DataError::NotFound(_))));
        assert_eq!(creature, before);
        assert_eq!(inventory, Inventory::default());
    }

    #[test]
    fn test_rest_xp_accrues_hourly() {
        let source = dex();
        let mut rng = ScriptedRng::new(vec![]);
        let mut inventory = Inventory::default();
        let mut engine = ProgressionEngine::new(&source, &mut rng, &mut inventory, at(3));

        let mut creature = bulbasaur(5, 60);
        creature.last_gain = Some(ExperienceGain { amount: 40, at: at(0) });
        // 2 xp per hour for three hours.
        let report = engine.apply_rest_xp(&mut creature).unwrap().unwrap();
        assert_eq!(report.gained, 6);
        assert_eq!(creature.experience, 66);
        assert_eq!(creature.last_gain, Some(ExperienceGain { amount: 40, at: at(3) }));
    }

    #[test]
    fn test_rest_xp_is_capped() {
        let source = dex();
        let mut rng = ScriptedRng::new(vec![]);
        let mut inventory = Inventory::default();
        let mut engine = ProgressionEngine::new(&source, &mut rng, &mut inventory, at(1000));

        let mut creature = bulbasaur(5, 60);
        creature.last_gain = Some(ExperienceGain { amount: 40, at: at(0) });
        let report = engine.apply_rest_xp(&mut creature).unwrap().unwrap();
        assert_eq!(report.gained, 80);
    }

    #[test]
    fn test_rest_xp_skips_without_history_or_time() {
        let source = dex();
        let mut rng = ScriptedRng::new(vec![]);
        let mut inventory = Inventory::default();
        let mut engine = ProgressionEngine::new(&source, &mut rng, &mut inventory, at(5));

        let mut fresh = bulbasaur(5, 60);
        assert_eq!(engine.apply_rest_xp(&mut fresh).unwrap(), None);

        let mut future = bulbasaur(5, 60);
        future.last_gain = Some(ExperienceGain { amount: 40, at: at(9) });
        assert_eq!(engine.apply_rest_xp(&mut future).unwrap(), None);
        assert_eq!(future.experience, 60);

        let mut tiny = bulbasaur(5, 60);
        tiny.last_gain = Some(ExperienceGain { amount: 5, at: at(0) });
        // 5% of 5 rounds to 0 per hour.
        assert_eq!(engine.apply_rest_xp(&mut tiny).unwrap(), None);

        let mut capped = bulbasaur(100, 5000);
        capped.last_gain = Some(ExperienceGain { amount: 40, at: at(0) });
        assert_eq!(engine.apply_rest_xp(&mut capped).unwrap(), None);
        assert_eq!(capped.experience, 5000);
        assert_eq!(capped.last_gain, Some(ExperienceGain { amount: 40, at: at(0) }));
    }

    #[test]
    fn test_award_helpers() {
        let source = dex();
        let mut rng = ScriptedRng::new(vec![]);
        let mut inventory = Inventory::default();
        let mut engine = ProgressionEngine::new(&source, &mut rng, &mut inventory, at(1));

        let mut fighter = bulbasaur(5, 60);
        assert_eq!(engine.award_battle_xp(&mut fighter, 20).unwrap().gained, 18);
        let mut catcher = bulbasaur(5, 60);
        assert_eq!(engine.award_capture_xp(&mut catcher, 20).unwrap().gained, 20);
    }
}
