use crate::creature::{Ability, BaseStats, Creature, ExperienceGain, MoveEntry};
use crate::data::DataSource;
use crate::errors::DataResult;
use crate::progression::level_for_experience;
use schema::{CreatureData, MoveData};
use std::time::SystemTime;

impl From<MoveData> for MoveEntry {
    fn from(data: MoveData) -> Self {
        Self {
            name: data.name,
            power: data.power.unwrap_or(0),
            accuracy: data.accuracy.unwrap_or(0),
            priority: data.priority,
            move_type: data.move_type,
        }
    }
}

/// Build a fresh creature record from service data.
///
/// Every referenced move is fetched, and the starting level is read off the
/// growth curve at the species' base experience. Nothing is returned unless
/// every lookup succeeded.
pub fn build_creature(
    source: &dyn DataSource,
    data: &CreatureData,
    now: SystemTime,
) -> DataResult<Creature> {
    let moves = data
        .moves
        .iter()
        .map(|reference| source.fetch_move(reference).map(MoveEntry::from))
        .collect::<DataResult<Vec<_>>>()?;

    let level = level_for_experience(source, &data.growth_curve, data.base_experience)?;

    let abilities = data
        .abilities
        .iter()
        .map(|ability| Ability {
            name: ability.name.clone(),
            is_hidden: ability.is_hidden,
            slot: ability.slot,
        })
        .collect();

    Ok(Creature {
        id: data.id,
        name: data.name.clone(),
        species: data.species.clone(),
        base_experience: data.base_experience,
        height: data.height,
        weight: data.weight,
        stats: BaseStats::from_values(&data.stats),
        types: data.types.clone(),
        abilities,
        held_items: data.held_items.clone(),
        moves,
        level,
        experience: data.base_experience,
        growth_curve: data.growth_curve.clone(),
        evolution_chain: data.evolution_chain.clone(),
        last_gain: Some(ExperienceGain {
            amount: data.base_experience,
            at: now,
        }),
        date_caught: Some(now),
    })
}

/// Fetch a creature by name and build it.
pub fn fetch_and_build(
    source: &dyn DataSource,
    name: &str,
    now: SystemTime,
) -> DataResult<Creature> {
    let data = source.fetch_creature(name)?;
    build_creature(source, &data, now)
}
