use super::growth::ProgressionEngine;
use crate::builder::fetch_and_build;
use crate::creature::Creature;
use crate::errors::DataResult;
use schema::EvolutionLink;
use serde::{Deserialize, Serialize};

/// The species a creature may turn into next, and the level it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionTarget<'a> {
    pub species: &'a str,
    /// 0 when the chain gives no level requirement.
    pub min_level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evolution {
    pub from: String,
    pub into: String,
}

/// Walk the chain for the node naming `species` and return its preferred child.
///
/// Among the children the lowest positive level requirement wins, earlier
/// children winning ties. If no child names a level the first child is
/// returned with `min_level` 0.
pub fn find_next_evolution<'a>(link: &'a EvolutionLink, species: &str) -> Option<EvolutionTarget<'a>> {
    if link.species.eq_ignore_ascii_case(species) {
        if let Some(target) = preferred_child(link) {
            return Some(target);
        }
    }
    link.evolves_to
        .iter()
        .find_map(|child| find_next_evolution(child, species))
}

fn preferred_child(link: &EvolutionLink) -> Option<EvolutionTarget<'_>> {
    let mut best: Option<EvolutionTarget<'_>> = None;
    for child in &link.evolves_to {
        let candidate = EvolutionTarget {
            species: &child.species,
            min_level: child.required_level(),
        };
        best = match best {
            None => Some(candidate),
            Some(current) if candidate.min_level > 0 && current.min_level == 0 => Some(candidate),
            Some(current) if candidate.min_level > 0 && candidate.min_level < current.min_level => {
                Some(candidate)
            }
            keep => keep,
        };
    }
    best
}

impl ProgressionEngine<'_> {
    /// Evolve `creature` in place if its chain allows it at its current level.
    ///
    /// The evolved species is fully fetched and built before anything on
    /// `creature` changes, so a failed lookup leaves it untouched.
    pub fn maybe_evolve(&mut self, creature: &mut Creature) -> DataResult<Option<Evolution>> {
        if creature.evolution_chain.is_empty() || creature.species.trim().is_empty() {
            return Ok(None);
        }

        let chain = self
            .data
            .fetch_evolution_chain(&creature.evolution_chain)
            .inspect_err(|err| log::warn!("evolution chain lookup failed: {}", err))?;

        let Some(target) = find_next_evolution(&chain.chain, &creature.species) else {
            return Ok(None);
        };
        if target.min_level == 0 || creature.level < target.min_level {
            return Ok(None);
        }

        let mut evolved = fetch_and_build(self.data, target.species, self.now)
            .inspect_err(|err| log::warn!("evolved species lookup failed: {}", err))?;
        evolved.inherit_progression(creature);

        let evolution = Evolution {
            from: creature.name.clone(),
            into: evolved.name.clone(),
        };
        log::info!("{} evolved into {}", evolution.from, evolution.into);
        *creature = evolved;
        Ok(Some(evolution))
    }
}
