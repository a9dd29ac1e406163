use crate::ResourceRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatValue {
    pub stat: String,
    pub base_stat: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityData {
    pub name: String,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub slot: u8,
}

/// Creature record as returned by the data service.
///
/// Species-level references (growth curve, evolution chain) are folded into
/// the record so a single fetch is enough to build a creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureData {
    pub id: u32,
    pub name: String,
    pub species: String,
    pub base_experience: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub stats: Vec<StatValue>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<AbilityData>,
    #[serde(default)]
    pub held_items: Vec<String>,
    #[serde(default)]
    pub moves: Vec<ResourceRef>,
    #[serde(default)]
    pub growth_curve: ResourceRef,
    #[serde(default)]
    pub evolution_chain: ResourceRef,
}
