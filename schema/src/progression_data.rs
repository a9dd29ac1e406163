use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelThreshold {
    pub level: u8,
    pub experience: u32,
}

/// Experience required to reach each level for one species family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthCurve {
    pub levels: Vec<LevelThreshold>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionDetail {
    #[serde(default)]
    pub min_level: Option<u8>,
}

/// One node of an evolution chain: a species and the species it can become.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionLink {
    pub species: String,
    #[serde(default)]
    pub evolution_details: Vec<EvolutionDetail>,
    #[serde(default)]
    pub evolves_to: Vec<EvolutionLink>,
}

impl EvolutionLink {
    /// Minimum level needed to evolve into this node, 0 when no detail sets one.
    /// When several details disagree the strictest one wins.
    pub fn required_level(&self) -> u8 {
        self.evolution_details
            .iter()
            .filter_map(|detail| detail.min_level)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionChain {
    pub chain: EvolutionLink,
}
