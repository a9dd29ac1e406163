//! Access to the creature data service.
//!
//! The engine only sees [`DataSource`]; where the records come from (a remote
//! API, a cache, a local file) is the caller's business.

use crate::errors::{ConfigError, DataError, DataResult};
use schema::{CreatureData, EvolutionChain, GrowthCurve, MoveData, ResourceRef};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub trait DataSource {
    fn fetch_creature(&self, name: &str) -> DataResult<CreatureData>;
    fn fetch_move(&self, reference: &ResourceRef) -> DataResult<MoveData>;
    fn fetch_growth_curve(&self, reference: &ResourceRef) -> DataResult<GrowthCurve>;
    fn fetch_evolution_chain(&self, reference: &ResourceRef) -> DataResult<EvolutionChain>;
}

/// In-memory data source, loadable from a RON dex file.
///
/// Creature names are matched case-insensitively; references must match
/// exactly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalDataSource {
    #[serde(default)]
    creatures: HashMap<String, CreatureData>,
    #[serde(default)]
    moves: HashMap<ResourceRef, MoveData>,
    #[serde(default)]
    growth_curves: HashMap<ResourceRef, GrowthCurve>,
    #[serde(default)]
    evolution_chains: HashMap<ResourceRef, EvolutionChain>,
}

impl LocalDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dex file from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let mut source: LocalDataSource = ron::from_str(content)?;
        // Normalise keys so lookups ignore case.
        source.creatures = source
            .creatures
            .into_iter()
            .map(|(name, data)| (name.to_lowercase(), data))
            .collect();
        Ok(source)
    }

    pub fn with_creature(mut self, data: CreatureData) -> Self {
        self.creatures.insert(data.name.to_lowercase(), data);
        self
    }

    pub fn with_move(mut self, reference: impl Into<ResourceRef>, data: MoveData) -> Self {
        self.moves.insert(reference.into(), data);
        self
    }

    pub fn with_growth_curve(mut self, reference: impl Into<ResourceRef>, curve: GrowthCurve) -> Self {
        self.growth_curves.insert(reference.into(), curve);
        self
    }

    pub fn with_evolution_chain(
        mut self,
        reference: impl Into<ResourceRef>,
        chain: EvolutionChain,
    ) -> Self {
        self.evolution_chains.insert(reference.into(), chain);
        self
    }

    /// Names of every creature in the dex, sorted.
    pub fn creature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.creatures.values().map(|c| c.name.clone()).collect();
        names.sort();
        names
    }
}

impl DataSource for LocalDataSource {
    fn fetch_creature(&self, name: &str) -> DataResult<CreatureData> {
        self.creatures
            .get(&name.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("creature '{}'", name)))
    }

    fn fetch_move(&self, reference: &ResourceRef) -> DataResult<MoveData> {
        self.moves
            .get(reference)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("move '{}'", reference)))
    }

    fn fetch_growth_curve(&self, reference: &ResourceRef) -> DataResult<GrowthCurve> {
        self.growth_curves
            .get(reference)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("growth curve '{}'", reference)))
    }

    fn fetch_evolution_chain(&self, reference: &ResourceRef) -> DataResult<EvolutionChain> {
        self.evolution_chains
            .get(reference)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("evolution chain '{}'", reference)))
    }
}
