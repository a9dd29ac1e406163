//! The player's session context: roster, inventory and where they are saved.
//!
//! Battles borrow a [`Session`] mutably for their whole run; nothing here is
//! global. Persisting it is the caller's job through a [`SessionStore`].

use crate::capture::Inventory;
use crate::creature::Creature;
use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Points at one roster entry: the name key and the position under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSelection {
    pub key: String,
    pub index: usize,
}

/// Caught creatures grouped by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    entries: BTreeMap<String, Vec<Creature>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    /// Total number of creatures across every key.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Every entry in menu order (sorted key, then position) with its
    /// "name (Lv N)" label.
    pub fn selections(&self) -> Vec<(RosterSelection, String)> {
        self.entries
            .iter()
            .flat_map(|(key, creatures)| {
                creatures.iter().enumerate().map(move |(index, creature)| {
                    (
                        RosterSelection {
                            key: key.clone(),
                            index,
                        },
                        creature.to_string(),
                    )
                })
            })
            .collect()
    }

    pub fn get(&self, selection: &RosterSelection) -> Option<&Creature> {
        self.entries
            .get(&selection.key)
            .and_then(|creatures| creatures.get(selection.index))
    }

    /// Each name in the roster with how many are filed under it, sorted.
    pub fn counts(&self) -> Vec<(String, usize)> {
        self.entries
            .iter()
            .map(|(key, creatures)| (key.clone(), creatures.len()))
            .collect()
    }

    pub fn entries(&self, key: &str) -> &[Creature] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// File a creature under its own name.
    pub fn append_caught(&mut self, creature: Creature) -> RosterSelection {
        let key = creature.name.clone();
        let list = self.entries.entry(key.clone()).or_default();
        list.push(creature);
        RosterSelection {
            key,
            index: list.len() - 1,
        }
    }

    /// Write a battle's result back to the entry it came from.
    ///
    /// If the creature changed name (it evolved) it moves to its new key and
    /// the old key is dropped once empty. Returns where the creature now
    /// lives, or `None` if the selection was stale and nothing was written.
    pub fn sync(&mut self, selection: &RosterSelection, updated: Creature) -> Option<RosterSelection> {
        let Some(list) = self.entries.get_mut(&selection.key) else {
            log::warn!("roster key '{}' vanished before write-back", selection.key);
            return None;
        };
        if selection.index >= list.len() {
            log::warn!(
                "roster position {} under '{}' vanished before write-back",
                selection.index,
                selection.key
            );
            return None;
        }

        if updated.name == selection.key {
            list[selection.index] = updated;
            return Some(selection.clone());
        }

        list.remove(selection.index);
        if list.is_empty() {
            self.entries.remove(&selection.key);
        }
        Some(self.append_caught(updated))
    }
}

/// Everything a trainer carries between battles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub trainer: String,
    #[serde(default)]
    pub roster: Roster,
    #[serde(default)]
    pub inventory: Inventory,
}

impl Session {
    pub fn new(trainer: impl Into<String>, inventory: Inventory) -> Self {
        Self {
            trainer: trainer.into(),
            roster: Roster::new(),
            inventory,
        }
    }
}

/// Loads and saves sessions by trainer name.
pub trait SessionStore {
    /// A trainer with nothing saved gets `None`.
    fn load(&self, trainer: &str) -> Result<Option<Session>, StoreError>;
    fn save(&self, session: &Session) -> Result<(), StoreError>;
}

/// Turn a trainer name into a safe file stem.
pub fn sanitize_trainer_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    match cleaned.trim_matches('_') {
        "" => "trainer".to_string(),
        stem => stem.to_string(),
    }
}

/// One pretty-printed JSON file per trainer inside a directory.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    dir: PathBuf,
}

impl JsonSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, trainer: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_trainer_name(trainer)))
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self, trainer: &str) -> Result<Option<Session>, StoreError> {
        let path = self.path_for(trainer);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("no saved session at {}", path.display());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let session = serde_json::from_str(&content)?;
        log::debug!("loaded session from {}", path.display());
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&session.trainer);
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&path, content)?;
        log::debug!("saved session to {}", path.display());
        Ok(())
    }
}
