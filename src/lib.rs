// In: src/lib.rs

//! Pokedex Battle Engine
//!
//! Turn-based wild encounters: combat exchanges, ball throws, and the
//! experience, leveling and evolution rules that follow from them. Creature
//! data, randomness, time, input and storage all arrive through injected
//! capabilities so the whole engine can be driven deterministically.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod builder;
pub mod capture;
pub mod combat;
pub mod commands;
pub mod config;
pub mod creature;
pub mod data;
pub mod errors;
pub mod probability;
pub mod progression;
pub mod prompt;
pub mod rng;
pub mod session;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Records returned by the data service.
pub use schema::{
    AbilityData, CreatureData, EvolutionChain, EvolutionDetail, EvolutionLink, GrowthCurve,
    LevelThreshold, MoveData, ResourceRef, StatName, StatValue,
};

// --- From this crate's modules (`src/`) ---

// The battle loop and what it reports.
pub use battle::{Battle, BattleEvent, BattleOutcome, BattlePhase, BattleReport, BattleServices};

// Resolvers.
pub use capture::{attempt_capture, capture_chance, BallKind, Inventory, StatusCondition};
pub use combat::{calculate_damage, decide_first, resolve_attack, Combatant, Side};
pub use probability::catch_probability;
pub use progression::{Clock, ExperienceReport, FixedClock, ProgressionEngine, SystemClock};

// Between-battle commands.
pub use commands::{parse_command, Command, CommandError};

// Records and capabilities.
pub use creature::{BaseStats, Creature, MoveEntry};
pub use data::{DataSource, LocalDataSource};
pub use prompt::{Choice, LinePrompter, Prompt, Prompter};
pub use rng::{RandomSource, ScriptedRng, SeededRng};
pub use session::{JsonSessionStore, Roster, RosterSelection, Session, SessionStore};

// Crate-specific error and result types.
pub use errors::{
    BattleError, BattleResult, CaptureError, ConfigError, DataError, DataResult, StoreError,
};
