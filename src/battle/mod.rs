pub mod orchestrator;
pub mod state;

#[cfg(test)]
mod tests;

pub use orchestrator::{Battle, BattleReport, BattleServices};
pub use state::{BattleEvent, BattleOutcome, BattlePhase, EventBus, HpStatus};
