use crate::battle::{Battle, BattleEvent, BattleServices};
use crate::builder::fetch_and_build;
use crate::capture::Inventory;
use crate::creature::Creature;
use crate::data::{DataSource, LocalDataSource};
use crate::errors::{BattleResult, DataError, DataResult};
use crate::progression::FixedClock;
use crate::prompt::{Choice, Prompt, Prompter};
use crate::rng::ScriptedRng;
use crate::session::Session;
use schema::{
    AbilityData, CreatureData, EvolutionChain, EvolutionDetail, EvolutionLink, GrowthCurve,
    LevelThreshold, MoveData, ResourceRef, StatValue,
};
use std::collections::VecDeque;
use std::io;
use std::time::{Duration, SystemTime};

pub const GROWTH: &str = "growth/test";

pub fn now() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

pub fn hours_ago(hours: u64) -> SystemTime {
    now() - Duration::from_secs(hours * 3600)
}

/// Enough values for one random supply grant, every ball going to Pokeballs.
pub fn supply_picks() -> Vec<f64> {
    vec![0.1; 7]
}

/// A builder for species records in the test dex.
///
/// # Example
/// ```
/// let pidgey = SpeciesBuilder::new(16, "pidgey", 50)
///     .with_stats(10, 45, 40, 56)
///     .with_moves(&["gust"])
///     .build();
/// ```
pub struct SpeciesBuilder {
    data: CreatureData,
}

impl SpeciesBuilder {
    pub fn new(id: u32, name: &str, base_experience: u32) -> Self {
        Self {
            data: CreatureData {
                id,
                name: name.to_string(),
                species: name.to_string(),
                base_experience,
                height: 5,
                weight: 50,
                stats: vec![],
                types: vec!["normal".to_string()],
                abilities: vec![AbilityData {
                    name: "run-away".to_string(),
                    is_hidden: false,
                    slot: 1,
                }],
                held_items: vec![],
                moves: vec![],
                growth_curve: ResourceRef::new(GROWTH),
                evolution_chain: ResourceRef::default(),
            },
        }
    }

    /// Sets hp, attack, defense and speed; the special stats stay at 0.
    pub fn with_stats(mut self, hp: u32, attack: u32, defense: u32, speed: u32) -> Self {
        self.data.stats = [("hp", hp), ("attack", attack), ("defense", defense), ("speed", speed)]
            .iter()
            .map(|(stat, base_stat)| StatValue {
                stat: stat.to_string(),
                base_stat: *base_stat,
            })
            .collect();
        self
    }

    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.data.moves = moves.iter().map(|name| ResourceRef::new(format!("move/{}", name))).collect();
        self
    }

    pub fn with_chain(mut self, chain: &str) -> Self {
        self.data.evolution_chain = ResourceRef::new(chain);
        self
    }

    pub fn build(self) -> CreatureData {
        self.data
    }
}

fn move_data(name: &str, power: u32, accuracy: u8) -> MoveData {
    MoveData {
        name: name.to_string(),
        power: Some(power),
        accuracy: Some(accuracy),
        priority: 0,
        move_type: "normal".to_string(),
    }
}

/// charmander and bulbasaur for the player, pidgey and golem for the wild
/// side, ivysaur as bulbasaur's evolution at level 16.
pub fn test_dex() -> LocalDataSource {
    LocalDataSource::new()
        .with_creature(
            SpeciesBuilder::new(4, "charmander", 62)
                .with_stats(39, 52, 43, 65)
                .with_moves(&["scratch"])
                .build(),
        )
        .with_creature(
            SpeciesBuilder::new(1, "bulbasaur", 64)
                .with_stats(45, 49, 49, 45)
                .with_moves(&["tackle"])
                .with_chain("chain/1")
                .build(),
        )
        .with_creature(
            SpeciesBuilder::new(2, "ivysaur", 142)
                .with_stats(60, 62, 63, 60)
                .with_moves(&["tackle", "vine-whip"])
                .with_chain("chain/1")
                .build(),
        )
        .with_creature(
            SpeciesBuilder::new(16, "pidgey", 50)
                .with_stats(10, 45, 40, 56)
                .with_moves(&["gust"])
                .build(),
        )
        .with_creature(
            SpeciesBuilder::new(76, "golem", 100)
                .with_stats(80, 400, 130, 100)
                .with_moves(&["rock-slide"])
                .build(),
        )
        .with_move("move/scratch", move_data("scratch", 40, 100))
        .with_move("move/tackle", move_data("tackle", 40, 100))
        .with_move("move/vine-whip", move_data("vine-whip", 45, 100))
        .with_move("move/gust", move_data("gust", 40, 100))
        .with_move("move/rock-slide", move_data("rock-slide", 300, 90))
        .with_growth_curve(
            GROWTH,
            GrowthCurve {
                levels: [(1, 0), (5, 100), (10, 400), (16, 1000), (20, 2000)]
                    .iter()
                    .map(|&(level, experience)| LevelThreshold { level, experience })
                    .collect(),
            },
        )
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

/// A roster creature built from the dex and moved to the given level and
/// experience, with no recorded gain.
pub fn roster_creature(dex: &LocalDataSource, name: &str, level: u8, experience: u32) -> Creature {
    let mut creature = match fetch_and_build(dex, name, now()) {
        Ok(creature) => creature,
        Err(err) => panic!("failed to build {} from the test dex: {}", name, err),
    };
    creature.level = level;
    creature.experience = experience;
    creature.last_gain = None;
    creature.date_caught = Some(hours_ago(48));
    creature
}

pub fn starting_inventory() -> Inventory {
    Inventory {
        poke_balls: 5,
        great_balls: 2,
        ultra_balls: 1,
        potions: 1,
    }
}

/// A session holding the given creatures.
pub fn session_with(creatures: Vec<Creature>) -> Session {
    let mut session = Session::new("red", starting_inventory());
    for creature in creatures {
        session.roster.append_caught(creature);
    }
    session
}

/// Replays fixed answers and records every prompt and event.
pub struct ScriptedPrompter {
    answers: VecDeque<Choice>,
    pub prompts: Vec<Prompt>,
    pub notified: Vec<BattleEvent>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Choice>) -> Self {
        Self {
            answers: answers.into(),
            prompts: Vec::new(),
            notified: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt_choice(&mut self, prompt: &Prompt) -> io::Result<Choice> {
        self.prompts.push(prompt.clone());
        match self.answers.pop_front() {
            Some(choice) => Ok(choice),
            None => panic!("ScriptedPrompter ran out of answers at prompt '{}'", prompt.message),
        }
    }

    fn notify(&mut self, event: &BattleEvent) {
        self.notified.push(event.clone());
    }
}

/// Wraps a dex and fails every growth curve lookup, as a dropped connection
/// would.
pub struct FailingDataSource {
    pub inner: LocalDataSource,
}

impl DataSource for FailingDataSource {
    fn fetch_creature(&self, name: &str) -> DataResult<CreatureData> {
        self.inner.fetch_creature(name)
    }

    fn fetch_move(&self, reference: &ResourceRef) -> DataResult<MoveData> {
        self.inner.fetch_move(reference)
    }

    fn fetch_growth_curve(&self, reference: &ResourceRef) -> DataResult<GrowthCurve> {
        Err(DataError::Transport(format!("connection reset fetching {}", reference)))
    }

    fn fetch_evolution_chain(&self, reference: &ResourceRef) -> DataResult<EvolutionChain> {
        self.inner.fetch_evolution_chain(reference)
    }
}

/// Everything one battle test needs, owned in one place.
pub struct BattleHarness {
    pub dex: LocalDataSource,
    pub session: Session,
    pub rng: ScriptedRng,
    pub clock: FixedClock,
    pub prompter: ScriptedPrompter,
}

impl BattleHarness {
    pub fn new(session: Session, rng_values: Vec<f64>, answers: Vec<Choice>) -> Self {
        Self {
            dex: test_dex(),
            session,
            rng: ScriptedRng::new(rng_values),
            clock: FixedClock(now()),
            prompter: ScriptedPrompter::new(answers),
        }
    }

    /// Run a full battle against `wild` using the harness dex.
    pub fn run(&mut self, wild: &str) -> BattleResult<crate::battle::BattleReport> {
        let services = BattleServices {
            data: &self.dex,
            rng: &mut self.rng,
            clock: &self.clock,
        };
        Battle::encounter(&mut self.session, services, &mut self.prompter, wild)?.run()
    }

    /// Run a full battle whose data lookups go through `data`.
    pub fn run_with(
        &mut self,
        data: &dyn DataSource,
        wild: Creature,
    ) -> BattleResult<crate::battle::BattleReport> {
        let services = BattleServices {
            data,
            rng: &mut self.rng,
            clock: &self.clock,
        };
        Battle::start(&mut self.session, services, &mut self.prompter, wild)?.run()
    }
}

pub fn count_grants(events: &[BattleEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, BattleEvent::SuppliesGranted(_)))
        .count()
}
