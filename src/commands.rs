//! The between-battles command prompt: parsing a typed line and rendering the
//! read-only views of the roster.

use crate::battle::{Battle, BattleReport, BattleServices};
use crate::data::DataSource;
use crate::errors::BattleResult;
use crate::progression::Clock;
use crate::prompt::Prompter;
use crate::rng::RandomSource;
use crate::session::{Roster, Session, SessionStore};
use std::fmt::Write;
use thiserror::Error;

/// Commands the prompt understands, with their help text.
pub const COMMANDS: [(&str, &str); 5] = [
    ("battle", "Battle a wild Pokemon, by name or at random"),
    ("pokedex", "Show your Pokedex"),
    ("inspect", "Inspect a Pokemon you have caught"),
    ("help", "Display a help message"),
    ("exit", "Exit the Pokedex"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fight a named wild creature, or a random one from the dex.
    Battle(Option<String>),
    Pokedex,
    Inspect(String),
    Help,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command")]
    Unknown(String),
    #[error("Command {0} doesn't take arguments")]
    NoArguments(&'static str),
    #[error("Enter a Pokemon to {0}")]
    MissingArgument(&'static str),
    #[error("Command {0} takes a single Pokemon")]
    TooManyArguments(&'static str),
}

/// Parse one typed line. Blank input is `Ok(None)`; words are lowercased.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let lowered = line.to_lowercase();
    let mut words = lowered.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<String> = words.map(str::to_string).collect();

    let command = match name {
        "battle" => Command::Battle(at_most_one("battle", args)?),
        "inspect" => match at_most_one("inspect", args)? {
            Some(target) => Command::Inspect(target),
            None => return Err(CommandError::MissingArgument("inspect")),
        },
        "pokedex" => no_arguments("pokedex", &args, Command::Pokedex)?,
        "help" => no_arguments("help", &args, Command::Help)?,
        "exit" => no_arguments("exit", &args, Command::Exit)?,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn at_most_one(command: &'static str, mut args: Vec<String>) -> Result<Option<String>, CommandError> {
    if args.len() > 1 {
        return Err(CommandError::TooManyArguments(command));
    }
    Ok(args.pop())
}

fn no_arguments(
    command: &'static str,
    args: &[String],
    parsed: Command,
) -> Result<Command, CommandError> {
    if args.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::NoArguments(command))
    }
}

/// Run one encounter, then save the session whatever the outcome.
///
/// A failed save is logged; the battle's own result is what comes back.
pub fn battle_and_save(
    session: &mut Session,
    store: &dyn SessionStore,
    data: &dyn DataSource,
    rng: &mut dyn RandomSource,
    clock: &dyn Clock,
    prompter: &mut dyn Prompter,
    wild: &str,
) -> BattleResult<BattleReport> {
    let services = BattleServices { data, rng, clock };
    let result = Battle::encounter(session, services, prompter, wild).and_then(|battle| battle.run());
    if let Err(err) = store.save(session) {
        log::error!("could not save session for {}: {}", session.trainer, err);
    }
    result
}

pub fn help_text() -> String {
    let mut text = String::from("Welcome to the Pokedex!\nUsage:\n");
    for (name, description) in COMMANDS {
        let _ = writeln!(text, "{}: {}", name, description);
    }
    text
}

/// Every name in the roster with its count, or `-empty`.
pub fn pokedex_listing(roster: &Roster) -> String {
    let mut text = String::from("Your Pokedex:\n");
    let counts = roster.counts();
    if counts.is_empty() {
        text.push_str("-empty\n");
    }
    for (name, count) in counts {
        let _ = writeln!(text, "-{} (x{})", name, count);
    }
    text
}

/// The detailed view of the most recent creature filed under `name`.
pub fn inspect(roster: &Roster, name: &str) -> Option<String> {
    roster
        .entries(&name.to_lowercase())
        .last()
        .map(|creature| format!("{:#}", creature))
}
