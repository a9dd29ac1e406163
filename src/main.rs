use clap::Parser;
use pokedex_battle::builder::fetch_and_build;
use pokedex_battle::commands::{battle_and_save, help_text, inspect, pokedex_listing};
use pokedex_battle::config::GameConfig;
use pokedex_battle::prompt::{Choice, LinePrompter, Prompt, Prompter};
use pokedex_battle::{
    parse_command, BattleError, Clock, Command, DataSource, JsonSessionStore, LocalDataSource,
    RandomSource, SeededRng, Session, SessionStore, SystemClock,
};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;

const STARTERS: [&str; 3] = ["bulbasaur", "charmander", "squirtle"];

#[derive(Parser, Debug)]
#[command(name = "pokedex-battle")]
#[command(about = "Battle and catch wild creatures from the terminal")]
struct Args {
    /// Path to a RON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible battles
    #[arg(long)]
    seed: Option<u64>,

    /// Trainer whose session to load
    #[arg(short, long)]
    trainer: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config_path = args
        .config
        .or_else(GameConfig::default_path)
        .unwrap_or_else(|| PathBuf::from("config.ron"));
    let config = GameConfig::load(&config_path)?;

    let level = config.log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let dex = LocalDataSource::load(&config.data_file)?;
    let store = JsonSessionStore::new(config.save_dir()?);
    let trainer = args.trainer.unwrap_or_else(|| config.trainer.clone());
    let mut session = store
        .load(&trainer)?
        .unwrap_or_else(|| Session::new(trainer.as_str(), config.starting_inventory));

    let mut rng = match args.seed.or(config.seed) {
        Some(seed) => SeededRng::new(seed),
        None => SeededRng::from_entropy(),
    };
    let clock = SystemClock;
    let stdin = io::stdin();
    let mut prompter = LinePrompter::new(stdin.lock(), io::stdout());

    if session.roster.is_empty() && !choose_starter(&mut session, &dex, &clock, &mut prompter)? {
        return Ok(());
    }
    store.save(&session)?;

    while let Some(line) = prompter.read_command("Pokedex > ")? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match command {
            Command::Battle(name) => {
                let wild = match name {
                    Some(name) => name,
                    None => match random_wild(&dex, &mut rng) {
                        Some(name) => name,
                        None => {
                            println!("The dex has no creatures to battle.");
                            continue;
                        }
                    },
                };
                let result = battle_and_save(
                    &mut session,
                    &store,
                    &dex,
                    &mut rng,
                    &clock,
                    &mut prompter,
                    &wild,
                );
                match result {
                    Ok(report) => {
                        log::info!("battle finished: {:?} in {} rounds", report.outcome, report.rounds);
                    }
                    Err(BattleError::NoRosterAvailable) => println!("No Pokemon in your Pokedex"),
                    Err(BattleError::Input(err)) => return Err(err.into()),
                    Err(err) => println!("{}", err),
                }
            }
            Command::Pokedex => print!("{}", pokedex_listing(&session.roster)),
            Command::Inspect(name) => match inspect(&session.roster, &name) {
                Some(view) => println!("{}", view),
                None => println!("You have not caught that pokemon"),
            },
            Command::Help => print!("{}", help_text()),
            Command::Exit => {
                println!("Closing the Pokedex... Goodbye!");
                break;
            }
        }
    }
    Ok(())
}

fn random_wild(dex: &LocalDataSource, rng: &mut dyn RandomSource) -> Option<String> {
    let names = dex.creature_names();
    if names.is_empty() {
        return None;
    }
    names.get(rng.pick_index(names.len(), "wild encounter")).cloned()
}

/// Offer the three starters to a trainer with an empty roster. Returns false
/// if they backed out.
fn choose_starter<R: BufRead, W: Write>(
    session: &mut Session,
    dex: &dyn DataSource,
    clock: &dyn Clock,
    prompter: &mut LinePrompter<R, W>,
) -> Result<bool, Box<dyn Error>> {
    let prompt = Prompt::new(
        "Starter # > ",
        STARTERS.iter().map(|name| capitalize(name)).collect(),
    )
    .with_header("Choose your starter Pokemon:");

    let index = match prompter.prompt_choice(&prompt)? {
        Choice::Selected(number) if (1..=STARTERS.len()).contains(&number) => number - 1,
        _ => return Ok(false),
    };
    let starter = fetch_and_build(dex, STARTERS[index], clock.now())?;
    println!("Starter {} added to your Pokedex.", capitalize(&starter.name));
    session.roster.append_caught(starter);
    Ok(true)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
