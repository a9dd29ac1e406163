use crate::battle::state::{BattleEvent, BattleOutcome, BattlePhase, EventBus, HpStatus};
use crate::builder::fetch_and_build;
use crate::capture::{attempt_capture, BallKind, StatusCondition, SupplyKind};
use crate::combat::{
    available_moves, choose_wild_move, decide_first, resolve_attack, AttackOutcome, Combatant,
    Side,
};
use crate::creature::{Creature, MoveEntry};
use crate::data::DataSource;
use crate::errors::{BattleError, BattleResult, CaptureError};
use crate::progression::{grant_random_supplies, Clock, ExperienceReport, ProgressionEngine};
use crate::prompt::{Choice, Prompt, Prompter};
use crate::rng::RandomSource;
use crate::session::{RosterSelection, Session};

/// External capabilities a battle runs against.
pub struct BattleServices<'a> {
    pub data: &'a dyn DataSource,
    pub rng: &'a mut dyn RandomSource,
    pub clock: &'a dyn Clock,
}

/// What a finished battle hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub rounds: u32,
    /// Roster entry that fought, if one was sent out.
    pub fighter: Option<RosterSelection>,
    pub events: Vec<BattleEvent>,
}

/// The roster member sent out, and where to write it back.
struct BoundPlayer {
    selection: RosterSelection,
    combatant: Combatant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Fight,
    Catch,
    Run,
    Item,
}

impl Action {
    const MENU: [Action; 4] = [Action::Fight, Action::Catch, Action::Run, Action::Item];

    fn label(self) -> &'static str {
        match self {
            Action::Fight => "Fight",
            Action::Catch => "Catch",
            Action::Run => "Run",
            Action::Item => "Item",
        }
    }
}

/// One wild encounter, driven round by round.
///
/// The battle borrows the session for its whole run. Inventory spending is
/// applied immediately. The fighting creature is written back to the roster
/// whenever its progression changes and when the battle ends with it bound.
pub struct Battle<'a> {
    session: &'a mut Session,
    data: &'a dyn DataSource,
    rng: &'a mut dyn RandomSource,
    clock: &'a dyn Clock,
    prompter: &'a mut dyn Prompter,

    wild: Combatant,
    wild_status: StatusCondition,
    player: Option<BoundPlayer>,
    phase: BattlePhase,
    round: u32,
    bus: EventBus,
}

impl<'a> Battle<'a> {
    /// Fetch the wild creature by name and start a battle against it.
    pub fn encounter(
        session: &'a mut Session,
        services: BattleServices<'a>,
        prompter: &'a mut dyn Prompter,
        wild_name: &str,
    ) -> BattleResult<Self> {
        if session.roster.is_empty() {
            return Err(BattleError::NoRosterAvailable);
        }
        let wild = fetch_and_build(services.data, wild_name, services.clock.now())?;
        Self::start(session, services, prompter, wild)
    }

    /// Start a battle against an already built wild creature.
    pub fn start(
        session: &'a mut Session,
        services: BattleServices<'a>,
        prompter: &'a mut dyn Prompter,
        mut wild: Creature,
    ) -> BattleResult<Self> {
        if session.roster.is_empty() {
            return Err(BattleError::NoRosterAvailable);
        }
        wild.date_caught = None;

        let mut battle = Self {
            session,
            data: services.data,
            rng: services.rng,
            clock: services.clock,
            prompter,
            wild: Combatant::new(wild),
            wild_status: StatusCondition::None,
            player: None,
            phase: BattlePhase::AwaitingAction,
            round: 0,
            bus: EventBus::new(),
        };
        let name = battle.wild.creature.name.clone();
        log::info!("battle started against wild {}", name);
        battle.emit(BattleEvent::BattleStarted { wild: name });
        Ok(battle)
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn wild(&self) -> &Combatant {
        &self.wild
    }

    pub fn wild_status(&self) -> StatusCondition {
        self.wild_status
    }

    pub fn player(&self) -> Option<&Combatant> {
        self.player.as_ref().map(|bound| &bound.combatant)
    }

    pub fn events(&self) -> &[BattleEvent] {
        self.bus.events()
    }

    /// Play rounds until the battle ends.
    pub fn run(mut self) -> BattleResult<BattleReport> {
        let outcome = loop {
            if let BattlePhase::Finished(outcome) = self.phase {
                break outcome;
            }
            self.play_round()?;
        };
        log::info!(
            "battle against {} ended after {} rounds: {:?}",
            self.wild.creature.name,
            self.round,
            outcome
        );
        Ok(BattleReport {
            outcome,
            rounds: self.round,
            fighter: self.player.map(|bound| bound.selection),
            events: self.bus.into_events(),
        })
    }

    /// Show the status, take one action and resolve it.
    pub fn play_round(&mut self) -> BattleResult<BattlePhase> {
        if self.phase.is_finished() {
            return Ok(self.phase);
        }
        self.round += 1;
        self.phase = BattlePhase::AwaitingAction;

        let status = BattleEvent::RoundStarted {
            round: self.round,
            player: self.player.as_ref().map(|bound| hp_status(&bound.combatant)),
            wild: hp_status(&self.wild),
        };
        self.emit(status);

        let menu = Prompt::new(
            "Choose action > ",
            Action::MENU.iter().map(|action| action.label().to_string()).collect(),
        );
        let action = match self.prompter.prompt_choice(&menu)? {
            Choice::Cancelled => {
                self.emit(BattleEvent::Cancelled);
                return Ok(self.finish(BattleOutcome::Cancelled));
            }
            Choice::Selected(number) => option_at(&Action::MENU, number),
        };

        match action {
            Some(Action::Fight) => self.fight()?,
            Some(Action::Catch) => self.catch()?,
            Some(Action::Run) => self.flee(),
            Some(Action::Item) => self.use_item()?,
            None => log::warn!("prompter returned an option outside the action menu"),
        }

        if !self.phase.is_finished() {
            self.phase = BattlePhase::AwaitingAction;
        }
        Ok(self.phase)
    }

    fn fight(&mut self) -> BattleResult<()> {
        self.phase = BattlePhase::Fighting;
        if !self.bind_player()? {
            return Ok(());
        }
        let Some(player_move) = self.choose_player_move()? else {
            return Ok(());
        };
        let wild_move = choose_wild_move(&self.wild.creature, &mut *self.rng);

        let Some(bound) = self.player.as_ref() else {
            return Ok(());
        };
        let first = decide_first(
            &player_move,
            &wild_move,
            &bound.combatant.creature,
            &self.wild.creature,
            &mut *self.rng,
        );

        for side in [first, first.opponent()] {
            let move_used = match side {
                Side::Player => &player_move,
                Side::Wild => &wild_move,
            };
            self.strike(side, move_used);
            if self.resolve_faints()? {
                break;
            }
        }
        Ok(())
    }

    fn catch(&mut self) -> BattleResult<()> {
        self.phase = BattlePhase::Catching;
        let inventory = &self.session.inventory;
        let options = BallKind::ALL
            .iter()
            .map(|ball| format!("{} (x{})", ball, inventory.count(ball.supply())))
            .collect();
        let prompt = Prompt::new("Ball > ", options).with_header("Choose ball:");
        let ball = match self.prompter.prompt_choice(&prompt)? {
            Choice::Cancelled => return Ok(()),
            Choice::Selected(number) => match option_at(&BallKind::ALL, number) {
                Some(ball) => ball,
                None => return Ok(()),
            },
        };

        let attempt = match attempt_capture(
            &mut self.session.inventory,
            ball,
            &self.wild,
            self.wild_status,
            &mut *self.rng,
        ) {
            Ok(attempt) => attempt,
            Err(CaptureError::OutOfStock(kind)) => {
                self.emit(BattleEvent::NoSupplies { kind });
                return Ok(());
            }
        };
        self.emit(BattleEvent::CaptureAttempted {
            ball,
            chance_percent: (attempt.chance * 100.0).round() as u32,
        });

        let name = self.wild.creature.name.clone();
        if !attempt.caught {
            self.emit(BattleEvent::EscapedBall { name });
            if self.player.is_some() {
                let wild_move = choose_wild_move(&self.wild.creature, &mut *self.rng);
                self.strike(Side::Wild, &wild_move);
                self.resolve_faints()?;
            }
            return Ok(());
        }

        self.emit(BattleEvent::Caught { name });
        let mut caught = self.wild.creature.clone();
        caught.date_caught = Some(self.clock.now());
        self.session.roster.append_caught(caught);

        let base_experience = self.wild.creature.base_experience;
        if let Some(mut creature) = self.bound_creature() {
            let name = creature.name.clone();
            let report = self.progression().award_capture_xp(&mut creature, base_experience)?;
            self.report_experience(&name, &report);
            self.commit_player(creature);
        }
        self.grant("Catch");
        self.finish(BattleOutcome::Caught);
        Ok(())
    }

    fn flee(&mut self) {
        self.phase = BattlePhase::Fleeing;
        self.emit(BattleEvent::Fled);
        self.sync_player();
        self.finish(BattleOutcome::Fled);
    }

    fn use_item(&mut self) -> BattleResult<()> {
        self.phase = BattlePhase::ItemUse;
        let potions = self.session.inventory.count(SupplyKind::Potion);
        if potions == 0 {
            self.emit(BattleEvent::NoSupplies {
                kind: SupplyKind::Potion,
            });
            return Ok(());
        }

        const STATUSES: [StatusCondition; 2] = [StatusCondition::Sleep, StatusCondition::Paralysis];
        let prompt = Prompt::new("Status > ", vec!["Sleep".to_string(), "Paralysis".to_string()])
            .with_header(format!("Choose status (Potion x{}):", potions));
        let status = match self.prompter.prompt_choice(&prompt)? {
            Choice::Cancelled => return Ok(()),
            Choice::Selected(number) => match option_at(&STATUSES, number) {
                Some(status) => status,
                None => return Ok(()),
            },
        };

        if let Err(CaptureError::OutOfStock(kind)) = self.session.inventory.take(SupplyKind::Potion) {
            self.emit(BattleEvent::NoSupplies { kind });
            return Ok(());
        }
        self.wild_status = status;
        let name = self.wild.creature.name.clone();
        self.emit(BattleEvent::StatusApplied { name, status });
        Ok(())
    }

    /// Ask for a roster member the first time one is needed, applying rest
    /// experience before it enters. Returns false if the player backed out.
    fn bind_player(&mut self) -> BattleResult<bool> {
        if self.player.is_some() {
            return Ok(true);
        }

        let selections = self.session.roster.selections();
        if selections.is_empty() {
            return Err(BattleError::NoRosterAvailable);
        }
        let (keys, labels): (Vec<RosterSelection>, Vec<String>) = selections.into_iter().unzip();
        let prompt = Prompt::new("Selection > ", labels).with_header("Choose your Pokemon:");
        let selection = match self.prompter.prompt_choice(&prompt)? {
            Choice::Cancelled => {
                self.finish(BattleOutcome::Cancelled);
                return Ok(false);
            }
            Choice::Selected(number) => match option_at(&keys, number) {
                Some(selection) => selection,
                None => return Ok(false),
            },
        };

        let mut creature = self
            .session
            .roster
            .get(&selection)
            .cloned()
            .ok_or(BattleError::NoRosterAvailable)?;
        let name = creature.name.clone();
        let rested = self.progression().apply_rest_xp(&mut creature)?;
        if let Some(report) = &rested {
            self.emit(BattleEvent::RestExperience {
                name: name.clone(),
                gained: report.gained,
            });
            self.report_progress(&name, report);
        }

        self.emit(BattleEvent::PlayerSelected {
            name: creature.name.clone(),
            level: creature.level,
        });
        self.player = Some(BoundPlayer {
            selection,
            combatant: Combatant::new(creature),
        });
        // Rest progress and any grant it paid are committed together, so a
        // later cancel or error cannot replay them.
        if rested.is_some() {
            self.sync_player();
        }
        Ok(true)
    }

    fn choose_player_move(&mut self) -> BattleResult<Option<MoveEntry>> {
        let Some(bound) = self.player.as_ref() else {
            return Ok(None);
        };
        let moves = available_moves(&bound.combatant.creature);
        let prompt = Prompt::new("Move > ", moves.iter().map(ToString::to_string).collect())
            .with_header("Choose a move:");
        match self.prompter.prompt_choice(&prompt)? {
            Choice::Selected(number) => Ok(option_at(&moves, number)),
            Choice::Cancelled => Ok(None),
        }
    }

    /// One side attacks the other. Does nothing without a bound player.
    fn strike(&mut self, side: Side, move_used: &MoveEntry) {
        let Some(bound) = self.player.as_mut() else {
            return;
        };
        let (attacker, defender) = match side {
            Side::Player => (&bound.combatant, &mut self.wild),
            Side::Wild => (&self.wild, &mut bound.combatant),
        };
        let attacker_name = attacker.creature.name.clone();
        let outcome = resolve_attack(attacker, defender, move_used, &mut *self.rng);

        let event = match outcome {
            AttackOutcome::CannotAct => return,
            AttackOutcome::Missed => BattleEvent::MoveMissed {
                side,
                attacker: attacker_name,
                move_name: move_used.name.clone(),
            },
            AttackOutcome::Hit {
                damage,
                remaining_hp,
            } => BattleEvent::MoveHit {
                side,
                attacker: attacker_name,
                move_name: move_used.name.clone(),
                damage,
                remaining_hp,
            },
        };
        self.emit(event);
    }

    /// Settle a faint on either side. Returns true if the battle ended.
    fn resolve_faints(&mut self) -> BattleResult<bool> {
        let Some(bound) = self.player.as_ref() else {
            return Ok(false);
        };

        if bound.combatant.is_fainted() {
            let name = bound.combatant.creature.name.clone();
            self.emit(BattleEvent::Fainted {
                side: Side::Player,
                name,
            });
            self.sync_player();
            self.finish(BattleOutcome::PlayerFainted);
            return Ok(true);
        }

        if self.wild.is_fainted() {
            self.emit(BattleEvent::Fainted {
                side: Side::Wild,
                name: self.wild.creature.name.clone(),
            });
            let base_experience = self.wild.creature.base_experience;
            if let Some(mut creature) = self.bound_creature() {
                let name = creature.name.clone();
                let report = self.progression().award_battle_xp(&mut creature, base_experience)?;
                self.report_experience(&name, &report);
                self.commit_player(creature);
            }
            self.grant("Battle win");
            self.finish(BattleOutcome::WildFainted);
            return Ok(true);
        }

        Ok(false)
    }

    fn progression(&mut self) -> ProgressionEngine<'_> {
        ProgressionEngine::new(
            self.data,
            &mut *self.rng,
            &mut self.session.inventory,
            self.clock.now(),
        )
    }

    /// A working copy of the bound creature for progression to mutate.
    fn bound_creature(&self) -> Option<Creature> {
        self.player
            .as_ref()
            .map(|bound| bound.combatant.creature.clone())
    }

    /// Install a progressed creature as the fighter and write it back.
    fn commit_player(&mut self, creature: Creature) {
        if let Some(bound) = self.player.as_mut() {
            bound.combatant.creature = creature;
        }
        self.sync_player();
    }

    /// Write the fighter back to the roster and follow it if it moved.
    fn sync_player(&mut self) {
        let Some(bound) = self.player.as_mut() else {
            return;
        };
        if let Some(moved) = self
            .session
            .roster
            .sync(&bound.selection, bound.combatant.creature.clone())
        {
            bound.selection = moved;
        }
    }

    /// Events for an experience gain, named as the creature was before it.
    fn report_experience(&mut self, name: &str, report: &ExperienceReport) {
        if report.gained == 0 {
            return;
        }
        self.emit(BattleEvent::ExperienceGained {
            name: name.to_string(),
            amount: report.gained,
        });
        self.report_progress(name, report);
    }

    fn report_progress(&mut self, name: &str, report: &ExperienceReport) {
        if report.leveled_up() {
            self.emit(BattleEvent::LevelUp {
                name: name.to_string(),
                level: report.new_level,
            });
        }
        if let Some(evolution) = &report.evolution {
            self.emit(BattleEvent::Evolved {
                from: evolution.from.clone(),
                into: evolution.into.clone(),
            });
        }
        if let Some(grant) = &report.supplies {
            self.emit(BattleEvent::SuppliesGranted(grant.clone()));
        }
    }

    fn grant(&mut self, reason: &str) {
        let grant = grant_random_supplies(&mut self.session.inventory, &mut *self.rng, reason);
        self.emit(BattleEvent::SuppliesGranted(grant));
    }

    fn finish(&mut self, outcome: BattleOutcome) -> BattlePhase {
        self.phase = BattlePhase::Finished(outcome);
        self.phase
    }

    fn emit(&mut self, event: BattleEvent) {
        self.prompter.notify(&event);
        self.bus.push(event);
    }
}

/// The item behind a 1-based menu number.
fn option_at<T: Clone>(items: &[T], number: usize) -> Option<T> {
    number.checked_sub(1).and_then(|index| items.get(index)).cloned()
}

fn hp_status(combatant: &Combatant) -> HpStatus {
    HpStatus {
        name: combatant.creature.name.clone(),
        current: combatant.current_hp(),
        max: combatant.max_hp(),
    }
}
