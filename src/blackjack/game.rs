use std::fmt;

use crate::blackjack::actor::Actor;
use crate::blackjack::shoe::Shoe;
use crate::blackjack::*;
use crate::error::{GameError, SimulationError};

pub type Episode = Vec<(StateKey, Action)>;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Outcome {
    Loss,
    Draw,
    Win,
}

// Everything a finished round leaves behind.
#[derive(Clone, Debug)]
pub struct Round {
    pub episode: Episode,
    pub outcome: Outcome,
    pub player_total: u32,
    pub house_total: u32,
    // Cards handed out during the round.
    pub issued: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Dealing,
    PlayerTurn,
    PlayerBust,
    DealerTurn,
    Settlement,
    Done,
}

// Receives a human-readable account of each round. Never consulted for the result.
pub trait Narrator {
    fn narrate(&mut self, line: &str);
}

pub struct LogNarrator;

impl Narrator for LogNarrator {
    fn narrate(&mut self, line: &str) {
        log::info!("{}", line);
    }
}

// Per-episode update hook for online learning.
pub trait Learner {
    fn learn(&mut self, episode: &[(StateKey, Action)], outcome: Outcome);
}

#[derive(Debug, Default)]
pub struct Report {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    // Only filled when no learner consumes the episodes.
    pub episodes: Vec<Round>,
}

pub struct Game {
    shoe: Shoe,
    narrator: Option<Box<dyn Narrator>>,
}

impl Outcome {
    pub fn reward(&self) -> f64 {
        match self {
            Outcome::Loss => -1.0,
            Outcome::Draw => 0.0,
            Outcome::Win => 1.0,
        }
    }

    pub fn settle(player_total: u32, house_total: u32) -> Outcome {
        if player_total > 21 {
            Outcome::Loss
        } else if player_total > house_total || house_total > 21 {
            Outcome::Win
        } else if player_total == house_total {
            Outcome::Draw
        } else {
            Outcome::Loss
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Loss => write!(f, "player loses"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::Win => write!(f, "player wins"),
        }
    }
}

impl Report {
    pub fn rounds(&self) -> usize {
        self.wins + self.draws + self.losses
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Win => self.wins += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        match self.rounds() {
            0 => 0.0,
            n => self.wins as f64 / n as f64,
        }
    }

    pub fn non_loss_rate(&self) -> f64 {
        match self.rounds() {
            0 => 0.0,
            n => (self.wins + self.draws) as f64 / n as f64,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rounds: {} won, {} drawn, {} lost, win rate {:.2}, non-loss rate {:.2}",
            self.rounds(),
            self.wins,
            self.draws,
            self.losses,
            self.win_rate(),
            self.non_loss_rate()
        )
    }
}

impl Game {
    pub fn new(shoe: Shoe) -> Game {
        Game {
            shoe,
            narrator: None,
        }
    }

    pub fn set_narrator(&mut self, narrator: Option<Box<dyn Narrator>>) {
        self.narrator = narrator;
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    // Lines are only formatted when someone listens.
    fn narrate<F: FnOnce() -> String>(&mut self, line: F) {
        if let Some(narrator) = self.narrator.as_mut() {
            narrator.narrate(&line());
        }
    }

    fn deal(&mut self, actor: &mut Actor, n: usize) -> Result<usize, GameError> {
        let cards = self.shoe.issue(n)?;
        actor.receive(cards);
        self.narrate(|| format!("dealt {} card(s), {}", n, actor));
        Ok(n)
    }

    // Plays one round to completion. Only the player's decisions are recorded;
    // the house is not a learning subject.
    pub fn play_round(&mut self, player: &mut Actor, house: &mut Actor) -> Result<Round, GameError> {
        for actor in &[&*player, &*house] {
            if !actor.has_policy() {
                return Err(GameError::MissingPolicy(actor.role()));
            }
        }

        let mut episode = Episode::new();
        let mut issued = 0;
        let mut settled = (Outcome::Draw, 0, 0);
        let mut phase = Phase::Dealing;
        loop {
            phase = match phase {
                Phase::Dealing => {
                    debug_assert!(player.hand().is_empty() && house.hand().is_empty());
                    self.narrate(|| "new round".to_string());
                    issued += self.deal(player, 2)?;
                    issued += self.deal(house, 2)?;
                    Phase::PlayerTurn
                }
                Phase::PlayerTurn => {
                    let state = player.state(house);
                    let action = player.decide(&state)?;
                    episode.push((state, action));
                    self.narrate(|| format!("player chooses to {} on {}", action, state.total));
                    match action {
                        Action::Stand => Phase::DealerTurn,
                        Action::Hit => {
                            issued += self.deal(player, 1)?;
                            if player.total_value().0 > 21 {
                                Phase::PlayerBust
                            } else {
                                Phase::PlayerTurn
                            }
                        }
                    }
                }
                Phase::PlayerBust => {
                    self.narrate(|| format!("player busts with {}", player.total_value().0));
                    Phase::Settlement
                }
                Phase::DealerTurn => {
                    let state = house.state(player);
                    match house.decide(&state)? {
                        Action::Hit => {
                            issued += self.deal(house, 1)?;
                            Phase::DealerTurn
                        }
                        Action::Stand => Phase::Settlement,
                    }
                }
                Phase::Settlement => {
                    debug_assert_eq!(
                        self.shoe.undealt()
                            + self.shoe.discarded()
                            + player.hand().len()
                            + house.hand().len(),
                        DECK_SIZE
                    );
                    let (player_total, _) = player.total_value();
                    let (house_total, _) = house.total_value();
                    let outcome = Outcome::settle(player_total, house_total);
                    self.narrate(|| {
                        format!("{}, {} against {}", outcome, player_total, house_total)
                    });
                    settled = (outcome, player_total, house_total);
                    Phase::Done
                }
                Phase::Done => {
                    self.shoe.recycle(player.discharge());
                    self.shoe.recycle(house.discharge());
                    break;
                }
            };
        }

        let (outcome, player_total, house_total) = settled;
        Ok(Round {
            episode,
            outcome,
            player_total,
            house_total,
            issued,
        })
    }

    // Plays `rounds` rounds in order. With a learner every episode is handed
    // over as soon as its round ends; otherwise they are kept in the report.
    pub fn play_rounds(
        &mut self,
        player: &mut Actor,
        house: &mut Actor,
        rounds: usize,
        mut learner: Option<&mut dyn Learner>,
    ) -> Result<Report, SimulationError> {
        let mut report = Report::default();
        for round in 0..rounds {
            let played = self
                .play_round(player, house)
                .map_err(|source| SimulationError { round, source })?;
            report.record(played.outcome);
            log::trace!(
                "round {}: {} cards, {} against {}, {}",
                round,
                played.issued,
                played.player_total,
                played.house_total,
                played.outcome
            );
            match learner.as_mut() {
                Some(learner) => learner.learn(&played.episode, played.outcome),
                None => report.episodes.push(played),
            }
            if (round + 1) % 100_000 == 0 {
                log::debug!("{} of {} rounds played", round + 1, rounds);
            }
        }
        log::info!("{}", report);
        Ok(report)
    }
}
