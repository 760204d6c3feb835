pub mod actor;
pub mod game;
pub mod shoe;

use std::cell::RefCell;
use std::convert::TryFrom;
use std::fmt;

use prettytable::{Cell, Row, Table};
use rand::prelude::*;

use crate::config::Config;
use crate::error::GameError;
use crate::solver::monte_carlo::{greedy_policy, ActionValues, StateValues};

use actor::Actor;
use game::{Game, LogNarrator};
use shoe::Shoe;

pub const DECK_SIZE: usize = 52;

pub const RANKS: [Card; 13] = [
    Card::Ace,
    Card::Value(2),
    Card::Value(3),
    Card::Value(4),
    Card::Value(5),
    Card::Value(6),
    Card::Value(7),
    Card::Value(8),
    Card::Value(9),
    Card::Value(10),
    Card::Jack,
    Card::Queen,
    Card::King,
];

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Card {
    Ace,
    Value(u32),
    Jack,
    Queen,
    King,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Action {
    Hit,
    Stand,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Role {
    House,
    Player,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
}

// What an actor sees when it has to decide: the opponent's face-up card value,
// its own total and whether an ace is still counted as 11.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StateKey {
    pub dealer: u32,
    pub total: u32,
    pub usable_ace: bool,
}

pub type Policy = Box<dyn Fn(&StateKey) -> Action>;

impl Card {
    pub fn is_ace(&self) -> bool {
        match self {
            Card::Ace => true,
            _ => false,
        }
    }

    // Aces count low here; `Hand::total_value` decides when one counts as 11.
    pub fn value(&self) -> u32 {
        match self {
            Card::Ace => 1,
            Card::Value(v) => *v,
            Card::Jack | Card::Queen | Card::King => 10,
        }
    }

    // Four copies of every rank, in rank order.
    pub fn deck() -> Vec<Card> {
        RANKS.iter().cycle().take(DECK_SIZE).copied().collect()
    }
}

impl TryFrom<&str> for Card {
    type Error = GameError;

    fn try_from(symbol: &str) -> Result<Self, Self::Error> {
        match symbol.trim() {
            "A" => Ok(Card::Ace),
            "J" => Ok(Card::Jack),
            "Q" => Ok(Card::Queen),
            "K" => Ok(Card::King),
            s => match s.parse::<u32>() {
                Ok(v @ 2..=10) => Ok(Card::Value(v)),
                _ => Err(GameError::UnknownRank(symbol.to_string())),
            },
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Ace => write!(f, "A"),
            Card::Value(v) => write!(f, "{}", v),
            Card::Jack => write!(f, "J"),
            Card::Queen => write!(f, "Q"),
            Card::King => write!(f, "K"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Hit => write!(f, "hit"),
            Action::Stand => write!(f, "stand"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::House => write!(f, "house"),
            Role::Player => write!(f, "player"),
        }
    }
}

impl Hand {
    #[cfg(test)]
    pub fn from_cards(cards: Vec<Card>) -> Hand {
        Hand { cards }
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn first(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    // Returns the hand total and whether an ace is still counted as 11.
    // Recomputed from scratch on every call since a new card may force a soft ace down.
    pub fn total_value(&self) -> (u32, bool) {
        let mut soft_aces = 0;
        let mut total = 0;
        for card in &self.cards {
            if card.is_ace() {
                soft_aces += 1;
                total += 11;
            } else {
                total += card.value();
            }
        }

        while total > 21 && soft_aces > 0 {
            total -= 10;
            soft_aces -= 1;
        }
        (total, soft_aces > 0)
    }

    // Empties the hand, handing the cards back to the caller.
    pub fn take(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<String> = self.cards.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", symbols.join(", "))
    }
}

// The house draws to 17.
pub fn house_policy(state: &StateKey) -> Action {
    if state.total < 17 {
        Action::Hit
    } else {
        Action::Stand
    }
}

// A policy that only sticks on 20 or higher.
pub fn stick_at_20_policy(state: &StateKey) -> Action {
    if state.total < 20 {
        Action::Hit
    } else {
        Action::Stand
    }
}

// Coin-flip behaviour policy, used to visit both actions in every state.
pub fn random_policy(rng: StdRng) -> impl Fn(&StateKey) -> Action {
    let rng = RefCell::new(rng);
    move |_: &StateKey| {
        if rng.borrow_mut().gen::<bool>() {
            Action::Hit
        } else {
            Action::Stand
        }
    }
}

fn dealer_cells() -> Vec<Cell> {
    let mut header = vec![Cell::new(""), Cell::new("Ace?")];
    for dealer in 1..=10 {
        header.push(match dealer {
            1 => Cell::new("A"),
            v => Cell::new(&format!("{}", v)),
        });
    }
    header
}

fn print_state_grid<F: Fn(&StateKey) -> Cell>(usable_ace: bool, cell: F) {
    let mut table = Table::new();
    table.add_row(Row::new(dealer_cells()));

    for total in 12..=21 {
        let mut cells = vec![
            Cell::new(&format!("{}", total)),
            Cell::new(if usable_ace { "Y" } else { "N" }),
        ];
        for dealer in 1..=10 {
            cells.push(cell(&StateKey {
                dealer,
                total,
                usable_ace,
            }));
        }
        table.add_row(Row::new(cells));
    }
    table.printstd();
}

pub fn print_state_values(values: &StateValues, usable_ace: bool) {
    print_state_grid(usable_ace, |state| match values.value(state) {
        Some(v) => Cell::new(&format!("{:.2}", v)),
        None => Cell::new(""),
    });
}

pub fn print_visits(values: &StateValues, usable_ace: bool) {
    print_state_grid(usable_ace, |state| {
        Cell::new(&format!("{}", values.visits(state)))
    });
}

pub fn print_policy(policy: &dyn Fn(&StateKey) -> Action) {
    let mut table = Table::new();
    table.add_row(Row::new(dealer_cells()));

    for usable_ace in &[false, true] {
        for total in 12..=21 {
            let mut cells = vec![
                Cell::new(&format!("{}", total)),
                Cell::new(if *usable_ace { "Y" } else { "N" }),
            ];
            for dealer in 1..=10 {
                let state = StateKey {
                    dealer,
                    total,
                    usable_ace: *usable_ace,
                };
                cells.push(match policy(&state) {
                    Action::Hit => Cell::new("H"),
                    Action::Stand => Cell::new("S"),
                });
            }
            table.add_row(Row::new(cells));
        }
    }
    table.printstd();
}

fn print_values(title: &str, values: &StateValues, visits: bool) {
    if values.is_empty() {
        log::warn!("no states visited, nothing to print for {}", title);
        return;
    }
    let total: u32 = values.iter().map(|(_, e)| e.count).sum();
    log::info!("{}: {} states, {} visits", title, values.len(), total);
    for usable_ace in &[true, false] {
        println!("{}, usable ace: {}", title, usable_ace);
        print_state_values(values, *usable_ace);
        if visits {
            println!("visits, usable ace: {}", usable_ace);
            print_visits(values, *usable_ace);
        }
    }
}

// A shoe whose top cards are given by rank symbols, e.g. ["10", "9", "A"].
fn dealt_shoe(symbols: &[String], rng: StdRng) -> Result<Shoe, GameError> {
    let top = symbols
        .iter()
        .map(|symbol| Card::try_from(symbol.as_str()))
        .collect::<Result<Vec<Card>, GameError>>()?;
    Shoe::stacked(&top, rng)
}

pub fn run(config: &Config) -> anyhow::Result<()> {
    let mut game = Game::new(Shoe::new(config.rng()));
    let mut player = Actor::player();
    let mut house = Actor::house();

    // Offline: collect every episode first, then evaluate them in one batch.
    log::info!("playing {} rounds with the stick-at-20 policy", config.rounds);
    let report = game.play_rounds(&mut player, &mut house, config.rounds, None)?;
    println!("{}", report);

    let mut values = StateValues::default();
    values.update(&report.episodes);
    print_values("state values", &values, config.visits);

    if config.action_values {
        // Online: the action-value table learns after every round.
        log::info!("estimating action values under a random policy");
        let mut action_values = ActionValues::default();
        player.set_policy(random_policy(config.rng()));
        game.play_rounds(
            &mut player,
            &mut house,
            config.rounds,
            Some(&mut action_values),
        )?;

        let greedy = greedy_policy(&action_values, stick_at_20_policy);
        println!("greedy policy");
        print_policy(&greedy);

        player.set_policy(greedy);
        let mut greedy_values = StateValues::default();
        let improved = game.play_rounds(
            &mut player,
            &mut house,
            config.rounds,
            Some(&mut greedy_values),
        )?;
        println!("{}", improved);
        print_values("greedy state values", &greedy_values, config.visits);
        player.set_policy(stick_at_20_policy);
    }
    log::info!("shoe reshuffled {} times", game.shoe().reshuffles());

    if config.show > 0 {
        // A fixed deal replaces the shoe so the narrated rounds start from known cards.
        if !config.deal.is_empty() {
            game = Game::new(dealt_shoe(&config.deal, config.rng())?);
        }
        game.set_narrator(Some(Box::new(LogNarrator)));
        game.play_rounds(&mut player, &mut house, config.show, None)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use Card as C;

    fn hand(cards: &[Card]) -> Hand {
        Hand::from_cards(cards.to_vec())
    }

    #[test]
    fn hand_value_test() {
        assert_eq!(hand(&[]).total_value(), (0, false));
        assert_eq!(hand(&[C::Ace]).total_value(), (11, true));
        assert_eq!(hand(&[C::Ace, C::Ace]).total_value(), (12, true));
        assert_eq!(hand(&[C::Ace, C::Ace, C::Ace]).total_value(), (13, true));
        assert_eq!(
            hand(&[C::Ace, C::Ace, C::Ace, C::Ace]).total_value(),
            (14, true)
        );

        for i in 2..=10 {
            assert_eq!(hand(&[C::Value(i)]).total_value(), (i, false));
        }
        assert_eq!(hand(&[C::King]).total_value(), (10, false));
        assert_eq!(hand(&[C::Queen, C::Jack, C::Ace]).total_value(), (21, false));
    }

    #[test]
    fn soft_ace_is_reduced_when_needed() {
        assert_eq!(hand(&[C::Ace, C::Value(10)]).total_value(), (21, true));
        assert_eq!(
            hand(&[C::Ace, C::Value(10), C::Value(5)]).total_value(),
            (16, false)
        );
        assert_eq!(
            hand(&[C::Ace, C::Ace, C::Value(9)]).total_value(),
            (21, true)
        );
        assert_eq!(
            hand(&[C::Ace, C::Ace, C::King, C::Value(9)]).total_value(),
            (21, false)
        );
        assert_eq!(
            hand(&[C::King, C::Queen, C::Value(5)]).total_value(),
            (25, false)
        );
    }

    #[test]
    fn adding_a_card_revisits_the_ace() {
        let mut h = hand(&[C::Ace, C::Value(6)]);
        assert_eq!(h.total_value(), (17, true));
        h.add_card(C::Value(8));
        assert_eq!(h.total_value(), (15, false));
    }

    #[test]
    fn parse_card_symbols() {
        assert_eq!(Card::try_from("A"), Ok(C::Ace));
        assert_eq!(Card::try_from("7"), Ok(C::Value(7)));
        assert_eq!(Card::try_from("10"), Ok(C::Value(10)));
        assert_eq!(Card::try_from("K"), Ok(C::King));
        for card in RANKS.iter() {
            assert_eq!(Card::try_from(card.to_string().as_str()), Ok(*card));
        }
    }

    #[test]
    fn unknown_rank_is_rejected() {
        for symbol in &["", "1", "11", "Z", "joker"] {
            assert_eq!(
                Card::try_from(*symbol),
                Err(GameError::UnknownRank(symbol.to_string()))
            );
        }
    }

    #[test]
    fn deck_has_four_of_each_rank() {
        let deck = Card::deck();
        assert_eq!(deck.len(), DECK_SIZE);
        for rank in RANKS.iter() {
            assert_eq!(deck.iter().filter(|c| *c == rank).count(), 4);
        }
        assert_eq!(deck.iter().map(|c| c.value()).sum::<u32>(), 340);
    }

    #[test]
    fn dealt_shoe_issues_symbols_in_order() {
        let symbols: Vec<String> = vec!["10".into(), "A".into(), "K".into()];
        let mut shoe = dealt_shoe(&symbols, StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(shoe.issue(3).unwrap(), vec![C::Value(10), C::Ace, C::King]);

        let unknown: Vec<String> = vec!["10".into(), "Z".into()];
        assert_eq!(
            dealt_shoe(&unknown, StdRng::seed_from_u64(1)).err(),
            Some(GameError::UnknownRank("Z".to_string()))
        );
        let fifth: Vec<String> = vec!["A".to_string(); 5];
        assert_eq!(
            dealt_shoe(&fifth, StdRng::seed_from_u64(1)).err(),
            Some(GameError::StackUnavailable(C::Ace))
        );
    }

    #[test]
    fn fixed_policies() {
        let state = |total| StateKey {
            dealer: 10,
            total,
            usable_ace: false,
        };
        assert_eq!(house_policy(&state(16)), Action::Hit);
        assert_eq!(house_policy(&state(17)), Action::Stand);
        assert_eq!(stick_at_20_policy(&state(19)), Action::Hit);
        assert_eq!(stick_at_20_policy(&state(20)), Action::Stand);
    }

    #[test]
    fn random_policy_tries_both_actions() {
        let policy = random_policy(StdRng::seed_from_u64(7));
        let state = StateKey {
            dealer: 5,
            total: 15,
            usable_ace: false,
        };
        let actions: Vec<Action> = (0..64).map(|_| policy(&state)).collect();
        assert!(actions.contains(&Action::Hit));
        assert!(actions.contains(&Action::Stand));
    }
}
