use std::fmt;

use crate::blackjack::*;
use crate::error::GameError;

// One side of the table. The hand belongs to this actor for the whole round;
// the policy can only be swapped between rounds since the game borrows the
// actor mutably while a round is in play.
pub struct Actor {
    role: Role,
    hand: Hand,
    policy: Option<Policy>,
}

impl Actor {
    pub fn new(role: Role) -> Actor {
        Actor {
            role,
            hand: Hand::default(),
            policy: None,
        }
    }

    pub fn house() -> Actor {
        let mut house = Actor::new(Role::House);
        house.set_policy(house_policy);
        house
    }

    pub fn player() -> Actor {
        let mut player = Actor::new(Role::Player);
        player.set_policy(stick_at_20_policy);
        player
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn set_policy<P>(&mut self, policy: P)
    where
        P: Fn(&StateKey) -> Action + 'static,
    {
        self.policy = Some(Box::new(policy));
    }

    #[cfg(test)]
    pub fn clear_policy(&mut self) {
        self.policy = None;
    }

    pub fn has_policy(&self) -> bool {
        self.policy.is_some()
    }

    pub fn receive<I: IntoIterator<Item = Card>>(&mut self, cards: I) {
        for card in cards {
            self.hand.add_card(card);
        }
    }

    pub fn total_value(&self) -> (u32, bool) {
        self.hand.total_value()
    }

    // Value of the face-up card, aces counted as 1. Zero before the deal.
    pub fn first_card_value(&self) -> u32 {
        self.hand.first().map_or(0, |c| c.value())
    }

    pub fn state(&self, opponent: &Actor) -> StateKey {
        let (total, usable_ace) = self.total_value();
        StateKey {
            dealer: opponent.first_card_value(),
            total,
            usable_ace,
        }
    }

    pub fn decide(&self, state: &StateKey) -> Result<Action, GameError> {
        match &self.policy {
            Some(policy) => Ok(policy(state)),
            None => Err(GameError::MissingPolicy(self.role)),
        }
    }

    // Clears the hand. The cards go back to the caller, which is responsible
    // for returning them to the shoe.
    pub fn discharge(&mut self) -> Vec<Card> {
        self.hand.take()
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (total, _) = self.total_value();
        write!(f, "{} {} ({})", self.role, self.hand, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_and_discharge() {
        let mut player = Actor::player();
        assert_eq!(player.total_value(), (0, false));
        assert_eq!(player.first_card_value(), 0);

        player.receive(vec![Card::Ace, Card::Value(10)]);
        assert_eq!(player.total_value(), (21, true));
        player.receive(vec![Card::Value(5)]);
        assert_eq!(player.total_value(), (16, false));

        let cards = player.discharge();
        assert_eq!(cards, vec![Card::Ace, Card::Value(10), Card::Value(5)]);
        assert!(player.hand().is_empty());
        assert_eq!(player.total_value(), (0, false));
    }

    #[test]
    fn hands_are_not_shared() {
        let mut player = Actor::player();
        let mut house = Actor::house();
        player.receive(Some(Card::King));
        house.receive(Vec::new());
        assert_eq!(player.hand().len(), 1);
        assert!(house.hand().is_empty());
    }

    #[test]
    fn state_uses_opponent_face_up_card() {
        let mut player = Actor::player();
        let mut house = Actor::house();
        player.receive(vec![Card::Value(9), Card::Ace]);
        house.receive(vec![Card::Queen, Card::Value(3)]);
        assert_eq!(
            player.state(&house),
            StateKey {
                dealer: 10,
                total: 20,
                usable_ace: true
            }
        );

        house.discharge();
        house.receive(vec![Card::Ace, Card::Value(3)]);
        assert_eq!(player.state(&house).dealer, 1);
    }

    #[test]
    fn decide_follows_policy() {
        let mut player = Actor::player();
        let state = StateKey {
            dealer: 2,
            total: 19,
            usable_ace: false,
        };
        assert_eq!(player.decide(&state), Ok(Action::Hit));

        player.set_policy(|_: &StateKey| Action::Stand);
        assert_eq!(player.decide(&state), Ok(Action::Stand));

        player.clear_policy();
        assert_eq!(
            player.decide(&state),
            Err(GameError::MissingPolicy(Role::Player))
        );
    }

    #[test]
    fn display_shows_hand_and_total() {
        let mut house = Actor::house();
        house.receive(vec![Card::Ace, Card::Value(7)]);
        assert_eq!(house.to_string(), "house [A, 7] (18)");
    }
}
