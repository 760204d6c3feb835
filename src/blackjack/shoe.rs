use std::collections::VecDeque;

use rand::prelude::*;

use crate::blackjack::*;
use crate::error::GameError;

// Reshuffling needs strictly more than this many discarded cards.
pub const MIN_RESHUFFLE: usize = 20;

// The card source. Cards are issued from the front of the undealt pool and
// come back through the discard pool; together with the cards held in hands
// they always add up to the full deck.
pub struct Shoe {
    undealt: VecDeque<Card>,
    discard: Vec<Card>,
    reshuffles: usize,
    rng: StdRng,
}

impl Shoe {
    // A full shuffled deck.
    pub fn new(rng: StdRng) -> Shoe {
        let mut shoe = Shoe {
            undealt: VecDeque::with_capacity(DECK_SIZE),
            discard: Vec::with_capacity(DECK_SIZE),
            reshuffles: 0,
            rng,
        };
        shoe.load(Card::deck());
        shoe
    }

    // `top` is issued first, in order. The rest of the deck follows shuffled.
    pub fn stacked(top: &[Card], rng: StdRng) -> Result<Shoe, GameError> {
        let mut rest = Card::deck();
        for card in top {
            match rest.iter().position(|c| c == card) {
                Some(i) => {
                    rest.swap_remove(i);
                }
                None => return Err(GameError::StackUnavailable(*card)),
            }
        }

        let mut shoe = Shoe {
            undealt: top.iter().copied().collect(),
            discard: Vec::with_capacity(DECK_SIZE),
            reshuffles: 0,
            rng,
        };
        shoe.load(rest);
        Ok(shoe)
    }

    pub fn undealt(&self) -> usize {
        self.undealt.len()
    }

    pub fn discarded(&self) -> usize {
        self.discard.len()
    }

    pub fn reshuffles(&self) -> usize {
        self.reshuffles
    }

    fn load(&mut self, mut cards: Vec<Card>) {
        cards.shuffle(&mut self.rng);
        self.undealt.extend(cards);
    }

    pub fn refill(&mut self, cards: Vec<Card>) -> Result<(), GameError> {
        if cards.is_empty() {
            return Err(GameError::EmptyRefill);
        }
        self.load(cards);
        Ok(())
    }

    // On failure the shoe is left as it was before the call.
    pub fn issue(&mut self, n: usize) -> Result<Vec<Card>, GameError> {
        let mut cards = Vec::with_capacity(n);
        for _ in 0..n {
            if self.undealt.is_empty() {
                if let Err(e) = self.reshuffle() {
                    for card in cards.into_iter().rev() {
                        self.undealt.push_front(card);
                    }
                    return Err(e);
                }
            }
            match self.undealt.pop_front() {
                Some(card) => cards.push(card),
                None => return Err(GameError::EmptyRefill),
            }
        }
        Ok(cards)
    }

    // Discarded cards are only shuffled once they are needed again.
    pub fn recycle<I: IntoIterator<Item = Card>>(&mut self, cards: I) {
        self.discard.extend(cards);
    }

    fn reshuffle(&mut self) -> Result<(), GameError> {
        // Too few cards in circulation means cards went missing somewhere.
        if self.discard.len() <= MIN_RESHUFFLE {
            return Err(GameError::ShoeExhausted {
                discarded: self.discard.len(),
                minimum: MIN_RESHUFFLE,
            });
        }

        log::debug!("shoe empty, reshuffling {} discarded cards", self.discard.len());
        let cards = std::mem::take(&mut self.discard);
        self.refill(cards)?;
        self.reshuffles += 1;
        Ok(())
    }
}
