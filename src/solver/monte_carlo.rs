use std::collections::HashMap;
use std::hash::Hash;

use crate::blackjack::game::{Learner, Outcome, Round};
use crate::blackjack::{Action, StateKey};
use crate::solver::*;

pub type StateValues = ValueTable<StateKey>;
pub type ActionValues = ValueTable<(StateKey, Action)>;

// How an episode step maps onto a table key.
pub trait StepKey: Eq + Hash {
    fn from_step(state: &StateKey, action: Action) -> Self;
}

impl StepKey for StateKey {
    fn from_step(state: &StateKey, _action: Action) -> Self {
        *state
    }
}

impl StepKey for (StateKey, Action) {
    fn from_step(state: &StateKey, action: Action) -> Self {
        (*state, action)
    }
}

impl<K: StepKey> ValueTable<K> {
    // Every-visit evaluation, undiscounted. Intermediate rewards are zero, so
    // the return of every step is the terminal payoff of its round.
    pub fn update<'a, I>(&mut self, rounds: I)
    where
        I: IntoIterator<Item = &'a Round>,
    {
        for round in rounds {
            self.update_episode(&round.episode, round.outcome);
        }
    }

    pub fn update_episode(&mut self, episode: &[(StateKey, Action)], outcome: Outcome) {
        let returns = outcome.reward();
        for (state, action) in episode {
            self.record(K::from_step(state, *action), returns);
        }
    }
}

impl<K: StepKey> Learner for ValueTable<K> {
    fn learn(&mut self, episode: &[(StateKey, Action)], outcome: Outcome) {
        self.update_episode(episode, outcome);
    }
}

// Picks the best-valued action seen in each state; unseen states defer to `fallback`.
pub fn greedy_policy<F>(action_values: &ActionValues, fallback: F) -> impl Fn(&StateKey) -> Action
where
    F: Fn(&StateKey) -> Action + 'static,
{
    let mut best: HashMap<StateKey, (Action, f64)> = HashMap::new();
    for ((state, action), estimate) in action_values.sorted() {
        let entry = best.entry(*state).or_insert((*action, estimate.avg));
        if estimate.avg > entry.1 {
            *entry = (*action, estimate.avg);
        }
    }

    move |state: &StateKey| match best.get(state) {
        Some((action, _)) => *action,
        None => fallback(state),
    }
}
