use clap::Parser;
use log::LevelFilter;
use rand::prelude::*;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Monte Carlo evaluation of a fixed blackjack policy",
    long_about = None
)]
pub struct Config {
    #[arg(long, default_value_t = 200_000, help = "Rounds to simulate per run")]
    pub rounds: usize,
    #[arg(long, help = "Seed for the shoe; random if omitted")]
    pub seed: Option<u64>,
    #[arg(long, default_value_t = 2, help = "Rounds to narrate at the end")]
    pub show: usize,
    #[arg(long, help = "Also estimate action values and compare the greedy policy")]
    pub action_values: bool,
    #[arg(long, help = "Also print visit counts per state")]
    pub visits: bool,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Cards to put on top of the shoe for the narrated rounds, e.g. 10,9,10,8"
    )]
    pub deal: Vec<String>,
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

impl Config {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
