mod blackjack;
mod config;
mod error;
mod solver;

use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use config::Config;

fn log(level: LevelFilter) -> anyhow::Result<()> {
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    log(config.log_level)?;
    blackjack::run(&config)
}
