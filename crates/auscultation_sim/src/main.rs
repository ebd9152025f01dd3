//! Auscultation trainer simulator
//!
//! Runs a trainer session without a headset: controller movement comes from a
//! scripted scenario, sounds come from synthesized tones or asset files, and
//! playback goes to the headless backend or a rodio output device.
//!
//! Usage: `auscultation_sim [config.toml|config.ron]`

mod app;
mod config;
mod error;
mod scenario;
mod tone;

use std::path::{Path, PathBuf};

use auscultation_engine::config::Config;
use auscultation_engine::foundation::logging;

use crate::app::Simulator;
use crate::config::SimulatorConfig;
use crate::scenario::Scenario;

const DEFAULT_CONFIG: &str = "resources/simulator.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    logging::init_with_level(config.level_filter());
    log::info!("Auscultation simulator starting ({:?} backend)", config.audio.kind);

    let scenario = match &config.scenario {
        Some(path) => Scenario::load(path).await?,
        None => Scenario::walkthrough(),
    };

    let mut simulator = Simulator::new(config)?;
    simulator.attach_model().await;
    let summary = simulator.run(&scenario).await;
    simulator.shutdown();

    log::info!(
        "Finished {} steps on '{}' | {}",
        summary.steps,
        summary.active_collection.as_deref().unwrap_or("no collection"),
        summary.status
    );
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SimulatorConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(SimulatorConfig::load_from_file(path)?),
        None if Path::new(DEFAULT_CONFIG).exists() => Ok(SimulatorConfig::load_from_file(DEFAULT_CONFIG)?),
        None => Ok(SimulatorConfig::default()),
    }
}
