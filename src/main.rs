//! Spin Arena entry point
//!
//! Runs a standard match headless and prints the final body states as JSON.
//!
//! Usage: `spin-arena [config.json]`

use spin_arena::consts::*;
use spin_arena::sim::{SimulationWorld, WorldEvent, standard_match};
use spin_arena::{SimConfig, SimResult};

/// Simulated frame length fed to the accumulator (s)
const FRAME_DT: f64 = 1.0 / 60.0;

/// Fixed-step driver for a world
struct Match {
    world: SimulationWorld,
    accumulator: f64,
    elapsed: f64,
}

impl Match {
    fn new(world: SimulationWorld) -> Self {
        Self {
            world,
            accumulator: 0.0,
            elapsed: 0.0,
        }
    }

    /// Run simulation steps for one frame
    fn update(&mut self, dt: f64) -> SimResult<()> {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let report = self.world.step(SIM_DT)?;
            self.accumulator -= SIM_DT;
            self.elapsed += SIM_DT;
            substeps += 1;

            for event in &report.events {
                log_event(report.tick, event);
            }
        }
        Ok(())
    }
}

fn log_event(tick: u64, event: &WorldEvent) {
    match event {
        WorldEvent::SpinDepleted { body, angular_speed } => {
            log::info!("[tick {tick}] top {body} stopped spinning at {angular_speed:.1} rad/s");
        }
        WorldEvent::OutOfBounds { body, tip } => {
            log::info!("[tick {tick}] top {body} ringed out at ({:.3}, {:.3})", tip.x, tip.z);
        }
        WorldEvent::Impact { a, b, outcome } => {
            log::debug!(
                "[tick {tick}] {a} hit {b}: impulse {:.5}, recoil {:.2e}",
                outcome.impulse,
                outcome.recoil
            );
        }
        WorldEvent::OppositeSpinUnsupported { a, b } => {
            log::warn!("[tick {tick}] {a} and {b} spin in opposite directions");
        }
    }
}

fn run() -> SimResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let max_seconds = config.max_seconds;
    log::info!("Spin Arena starting with seed {:#x}", config.seed);

    let (world, _) = standard_match(config)?;
    let mut game = Match::new(world);

    while !game.world.is_match_over() && game.elapsed < max_seconds {
        game.update(FRAME_DT)?;
    }

    match game.world.winner() {
        Some(id) => log::info!("Top {id} wins after {:.2} s", game.elapsed),
        None if game.world.is_match_over() => log::info!("Draw after {:.2} s", game.elapsed),
        None => log::info!("Time limit reached after {:.2} s", game.elapsed),
    }

    let summary = serde_json::json!({
        "ticks": game.world.tick(),
        "seconds": game.elapsed,
        "winner": game.world.winner(),
        "bodies": game.world.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
