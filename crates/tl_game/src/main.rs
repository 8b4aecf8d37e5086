//! Headless runner.
//!
//! Loads a config, builds a scene and drives it for a fixed number of ticks,
//! either with scripted input from a replay file or with no input at all.
//! With `--realtime` ticks are paced against the wall clock:
//!   1. `begin_frame()` measures the real delta and feeds the accumulator
//!   2. `while should_step()` runs fixed-dt ticks

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tl_core::input::InputState;
use tl_core::time::FrameClock;
use tl_game::config::{load_config_from_path, GameConfig};
use tl_game::entity::EntityKind;
use tl_game::events::SimEvent;
use tl_game::replay::{load_replay_from_path, ReplayFrame, ReplaySequence};
use tl_game::world::World;

/// Timberline headless simulation runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gameplay tuning JSON; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scripted input to play back
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Ticks to run without a replay
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Overrides the world seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pace ticks against the wall clock
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Default)]
struct RunTotals {
    trees_felled: u32,
    enemies_spawned: u32,
    enemies_killed: u32,
    player_hits: u32,
    swords_thrown: u32,
}

impl RunTotals {
    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::TreeFelled { .. } => self.trees_felled += 1,
            SimEvent::EnemySpawned { .. } => self.enemies_spawned += 1,
            SimEvent::EnemyKilled { .. } => self.enemies_killed += 1,
            SimEvent::PlayerHit { .. } => self.player_hits += 1,
            SimEvent::SwordThrown { .. } => self.swords_thrown += 1,
            _ => {}
        }
    }
}

struct Runner {
    world: World,
    input: InputState,
    frames: Vec<ReplayFrame>,
    total_ticks: u64,
    ticks_done: u64,
    totals: RunTotals,
}

impl Runner {
    fn new(world: World, replay: Option<&ReplaySequence>, ticks: u64) -> Self {
        let (frames, total_ticks) = match replay {
            Some(replay) => (
                replay.expanded_frames().into_iter().cloned().collect(),
                replay.tick_count(),
            ),
            None => (Vec::new(), ticks),
        };
        Self {
            world,
            input: InputState::new(),
            frames,
            total_ticks,
            ticks_done: 0,
            totals: RunTotals::default(),
        }
    }

    fn finished(&self) -> bool {
        self.ticks_done >= self.total_ticks
    }

    fn tick(&mut self) {
        if let Some(frame) = self.frames.get(self.ticks_done as usize) {
            frame.apply_to(&mut self.input);
        }
        let events = self.world.step(&self.input);
        self.input.end_frame();
        self.ticks_done += 1;

        for event in &events {
            log::debug!("t={}ms {:?}", self.world.now_ms(), event);
            self.totals.record(event);
            if matches!(
                event,
                SimEvent::TreeFelled { .. }
                    | SimEvent::PlayerHit { .. }
                    | SimEvent::SpeedIncreased { .. }
                    | SimEvent::RangeIncreased { .. }
            ) {
                let hud = self.world.hud();
                log::info!("{} | {}", hud.planks, hud.stats);
            }
        }
    }

    fn run_flat_out(&mut self) {
        while !self.finished() {
            self.tick();
        }
    }

    fn run_realtime(&mut self) {
        let mut clock = FrameClock::new(self.world.config().world.fixed_dt_us);
        while !self.finished() {
            clock.begin_frame();
            while !self.finished() && clock.should_step() {
                self.tick();
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

fn load_config(args: &Args) -> Result<GameConfig, String> {
    let mut config = match &args.config {
        Some(path) => load_config_from_path(path).map_err(|err| err.to_string())?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), String> {
    let mut config = load_config(args)?;
    let replay = match &args.replay {
        Some(path) => {
            let replay = load_replay_from_path(path)?;
            log::info!(
                "Loaded replay {} ({} ticks)",
                path.display(),
                replay.tick_count()
            );
            replay.apply_overrides(&mut config);
            if let Some(seed) = args.seed {
                config.world.seed = seed;
            }
            Some(replay)
        }
        None => None,
    };
    config.validate().map_err(|err| err.to_string())?;

    let world = World::new(config);
    let mut runner = Runner::new(world, replay.as_ref(), args.ticks);
    if args.realtime {
        runner.run_realtime();
    } else {
        runner.run_flat_out();
    }

    let world = &runner.world;
    let arena = &world.state().arena;
    let hud = world.hud();
    println!("{}", hud.planks);
    println!("{}", hud.stats);
    log::info!(
        "Ran {} ticks ({} ms): {} trees felled, {} swords thrown, {} cyclops spawned, {} killed, {} player hits",
        world.step_count(),
        world.now_ms(),
        runner.totals.trees_felled,
        runner.totals.swords_thrown,
        runner.totals.enemies_spawned,
        runner.totals.enemies_killed,
        runner.totals.player_hits
    );
    log::info!(
        "Scene now holds {} trees and {} cyclops",
        arena.count_active(EntityKind::Tree),
        arena.count_active(EntityKind::Cyclop)
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Timberline starting...");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
