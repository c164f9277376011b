use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use runner2d::{
    Action, FrameCatalog, FramePacer, FrameRenderer, GameConfig, GameLoop, JsonLevelLoader, LevelData,
    LevelLoader, Libraries, RenderFrame, ScriptStep, ScriptedInput, World,
};

/// Runs a Runner2D round without a window, driven by a scripted input.
#[derive(Parser)]
#[command(version, about = "Headless Runner2D round with scripted input")]
struct Cli {
    /// JSON level file. Uses the built-in starter level when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,

    /// JSON config file; missing fields keep their defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Stop after this many frames.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Override the configured frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Seed for enemy fire timing.
    #[arg(long)]
    seed: Option<u64>,

    /// Sleep between frames instead of running as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(short, long)]
    verbose: bool,
}

/// Logs a one-line summary once per simulated second.
struct LogRenderer {
    fps: u64,
}

impl FrameRenderer for LogRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<()> {
        log::trace!("frame {}: {} sprites, {} platforms", frame.frame, frame.commands.len(), frame.platforms.len());
        if frame.frame % self.fps == 0 {
            let offset = frame.camera.offset();
            log::info!(
                "t={:>5}ms health={:>3} sprites={} camera=({:.0}, {:.0})",
                frame.now_ms,
                frame.player_health,
                frame.commands.len(),
                offset.x,
                offset.y
            );
        }
        Ok(())
    }
}

/// Registers synthetic frames for every name the default libraries look up.
fn demo_catalog() -> FrameCatalog {
    let mut catalog = FrameCatalog::new();
    for facing in ["r", "l"] {
        for (name, count) in [("idle", 1), ("walk", 10), ("jump", 10), ("idle_shoot", 3), ("walk_shoot", 10), ("jump_shoot", 10)] {
            catalog.register_sequence(&format!("{name}_{facing}"), count, 120.0, 104.0);
        }
    }
    catalog.register("enemy_0", 64.0, 64.0);
    catalog.register("projectile_0", 50.0, 20.0);
    catalog.register_sequence("health_drop", 4, 32.0, 32.0);
    catalog
}

/// Walk, jump, shoot and turn around, repeated until `frames` are covered.
fn demo_script(frames: u64) -> Vec<ScriptStep> {
    let pattern = [
        ScriptStep::idle(30),
        ScriptStep::new(90, &[Action::Right]),
        ScriptStep::new(20, &[Action::Right, Action::Jump]),
        ScriptStep::new(40, &[Action::Right, Action::Shoot]),
        ScriptStep::new(90, &[Action::Left]),
        ScriptStep::new(8, &[Action::Jump]),
        ScriptStep::idle(22),
    ];
    let mut script = Vec::new();
    let mut covered = 0;
    while covered < frames {
        for step in &pattern {
            covered += step.frames;
            script.push(step.clone());
        }
    }
    script
}

fn load_level(path: Option<&PathBuf>) -> Result<LevelData> {
    match path {
        Some(path) => Ok(JsonLevelLoader.load(path)?),
        None => Ok(LevelData::starter()),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(fps) = cli.fps {
        config = config.with_fps(fps);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    let fps = config.display.fps;

    let level = load_level(cli.level.as_ref()).context("map load failed")?;
    let libraries = Libraries::from_catalog(&demo_catalog(), &config.animation)?;
    let mut world = World::new(&level, config, libraries).context("building round")?;

    let pacer = if cli.realtime {
        FramePacer::new(fps)
    } else {
        FramePacer::unpaced(fps)
    };
    let mut input = ScriptedInput::new(demo_script(cli.frames));
    let mut renderer = LogRenderer {
        fps: u64::from(fps.max(1)),
    };

    let summary = GameLoop::new(pacer)
        .with_max_frames(cli.frames)
        .run(&mut world, &mut input, &mut renderer)?;

    let player = world.player();
    log::info!(
        "finished after {} frames: {:?}, health {}, player at ({:.1}, {:.1})",
        summary.frames,
        summary.state,
        player.health(),
        player.body.position.x,
        player.body.position.y
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
