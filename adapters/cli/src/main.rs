#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Whack-a-Penguin experience.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use whack_core::Tuning;
use whack_rendering::{Color, FieldPresentation, Presentation, RenderingBackend, Scene};
use whack_rendering_macroquad::MacroquadBackend;

use self::simulation::{run_headless, Simulation};

/// Default number of frames simulated by a headless session.
const DEFAULT_HEADLESS_FRAMES: u32 = 10_000;

/// Whack-a-Penguin: strike the evil penguins, spare the friendly ones.
#[derive(Debug, Parser)]
#[command(name = "whack-a-penguin", version, about)]
struct Args {
    /// Seed for the spawn random source; drawn from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file overriding the classic tuning values.
    #[arg(long, value_name = "FILE")]
    tuning: Option<PathBuf>,

    /// Synchronise presentation with the display refresh rate (default).
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,

    /// Render as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    no_vsync: bool,

    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,

    /// Run without a window, letting a scripted player strike every enemy.
    #[arg(long)]
    headless: bool,

    /// Frame budget of a headless session, at sixty frames per second.
    #[arg(long, default_value_t = DEFAULT_HEADLESS_FRAMES)]
    headless_frames: u32,
}

impl Args {
    fn vsync_enabled(&self) -> bool {
        self.vsync || !self.no_vsync
    }
}

/// Entry point for the Whack-a-Penguin command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => config::load_tuning(path)
            .with_context(|| format!("could not apply tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("spawn seed {seed}");

    let mut simulation = Simulation::new(tuning, seed);
    println!("{}", simulation.welcome_banner());

    if args.headless {
        let report = run_headless(&mut simulation, args.headless_frames);
        println!(
            "Final score: {} after {} rounds ({:?})",
            report.score, report.rounds, report.phase
        );
        return Ok(());
    }

    let field = FieldPresentation::new(
        FieldPresentation::DEFAULT_WIDTH,
        FieldPresentation::DEFAULT_HEIGHT,
        FieldPresentation::GRASS_COLOR,
        FieldPresentation::HOLE_COLOR,
    )
    .context("could not describe the play field")?;
    let mut scene = Scene::new(field);
    simulation.populate_scene(&mut scene);
    let presentation =
        Presentation::new("Whack-a-Penguin", Color::from_rgb_u8(24, 40, 24), scene);

    MacroquadBackend::new()
        .with_vsync(args.vsync_enabled())
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, scene| simulation.frame(dt, input, scene))
        .context("rendering backend failed")
}
