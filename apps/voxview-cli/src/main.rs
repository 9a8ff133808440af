mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voxview_assets::{AssetPaths, WeaponAsset, read_animation_list};
use voxview_character::{Character, VoxelCharacter};
use voxview_common::ViewerConfig;
use voxview_render::RecordingRenderer;
use voxview_viewer::weapons::{LOADOUTS, WeaponOp};
use voxview_viewer::{
    FrameClock, FrameTiming, HeadlessApplication, HeadlessWindow, HudLine, ManualClock, Viewer,
};

#[derive(Parser)]
#[command(name = "voxview-cli", about = "CLI tool for voxview operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration
    Info,
    /// Print the resolved asset file locations
    Paths,
    /// Check that every model, weapon and font file exists
    Check,
    /// Run the viewer headless with scripted input
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Fixed frame time in seconds
        #[arg(long, default_value = "0.016666")]
        dt: f32,
        /// Comma-separated scripted events, e.g. `0:up:press,30:up:release,40:z:tap`
        #[arg(short = 's', long = "script", value_delimiter = ',')]
        events: Vec<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Also print the command stream of the last frame
        #[arg(long)]
        dump: bool,
    },
}

#[derive(Serialize)]
struct SimulationSummary {
    frames: u64,
    timing: FrameTiming,
    camera: String,
    animation_index: usize,
    animation: Option<String>,
    weapon: &'static str,
    wireframe: bool,
    talking: bool,
    help_text: bool,
    multisampling: bool,
    window: (u32, u32),
    hud: Vec<HudLine>,
}

fn load_config(path: Option<&PathBuf>) -> Result<ViewerConfig> {
    match path {
        Some(p) => ViewerConfig::load(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(ViewerConfig::default()),
    }
}

/// Every distinct weapon file the cycle can load.
fn weapon_assets(config: &ViewerConfig) -> Vec<WeaponAsset> {
    let mut names: Vec<&str> = LOADOUTS
        .iter()
        .flat_map(|l| l.ops.iter())
        .filter_map(|op| match op {
            WeaponOp::Load(_, name) => Some(*name),
            WeaponOp::Unload(_) => None,
        })
        .collect();
    names.dedup();
    names
        .into_iter()
        .map(|name| WeaponAsset::resolve(&config.weapons_dir, name))
        .collect()
}

fn check(config: &ViewerConfig) -> Result<bool> {
    let paths = AssetPaths::resolve(&config.model);
    let mut ok = true;

    for (kind, path) in paths.files() {
        let found = path.is_file();
        ok &= found;
        println!("[{}] {kind}: {}", if found { "ok" } else { "MISSING" }, path.display());
    }
    if paths.animation_list.is_file() {
        match read_animation_list(&paths.animation_list) {
            Ok(clips) => println!("     {} animations", clips.len()),
            Err(e) => {
                ok = false;
                println!("[BAD] animation list: {e}");
            }
        }
    }

    // Weapons are optional at runtime, so they warn rather than fail.
    for weapon in weapon_assets(config) {
        let found = weapon.path.is_file();
        println!(
            "[{}] weapon {}: {}",
            if found { "ok" } else { "warn" },
            weapon.name,
            weapon.path.display()
        );
    }

    let font = config.font.path.is_file();
    ok &= font;
    println!("[{}] font: {}", if font { "ok" } else { "MISSING" }, config.font.path.display());
    Ok(ok)
}

fn simulate(
    config: ViewerConfig,
    frames: u64,
    dt: f32,
    events: &[String],
    json: bool,
    dump: bool,
) -> Result<()> {
    let scripted = events
        .iter()
        .map(|e| script::parse_event(e))
        .collect::<Result<Vec<_>>>()?;

    let (width, height) = (config.window.width, config.window.height);
    let mut window = HeadlessWindow::new(width, height);
    script::schedule(&mut window, &scripted);
    tracing::debug!(events = scripted.len(), frames, dt, "scripted input scheduled");

    let clock = ManualClock::new();
    let mut viewer: Viewer<_, VoxelCharacter, _, _> = Viewer::create(
        config,
        RecordingRenderer::new(width, height),
        window,
        HeadlessApplication::with_frame_limit(frames),
        FrameClock::manual(&clock),
    )?;

    let mut ran = 0;
    while !viewer.should_close() {
        clock.advance_secs(dt);
        viewer.poll_events();
        viewer.update();
        viewer.render()?;
        ran += 1;
        tracing::trace!(frame = ran, "simulated frame");
    }
    tracing::info!(frames = ran, "simulation finished");

    let state = viewer.state();
    let index = state.animation_index;
    let summary = SimulationSummary {
        frames: ran,
        timing: viewer.timing(),
        camera: viewer.camera().describe(),
        animation_index: index,
        animation: viewer.character().animation_name(index).map(str::to_owned),
        weapon: state.weapons.name(),
        wireframe: state.wireframe,
        talking: state.talking,
        help_text: state.help_text,
        multisampling: state.multisampling,
        window: (state.width, state.height),
        hud: viewer.hud_lines(),
    };
    let last_frame = viewer.render_context().last_frame().map(|f| f.to_text());
    viewer.destroy();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Simulated {} frames", summary.frames);
        println!("Timing: fps={:.1} delta={:.4}", summary.timing.fps, summary.timing.delta);
        println!("{}", summary.camera);
        println!(
            "Animation [{}]: {}",
            summary.animation_index,
            summary.animation.as_deref().unwrap_or("-")
        );
        println!("Weapon: {}", summary.weapon);
        println!(
            "Wireframe={} Talking={} HelpText={} Multisampling={}",
            summary.wireframe, summary.talking, summary.help_text, summary.multisampling
        );
        println!("HUD:");
        for line in &summary.hud {
            println!("  ({:.0}, {:.0}) {}", line.x, line.y, line.text);
        }
    }
    if dump {
        if let Some(text) = last_frame {
            print!("{text}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_ref())?;
    tracing::debug!(model = %config.model.name, "configuration loaded");

    match cli.command {
        Commands::Info => {
            println!("voxview-cli v{}", env!("CARGO_PKG_VERSION"));
            print!("{}", config.to_yaml()?);
        }
        Commands::Paths => {
            let paths = AssetPaths::resolve(&config.model);
            for (kind, path) in paths.files() {
                println!("{kind}: {}", path.display());
            }
            for weapon in weapon_assets(&config) {
                println!("weapon {}: {}", weapon.name, weapon.path.display());
            }
            println!("font: {}", config.font.path.display());
        }
        Commands::Check => {
            if !check(&config)? {
                anyhow::bail!("required assets are missing");
            }
            println!("All required assets present");
        }
        Commands::Simulate {
            frames,
            dt,
            events,
            json,
            dump,
        } => simulate(config, frames, dt, &events, json, dump)?,
    }

    Ok(())
}
