mod config;
mod host;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nfield_core::{
    DeviceCapabilities, PerformanceMetrics, PerformanceMonitor, QualityConfig, SceneController,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::{Overrides, SimConfig};
use crate::host::{HeadlessHost, sweep};

#[derive(Parser)]
#[command(name = "nfield", about = "Adaptive neural particle field, headless")]
struct Cli {
    /// TOML config file (defaults to $NFIELD_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Surface width
    #[arg(long, global = true)]
    width: Option<f64>,

    /// Surface height
    #[arg(long, global = true)]
    height: Option<f64>,

    /// Fixed RNG seed for a reproducible field
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Honor the reduced-motion preference
    #[arg(long, global = true)]
    reduced_motion: bool,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detected capabilities and the quality they select
    Probe {
        #[arg(long)]
        json: bool,
    },

    /// Run the scene and report performance metrics
    Run {
        /// Frames to run (0 with --realtime runs until Ctrl-C)
        #[arg(long, default_value_t = 120)]
        frames: u64,

        /// Pace frames on the wall clock instead of a synthetic one
        #[arg(long)]
        realtime: bool,

        #[arg(long)]
        json: bool,
    },

    /// Run the scene and write the last frame as an image
    Snapshot {
        /// Output file path; `.png` writes PNG, anything else binary PPM
        path: PathBuf,

        #[arg(long, default_value_t = 60)]
        frames: u64,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = SimConfig::load(cli.config.as_deref())?;
    config.apply(&Overrides {
        width: cli.width,
        height: cli.height,
        seed: cli.seed,
        reduced_motion: cli.reduced_motion,
    });
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Probe { json } => cmd_probe(&config, *json),
        Commands::Run {
            frames,
            realtime,
            json,
        } => cmd_run(&config, *frames, *realtime, *json).await,
        Commands::Snapshot { path, frames } => cmd_snapshot(&config, path, *frames),
    }
}

// ---------------------------------------------------------------------------
// Scene setup
// ---------------------------------------------------------------------------

fn build_scene(config: &SimConfig) -> Result<SceneController<HeadlessHost>> {
    let capabilities = DeviceCapabilities::probe(&config.host_hints());
    let rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let host = HeadlessHost::new(
        config.width,
        config.height,
        capabilities.device_pixel_ratio,
    );

    let mut scene = SceneController::with_rng(host, capabilities, config.reduced_motion, rng)
        .with_monitor(PerformanceMonitor::with_target_fps(config.target_fps));
    scene.initialize().context("failed to initialize scene")?;
    scene.start().context("failed to start scene")?;
    Ok(scene)
}

/// Drive `frames` frames on a synthetic clock, feeding the pointer sweep
/// from the same thread.
fn run_offline(scene: &mut SceneController<HeadlessHost>, frames: u64, interval_ms: f64) -> u64 {
    let mut writer = scene.host_mut().take_pointer();
    let bounds = scene.bounds();
    let mut ran = 0;
    while ran < frames && scene.host().frame_pending() {
        let t = interval_ms * (ran + 1) as f64;
        if let Some(writer) = writer.as_mut() {
            let p = sweep(t, bounds.width, bounds.height);
            writer.pointer_moved(p.x, p.y, t);
        }
        scene.on_frame(t);
        ran += 1;
    }
    ran
}

/// Drive frames on a tokio interval until `frames` have run (0 = no limit)
/// or Ctrl-C. The pointer sweep runs as its own task.
async fn run_realtime(
    scene: &mut SceneController<HeadlessHost>,
    frames: u64,
    interval_ms: f64,
) -> Result<u64> {
    let token = CancellationToken::new();
    let bounds = scene.bounds();
    let pointer_task = scene.host_mut().take_pointer().map(|mut writer| {
        let token = token.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(Duration::from_millis(8));
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let t = started.elapsed().as_secs_f64() * 1000.0;
                        let p = sweep(t, bounds.width, bounds.height);
                        writer.pointer_moved(p.x, p.y, t);
                    }
                }
            }
        })
    });

    let period = Duration::from_secs_f64(interval_ms / 1000.0);
    let mut ticker = tokio::time::interval(period);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let started = Instant::now();
    let mut ran = 0;
    while (frames == 0 || ran < frames) && scene.host().frame_pending() {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupted after {ran} frames");
                break;
            }
            _ = ticker.tick() => {
                scene.on_frame(started.elapsed().as_secs_f64() * 1000.0);
                ran += 1;
            }
        }
    }

    token.cancel();
    if let Some(task) = pointer_task {
        task.await.context("pointer task failed")?;
    }
    Ok(ran)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProbeReport {
    capabilities: DeviceCapabilities,
    reduced_motion: bool,
    quality: QualityConfig,
}

fn cmd_probe(config: &SimConfig, json: bool) -> Result<()> {
    let capabilities = DeviceCapabilities::probe(&config.host_hints());
    let quality = QualityConfig::for_device(&capabilities, config.reduced_motion);

    if json {
        let report = ProbeReport {
            capabilities,
            reduced_motion: config.reduced_motion,
            quality,
        };
        let out = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{out}");
        return Ok(());
    }

    println!("cores:        {}", capabilities.hardware_concurrency);
    println!("high_perf:    {}", capabilities.is_high_performance);
    println!("accelerated:  {}", capabilities.supports_accelerated_drawing);
    println!("pixel_ratio:  {}", capabilities.device_pixel_ratio);
    println!("particles:    {}", quality.particle_count);
    println!("trails:       {}", quality.enable_trails);
    println!("shapes:       {}", quality.enable_complex_shapes);
    println!("connections:  {}", quality.max_connections);
    println!("speed:        {}", quality.animation_speed);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    frames: u64,
    connection_rebuilds: u64,
    metrics: PerformanceMetrics,
    performance_good: bool,
}

async fn cmd_run(config: &SimConfig, frames: u64, realtime: bool, json: bool) -> Result<()> {
    let mut scene = build_scene(config)?;
    let ran = if realtime {
        run_realtime(&mut scene, frames, config.frame_interval_ms).await?
    } else {
        run_offline(&mut scene, frames, config.frame_interval_ms)
    };

    let report = RunReport {
        frames: ran,
        connection_rebuilds: scene.connection_rebuilds(),
        metrics: scene.metrics(),
        performance_good: scene.is_performance_good(),
    };
    scene.dispose();

    if json {
        let out = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{out}");
        return Ok(());
    }

    let m = report.metrics;
    println!("frames:       {}", report.frames);
    println!("particles:    {}", m.particle_count);
    println!("connections:  {}", m.connection_count);
    println!("rebuilds:     {}", report.connection_rebuilds);
    println!("fps:          {:.1}", m.fps);
    println!("frame_time:   {:.2}ms", m.frame_time);
    println!("render_time:  {:.3}ms", m.render_time);
    println!(
        "performance:  {}",
        if report.performance_good { "good" } else { "poor" }
    );
    Ok(())
}

fn cmd_snapshot(config: &SimConfig, path: &Path, frames: u64) -> Result<()> {
    let mut scene = build_scene(config)?;
    let ran = run_offline(&mut scene, frames, config.frame_interval_ms);

    let raster = scene
        .host()
        .raster()
        .context("drawing surface disappeared")?;
    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    let bytes = if is_png {
        raster.to_png().context("failed to encode PNG")?
    } else {
        raster.to_ppm()
    };
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "wrote {} ({}x{}, {} frames)",
        path.display(),
        raster.pixel_width(),
        raster.pixel_height(),
        ran
    );
    Ok(())
}
