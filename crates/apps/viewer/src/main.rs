use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scene::ElementInfo;
use scene::visibility::FilterPatch;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use viewer::{FrameStats, HeadlessBackend, Visualization, ViewerConfig, ViewerSummary};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the netglobe network globe")]
struct Args {
    /// Topology document URL or path (default: built-in sample network)
    #[arg(long, env = "NETGLOBE_TOPOLOGY")]
    topology: Option<String>,

    /// Cable document URL or path (default: built-in sample cables)
    #[arg(long, env = "NETGLOBE_CABLES")]
    cables: Option<String>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames to render before printing the summary
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Simulated display refresh rate
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Start with rotation paused
    #[arg(long)]
    paused: bool,

    /// Zoom level, 0 (far) to 100 (near)
    #[arg(long)]
    zoom: Option<f64>,

    /// Globe radius in scene units
    #[arg(long)]
    base_radius: Option<f64>,

    /// Rotation speed in radians per second
    #[arg(long)]
    rotation_speed: Option<f64>,

    #[arg(long)]
    hide_existing: bool,

    #[arg(long)]
    hide_proposed: bool,

    #[arg(long)]
    hide_satellites: bool,

    #[arg(long)]
    hide_stations: bool,

    #[arg(long)]
    hide_routers: bool,

    #[arg(long)]
    hide_cables: bool,

    /// Report the element under this canvas pixel after the last frame
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    pick: Option<Vec<f64>>,
}

#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    summary: ViewerSummary,
    last_frame: Option<FrameStats>,
    picked: Option<ElementInfo>,
}

impl Args {
    fn into_config(self) -> Result<(ViewerConfig, RunOptions), viewer::ConfigError> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::from_json_file(path)?,
            None => ViewerConfig::default(),
        };
        if self.topology.is_some() {
            config.topology = self.topology;
        }
        if self.cables.is_some() {
            config.cables = self.cables;
        }
        if let Some(radius) = self.base_radius {
            config.projection.base_radius = radius;
        }
        if let Some(speed) = self.rotation_speed {
            config.rotation_speed = speed;
        }
        config.filter.apply(&FilterPatch {
            show_existing: self.hide_existing.then_some(false),
            show_proposed: self.hide_proposed.then_some(false),
            show_satellites: self.hide_satellites.then_some(false),
            show_stations: self.hide_stations.then_some(false),
            show_routers: self.hide_routers.then_some(false),
            show_cables: self.hide_cables.then_some(false),
            zoom_level: self.zoom,
            is_rotating: self.paused.then_some(false),
        });
        config.validate()?;

        let pick = match self.pick.as_deref() {
            Some([x, y]) => Some((*x, *y)),
            _ => None,
        };
        let options = RunOptions {
            frames: self.frames,
            dt: if self.fps.is_finite() && self.fps > 0.0 {
                1.0 / self.fps
            } else {
                1.0 / 60.0
            },
            pick,
        };
        Ok((config, options))
    }
}

struct RunOptions {
    frames: u32,
    dt: f64,
    pick: Option<(f64, f64)>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (config, options) = match Args::parse().into_config() {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    match run(&config, &options).await {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("failed to encode summary: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    config: &ViewerConfig,
    options: &RunOptions,
) -> Result<Report, viewer::VisualizationError> {
    let mut viz = Visualization::new(HeadlessBackend::new(), config)?;
    viz.load_topology().await?;
    if viz.using_fallback_data() {
        info!("network data unavailable, showing sample network");
    }

    for _ in 0..options.frames {
        viz.tick(options.dt)?;
    }

    let picked = options.pick.and_then(|(x, y)| viz.pick_screen(x, y));
    let last_frame = viz.backend().and_then(HeadlessBackend::last_frame);
    viz.dispose();

    info!(frames = options.frames, "run complete");
    Ok(Report {
        summary: viz.summary(),
        last_frame,
        picked,
    })
}
