// main.rs - Headless session runner: ticks the engine at a fixed frame rate,
// optionally replays a scripted input timeline, and prints the final state.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use cinematic_engine::{
    AudioMix, CameraMode, CameraPose, Command, DeviceProfile, EngineConfig, EngineHost, InputEvent, IntentSender,
    OrchestratorBuilder, PlaybackSpeed, SceneCamera, Theme, TimelineState, ZoneDirectory,
};

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Experience theme to select at startup
    #[arg(short, long, default_value = "cyberpunk", value_parser = parse_theme)]
    pub theme: Theme,

    /// Simulated session length in seconds
    #[arg(short, long, default_value = "60")]
    pub seconds: f32,

    /// Frames per second to tick at
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Autoplay speed (1, 2 or 3)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=3))]
    pub speed: u8,

    /// Engine config JSON; defaults are used for missing fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Zone directory JSON replacing the built-in tables
    #[arg(short, long)]
    pub zones: Option<PathBuf>,

    /// Start in free-look explore mode instead of autoplay
    #[arg(long)]
    pub explore: bool,

    /// JSON array of `{ "at": seconds, "event": InputEvent }` to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Pace frames against the wall clock instead of running flat out
    #[arg(long)]
    pub realtime: bool,

    /// Write the final report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_theme(s: &str) -> std::result::Result<Theme, String> {
    Theme::parse(s).ok_or_else(|| format!("unknown theme '{s}' (expected cyberpunk or nature)"))
}

/// One scripted input, delivered once the engine clock reaches `at`
#[derive(Debug, Clone, Deserialize)]
struct ScriptedEvent {
    at: f64,
    event: InputEvent,
}

/// Host stand-in: keeps a scene camera, grants pointer lock on request and
/// records the latest audio mix.
struct HeadlessHost {
    camera: SceneCamera,
    sender: IntentSender,
    mix: AudioMix,
}

impl EngineHost for HeadlessHost {
    fn apply_camera(&mut self, pose: &CameraPose) {
        self.camera.apply(pose);
    }

    fn request_pointer_lock(&mut self) {
        // Granted asynchronously, like a browser would
        if let Err(e) = self.sender.send(InputEvent::PointerLockChanged(true)) {
            warn!("Could not report pointer lock: {e}");
        }
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        info!("Fullscreen {}", if fullscreen { "on" } else { "off" });
    }

    fn apply_audio(&mut self, mix: &AudioMix) {
        self.mix = *mix;
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionReport {
    frames: u64,
    engine_seconds: f64,
    state: TimelineState,
    camera: CameraPose,
    audio: AudioMix,
}

async fn load_script(path: &Path) -> Result<Vec<ScriptedEvent>> {
    let s = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut events: Vec<ScriptedEvent> = serde_json::from_str(&s)
        .with_context(|| format!("Failed to parse script JSON from {}", path.display()))?;
    events.sort_by(|a, b| a.at.total_cmp(&b.at));
    Ok(events)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting with {args:?}");

    if args.fps == 0 {
        return Err(anyhow!("--fps must be positive"));
    }

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let directory = match &args.zones {
        Some(path) => ZoneDirectory::from_json_file(path)
            .with_context(|| format!("Failed to load zone directory {}", path.display()))?,
        None => ZoneDirectory::builtin(),
    };
    let script = match &args.script {
        Some(path) => load_script(path).await?,
        None => Vec::new(),
    };

    let mut engine = OrchestratorBuilder::new()
        .config(config)
        .directory(directory)
        .device_profile(DeviceProfile::detect())
        .build()
        .context("Failed to build orchestrator")?;

    let sender = engine.sender();
    let mut host = HeadlessHost {
        camera: SceneCamera::default(),
        sender: sender.clone(),
        mix: AudioMix::silent(),
    };

    let speed = PlaybackSpeed::try_from(args.speed)?;
    sender.send(InputEvent::Command(Command::SelectExperience(args.theme)))?;
    sender.send(InputEvent::Command(Command::SetSpeed(speed)))?;
    if args.explore {
        sender.send(InputEvent::Command(Command::SetCameraMode(CameraMode::Explore)))?;
        sender.send(InputEvent::PointerClick)?;
    }

    let dt = 1.0 / args.fps as f32;
    let total_frames = (args.seconds.max(0.0) * args.fps as f32).round() as u64;
    let mut interval = tokio::time::interval(Duration::from_secs_f32(dt));
    let mut zone_watch = engine.store().subscribe();
    let mut last_zone = None;
    let mut pending = script.into_iter().peekable();

    let start = Instant::now();
    for frame in 0..total_frames {
        if args.realtime {
            interval.tick().await;
        }

        while let Some(next) = pending.next_if(|e| e.at <= engine.clock()) {
            sender.send(next.event)?;
        }

        engine.tick(dt, &mut host);

        if zone_watch.has_changed().unwrap_or(false) {
            let state = zone_watch.borrow_and_update();
            if state.is_experience_selected() && last_zone != Some(state.current_zone) {
                info!(
                    "Zone {} at {:.2}s ({:.1}%), visited {}",
                    state.current_zone,
                    state.current_time(),
                    state.progress(),
                    state.visited_zones.len()
                );
                last_zone = Some(state.current_zone);
            }
        }

        if frame > 0 && frame % (args.fps as u64 * 10) == 0 {
            info!("Frame {frame}/{total_frames}, fps {:.1}", engine.store().select(|s| s.fps));
        }
    }

    let report = SessionReport {
        frames: total_frames,
        engine_seconds: engine.clock(),
        state: engine.store().snapshot(),
        camera: *host.camera.pose(),
        audio: host.mix,
    };
    if let Some(theme) = report.state.experience {
        let zone = engine
            .directory()
            .theme(theme)
            .zone_at(report.state.current_zone_index)?;
        info!("Finished in {} ({})", zone.name, zone.description);
    }
    engine.shutdown(&mut host);
    info!("Session complete: {total_frames} frames in {:?}", start.elapsed());

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    match &args.output {
        Some(path) => tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
