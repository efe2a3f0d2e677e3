use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use formcoach_core::presets::Side;
use formcoach_core::synthetic::{curl_pose, deadlift_pose, lunge_pose, plank_pose, squat_pose};
use formcoach_core::{
    remap, DetectorRegistry, ExerciseKind, FormcoachConfig, FrameStatus, Joint, LandmarkFrame,
    Session, SkipReason,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const FRAME_US: i64 = 33_333;
const SWEEP_STEPS: usize = 12;
const SETUP_FRAMES: usize = 5;

#[derive(Parser)]
#[command(name = "formcoach", about = "Count repetitions and coach form from pose landmarks")]
struct Cli {
    /// TOML file layered over the built-in presets
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the exercises sessions can be started for
    Exercises,
    /// Print the built-in presets as TOML
    Presets,
    /// Run a JSONL landmark stream ("-" for stdin) through one session
    Replay {
        #[arg(long)]
        exercise: String,
        /// Print only the final summary
        #[arg(long)]
        summary_only: bool,
        frames: PathBuf,
    },
    /// Run a synthetic athlete through a few repetitions
    Demo {
        #[arg(long)]
        exercise: String,
        #[arg(long, default_value_t = 3)]
        reps: u32,
    },
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "formcoach_core=info".parse() {
        filter = filter.add_directive(d);
    }
    if let Ok(d) = "formcoach=info".parse() {
        filter = filter.add_directive(d);
    }
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn load_registry(path: Option<&Path>) -> Result<DetectorRegistry, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(format!("config file not found: {}", path.display()).into());
        }
        info!("loading config from {}", path.display());
    }
    let config = FormcoachConfig::load_layered(None, path)?;
    Ok(DetectorRegistry::from_config(config)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Exercises => {
            let registry = load_registry(cli.config.as_deref())?;
            for name in registry.names() {
                if let Some(exercise) = registry.get(name) {
                    println!("{:<20} {}", name, exercise.kind.name());
                }
            }
        }
        Commands::Presets => {
            print!("{}", FormcoachConfig::default().to_toml_string()?);
        }
        Commands::Replay {
            exercise,
            summary_only,
            frames,
        } => {
            let registry = load_registry(cli.config.as_deref())?;
            let mut session = registry.start_session(&exercise)?;
            replay(&mut session, &frames, summary_only)?;
            println!("{}", serde_json::to_string_pretty(&session.summary())?);
        }
        Commands::Demo { exercise, reps } => {
            let registry = load_registry(cli.config.as_deref())?;
            let mut session = registry.start_session(&exercise)?;
            let frames = demo_frames(&session, reps);
            info!("demo: {} frames for '{}'", frames.len(), exercise);

            let mut last_message = String::new();
            for frame in &frames {
                let response = session.process(frame);
                if response.message != last_message {
                    println!(
                        "{:>7.2}s  reps {:>4.1}  {:>5.1}%  {}",
                        frame.timestamp_us as f64 / 1e6,
                        response.repetition_count,
                        response.completion,
                        response.message
                    );
                    last_message = response.message;
                }
            }
            println!("{}", serde_json::to_string_pretty(&session.summary())?);
        }
    }
    Ok(())
}

fn replay(
    session: &mut Session,
    path: &Path,
    summary_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: LandmarkFrame = serde_json::from_str(&line)
            .map_err(|e| format!("line {}: invalid landmark frame: {}", index + 1, e))?;
        let response = session.process(&frame);
        match &response.status {
            FrameStatus::Skipped(SkipReason::MissingLandmarks(joints)) => {
                let names: Vec<&str> = joints.iter().map(Joint::name).collect();
                warn!("line {}: frame skipped, missing {}", index + 1, names.join(", "));
            }
            FrameStatus::Skipped(reason) => {
                warn!("line {}: frame skipped: {:?}", index + 1, reason);
            }
            FrameStatus::Evaluated => {}
        }
        if !summary_only {
            writeln!(out, "{}", serde_json::to_string(&response)?)?;
        }
    }
    Ok(())
}

/// Primary angle rising and falling between the two ends of the range,
/// after a few frames at the start position.
fn sweep(from: f32, to: f32, reps: u32) -> Vec<f32> {
    let mut values = vec![from; SETUP_FRAMES];
    for _ in 0..reps {
        for step in 1..=SWEEP_STEPS {
            values.push(from + (to - from) * step as f32 / SWEEP_STEPS as f32);
        }
        for step in 1..=SWEEP_STEPS {
            values.push(to + (from - to) * step as f32 / SWEEP_STEPS as f32);
        }
    }
    values
}

fn demo_frames(session: &Session, reps: u32) -> Vec<LandmarkFrame> {
    let config = session.detector().config();
    let at = |i: usize| i as i64 * FRAME_US;

    match config.kind {
        ExerciseKind::Deadlift => sweep(180.0, 60.0, reps)
            .into_iter()
            .enumerate()
            .map(|(i, hip)| deadlift_pose(hip, 170.0, 170.0, 30.0).build(at(i)))
            .collect(),
        ExerciseKind::BicepCurl => {
            let side = if config.joints().contains(&Joint::LeftElbow) {
                Side::Left
            } else {
                Side::Right
            };
            sweep(170.0, 35.0, reps)
                .into_iter()
                .enumerate()
                .map(|(i, elbow)| curl_pose(side, elbow, 20.0).build(at(i)))
                .collect()
        }
        ExerciseKind::Squat => sweep(170.0, 90.0, reps)
            .into_iter()
            .enumerate()
            .map(|(i, knee)| squat_pose(knee, 1.8).build(at(i)))
            .collect(),
        ExerciseKind::Lunge => sweep(170.0, 95.0, reps)
            .into_iter()
            .enumerate()
            .map(|(i, front)| {
                let back = remap(front, (170.0, 95.0), (170.0, 90.0));
                lunge_pose(front, back).build(at(i))
            })
            .collect(),
        // one second of holding per requested repetition
        ExerciseKind::Plank => (0..SETUP_FRAMES + reps as usize * 30)
            .map(|i| plank_pose(175.0).build(at(i)))
            .collect(),
    }
}
