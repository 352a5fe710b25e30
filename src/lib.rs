//! Feedercam - smart bird feeder monitor.
//!
//! Classifies camera frames with an ONNX species model and reacts with
//! deduplicated visit logging, interval-consensus resolution, and ambient
//! lighting on a Philips Hue bridge.

#![warn(missing_docs)]

pub mod capture;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod inference;
pub mod lighting;
pub mod monitor;
pub mod sink;
pub mod status;

use capture::{DirectorySource, FrameSource};
use chrono::Local;
use clap::Parser;
use cli::{Cli, Command, ConfigAction, MonitorArgs};
use config::{Config, load_default_config, save_default_config};
use inference::{ClassifiedFrame, ImageClassifier};
use lighting::{HueLights, LightingDevice, NullLights};
use monitor::{FeederMonitor, timer};
use sink::{FileStore, SinkMessage, spawn_sink_worker};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for the feedercam CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.monitor.verbose, cli.monitor.quiet);

    // Load configuration
    let config = load_default_config()?;

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command, &config);
    }

    // Exit cleanly on interrupt; timers and the sink worker die with the
    // process, which is the only shutdown contract they have.
    if let Err(e) = ctrlc::set_handler(|| {
        std::process::exit(130); // 128 + SIGINT(2)
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    // Initialize ONNX Runtime
    inference::init_runtime();

    let config = apply_overrides(config, &cli.monitor);
    config::validate_config(&config)?;

    run_monitor(&config, &cli.monitor)
}

/// Overlay CLI flags on the file configuration.
fn apply_overrides(mut config: Config, args: &MonitorArgs) -> Config {
    if let Some(ref model) = args.model {
        config.model.path = Some(model.clone());
    }
    if let Some(ref labels) = args.labels {
        config.model.labels = Some(labels.clone());
    }
    if let Some(ref source) = args.source {
        config.capture.source = Some(source.clone());
    }
    if args.follow {
        config.capture.follow = true;
    }
    if let Some(top_k) = args.top_k {
        config.detection.top_k = top_k;
    }
    if let Some(threshold) = args.threshold {
        config.detection.threshold = threshold;
    }
    if let Some(ref storage) = args.storage {
        config.visits.storage = Some(storage.clone());
    }
    if let Some(interval) = args.visit_interval {
        config.visits.interval_secs = interval;
    }
    if let Some(interval) = args.consensus_interval {
        config.consensus.interval_secs = interval;
    }

    config
}

/// Run the monitor loop until the frame source is exhausted.
fn run_monitor(config: &Config, args: &MonitorArgs) -> Result<()> {
    // Validated above; these cannot be None here.
    let storage_dir = config
        .visits
        .storage
        .as_ref()
        .ok_or_else(|| Error::Internal {
            message: "storage directory missing after validation".to_string(),
        })?;
    let source_dir = config
        .capture
        .source
        .as_ref()
        .ok_or_else(|| Error::Internal {
            message: "frame source missing after validation".to_string(),
        })?;

    // Build classifier (bad models abort here, before any frame)
    let mut classifier = ImageClassifier::from_config(&config.model, &config.detection)?;

    // Persistence worker
    let store = FileStore::open(storage_dir)?;
    let sink = spawn_sink_worker(Box::new(store))?;

    // Lighting device
    let device: Box<dyn LightingDevice> = match (&config.lighting, args.no_lighting) {
        (Some(lighting), false) => Box::new(HueLights::from_config(lighting)?),
        _ => Box::new(NullLights),
    };
    let palette = config
        .lighting
        .as_ref()
        .map(|l| l.palette.clone())
        .unwrap_or_default();
    let exclusions: HashSet<String> = config.detection.exclusions.iter().cloned().collect();

    // The monitor is the single mutual-exclusion domain: frame processing
    // and both timer callbacks serialize on this lock.
    let feeder = Arc::new(Mutex::new(FeederMonitor::new(
        exclusions,
        palette,
        device,
        Instant::now(),
    )));

    let visit_monitor = Arc::clone(&feeder);
    timer::spawn_periodic(
        "visit-window",
        Duration::from_secs(config.visits.interval_secs),
        move || match visit_monitor.lock() {
            Ok(mut guard) => guard.visit_window_tick(Instant::now()),
            Err(_) => warn!("Monitor lock poisoned, skipping visit-window tick"),
        },
    )?;

    let consensus_monitor = Arc::clone(&feeder);
    timer::spawn_periodic(
        "consensus",
        Duration::from_secs(config.consensus.interval_secs),
        move || match consensus_monitor.lock() {
            Ok(mut guard) => {
                guard.consensus_tick(Instant::now());
            }
            Err(_) => warn!("Monitor lock poisoned, skipping consensus tick"),
        },
    )?;

    // Frame source
    let mut source = DirectorySource::open(
        source_dir,
        config.capture.follow,
        Duration::from_millis(config.capture.poll_interval_ms),
    )?;

    info!(
        "Monitoring feeder: source={}, visit interval {}s, consensus interval {}s{}",
        source_dir.display(),
        config.visits.interval_secs,
        config.consensus.interval_secs,
        if args.training { " (training mode)" } else { "" }
    );

    let mut frames: u64 = 0;
    let mut visits: u64 = 0;
    let mut last_labels: Vec<String> = Vec::new();
    let mut last_frame_end = Instant::now();

    while let Some(image) = source.next_frame()? {
        let inference_start = Instant::now();
        // A failing classifier is "no detection for this frame", never fatal.
        let frame = classifier.classify(&image, Local::now()).unwrap_or_else(|e| {
            warn!("Classifier error, treating frame as no detection: {e}");
            ClassifiedFrame {
                ranked: Vec::new(),
                timestamp: Local::now(),
            }
        });
        frames += 1;

        if args.print_debug {
            print_frame_debug(inference_start.elapsed(), last_frame_end.elapsed(), &frame);
        }
        last_frame_end = Instant::now();

        if args.training {
            // Training mode collects frames whose labels differ from the
            // previous frame; the visit/consensus path is bypassed.
            let current = frame.labels();
            if labels_differ(&current, &last_labels, config.detection.top_k) {
                info!("Difference detected, saving training capture");
                sink.send(SinkMessage::TrainingCapture {
                    image,
                    tag: constants::TRAINING_TAG.to_string(),
                });
            }
            last_labels = current.into_iter().map(ToString::to_string).collect();
            continue;
        }

        let event = feeder
            .lock()
            .map_err(|_| Error::Internal {
                message: "monitor lock poisoned".to_string(),
            })?
            .process_frame(&frame);

        if let Some(event) = event {
            visits += 1;
            sink.send(SinkMessage::Visit { event, image });
        }
    }

    info!("Frame source exhausted: {frames} frames processed, {visits} visits logged");
    Ok(())
}

/// True when fewer than `top_k` labels are shared between frames.
///
/// Training mode uses this to spot classifier output changes worth keeping
/// as candidate images for a custom model.
fn labels_differ(current: &[&str], previous: &[String], top_k: usize) -> bool {
    let shared = current
        .iter()
        .filter(|label| previous.iter().any(|p| p == *label))
        .count();
    shared < top_k
}

/// Print per-frame timing and results for the print-debug flag.
#[allow(clippy::print_stdout)]
fn print_frame_debug(inference: Duration, frame_gap: Duration, frame: &ClassifiedFrame) {
    let fps = if frame_gap.as_secs_f64() > 0.0 {
        1.0 / frame_gap.as_secs_f64()
    } else {
        0.0
    };
    println!(
        "\nInference: {:.2} ms, FPS: {:.2} fps",
        inference.as_secs_f64() * 1000.0,
        fps
    );
    for prediction in &frame.ranked {
        println!(" {}, score={:.2}", prediction.label, prediction.confidence);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging is suppressed by default; use -v for debug, -vv for trace.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt().with_env_filter(filter).init();
}

fn handle_command(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
        Command::Tally { storage } => handle_tally_command(storage, config),
    }
}

#[allow(clippy::print_stdout)]
fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = save_default_config(&Config::default())?;
            println!("Created config file: {}", path.display());
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let contents =
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("{contents}");
        }
        ConfigAction::Path => {
            println!("{}", config::config_file_path()?.display());
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn handle_tally_command(storage: Option<PathBuf>, config: &Config) -> Result<()> {
    let storage = storage
        .or_else(|| config.visits.storage.clone())
        .ok_or_else(|| Error::ConfigValidation {
            message: "no storage directory (use --storage or set visits.storage in config)"
                .to_string(),
        })?;

    let tally = status::visit_tally(&storage)?;
    if tally.is_empty() {
        println!("No visits logged yet.");
        return Ok(());
    }

    let mut entries: Vec<(String, u64)> = tally.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (species, count) in entries {
        println!("{count:>6}  {species}");
    }
    Ok(())
}
