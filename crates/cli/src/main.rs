use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use headturn_core::capture::infrastructure::image_file_source::ImageFileSource;
use headturn_core::capture::infrastructure::image_file_writer::ImageFileWriter;
use headturn_core::capture::photo_capture_use_case::PhotoCaptureUseCase;
use headturn_core::challenge::domain::progress::Progress;
use headturn_core::detection::infrastructure::recorded_stream::RecordedStream;
use headturn_core::session::domain::guidance::STEP_LABELS;
use headturn_core::session::domain::phase::Phase;
use headturn_core::session::infrastructure::session_worker::{SessionWorker, WorkerMessage};
use headturn_core::session::liveness_session::LivenessSession;
use headturn_core::session::session_observer::LoggingSessionObserver;
use headturn_core::shared::config::EngineConfig;
use headturn_core::shared::constants::IMAGE_EXTENSIONS;
use headturn_core::shared::device::DeviceClass;
use headturn_core::storage::domain::classification_cache::ClassificationCache;
use headturn_core::storage::domain::key_value_store::KeyValueStore;
use headturn_core::storage::domain::progress_store::{ProgressLoad, ProgressStore};
use headturn_core::storage::infrastructure::json_file_store::JsonFileStore;

/// Head-turn liveness verification over recorded face-landmark streams.
#[derive(Parser)]
#[command(name = "headturn", version)]
struct Cli {
    /// State file holding progress across runs (default: user data dir).
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON-lines landmark recording through the challenge.
    Verify(VerifyArgs),
    /// Show persisted progress and the cached classification.
    Status,
    /// Clear persisted progress.
    Reset {
        /// Also forget the cached classification.
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args)]
struct VerifyArgs {
    /// Landmark recording (one JSON object per frame).
    landmarks: PathBuf,

    /// Engine config JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Client user agent, used to detect mobile devices.
    #[arg(long)]
    user_agent: Option<String>,

    /// Treat the client as mobile regardless of user agent.
    #[arg(long)]
    mobile: bool,

    /// Yaw delta that counts as a turn.
    #[arg(long)]
    yaw_threshold: Option<f64>,

    /// Yaw delta below which the head counts as centered.
    #[arg(long)]
    neutral_threshold: Option<f64>,

    /// Consecutive frames a direction must be held.
    #[arg(long)]
    hold_frames: Option<u32>,

    /// Frames used to measure the neutral pose.
    #[arg(long)]
    calibration_frames: Option<u32>,

    /// Consecutive invalid frames tolerated on mobile before photo fallback.
    #[arg(long)]
    degradation_limit: Option<u32>,

    /// EMA weight of the newest yaw value (0.0-1.0].
    #[arg(long)]
    smoothing_alpha: Option<f64>,

    /// Ignore stored progress and start from the first step.
    #[arg(long)]
    fresh: bool,

    /// Run the session on a worker thread.
    #[arg(long)]
    threaded: bool,

    /// Still image to use when the live check falls back to a photo.
    #[arg(long)]
    fallback_photo: Option<PathBuf>,

    /// Where to write the fallback photo.
    #[arg(long, default_value = "fallback.png")]
    photo_out: PathBuf,

    /// Capture the fallback photo even if the live check did not abandon.
    #[arg(long)]
    force_photo: bool,

    /// Keep the photo unmirrored.
    #[arg(long)]
    no_mirror: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let state_path = resolve_state_path(cli.state)?;
    let storage: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(state_path.clone()));

    match cli.command {
        Command::Verify(args) => {
            validate(&args)?;
            run_verify(&args, storage)
        }
        Command::Status => run_status(&state_path, storage),
        Command::Reset { all } => run_reset(all, storage),
    }
}

fn run_verify(args: &VerifyArgs, storage: Arc<dyn KeyValueStore>) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(args)?;
    let device = device_class(args);
    let stream = RecordedStream::load(&args.landmarks)?;
    log::info!("Loaded {} frames from {}", stream.len(), args.landmarks.display());

    if args.fresh {
        ProgressStore::new(storage.clone()).clear()?;
    }

    let session = LivenessSession::new(
        config,
        device,
        Box::new(stream.landmark_source()),
        storage,
        Box::new(LoggingSessionObserver::new()),
    )
    .with_classifier(Box::new(stream.classifier()));

    let session = if args.threaded {
        replay_threaded(session, &stream)?
    } else {
        replay(session, &stream)?
    };

    println!("phase:    {}", session.phase());
    println!("progress: {}/{}", session.progress(), Progress::FINAL);
    if let Some(gender) = session.gender() {
        println!("gender:   {gender}");
    }
    println!("{}", session.instruction());

    match session.phase() {
        Phase::Done => Ok(()),
        Phase::Unsupported => capture_photo(args, session.phase()),
        _ if args.force_photo => capture_photo(args, session.phase()),
        phase => Err(format!(
            "Challenge not completed (phase {phase}, step {}); run again to resume",
            session.progress()
        )
        .into()),
    }
}

fn replay(mut session: LivenessSession, stream: &RecordedStream) -> Result<LivenessSession, Box<dyn std::error::Error>> {
    session.start()?;
    for frame in stream.frames() {
        session.process_frame(&frame);
        if matches!(session.phase(), Phase::Done | Phase::Unsupported) {
            break;
        }
    }
    Ok(session)
}

fn replay_threaded(
    session: LivenessSession,
    stream: &RecordedStream,
) -> Result<LivenessSession, Box<dyn std::error::Error>> {
    let worker = SessionWorker::spawn(session);
    worker.start()?;
    for frame in stream.frames() {
        worker.submit(frame)?;
        let failure = worker.reports().try_iter().find_map(|message| match message {
            WorkerMessage::StartFailed(e) => Some(e),
            WorkerMessage::Report(_) => None,
        });
        if let Some(e) = failure {
            worker.stop()?;
            return Err(e.into());
        }
    }
    let session = worker.stop()?;
    if session.phase() == Phase::Error {
        return Err("Landmark detector failed to initialize".into());
    }
    Ok(session)
}

fn capture_photo(args: &VerifyArgs, phase: Phase) -> Result<(), Box<dyn std::error::Error>> {
    let Some(input) = &args.fallback_photo else {
        return Err("Live check unavailable on this device; pass --fallback-photo to verify with a still".into());
    };
    let mut use_case = PhotoCaptureUseCase::new(
        Box::new(ImageFileSource::new(input.clone())),
        Box::new(ImageFileWriter::new()),
    )
    .with_mirror(!args.no_mirror);
    use_case.execute(phase, &args.photo_out, args.force_photo)?;
    println!("photo:    {}", args.photo_out.display());
    Ok(())
}

fn run_status(state_path: &Path, storage: Arc<dyn KeyValueStore>) -> Result<(), Box<dyn std::error::Error>> {
    let load = ProgressStore::new(storage.clone()).load();
    let progress = match &load {
        ProgressLoad::Ok(p) => *p,
        ProgressLoad::Unavailable(reason) => return Err(format!("State unavailable: {reason}").into()),
        ProgressLoad::Corrupt(raw) => {
            println!("stored progress is unreadable ({raw}); next run starts over");
            load.progress()
        }
    };

    println!("state: {}", state_path.display());
    for (i, label) in STEP_LABELS.iter().enumerate() {
        let mark = if i < progress.value() as usize { "x" } else { " " };
        println!("  [{mark}] {}. {label}", i + 1);
    }
    match ClassificationCache::new(storage).load() {
        Some(gender) => println!("gender: {gender}"),
        None => println!("gender: -"),
    }
    Ok(())
}

fn run_reset(all: bool, storage: Arc<dyn KeyValueStore>) -> Result<(), Box<dyn std::error::Error>> {
    ProgressStore::new(storage.clone()).clear()?;
    if all {
        ClassificationCache::new(storage).clear()?;
    }
    log::info!("Progress cleared");
    Ok(())
}

fn resolve_state_path(state: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    state
        .or_else(JsonFileStore::default_path)
        .ok_or_else(|| "No user data directory available; pass --state".into())
}

fn build_config(args: &VerifyArgs) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(v) = args.yaw_threshold {
        config.yaw_threshold = v;
    }
    if let Some(v) = args.neutral_threshold {
        config.neutral_threshold = v;
    }
    if let Some(v) = args.hold_frames {
        config.hold_frames = v;
    }
    if let Some(v) = args.calibration_frames {
        config.calibration_frames = v;
    }
    if let Some(v) = args.degradation_limit {
        config.degradation_limit = v;
    }
    if let Some(v) = args.smoothing_alpha {
        config.smoothing_alpha = v;
    }
    config.validate()?;
    Ok(config)
}

fn device_class(args: &VerifyArgs) -> DeviceClass {
    if args.mobile {
        return DeviceClass::Mobile;
    }
    args.user_agent
        .as_deref()
        .map(DeviceClass::from_user_agent)
        .unwrap_or_default()
}

fn validate(args: &VerifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.landmarks.exists() {
        return Err(format!("Landmark recording not found: {}", args.landmarks.display()).into());
    }
    if let Some(photo) = &args.fallback_photo {
        if !photo.exists() {
            return Err(format!("Fallback photo not found: {}", photo.display()).into());
        }
    }
    if args.force_photo && args.fallback_photo.is_none() {
        return Err("--force-photo requires --fallback-photo".into());
    }
    if !is_image(&args.photo_out) {
        return Err(format!(
            "Photo output must have an image extension ({}), got {}",
            IMAGE_EXTENSIONS.join(", "),
            args.photo_out.display()
        )
        .into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify_args(extra: &[&str], landmarks: &Path) -> VerifyArgs {
        let mut argv = vec!["headturn", "verify", landmarks.to_str().unwrap()];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Verify(args) => args,
            _ => panic!("expected verify"),
        }
    }

    fn recording(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("frames.jsonl");
        std::fs::write(&path, "{\"landmarks\": null}\n").unwrap();
        path
    }

    #[test]
    fn test_missing_recording_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = verify_args(&[], &dir.path().join("missing.jsonl"));
        let err = validate(&args).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_force_photo_needs_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = verify_args(&["--force-photo"], &recording(&dir));
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_photo_out_needs_image_extension() {
        let dir = tempfile::tempdir().unwrap();
        let args = verify_args(&["--photo-out", "out.txt"], &recording(&dir));
        assert!(validate(&args).is_err());
        let args = verify_args(&["--photo-out", "out.JPG"], &recording(&dir));
        assert!(validate(&args).is_ok());
    }

    #[test]
    fn test_overrides_apply_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let args = verify_args(&["--hold-frames", "3", "--yaw-threshold", "0.02"], &recording(&dir));
        let config = build_config(&args).unwrap();
        assert_eq!(config.hold_frames, 3);
        assert_eq!(config.yaw_threshold, 0.02);

        let args = verify_args(&["--smoothing-alpha", "0"], &recording(&dir));
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_device_class_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = recording(&dir);
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        assert_eq!(device_class(&verify_args(&["--user-agent", iphone], &path)), DeviceClass::Mobile);
        assert_eq!(device_class(&verify_args(&["--mobile"], &path)), DeviceClass::Mobile);
        assert_eq!(device_class(&verify_args(&[], &path)), DeviceClass::Desktop);
    }

    #[test]
    fn test_reset_and_status_against_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        let storage: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(state.clone()));
        ProgressStore::new(storage.clone())
            .save(Progress::new(2).unwrap())
            .unwrap();

        run_status(&state, storage.clone()).unwrap();
        run_reset(false, storage.clone()).unwrap();
        assert_eq!(ProgressStore::new(storage).load(), ProgressLoad::Ok(Progress::START));
    }

    #[test]
    fn test_state_flag_is_global() {
        let cli = Cli::try_parse_from(["headturn", "status", "--state", "/tmp/x.json"]).unwrap();
        assert_eq!(cli.state, Some(PathBuf::from("/tmp/x.json")));
    }
}
