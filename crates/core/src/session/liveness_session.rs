use std::sync::Arc;

use crate::challenge::domain::progress::Progress;
use crate::detection::domain::attribute_classifier::{AttributeClassifier, Gender};
use crate::detection::domain::landmark_source::LandmarkSource;
use crate::session::domain::frame_report::FrameReport;
use crate::session::domain::guidance;
use crate::session::domain::phase::Phase;
use crate::session::domain::session_event::SessionEvent;
use crate::session::domain::session_state::{step, Observation, SessionState};
use crate::session::session_observer::SessionObserver;
use crate::shared::config::EngineConfig;
use crate::shared::device::DeviceClass;
use crate::shared::error::LivenessError;
use crate::shared::frame::Frame;
use crate::storage::domain::classification_cache::ClassificationCache;
use crate::storage::domain::key_value_store::{KeyValueStore, StorageError};
use crate::storage::domain::progress_store::{ProgressLoad, ProgressStore};

/// Head-turn liveness check: detector → yaw → calibration → challenge.
///
/// Owns the detector, the persisted caches and the frame state machine.
/// One instance serves one user; feed it frames in capture order.
pub struct LivenessSession {
    config: EngineConfig,
    device: DeviceClass,
    source: Box<dyn LandmarkSource>,
    classifier: Option<Box<dyn AttributeClassifier>>,
    progress_store: ProgressStore,
    classification_cache: ClassificationCache,
    observer: Box<dyn SessionObserver>,
    state: SessionState,
    initial_load: ProgressLoad,
    gender: Option<Gender>,
    classification_attempted: bool,
    diagnostic: Option<String>,
    last_report: Option<FrameReport>,
    storage_issue: Option<LivenessError>,
}

impl LivenessSession {
    /// Builds a session in the loading phase, resuming stored progress.
    pub fn new(
        config: EngineConfig,
        device: DeviceClass,
        source: Box<dyn LandmarkSource>,
        storage: Arc<dyn KeyValueStore>,
        observer: Box<dyn SessionObserver>,
    ) -> Self {
        let progress_store = ProgressStore::new(storage.clone());
        let classification_cache = ClassificationCache::new(storage);

        let initial_load = progress_store.load();
        match &initial_load {
            ProgressLoad::Ok(p) if p.value() > 0 => log::info!("Resuming at step {p}"),
            ProgressLoad::Ok(_) => {}
            ProgressLoad::Unavailable(reason) => {
                log::warn!("Progress storage unavailable ({reason}); starting from the first step")
            }
            ProgressLoad::Corrupt(raw) => {
                log::warn!("Ignoring unreadable stored progress {raw:?}")
            }
        }

        let state = SessionState::new(&config, device, initial_load.progress());
        let gender = classification_cache.load();

        Self {
            config,
            device,
            source,
            classifier: None,
            progress_store,
            classification_cache,
            observer,
            state,
            initial_load,
            gender,
            classification_attempted: false,
            diagnostic: None,
            last_report: None,
            storage_issue: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn AttributeClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Brings up the landmark detector. On failure the session enters the
    /// error phase; calling again retries.
    pub fn initialize(&mut self) -> Result<(), LivenessError> {
        match self.source.initialize() {
            Ok(()) => {
                log::info!("Landmark detector '{}' ready ({} client)", self.source.name(), self.device);
                if matches!(self.state.phase(), Phase::Loading | Phase::Error) {
                    self.transition(self.state.clone().with_phase(Phase::Idle));
                }
                Ok(())
            }
            Err(e) => {
                log::error!("Landmark detector failed to initialize: {e}");
                self.transition(self.state.clone().with_phase(Phase::Error));
                Err(LivenessError::DetectorInitializationFailed(e.to_string()))
            }
        }
    }

    /// Starts a new attempt from calibration, initializing the detector
    /// first if needed. Stored progress is resumed.
    pub fn start(&mut self) -> Result<(), LivenessError> {
        if matches!(self.state.phase(), Phase::Loading | Phase::Error) {
            self.initialize()?;
        }
        self.diagnostic = None;
        self.last_report = None;
        self.transition(self.state.clone().restart());
        Ok(())
    }

    /// Discards all progress, persisted included, and returns to idle.
    /// The cached classification is kept.
    pub fn reset(&mut self) {
        self.transition(self.state.clone().cleared());
        if let Err(e) = self.progress_store.clear() {
            self.storage_failed("clear progress", e);
        }
        self.classification_attempted = false;
        self.diagnostic = None;
        self.last_report = None;
    }

    /// Runs one captured frame through the check.
    pub fn process_frame(&mut self, frame: &Frame) -> FrameReport {
        if matches!(self.state.phase(), Phase::Loading | Phase::Error) {
            return FrameReport::new(self.state.phase(), self.state.progress());
        }

        let detected = match self.source.detect(frame) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                log::debug!("Frame {}: detection failed: {e}", frame.index());
                None
            }
        };
        let observation = match &detected {
            Some(landmarks) => Observation::Face(landmarks),
            None => Observation::NoFace,
        };

        let outcome = step(self.state.clone(), &self.config, observation);
        self.state = outcome.state;
        for event in &outcome.events {
            self.apply(event);
        }

        let report = outcome.report;
        if report.request_classification {
            self.classify_once(frame);
        }
        if let Some(line) = guidance::diagnostic(&report, self.gender, self.config.no_face_notice_frames) {
            log::debug!("Frame {}: {line}", frame.index());
            self.diagnostic = Some(line);
        }
        self.last_report = Some(report.clone());
        report
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn progress(&self) -> Progress {
        self.state.progress()
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    /// `(accumulated, required)` calibration frames.
    pub fn calibration_progress(&self) -> (u32, u32) {
        (self.state.calibration_count(), self.config.calibration_frames)
    }

    pub fn instruction(&self) -> &'static str {
        guidance::instruction(self.state.phase(), self.state.progress())
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    /// How the stored progress read went when the session was built.
    pub fn initial_load(&self) -> &ProgressLoad {
        &self.initial_load
    }

    pub fn fallback_required(&self) -> bool {
        self.state.phase() == Phase::Unsupported
    }

    /// Most recent persistence failure, if any. Never fatal.
    pub fn storage_issue(&self) -> Option<&LivenessError> {
        self.storage_issue.as_ref()
    }

    fn storage_failed(&mut self, action: &str, error: StorageError) {
        log::warn!("Could not {action}: {error}");
        self.storage_issue = Some(LivenessError::StorageUnavailable(error.to_string()));
    }

    fn transition(&mut self, next: SessionState) {
        let events = self.state.events_towards(&next);
        self.state = next;
        for event in &events {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::ProgressChanged(progress) => {
                if let Err(e) = self.progress_store.save(*progress) {
                    self.storage_failed("persist progress", e);
                }
            }
            SessionEvent::Succeeded => {
                if let Err(e) = self.progress_store.clear() {
                    self.storage_failed("clear progress", e);
                }
            }
            SessionEvent::PhaseChanged(_) | SessionEvent::FallbackRequired => {}
        }
        self.observer.notify(event);
    }

    fn classify_once(&mut self, frame: &Frame) {
        if self.gender.is_some() || self.classification_attempted {
            return;
        }
        let Some(classifier) = self.classifier.as_mut() else {
            return;
        };
        self.classification_attempted = true;

        match classifier.classify(frame) {
            Ok(Some(gender)) => {
                log::info!("Classifier label: {gender}");
                self.gender = Some(gender);
                if let Err(e) = self.classification_cache.save(gender) {
                    self.storage_failed("cache classification", e);
                }
            }
            Ok(None) => log::debug!("Classifier returned no label"),
            Err(e) => log::warn!("Classifier failed: {e}"),
        }
    }
}
