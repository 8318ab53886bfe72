use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::attribute_classifier::{AttributeClassifier, Gender};
use crate::detection::domain::landmark_set::{LandmarkSet, Point3};
use crate::detection::domain::landmark_source::{DetectionError, LandmarkSource};
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("failed to open recording {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read recording line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed recording line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("recording line {line} repeats frame index {index}")]
    DuplicateIndex { line: usize, index: usize },
}

/// One line of a JSON-lines landmark recording.
///
/// `landmarks: null` means the detector found no face. Individual
/// coordinates may be `null`, which stands for a non-finite value (JSON has
/// no NaN), so corrupted detector output can be captured faithfully.
#[derive(Debug, Deserialize)]
struct RecordedFrame {
    index: Option<usize>,
    #[serde(default)]
    timestamp_ms: f64,
    landmarks: Option<Vec<[Option<f64>; 3]>>,
    #[serde(default)]
    gender: Option<String>,
}

/// A landmark stream captured from a real detector, replayable frame by frame.
pub struct RecordedStream {
    timestamps: Vec<(usize, f64)>,
    landmarks: Arc<HashMap<usize, LandmarkSet>>,
    genders: Arc<HashMap<usize, Gender>>,
}

impl RecordedStream {
    pub fn load(path: &Path) -> Result<Self, RecordingError> {
        let file = File::open(path).map_err(|source| RecordingError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(BufReader::new(file))
    }

    /// Parses JSON lines. Blank lines are skipped; frames without an explicit
    /// `index` are numbered by their position in the stream. Each index may
    /// appear only once.
    pub fn parse(reader: impl BufRead) -> Result<Self, RecordingError> {
        let mut timestamps = Vec::new();
        let mut landmarks = HashMap::new();
        let mut genders = HashMap::new();
        let mut seen = HashSet::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| RecordingError::Read {
                line: line_no + 1,
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: RecordedFrame =
                serde_json::from_str(&line).map_err(|source| RecordingError::Parse {
                    line: line_no + 1,
                    source,
                })?;

            let index = record.index.unwrap_or(timestamps.len());
            if !seen.insert(index) {
                return Err(RecordingError::DuplicateIndex {
                    line: line_no + 1,
                    index,
                });
            }
            timestamps.push((index, record.timestamp_ms));

            if let Some(points) = record.landmarks {
                landmarks.insert(index, to_landmark_set(points));
            }
            if let Some(gender) = record.gender.as_deref().and_then(Gender::parse) {
                genders.insert(index, gender);
            }
        }

        Ok(Self {
            timestamps,
            landmarks: Arc::new(landmarks),
            genders: Arc::new(genders),
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Pixel-less frames in recording order, carrying index and timestamp.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        self.timestamps
            .iter()
            .map(|&(index, ts)| Frame::placeholder(index).with_timestamp(ts))
    }

    pub fn landmark_source(&self) -> RecordedLandmarkSource {
        RecordedLandmarkSource::new(self.landmarks.clone())
    }

    pub fn classifier(&self) -> RecordedAttributeClassifier {
        RecordedAttributeClassifier {
            genders: self.genders.clone(),
        }
    }
}

fn to_landmark_set(points: Vec<[Option<f64>; 3]>) -> LandmarkSet {
    LandmarkSet::new(
        points
            .into_iter()
            .map(|[x, y, z]| {
                Point3::new(
                    x.unwrap_or(f64::NAN),
                    y.unwrap_or(f64::NAN),
                    z.unwrap_or(f64::NAN),
                )
            })
            .collect(),
    )
}

/// Replays recorded landmark sets by frame index.
///
/// Frames missing from the recording are reported as "no face".
pub struct RecordedLandmarkSource {
    landmarks: Arc<HashMap<usize, LandmarkSet>>,
}

impl RecordedLandmarkSource {
    pub fn new(landmarks: Arc<HashMap<usize, LandmarkSet>>) -> Self {
        Self { landmarks }
    }
}

impl LandmarkSource for RecordedLandmarkSource {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, DetectionError> {
        Ok(self.landmarks.get(&frame.index()).cloned())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Replays the classifier label recorded for a frame, if any.
pub struct RecordedAttributeClassifier {
    genders: Arc<HashMap<usize, Gender>>,
}

impl AttributeClassifier for RecordedAttributeClassifier {
    fn classify(&mut self, frame: &Frame) -> Result<Option<Gender>, Box<dyn std::error::Error>> {
        Ok(self.genders.get(&frame.index()).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RECORDING: &str = r#"
{"index": 0, "timestamp_ms": 0.0, "landmarks": [[0.5, 0.5, 0.0], [0.4, 0.4, 0.0]]}
{"index": 1, "timestamp_ms": 16.7, "landmarks": null}

{"index": 2, "timestamp_ms": 33.4, "landmarks": [[null, 0.5, 0.0]], "gender": "female"}
"#;

    #[test]
    fn test_parse_counts_frames_and_skips_blank_lines() {
        let stream = RecordedStream::parse(Cursor::new(RECORDING)).unwrap();
        assert_eq!(stream.len(), 3);
        let indices: Vec<usize> = stream.frames().map(|f| f.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_frames_carry_timestamps() {
        let stream = RecordedStream::parse(Cursor::new(RECORDING)).unwrap();
        let last = stream.frames().last().unwrap();
        assert!((last.timestamp_ms() - 33.4).abs() < 1e-9);
    }

    #[test]
    fn test_source_replays_landmarks_by_index() {
        let stream = RecordedStream::parse(Cursor::new(RECORDING)).unwrap();
        let mut source = stream.landmark_source();

        let first = source.detect(&Frame::placeholder(0)).unwrap().unwrap();
        assert_eq!(first.len(), 2);
        assert!(source.detect(&Frame::placeholder(1)).unwrap().is_none());
        assert!(source.detect(&Frame::placeholder(99)).unwrap().is_none());
    }

    #[test]
    fn test_null_coordinate_becomes_non_finite() {
        let stream = RecordedStream::parse(Cursor::new(RECORDING)).unwrap();
        let mut source = stream.landmark_source();
        let lm = source.detect(&Frame::placeholder(2)).unwrap().unwrap();
        assert!(lm.points()[0].x.is_nan());
        assert_eq!(lm.finite_x(0), None);
    }

    #[test]
    fn test_classifier_replays_recorded_label() {
        let stream = RecordedStream::parse(Cursor::new(RECORDING)).unwrap();
        let mut classifier = stream.classifier();
        assert_eq!(
            classifier.classify(&Frame::placeholder(2)).unwrap(),
            Some(Gender::Female)
        );
        assert_eq!(classifier.classify(&Frame::placeholder(0)).unwrap(), None);
    }

    #[test]
    fn test_missing_index_uses_position() {
        let data = "{\"landmarks\": null}\n{\"landmarks\": [[0.1, 0.1, 0.1]]}\n";
        let stream = RecordedStream::parse(Cursor::new(data)).unwrap();
        let mut source = stream.landmark_source();
        assert!(source.detect(&Frame::placeholder(1)).unwrap().is_some());
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let data = "{\"index\": 0, \"landmarks\": null}\nnot json\n";
        let err = RecordedStream::parse(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, RecordingError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_repeated_index_is_rejected() {
        let data = "{\"index\": 4, \"landmarks\": null}\n{\"index\": 4, \"landmarks\": [[0.1, 0.1, 0.1]]}\n";
        let err = RecordedStream::parse(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, RecordingError::DuplicateIndex { line: 2, index: 4 }));
    }

    #[test]
    fn test_position_colliding_with_explicit_index_is_rejected() {
        let data = "{\"index\": 1, \"landmarks\": null}\n{\"landmarks\": null}\n";
        let err = RecordedStream::parse(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, RecordingError::DuplicateIndex { line: 2, index: 1 }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecordedStream::load(&dir.path().join("missing.jsonl")).err().unwrap();
        assert!(matches!(err, RecordingError::Open { .. }));
    }
}
