use serde::{Deserialize, Serialize};

use crate::shared::frame::Frame;

/// Label produced by the optional attribute classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain interface for the secondary gender/age classifier.
///
/// Non-critical enrichment: the session calls it at most once and ignores
/// failures, so it has no bearing on the liveness outcome.
pub trait AttributeClassifier: Send {
    fn classify(&mut self, frame: &Frame) -> Result<Option<Gender>, Box<dyn std::error::Error>>;
}
