pub mod attribute_classifier;
pub mod landmark_set;
pub mod landmark_source;
