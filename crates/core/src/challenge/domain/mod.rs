pub mod calibrator;
pub mod challenge_sequencer;
pub mod degradation_monitor;
pub mod hold_counters;
pub mod progress;
