pub mod failover_landmark_source;
pub mod recorded_stream;
