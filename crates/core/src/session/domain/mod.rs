pub mod frame_report;
pub mod guidance;
pub mod phase;
pub mod session_event;
pub mod session_state;
