pub mod domain;
pub mod infrastructure;
pub mod liveness_session;
pub mod session_observer;
