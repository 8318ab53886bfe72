pub mod channel_session_observer;
pub mod session_worker;
