use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::session::domain::frame_report::FrameReport;
use crate::session::liveness_session::LivenessSession;
use crate::shared::error::LivenessError;
use crate::shared::frame::Frame;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

pub enum SessionCommand {
    Start,
    Frame(Frame),
    Reset,
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    Report(FrameReport),
    StartFailed(LivenessError),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("session worker has stopped")]
    Disconnected,
    #[error("session worker panicked")]
    Panicked,
}

/// Runs a [`LivenessSession`] on its own thread.
///
/// The session is only reachable through commands; per-frame reports come
/// back on [`reports`](Self::reports). Session events reach whatever
/// observer the session was built with. The command queue is bounded, so
/// a producer faster than the detector blocks instead of piling up frames.
pub struct SessionWorker {
    commands: Sender<SessionCommand>,
    reports: Receiver<WorkerMessage>,
    handle: JoinHandle<LivenessSession>,
}

impl SessionWorker {
    pub fn spawn(session: LivenessSession) -> Self {
        Self::with_capacity(session, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(mut session: LivenessSession, capacity: usize) -> Self {
        let (command_tx, command_rx) = crossbeam_channel::bounded::<SessionCommand>(capacity.max(1));
        let (report_tx, report_rx) = crossbeam_channel::unbounded::<WorkerMessage>();

        let handle = std::thread::spawn(move || {
            for command in command_rx {
                let message = match command {
                    SessionCommand::Start => match session.start() {
                        Ok(()) => None,
                        Err(e) => Some(WorkerMessage::StartFailed(e)),
                    },
                    SessionCommand::Frame(frame) => {
                        Some(WorkerMessage::Report(session.process_frame(&frame)))
                    }
                    SessionCommand::Reset => {
                        session.reset();
                        None
                    }
                    SessionCommand::Stop => break,
                };
                if let Some(message) = message {
                    // Reports are advisory; keep processing if nobody reads them.
                    let _ = report_tx.send(message);
                }
            }
            log::debug!("Session worker exiting");
            session
        });

        Self {
            commands: command_tx,
            reports: report_rx,
            handle,
        }
    }

    pub fn start(&self) -> Result<(), WorkerError> {
        self.send(SessionCommand::Start)
    }

    pub fn submit(&self, frame: Frame) -> Result<(), WorkerError> {
        self.send(SessionCommand::Frame(frame))
    }

    pub fn reset(&self) -> Result<(), WorkerError> {
        self.send(SessionCommand::Reset)
    }

    pub fn reports(&self) -> &Receiver<WorkerMessage> {
        &self.reports
    }

    /// Stops the worker after the queued commands and hands the session back.
    pub fn stop(self) -> Result<LivenessSession, WorkerError> {
        // The thread may already be gone; joining reports how it ended.
        let _ = self.commands.send(SessionCommand::Stop);
        drop(self.commands);
        self.handle.join().map_err(|_| WorkerError::Panicked)
    }

    fn send(&self, command: SessionCommand) -> Result<(), WorkerError> {
        self.commands.send(command).map_err(|_| WorkerError::Disconnected)
    }
}
