//! Background task that owns a session.
//!
//! [`start_session`] moves a [`SessionController`] into a tokio task which
//! greets the user and then handles submissions one at a time. Everything
//! else talks to it through a cloneable [`SessionHandle`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::SessionController;
use crate::speech::TranscriptSink;

/// A request for the session task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Submit text as the next user turn.
    Submit(String),
}

/// Handle to a running session.
///
/// Typed submissions queue in arrival order. A speech transcript is only
/// accepted while no turn is pending and is dropped otherwise. The session
/// ends when [`shutdown`](Self::shutdown) is called or every handle is
/// dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    shutdown_tx: mpsc::Sender<()>,
    /// Submissions queued or in flight.
    pending: Arc<AtomicUsize>,
}

impl SessionHandle {
    /// Queue `text` for submission. Returns false if the session has ended.
    pub fn submit(&self, text: impl Into<String>) -> bool {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.send(text.into())
    }

    fn send(&self, text: String) -> bool {
        let sent = self.command_tx.send(SessionCommand::Submit(text)).is_ok();
        if !sent {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
        sent
    }

    /// Whether a submission is queued or awaiting its reply.
    pub fn is_busy(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    /// Ask the session to stop, abandoning any request in flight.
    /// Returns true if the signal was delivered.
    pub fn shutdown(&self) -> bool {
        self.shutdown_tx.try_send(()).is_ok()
    }

    /// Whether the session task is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }
}

impl TranscriptSink for SessionHandle {
    fn submit_transcript(&self, text: String) {
        if self
            .pending
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("transcript dropped; a turn is already pending");
            return;
        }
        if !self.send(text) {
            debug!("transcript dropped; session has ended");
        }
    }
}

/// Start a session in the background.
///
/// The task runs [`SessionController::initialize_session`] first. The join
/// handle yields the controller back once the session ends.
pub fn start_session(controller: SessionController) -> (SessionHandle, JoinHandle<SessionController>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let pending = Arc::new(AtomicUsize::new(0));

    let task = tokio::spawn(run_session(
        controller,
        command_rx,
        shutdown_rx,
        pending.clone(),
    ));

    (
        SessionHandle {
            command_tx,
            shutdown_tx,
            pending,
        },
        task,
    )
}

async fn run_session(
    mut controller: SessionController,
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    mut shutdown_rx: mpsc::Receiver<()>,
    pending: Arc<AtomicUsize>,
) -> SessionController {
    controller.initialize_session();

    loop {
        let command = tokio::select! {
            command = command_rx.recv() => command,
            Some(()) = shutdown_rx.recv() => break,
        };

        match command {
            Some(SessionCommand::Submit(text)) => {
                tokio::select! {
                    _ = controller.submit_turn(&text) => {
                        pending.fetch_sub(1, Ordering::SeqCst);
                    }
                    Some(()) = shutdown_rx.recv() => {
                        info!(session = %controller.id(), "shutdown during request; abandoning reply");
                        break;
                    }
                }
            }
            None => break,
        }
    }

    info!(
        session = %controller.id(),
        turns = controller.history().len(),
        "session ended"
    );
    controller
}
