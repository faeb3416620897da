//! Transcript controller
//!
//! Owns the transcript and the busy flag, runs one backend turn at a time and
//! maps whatever comes back onto new entries. Front-ends observe changes through
//! [`TranscriptController::subscribe`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::agent::{AgentBackend, AgentReply};
use crate::error::{AgentError, AgentResult};
use crate::state::{ChatEntry, TranscriptState};

/// Shown in place of the user's words when nothing was transcribed
pub const SILENCE_TEXT: &str = "(Silence)";

/// The single generic entry appended for any failed turn
pub const CONNECTION_ERROR_TEXT: &str =
    "⚠️ Error: Cannot connect to Python Brain. Is server.py running?";

/// Change notifications published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    EntryAppended(ChatEntry),
    BusyChanged(bool),
}

pub struct TranscriptController<B> {
    backend: Arc<B>,
    state: TranscriptState,
    subscribers: Vec<mpsc::UnboundedSender<TranscriptEvent>>,
}

impl<B: AgentBackend> TranscriptController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_shared_backend(Arc::new(backend))
    }

    pub fn with_shared_backend(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: TranscriptState::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn state(&self) -> &TranscriptState {
        &self.state
    }

    pub fn entries(&self) -> &[ChatEntry] {
        self.state.entries()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Register for change notifications. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TranscriptEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Run one full turn: record, transcribe, reply.
    ///
    /// Does nothing while another turn is in flight. Failures never escape;
    /// they become a single error entry in the transcript. If this future is
    /// dropped before the backend answers, the busy flag is still cleared.
    pub async fn request_turn(&mut self) {
        if !self.begin_turn() {
            return;
        }
        let backend = Arc::clone(&self.backend);
        let turn = TurnGuard { controller: self };
        let outcome = backend.run_agent().await;
        turn.finish(outcome);
    }

    /// First half of a turn. Marks the controller busy and returns `true`, or
    /// returns `false` without side effects if a turn is already in flight.
    pub fn begin_turn(&mut self) -> bool {
        if self.state.is_busy() {
            debug!("turn already in flight, ignoring request");
            return false;
        }
        self.set_busy(true);
        debug!("turn started");
        true
    }

    /// Second half of a turn. Appends the entries for `outcome` and clears the
    /// busy flag, whatever the outcome was.
    pub fn finish_turn(&mut self, outcome: AgentResult<AgentReply>) {
        if !self.state.is_busy() {
            warn!("turn outcome arrived with no turn in flight, dropping it");
            return;
        }

        match outcome {
            Ok(reply) => {
                let appended = self.apply_reply(reply);
                info!(appended, "turn completed");
            }
            Err(err) => {
                error!(error = %err, "agent turn failed");
                self.append(ChatEntry::bot(CONNECTION_ERROR_TEXT));
            }
        }

        self.set_busy(false);
    }

    fn abandon_turn(&mut self) {
        if self.state.is_busy() {
            warn!("turn dropped before the backend answered");
            self.set_busy(false);
        }
    }

    fn apply_reply(&mut self, reply: AgentReply) -> usize {
        let user_text = reply
            .user_text
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| SILENCE_TEXT.to_string());
        self.append(ChatEntry::user(user_text));

        match reply.bot_text.filter(|text| !text.is_empty()) {
            Some(bot_text) => {
                self.append(ChatEntry::bot(bot_text));
                2
            }
            None => 1,
        }
    }

    fn append(&mut self, entry: ChatEntry) {
        self.state.push(entry.clone());
        self.publish(TranscriptEvent::EntryAppended(entry));
    }

    fn set_busy(&mut self, busy: bool) {
        self.state.set_busy(busy);
        self.publish(TranscriptEvent::BusyChanged(busy));
    }

    fn publish(&mut self, event: TranscriptEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Clears the busy flag of a turn whose future is dropped mid-flight
struct TurnGuard<'a, B: AgentBackend> {
    controller: &'a mut TranscriptController<B>,
}

impl<B: AgentBackend> TurnGuard<'_, B> {
    fn finish(self, outcome: AgentResult<AgentReply>) {
        self.controller.finish_turn(outcome);
    }
}

impl<B: AgentBackend> Drop for TurnGuard<'_, B> {
    fn drop(&mut self) {
        self.controller.abandon_turn();
    }
}

impl<B: AgentBackend + 'static> TranscriptController<B> {
    /// Begin a turn and run the backend call on a background task.
    ///
    /// Returns `None` if a turn is already in flight. The caller hands the
    /// task's result to [`TranscriptController::settle`] once it finishes.
    pub fn spawn_turn(&mut self) -> Option<JoinHandle<AgentResult<AgentReply>>> {
        if !self.begin_turn() {
            return None;
        }
        let backend = Arc::clone(&self.backend);
        Some(tokio::spawn(async move { backend.run_agent().await }))
    }

    /// Settle a turn started with [`TranscriptController::spawn_turn`].
    pub async fn settle(&mut self, task: JoinHandle<AgentResult<AgentReply>>) {
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(AgentError::TaskFailed(join_err.to_string())),
        };
        self.finish_turn(outcome);
    }
}
