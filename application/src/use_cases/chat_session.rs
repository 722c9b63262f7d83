//! Chat session use case.
//!
//! [`ChatSession`] owns one conversation: the message store, the draft and
//! every dispatch to the remote responder. It is the only component that
//! mutates session state.
//!
//! # Flow
//!
//! ```text
//! draft_changed ──► is_submittable (every change, no debounce)
//! submit ─────────► gate ─► commit user message + clear draft ─► dispatch
//! next_resolution ► append assistant reply (or failed turn) ─► next queued
//! destroy ────────► cancel token + abort in-flight calls
//! ```
//!
//! Responder calls run as tasks in a [`JoinSet`]; their results are applied
//! by whoever owns the session (see [`ChatSession::run`]), so all mutation
//! stays serialized through one owner. Replies are appended in resolution
//! order.

use crate::config::SessionConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::responder::{RemoteResponder, ResponderError};
use crate::ports::session_event::{SessionEvent, SessionView};
use clinichat_domain::util::preview;
use clinichat_domain::{
    DispatchId, DispatchPolicy, DispatchState, Draft, Message, MessageId, MessageStatus,
    MessageStore, NewMessage, SessionError, SubmittedText, is_submittable,
};
use futures::FutureExt;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Intents sent into a running session by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    DraftChanged(String),
    SubmitRequested,
    Destroy,
}

/// How a dispatch ended, as applied to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub dispatch: DispatchId,
    pub state: DispatchState,
    /// The appended assistant message; `None` when cancelled
    pub message: Option<MessageId>,
}

/// Result of one responder task. `None` means the call was cancelled.
struct DispatchOutcome {
    id: DispatchId,
    result: Option<Result<String, ResponderError>>,
}

/// A committed user message whose dispatch has not started yet
struct QueuedDispatch {
    id: DispatchId,
    trigger: MessageId,
}

/// One conversation with the assistant.
///
/// Created when the chat panel opens and destroyed when it closes; nothing
/// outlives it. Dispatches are spawned onto the ambient Tokio runtime, so
/// `submit` must be called from within one.
pub struct ChatSession {
    id: String,
    store: MessageStore,
    draft: Draft,
    responder: Arc<dyn RemoteResponder>,
    config: SessionConfig,
    in_flight: JoinSet<DispatchOutcome>,
    tasks: HashMap<task::Id, DispatchId>,
    queued: VecDeque<QueuedDispatch>,
    states: BTreeMap<DispatchId, DispatchState>,
    last_dispatch: u64,
    cancellation: CancellationToken,
    tx: Option<mpsc::UnboundedSender<SessionEvent>>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ChatSession {
    /// Create a session, seeding the configured greeting.
    pub fn new(responder: Arc<dyn RemoteResponder>, config: SessionConfig) -> Self {
        let mut store = MessageStore::new();
        if let Some(greeting) = config.greeting.as_deref().filter(|g| is_submittable(g)) {
            store.append(NewMessage::assistant(greeting));
        }

        let id = format!("session-{}", chrono::Utc::now().timestamp_millis());
        debug!(
            "Created {} (responder: {}, policy: {})",
            id,
            responder.name(),
            config.dispatch_policy
        );

        Self {
            id,
            store,
            draft: Draft::default(),
            responder,
            config,
            in_flight: JoinSet::new(),
            tasks: HashMap::new(),
            queued: VecDeque::new(),
            states: BTreeMap::new(),
            last_dispatch: 0,
            cancellation: CancellationToken::new(),
            tx: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Override the generated session id (used in logs).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Emit [`SessionEvent`]s to the given channel.
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set a conversation logger for structured event logging.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self.conversation_logger.log(ConversationEvent::SessionCreated {
            session: self.id.clone(),
            responder: self.responder.name().to_string(),
            policy: self.config.dispatch_policy,
            seeded: self.store.len(),
        });
        self
    }

    /// Tie the session to a parent token; cancelling the parent cancels
    /// every dispatch of this session.
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.cancellation = parent.child_token();
        self
    }

    /// Swap the responder used by future dispatches.
    pub fn set_responder(&mut self, responder: Arc<dyn RemoteResponder>) {
        info!("{}: responder set to {}", self.id, responder.name());
        self.responder = responder;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ==================== Draft & Validation ====================

    /// Replace the draft and return whether it may be submitted.
    pub fn draft_changed(&mut self, text: impl Into<String>) -> bool {
        self.draft.set(text);
        let submittable = self.draft.is_submittable();
        self.emit(SessionEvent::DraftChanged {
            draft: self.draft.as_str().to_string(),
            submittable,
        });
        submittable
    }

    pub fn draft(&self) -> &str {
        self.draft.as_str()
    }

    pub fn is_submittable(&self) -> bool {
        self.draft.is_submittable()
    }

    // ==================== Read Access ====================

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    /// Messages, draft and dispatch count read together.
    pub fn view(&self) -> SessionView {
        SessionView {
            messages: self.store.snapshot(),
            draft: self.draft.as_str().to_string(),
            submittable: self.draft.is_submittable(),
            pending_dispatches: self.pending_dispatches(),
        }
    }

    /// Dispatches whose responder call is outstanding
    pub fn pending_dispatches(&self) -> usize {
        self.in_flight.len()
    }

    /// Dispatches waiting for an outstanding one to finish
    pub fn queued_dispatches(&self) -> usize {
        self.queued.len()
    }

    /// True while any dispatch is pending or queued
    pub fn has_outstanding(&self) -> bool {
        !self.in_flight.is_empty() || !self.queued.is_empty()
    }

    pub fn dispatch_state(&self, id: DispatchId) -> Option<DispatchState> {
        self.states.get(&id).copied()
    }

    // ==================== Dispatch Pipeline ====================

    /// Submit the current draft.
    ///
    /// A second trigger for the same send sees the cleared draft and is
    /// rejected.
    pub fn submit_requested(&mut self) -> Result<DispatchId, SessionError> {
        let text = self.draft.as_str().to_string();
        self.submit(&text)
    }

    /// Commit `text` as a user message, clear the draft and dispatch it.
    ///
    /// Returns `Rejected` for blank text and `Busy` under
    /// [`DispatchPolicy::Reject`] while a reply is outstanding; neither
    /// changes any state. A `Busy` refusal is also emitted as
    /// [`SessionEvent::SubmitRefused`] so the renderer can say so.
    pub fn submit(&mut self, text: &str) -> Result<DispatchId, SessionError> {
        let Some(text) = SubmittedText::try_new(text) else {
            debug!("{}: submit rejected, draft is blank", self.id);
            return Err(SessionError::Rejected);
        };

        if self.config.dispatch_policy == DispatchPolicy::Reject && self.has_outstanding() {
            debug!("{}: submit refused, a reply is pending", self.id);
            self.emit(SessionEvent::SubmitRefused(SessionError::Busy));
            return Err(SessionError::Busy);
        }

        // Commit: append + clear happen together before anything is emitted
        let trigger = self.store.append(NewMessage::user(text.into_inner()));
        self.draft.take();

        let committed = self.store.last().cloned();
        if let Some(message) = committed {
            self.conversation_logger.log(ConversationEvent::UserMessage {
                session: self.id.clone(),
                id: message.id,
                text: message.text.clone(),
            });
            self.emit(SessionEvent::MessageAppended(message));
        }
        self.emit(SessionEvent::DraftChanged {
            draft: String::new(),
            submittable: false,
        });

        self.last_dispatch += 1;
        let id = DispatchId::new(self.last_dispatch);
        self.states.insert(id, DispatchState::Idle);

        let must_wait = !self.config.dispatch_policy.allows_overlap() && self.has_outstanding();

        if must_wait {
            debug!("{}: {} queued behind {} pending", self.id, id, self.in_flight.len());
            self.queued.push_back(QueuedDispatch { id, trigger });
            self.emit(SessionEvent::DispatchQueued(id));
        } else {
            self.start_dispatch(id, trigger);
        }

        Ok(id)
    }

    /// Wait for the next responder call to finish and apply its result.
    ///
    /// Returns `None` when nothing is in flight. Replies land at the end of
    /// the log in the order their calls resolve.
    pub async fn next_resolution(&mut self) -> Option<Resolution> {
        loop {
            let outcome = match self.in_flight.join_next_with_id().await? {
                Ok((task, outcome)) => {
                    self.tasks.remove(&task);
                    outcome
                }
                Err(e) => {
                    let Some(id) = self.tasks.remove(&e.id()) else {
                        continue;
                    };
                    if e.is_cancelled() {
                        DispatchOutcome { id, result: None }
                    } else {
                        error!("{}: {} task failed: {}", self.id, id, e);
                        DispatchOutcome {
                            id,
                            result: Some(Err(ResponderError::Other(format!(
                                "dispatch task failed: {}",
                                e
                            )))),
                        }
                    }
                }
            };
            return Some(self.apply_outcome(outcome));
        }
    }

    /// Transition the status of a pending message.
    ///
    /// An unknown id is a defect in the caller and is logged as an error.
    pub fn update_status(
        &mut self,
        id: MessageId,
        status: MessageStatus,
    ) -> Result<(), SessionError> {
        self.store.update_status(id, status).map_err(|e| {
            error!("{}: status update rejected: {}", self.id, e);
            debug_assert!(
                !self.config.assert_on_defect,
                "{}: status update rejected: {}",
                self.id,
                e
            );
            SessionError::from(e)
        })
    }

    /// Tear the session down.
    ///
    /// Outstanding calls are cancelled and their results discarded; the
    /// store is dropped with the session.
    pub fn destroy(mut self) {
        self.cancellation.cancel();
        self.in_flight.abort_all();
        self.queued.clear();

        let mut cancelled = 0usize;
        for state in self.states.values_mut() {
            if !state.is_terminal() {
                *state = DispatchState::Cancelled;
                cancelled += 1;
            }
        }

        if cancelled > 0 {
            self.conversation_logger.log(ConversationEvent::DispatchCancelled {
                session: self.id.clone(),
                dispatch: None,
                count: cancelled,
            });
        }
        self.conversation_logger.log(ConversationEvent::SessionDestroyed {
            session: self.id.clone(),
            messages: self.store.len(),
        });
        info!(
            "{} destroyed ({} messages, {} dispatches cancelled)",
            self.id,
            self.store.len(),
            cancelled
        );
        self.emit(SessionEvent::Destroyed);
    }

    /// Drive the session from a command channel until `Destroy`, until
    /// the channel closes or until the parent token is cancelled, then
    /// destroy it.
    ///
    /// Commands and responder completions are handled one at a time in the
    /// order they are delivered.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SessionCommand>) {
        let cancellation = self.cancellation.clone();
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::DraftChanged(text)) => {
                        self.draft_changed(text);
                    }
                    Some(SessionCommand::SubmitRequested) => match self.submit_requested() {
                        Err(e) if e.is_silent() => debug!("{}: submit not taken: {}", self.id, e),
                        Err(e) => info!("{}: submit refused: {}", self.id, e),
                        Ok(_) => {}
                    },
                    Some(SessionCommand::Destroy) | None => break,
                },
                _ = cancellation.cancelled() => break,
                Some(resolution) = self.next_resolution(), if !self.in_flight.is_empty() => {
                    debug!(
                        "{}: {} finished as {}",
                        self.id, resolution.dispatch, resolution.state
                    );
                }
            }
        }
        self.destroy();
    }

    // ==================== Internals ====================

    fn start_dispatch(&mut self, id: DispatchId, trigger: MessageId) {
        let history = self.history_for(trigger);
        let responder = Arc::clone(&self.responder);
        let token = self.cancellation.child_token();
        let timeout = self.config.responder_timeout;

        debug!(
            "{}: {} calling {} with {} messages",
            self.id,
            id,
            responder.name(),
            history.len()
        );

        self.states.insert(id, DispatchState::Pending);
        let handle = self.in_flight.spawn(async move {
            let call = AssertUnwindSafe(call_responder(responder.as_ref(), &history, timeout))
                .catch_unwind()
                .map(|r| {
                    r.unwrap_or_else(|_| Err(ResponderError::Other("responder panicked".into())))
                });

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = call => Some(result),
            };
            DispatchOutcome { id, result }
        });
        self.tasks.insert(handle.id(), id);
        self.emit(SessionEvent::DispatchStarted(id));
    }

    /// History sent for a dispatch: everything committed so far except
    /// user messages that were submitted after the trigger.
    fn history_for(&self, trigger: MessageId) -> Vec<Message> {
        self.store
            .messages()
            .iter()
            .filter(|m| !(m.author.is_user() && m.id > trigger))
            .cloned()
            .collect()
    }

    fn apply_outcome(&mut self, outcome: DispatchOutcome) -> Resolution {
        let DispatchOutcome { id, result } = outcome;

        let (state, message) = match result {
            None => {
                debug!("{}: {} cancelled", self.id, id);
                self.conversation_logger.log(ConversationEvent::DispatchCancelled {
                    session: self.id.clone(),
                    dispatch: Some(id),
                    count: 1,
                });
                (DispatchState::Cancelled, None)
            }
            Some(Ok(text)) if is_submittable(&text) => {
                let message_id = self.store.append(NewMessage::assistant(text));
                self.log_reply(id, message_id);
                (DispatchState::Resolved, Some(message_id))
            }
            Some(Ok(_)) => (
                DispatchState::Failed,
                Some(self.append_failure(id, ResponderError::EmptyResponse)),
            ),
            Some(Err(e)) => (DispatchState::Failed, Some(self.append_failure(id, e))),
        };

        self.states.insert(id, state);
        if let Some(message) = message.and_then(|m| self.store.get(m)).cloned() {
            self.emit(SessionEvent::MessageAppended(message));
        }
        self.emit(SessionEvent::DispatchFinished { id, state });

        self.start_next_queued();

        Resolution {
            dispatch: id,
            state,
            message,
        }
    }

    fn append_failure(&mut self, id: DispatchId, err: ResponderError) -> MessageId {
        warn!("{}: {} failed: {}", self.id, id, err);
        let text = self.config.failure_message(&err.to_string());
        let message_id = self.store.append(NewMessage::assistant_failure(text));
        self.conversation_logger.log(ConversationEvent::AssistantFailure {
            session: self.id.clone(),
            dispatch: id,
            id: message_id,
            error: err.to_string(),
        });
        message_id
    }

    fn log_reply(&self, id: DispatchId, message_id: MessageId) {
        let Some(message) = self.store.get(message_id) else {
            return;
        };
        debug!(
            "{}: {} resolved: {}",
            self.id,
            id,
            preview(&message.text, 80)
        );
        self.conversation_logger.log(ConversationEvent::AssistantReply {
            session: self.id.clone(),
            dispatch: id,
            id: message_id,
            responder: self.responder.name().to_string(),
            text: message.text.clone(),
        });
    }

    fn start_next_queued(&mut self) {
        if !self.in_flight.is_empty() {
            return;
        }
        if let Some(next) = self.queued.pop_front() {
            self.start_dispatch(next.id, next.trigger);
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.tx {
            // A closed receiver just means nobody is rendering
            let _ = tx.send(event);
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

async fn call_responder(
    responder: &dyn RemoteResponder,
    history: &[Message],
    timeout: Option<Duration>,
) -> Result<String, ResponderError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, responder.respond(history))
            .await
            .unwrap_or(Err(ResponderError::Timeout)),
        None => responder.respond(history).await,
    }
}
