//! # Application State
//!
//! Core business state for Drugbot. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── sessions: Vec<Session>              // backend sessions, newest first
//! ├── active: Option<ActiveContext>       // None until the session list resolves
//! ├── draft: Draft                        // the new-chat thread
//! ├── locale / use_rag / streaming        // settings
//! ├── loading_sessions: bool              // session list request outstanding
//! ├── loading_history: HashSet            // session ids with a history fetch outstanding
//! ├── in_flight: Option<PendingSend>      // the one outstanding send
//! ├── pending_deletes: HashMap            // removed session and its index, by id
//! └── notifications: VecDeque             // transient toasts
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::core::config::ResolvedConfig;
use crate::core::locale::{Locale, Strings};
use crate::core::message::Message;
use crate::core::session::{ActiveContext, Draft, Session};

/// How many toasts are kept at once; older ones are dropped.
pub const MAX_NOTIFICATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
    pub created: Instant,
}

/// Bookkeeping for the send that is waiting on the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    /// Thread the message was sent from.
    pub context: ActiveContext,
    /// Streaming placeholder message, if streaming.
    pub placeholder_id: Option<String>,
    /// Session id announced by stream records so far.
    pub session_id: Option<String>,
    /// Markdown received so far.
    pub raw: String,
}

pub struct App {
    pub sessions: Vec<Session>,
    pub active: Option<ActiveContext>,
    pub draft: Draft,
    pub locale: Locale,
    pub use_rag: bool,
    pub streaming: bool,
    pub loading_sessions: bool,
    pub loading_history: HashSet<String>,
    pub in_flight: Option<PendingSend>,
    pub pending_deletes: HashMap<String, (usize, Session)>,
    pub notifications: VecDeque<Notification>,
    /// Session asked for on the command line, consumed by the first list load.
    pub requested_session: Option<String>,
}

impl App {
    pub fn new(locale: Locale) -> Self {
        Self {
            sessions: Vec::new(),
            active: None,
            draft: Draft::new(locale),
            locale,
            use_rag: false,
            streaming: false,
            loading_sessions: false,
            loading_history: HashSet::new(),
            in_flight: None,
            pending_deletes: HashMap::new(),
            notifications: VecDeque::new(),
            requested_session: None,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            use_rag: config.use_rag,
            streaming: config.streaming,
            requested_session: config.initial_session.clone(),
            ..Self::new(config.locale)
        }
    }

    pub fn strings(&self) -> &'static Strings {
        self.locale.strings()
    }

    pub fn notify(&mut self, level: NotificationLevel, text: impl Into<String>) {
        self.notifications.push_back(Notification {
            level,
            text: text.into(),
            created: Instant::now(),
        });
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    /// Drops notifications older than `max_age`.
    pub fn prune_notifications(&mut self, max_age: Duration) {
        self.notifications.retain(|n| n.created.elapsed() < max_age);
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn session_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Sessions are kept newest first, so this is the stored order.
    pub fn sessions_by_recency(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_session(&self) -> Option<&Session> {
        match self.active.as_ref()? {
            ActiveContext::ExistingSession(id) => self.session(id),
            ActiveContext::NewChat => None,
        }
    }

    /// The thread behind a context, if it still exists.
    pub fn thread(&self, context: &ActiveContext) -> Option<&[Message]> {
        match context {
            ActiveContext::NewChat => Some(&self.draft.messages),
            ActiveContext::ExistingSession(id) => self.session(id).map(|s| s.messages.as_slice()),
        }
    }

    pub fn thread_mut(&mut self, context: &ActiveContext) -> Option<&mut Vec<Message>> {
        match context {
            ActiveContext::NewChat => Some(&mut self.draft.messages),
            ActiveContext::ExistingSession(id) => self.session_mut(id).map(|s| &mut s.messages),
        }
    }

    /// Messages currently on screen.
    pub fn active_thread(&self) -> Option<&[Message]> {
        self.thread(self.active.as_ref()?)
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_history_loading(&self, id: &str) -> bool {
        self.loading_history.contains(id)
    }

    /// Whether the input should accept a submission right now.
    pub fn can_send(&self) -> bool {
        if self.is_sending() {
            return false;
        }
        match &self.active {
            None => false,
            Some(ActiveContext::NewChat) => true,
            Some(ActiveContext::ExistingSession(id)) => {
                self.session(id).is_some_and(|s| s.messages_loaded) && !self.is_history_loading(id)
            }
        }
    }

    /// Display name of the active thread.
    pub fn active_title(&self) -> Option<String> {
        match self.active.as_ref()? {
            ActiveContext::NewChat => Some(self.strings().new_chat_name.to_string()),
            ActiveContext::ExistingSession(_) => self.active_session().map(|s| s.name.clone()),
        }
    }
}
