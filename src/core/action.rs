//! # Actions
//!
//! Everything that can happen in Drugbot becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::ReplyReceived(reply)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state and returns an [`Effect`] describing the I/O to run next. No
//! side effects here; the TUI runs effects and feeds results back as actions.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use chrono::Utc;
use log::{debug, info, warn};

use crate::api::{ChatReply, HistoryMessage, Sender, SessionSummary, StreamRecord};
use crate::core::message::{Message, MessageKind, insert_ordered, sort_thread};
use crate::core::session::{self, ActiveContext, Draft, Session};
use crate::core::state::{App, NotificationLevel, PendingSend};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// Fetch the session list (startup).
    LoadSessions,
    SessionsLoaded(Vec<SessionSummary>),
    SessionsFailed(String),
    SelectSession(String),
    HistoryLoaded {
        session_id: String,
        messages: Vec<HistoryMessage>,
    },
    HistoryFailed {
        session_id: String,
        error: String,
    },
    NewChat,
    Submit(String),
    ReplyReceived(ChatReply),
    StreamRecord(StreamRecord),
    StreamFinished,
    SendFailed(String),
    DeleteSession(String),
    SessionDeleted(String),
    DeleteFailed {
        session_id: String,
        error: String,
    },
    HealthCheck,
    HealthReported(Result<String, String>),
    ToggleRag,
}

/// A chat message on its way to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub query: String,
    /// `None` for the new-chat draft.
    pub session_id: Option<String>,
    pub use_rag: bool,
    pub streaming: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    FetchSessions,
    FetchHistory(String),
    Send(OutgoingMessage),
    DeleteSession(String),
    HealthCheck,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Quit => Effect::Quit,

        Action::LoadSessions => {
            if app.loading_sessions {
                return Effect::None;
            }
            app.loading_sessions = true;
            Effect::FetchSessions
        }

        Action::SessionsLoaded(summaries) => sessions_loaded(app, summaries),

        Action::SessionsFailed(error) => {
            warn!("Session list failed: {}", error);
            app.loading_sessions = false;
            app.requested_session = None;
            app.notify(NotificationLevel::Error, app.strings().sessions_failed);
            if app.active.is_none() {
                app.active = Some(ActiveContext::NewChat);
            }
            Effect::None
        }

        Action::SelectSession(id) => select_session(app, &id),

        Action::HistoryLoaded {
            session_id,
            messages,
        } => {
            app.loading_history.remove(&session_id);
            let Some(session) = app.session_mut(&session_id) else {
                debug!("Dropping history for unknown session {}", session_id);
                return Effect::None;
            };
            for entry in messages {
                let message = Message::from(entry);
                if !session.messages.iter().any(|m| m.id == message.id) {
                    session.messages.push(message);
                }
            }
            sort_thread(&mut session.messages);
            session.messages_loaded = true;
            debug!(
                "History loaded for {}: {} messages",
                session_id,
                session.messages.len()
            );
            Effect::None
        }

        Action::HistoryFailed { session_id, error } => {
            warn!("History fetch failed for {}: {}", session_id, error);
            app.loading_history.remove(&session_id);
            let strings = app.strings();
            let Some(session) = app.session_mut(&session_id) else {
                return Effect::None;
            };
            session.messages = vec![Message::error(strings.history_failed)];
            session.messages_loaded = true;
            app.notify(NotificationLevel::Error, strings.history_failed_notice);
            Effect::None
        }

        Action::NewChat => {
            app.active = Some(ActiveContext::NewChat);
            Effect::None
        }

        Action::Submit(text) => submit(app, &text),

        Action::ReplyReceived(reply) => {
            let Some(pending) = app.in_flight.take() else {
                warn!("Reply received with no send in flight");
                return Effect::None;
            };
            finish_send(app, pending, reply.text, reply.session_id)
        }

        Action::StreamRecord(record) => {
            let Some(pending) = app.in_flight.as_mut() else {
                return Effect::None;
            };
            if let Some(id) = record.session_id.filter(|id| !id.is_empty()) {
                pending.session_id = Some(id);
            }
            let Some(text) = record.text.filter(|t| !t.is_empty()) else {
                return Effect::None;
            };
            pending.raw.push_str(&text);

            let context = pending.context.clone();
            let placeholder = pending.placeholder_id.clone();
            let raw = pending.raw.clone();
            if let Some(thread) = app.thread_mut(&context)
                && let Some(id) = placeholder
                && let Some(message) = thread.iter_mut().find(|m| m.id == id)
            {
                message.set_markdown(raw);
            }
            Effect::None
        }

        Action::StreamFinished => {
            let Some(pending) = app.in_flight.take() else {
                return Effect::None;
            };
            let text = Some(pending.raw.clone()).filter(|t| !t.trim().is_empty());
            let session_id = pending.session_id.clone();
            finish_send(app, pending, text, session_id)
        }

        Action::SendFailed(error) => {
            let Some(pending) = app.in_flight.take() else {
                return Effect::None;
            };
            warn!("Send failed: {}", error);
            let notice = Message::error(app.strings().send_failed);
            match app.thread_mut(&pending.context) {
                Some(thread) => {
                    if let Some(id) = &pending.placeholder_id {
                        thread.retain(|m| &m.id != id);
                    }
                    insert_ordered(thread, notice);
                }
                None => debug!("Send failed for a thread that no longer exists"),
            }
            Effect::None
        }

        Action::DeleteSession(id) => {
            if app.pending_deletes.contains_key(&id) {
                return Effect::None;
            }
            let Some(pos) = app.sessions.iter().position(|s| s.id == id) else {
                return Effect::None;
            };
            let removed = app.sessions.remove(pos);
            app.pending_deletes.insert(id.clone(), (pos, removed));
            info!("Deleting session {}", id);
            Effect::DeleteSession(id)
        }

        Action::SessionDeleted(id) => {
            app.pending_deletes.remove(&id);
            app.loading_history.remove(&id);
            app.notify(NotificationLevel::Success, app.strings().session_deleted);

            if app.active == Some(ActiveContext::ExistingSession(id)) {
                match app.sessions.first().map(|s| s.id.clone()) {
                    Some(next) => return select_session(app, &next),
                    None => app.active = Some(ActiveContext::NewChat),
                }
            }
            Effect::None
        }

        Action::DeleteFailed { session_id, error } => {
            warn!("Delete failed for {}: {}", session_id, error);
            if let Some((pos, session)) = app.pending_deletes.remove(&session_id) {
                restore_session(app, pos, session);
            }
            app.notify(NotificationLevel::Error, app.strings().delete_failed);
            Effect::None
        }

        Action::HealthCheck => Effect::HealthCheck,

        Action::HealthReported(result) => {
            match result {
                Ok(status) => {
                    let text = format!("{}: {}", app.strings().health_ok, status);
                    app.notify(NotificationLevel::Success, text);
                }
                Err(error) => {
                    warn!("Health check failed: {}", error);
                    app.notify(NotificationLevel::Error, app.strings().health_failed);
                }
            }
            Effect::None
        }

        Action::ToggleRag => {
            app.use_rag = !app.use_rag;
            info!("RAG {}", if app.use_rag { "enabled" } else { "disabled" });
            Effect::None
        }
    }
}

fn sessions_loaded(app: &mut App, summaries: Vec<SessionSummary>) -> Effect {
    app.loading_sessions = false;
    info!("Loaded {} sessions", summaries.len());

    let mut sessions: Vec<Session> = Vec::with_capacity(summaries.len());
    for summary in summaries {
        if sessions.iter().any(|s| s.id == summary.id) {
            continue;
        }
        // keep anything already fetched for a session we know
        let session = match app.sessions.iter().position(|s| s.id == summary.id) {
            Some(pos) => app.sessions.swap_remove(pos),
            None => Session::from_summary(summary, app.locale),
        };
        sessions.push(session);
    }
    session::sort_by_recency(&mut sessions);
    app.sessions = sessions;

    if app.active.is_some() {
        return Effect::None;
    }

    if let Some(requested) = app.requested_session.take() {
        if app.session(&requested).is_some() {
            return select_session(app, &requested);
        }
        warn!("Requested session {} not found", requested);
        app.notify(NotificationLevel::Warning, app.strings().session_not_found);
        app.active = Some(ActiveContext::NewChat);
        return Effect::None;
    }

    match app.sessions.first().map(|s| s.id.clone()) {
        Some(newest) => select_session(app, &newest),
        None => {
            app.active = Some(ActiveContext::NewChat);
            Effect::None
        }
    }
}

/// Puts a session whose delete failed back where it was. Only that one entry
/// changes; anything added to the list meanwhile stays.
fn restore_session(app: &mut App, pos: usize, session: Session) {
    if app.session(&session.id).is_some() {
        return;
    }
    let at = pos.min(app.sessions.len());
    app.sessions.insert(at, session);
    // stable, so an untouched list comes back exactly as it was
    session::sort_by_recency(&mut app.sessions);
}

fn select_session(app: &mut App, id: &str) -> Effect {
    let Some(session) = app.session(id) else {
        debug!("Ignoring selection of unknown session {}", id);
        return Effect::None;
    };
    let needs_history = !session.messages_loaded && !app.is_history_loading(id);
    app.active = Some(ActiveContext::ExistingSession(id.to_string()));
    if needs_history {
        app.loading_history.insert(id.to_string());
        return Effect::FetchHistory(id.to_string());
    }
    Effect::None
}

fn submit(app: &mut App, text: &str) -> Effect {
    let query = text.trim();
    if query.is_empty() || !app.can_send() {
        return Effect::None;
    }
    let Some(context) = app.active.clone() else {
        return Effect::None;
    };
    let streaming = app.streaming;
    let Some(thread) = app.thread_mut(&context) else {
        return Effect::None;
    };

    insert_ordered(thread, Message::user(query));
    let placeholder_id = if streaming {
        let placeholder = Message::placeholder();
        let id = placeholder.id.clone();
        insert_ordered(thread, placeholder);
        Some(id)
    } else {
        None
    };

    let session_id = context.session_id().map(str::to_string);
    app.in_flight = Some(PendingSend {
        context,
        placeholder_id,
        session_id: None,
        raw: String::new(),
    });
    Effect::Send(OutgoingMessage {
        query: query.to_string(),
        session_id,
        use_rag: app.use_rag,
        streaming,
    })
}

/// Writes the bot reply into `thread`, reusing the streaming placeholder
/// when there is one.
fn settle_reply(thread: &mut Vec<Message>, placeholder_id: Option<&str>, text: String) {
    if let Some(id) = placeholder_id
        && let Some(message) = thread.iter_mut().find(|m| m.id == id)
    {
        message.set_markdown(text);
        message.kind = MessageKind::Text;
        return;
    }
    insert_ordered(thread, Message::bot_markdown(text));
}

fn finish_send(
    app: &mut App,
    pending: PendingSend,
    text: Option<String>,
    session_id: Option<String>,
) -> Effect {
    let text = text.unwrap_or_else(|| app.strings().no_answer.to_string());
    let placeholder = pending.placeholder_id.as_deref();

    match pending.context {
        ActiveContext::NewChat => match session_id {
            Some(id) => promote_draft(app, id, placeholder, text),
            None => {
                warn!("Backend reply carried no session id; keeping the draft");
                settle_reply(&mut app.draft.messages, placeholder, text);
                app.notify(NotificationLevel::Warning, app.strings().missing_session_id);
            }
        },
        ActiveContext::ExistingSession(id) => match app.session_mut(&id) {
            Some(session) => settle_reply(&mut session.messages, placeholder, text),
            None => warn!("Dropping reply for session {} which no longer exists", id),
        },
    }
    Effect::None
}

/// Turns the draft into a real session now that the backend has named it.
fn promote_draft(app: &mut App, id: String, placeholder: Option<&str>, text: String) {
    let mut draft = std::mem::replace(&mut app.draft, Draft::new(app.locale));
    settle_reply(&mut draft.messages, placeholder, text);
    // the greeting is local to the draft; backend history never has it
    draft.messages.retain(|m| !m.is_greeting());

    let created_at = draft
        .messages
        .iter()
        .find(|m| m.sender == Sender::User)
        .map_or_else(Utc::now, |m| m.timestamp);
    let name = session::derive_title(&draft.messages)
        .unwrap_or_else(|| session::default_name(created_at, app.locale));
    info!("Draft promoted to session {}", id);

    app.sessions.retain(|s| s.id != id);
    app.sessions.push(Session {
        id: id.clone(),
        name,
        messages: draft.messages,
        created_at,
        messages_loaded: true,
    });
    session::sort_by_recency(&mut app.sessions);

    if app.active == Some(ActiveContext::NewChat) {
        app.active = Some(ActiveContext::ExistingSession(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::is_sorted;
    use crate::test_support::{history, session, summary, test_app};

    fn reply(text: &str, session_id: Option<&str>) -> ChatReply {
        ChatReply {
            text: Some(text.to_string()),
            session_id: session_id.map(str::to_string),
        }
    }

    /// App on the new-chat draft with no sessions.
    fn new_chat_app() -> App {
        let mut app = test_app();
        update(&mut app, Action::SessionsLoaded(Vec::new()));
        app
    }

    /// App with loaded sessions `a` (older) and `b` (newer), `b` active.
    fn two_session_app() -> App {
        let mut app = test_app();
        update(
            &mut app,
            Action::SessionsLoaded(vec![summary("a", 1), summary("b", 2)]),
        );
        for id in ["a", "b"] {
            update(
                &mut app,
                Action::HistoryLoaded {
                    session_id: id.to_string(),
                    messages: Vec::new(),
                },
            );
        }
        app
    }

    fn user_count(messages: &[Message]) -> usize {
        messages.iter().filter(|m| m.sender == Sender::User).count()
    }

    #[test]
    fn test_quit_returns_quit_effect() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }

    #[test]
    fn test_load_sessions_once() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::LoadSessions), Effect::FetchSessions);
        assert!(app.loading_sessions);
        assert_eq!(update(&mut app, Action::LoadSessions), Effect::None);
    }

    #[test]
    fn test_empty_session_list_enters_new_chat() {
        let mut app = test_app();
        update(&mut app, Action::LoadSessions);
        let effect = update(&mut app, Action::SessionsLoaded(Vec::new()));
        assert_eq!(effect, Effect::None);
        assert_eq!(app.active, Some(ActiveContext::NewChat));
        assert!(app.active_session().is_none());
        assert!(!app.loading_sessions);
    }

    #[test]
    fn test_newest_session_is_selected_by_default() {
        let mut app = test_app();
        let effect = update(
            &mut app,
            Action::SessionsLoaded(vec![summary("a", 1), summary("b", 2)]),
        );
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("b".to_string())));
        assert_eq!(effect, Effect::FetchHistory("b".to_string()));
        assert_eq!(app.sessions[0].id, "b");
        assert!(app.is_history_loading("b"));
    }

    #[test]
    fn test_requested_session_is_selected() {
        let mut app = test_app();
        app.requested_session = Some("a".to_string());
        let effect = update(
            &mut app,
            Action::SessionsLoaded(vec![summary("a", 1), summary("b", 2)]),
        );
        assert_eq!(effect, Effect::FetchHistory("a".to_string()));
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("a".to_string())));
        assert!(app.requested_session.is_none());
    }

    #[test]
    fn test_missing_requested_session_falls_back_to_new_chat() {
        let mut app = test_app();
        app.requested_session = Some("gone".to_string());
        update(&mut app, Action::SessionsLoaded(vec![summary("a", 1)]));
        assert_eq!(app.active, Some(ActiveContext::NewChat));
        assert_eq!(
            app.notifications.back().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
    }

    #[test]
    fn test_sessions_failed_enters_new_chat_with_error() {
        let mut app = test_app();
        update(&mut app, Action::LoadSessions);
        update(&mut app, Action::SessionsFailed("refused".to_string()));
        assert_eq!(app.active, Some(ActiveContext::NewChat));
        assert!(!app.loading_sessions);
        assert_eq!(
            app.notifications.back().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
    }

    #[test]
    fn test_sessions_loaded_keeps_user_choice() {
        let mut app = test_app();
        update(&mut app, Action::NewChat);
        let effect = update(&mut app, Action::SessionsLoaded(vec![summary("a", 1)]));
        assert_eq!(effect, Effect::None);
        assert_eq!(app.active, Some(ActiveContext::NewChat));
    }

    #[test]
    fn test_select_unknown_session_is_ignored() {
        let mut app = new_chat_app();
        assert_eq!(update(&mut app, Action::SelectSession("x".to_string())), Effect::None);
        assert_eq!(app.active, Some(ActiveContext::NewChat));
    }

    #[test]
    fn test_select_loaded_session_does_not_refetch() {
        let mut app = two_session_app();
        assert_eq!(update(&mut app, Action::SelectSession("a".to_string())), Effect::None);
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("a".to_string())));
    }

    #[test]
    fn test_select_while_fetching_does_not_refetch() {
        let mut app = test_app();
        update(&mut app, Action::SessionsLoaded(vec![summary("a", 1), summary("b", 2)]));
        update(&mut app, Action::SelectSession("a".to_string()));
        assert_eq!(update(&mut app, Action::SelectSession("b".to_string())), Effect::None);
    }

    #[test]
    fn test_history_is_sorted_and_marked_loaded() {
        let mut app = test_app();
        update(&mut app, Action::SessionsLoaded(vec![summary("a", 1)]));
        update(
            &mut app,
            Action::HistoryLoaded {
                session_id: "a".to_string(),
                messages: vec![
                    history("m2", Sender::Bot, "second", 20),
                    history("m1", Sender::User, "first", 10),
                    history("m3", Sender::User, "third", 30),
                ],
            },
        );
        let session = app.session("a").unwrap();
        assert!(session.messages_loaded);
        assert!(is_sorted(&session.messages));
        assert_eq!(session.messages[0].id, "m1");
        assert_eq!(session.messages[1].text, "<p>second</p>\n");
        assert!(!app.is_history_loading("a"));
        assert!(app.can_send());
    }

    #[test]
    fn test_empty_history_is_loaded_not_pending() {
        let mut app = test_app();
        update(&mut app, Action::SessionsLoaded(vec![summary("a", 1)]));
        update(
            &mut app,
            Action::HistoryLoaded {
                session_id: "a".to_string(),
                messages: Vec::new(),
            },
        );
        let session = app.session("a").unwrap();
        assert!(session.messages_loaded);
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_history_failure_shows_single_error() {
        let mut app = test_app();
        update(&mut app, Action::SessionsLoaded(vec![summary("a", 1)]));
        update(
            &mut app,
            Action::HistoryFailed {
                session_id: "a".to_string(),
                error: "HTTP 500".to_string(),
            },
        );
        let session = app.session("a").unwrap();
        assert!(session.messages_loaded);
        assert_eq!(session.messages.len(), 1);
        assert!(session.messages[0].is_error());
        assert_eq!(update(&mut app, Action::SelectSession("a".to_string())), Effect::None);
    }

    #[test]
    fn test_history_for_unknown_session_is_dropped() {
        let mut app = new_chat_app();
        let effect = update(
            &mut app,
            Action::HistoryLoaded {
                session_id: "ghost".to_string(),
                messages: vec![history("m1", Sender::User, "x", 1)],
            },
        );
        assert_eq!(effect, Effect::None);
        assert!(app.sessions.is_empty());
    }

    #[test]
    fn test_submit_rejects_blank_input() {
        let mut app = new_chat_app();
        assert_eq!(update(&mut app, Action::Submit("   \n".to_string())), Effect::None);
        assert_eq!(app.draft.messages.len(), 1);
        assert!(!app.is_sending());
    }

    #[test]
    fn test_submit_rejected_without_context() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Submit("hi".to_string())), Effect::None);
        assert!(!app.draft.has_user_messages());
    }

    #[test]
    fn test_submit_rejected_while_history_loading() {
        let mut app = test_app();
        update(&mut app, Action::SessionsLoaded(vec![summary("a", 1)]));
        assert_eq!(update(&mut app, Action::Submit("hi".to_string())), Effect::None);
        assert!(app.session("a").unwrap().messages.is_empty());
    }

    #[test]
    fn test_only_one_send_in_flight() {
        let mut app = new_chat_app();
        assert!(matches!(update(&mut app, Action::Submit("one".to_string())), Effect::Send(_)));
        assert_eq!(update(&mut app, Action::Submit("two".to_string())), Effect::None);
        assert_eq!(user_count(&app.draft.messages), 1);
    }

    #[test]
    fn test_submit_from_draft_sends_without_session() {
        let mut app = new_chat_app();
        app.use_rag = true;
        let effect = update(&mut app, Action::Submit("  hello  ".to_string()));
        assert_eq!(
            effect,
            Effect::Send(OutgoingMessage {
                query: "hello".to_string(),
                session_id: None,
                use_rag: true,
                streaming: false,
            })
        );
        assert_eq!(app.draft.messages.last().unwrap().text, "hello");
    }

    #[test]
    fn test_new_chat_reply_promotes_draft() {
        let mut app = new_chat_app();
        update(&mut app, Action::Submit("hello".to_string()));
        update(&mut app, Action::ReplyReceived(reply("hi", Some("s1"))));

        assert_eq!(app.sessions.len(), 1);
        let session = &app.sessions[0];
        assert_eq!(session.id, "s1");
        assert_eq!(session.name, "hello");
        assert!(session.messages_loaded);
        assert!(session.messages.iter().any(|m| m.text == "hello" && m.sender == Sender::User));
        let bot = session.messages.last().unwrap();
        assert_eq!(bot.sender, Sender::Bot);
        assert_eq!(bot.text, "<p>hi</p>\n");
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("s1".to_string())));
        assert!(!app.draft.has_user_messages());
        assert!(!app.is_sending());
    }

    #[test]
    fn test_promotion_replaces_same_id_session() {
        let mut app = new_chat_app();
        app.sessions.push(session("s1", 1));
        update(&mut app, Action::Submit("hello".to_string()));
        update(&mut app, Action::ReplyReceived(reply("hi", Some("s1"))));
        assert_eq!(app.sessions.iter().filter(|s| s.id == "s1").count(), 1);
        assert_eq!(user_count(&app.sessions[0].messages), 1);
    }

    #[test]
    fn test_promotion_does_not_steal_focus() {
        let mut app = two_session_app();
        update(&mut app, Action::NewChat);
        update(&mut app, Action::Submit("hello".to_string()));
        update(&mut app, Action::SelectSession("a".to_string()));
        update(&mut app, Action::ReplyReceived(reply("hi", Some("s9"))));
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("a".to_string())));
        assert!(app.session("s9").is_some());
    }

    #[test]
    fn test_reply_without_session_id_keeps_draft() {
        let mut app = new_chat_app();
        update(&mut app, Action::Submit("hello".to_string()));
        update(
            &mut app,
            Action::ReplyReceived(ChatReply {
                text: None,
                session_id: None,
            }),
        );
        assert!(app.sessions.is_empty());
        assert_eq!(app.active, Some(ActiveContext::NewChat));
        let last = app.draft.messages.last().unwrap();
        assert_eq!(last.markdown.as_deref(), Some(app.strings().no_answer));
        assert_eq!(
            app.notifications.back().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
    }

    #[test]
    fn test_reply_appends_to_existing_session() {
        let mut app = two_session_app();
        let effect = update(&mut app, Action::Submit("dose?".to_string()));
        assert!(matches!(
            effect,
            Effect::Send(OutgoingMessage { ref session_id, .. }) if session_id.as_deref() == Some("b")
        ));
        update(&mut app, Action::ReplyReceived(reply("500mg", Some("b"))));

        let b = app.session("b").unwrap();
        assert_eq!(b.messages.len(), 2);
        assert_eq!(user_count(&b.messages), 1);
        assert_eq!(b.messages[1].sender, Sender::Bot);
        assert!(is_sorted(&b.messages));
        assert!(app.session("a").unwrap().messages.is_empty());
    }

    #[test]
    fn test_reply_for_deleted_session_is_dropped() {
        let mut app = two_session_app();
        update(&mut app, Action::Submit("dose?".to_string()));
        update(&mut app, Action::DeleteSession("b".to_string()));
        update(&mut app, Action::SessionDeleted("b".to_string()));
        update(&mut app, Action::ReplyReceived(reply("500mg", Some("b"))));
        assert!(app.session("b").is_none());
        assert!(!app.is_sending());
    }

    #[test]
    fn test_send_failure_appends_one_error() {
        let mut app = two_session_app();
        update(&mut app, Action::Submit("dose?".to_string()));
        update(&mut app, Action::SendFailed("HTTP 500".to_string()));

        let b = app.session("b").unwrap();
        assert_eq!(b.messages.len(), 2);
        assert_eq!(b.messages.iter().filter(|m| m.is_error()).count(), 1);
        assert_eq!(b.id, "b");
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("b".to_string())));
        assert!(!app.is_sending());
        assert!(app.can_send());
    }

    #[test]
    fn test_draft_send_failure_keeps_draft() {
        let mut app = new_chat_app();
        update(&mut app, Action::Submit("hello".to_string()));
        update(&mut app, Action::SendFailed("refused".to_string()));
        assert!(app.sessions.is_empty());
        assert_eq!(app.active, Some(ActiveContext::NewChat));
        assert!(app.draft.messages.last().unwrap().is_error());
    }

    #[test]
    fn test_streaming_fills_placeholder_then_promotes() {
        let mut app = new_chat_app();
        app.streaming = true;
        let effect = update(&mut app, Action::Submit("hello".to_string()));
        assert!(matches!(effect, Effect::Send(OutgoingMessage { streaming: true, .. })));
        assert_eq!(app.draft.messages.last().unwrap().kind, MessageKind::Pending);

        for (text, sid) in [("**h", None), ("i**", Some("s1"))] {
            update(
                &mut app,
                Action::StreamRecord(StreamRecord {
                    text: Some(text.to_string()),
                    session_id: sid.map(str::to_string),
                }),
            );
        }
        let pending = app.draft.messages.last().unwrap();
        assert_eq!(pending.text, "<p><strong>hi</strong></p>\n");

        update(&mut app, Action::StreamFinished);
        let session = app.session("s1").unwrap();
        assert_eq!(session.messages.len(), 2);
        let bot = session.messages.last().unwrap();
        assert_eq!(bot.kind, MessageKind::Text);
        assert_eq!(bot.markdown.as_deref(), Some("**hi**"));
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("s1".to_string())));
    }

    #[test]
    fn test_streaming_failure_removes_placeholder() {
        let mut app = two_session_app();
        app.streaming = true;
        update(&mut app, Action::Submit("dose?".to_string()));
        update(
            &mut app,
            Action::StreamRecord(StreamRecord {
                text: Some("partial".to_string()),
                session_id: None,
            }),
        );
        update(&mut app, Action::SendFailed("reset".to_string()));
        let b = app.session("b").unwrap();
        assert_eq!(b.messages.len(), 2);
        assert!(b.messages.iter().all(|m| m.kind != MessageKind::Pending));
        assert!(b.messages[1].is_error());
    }

    #[test]
    fn test_empty_stream_uses_fallback() {
        let mut app = two_session_app();
        app.streaming = true;
        update(&mut app, Action::Submit("dose?".to_string()));
        update(&mut app, Action::StreamFinished);
        let bot = app.session("b").unwrap().messages.last().unwrap().clone();
        assert_eq!(bot.markdown.as_deref(), Some(app.strings().no_answer));
    }

    #[test]
    fn test_delete_non_active_keeps_active() {
        let mut app = two_session_app();
        assert_eq!(
            update(&mut app, Action::DeleteSession("a".to_string())),
            Effect::DeleteSession("a".to_string())
        );
        assert!(app.session("a").is_none());
        update(&mut app, Action::SessionDeleted("a".to_string()));
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("b".to_string())));
        assert_eq!(app.sessions.len(), 1);
    }

    #[test]
    fn test_delete_active_selects_newest_remaining() {
        let mut app = test_app();
        update(
            &mut app,
            Action::SessionsLoaded(vec![summary("a", 1), summary("b", 3), summary("c", 2)]),
        );
        update(&mut app, Action::DeleteSession("b".to_string()));
        let effect = update(&mut app, Action::SessionDeleted("b".to_string()));
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("c".to_string())));
        assert_eq!(effect, Effect::FetchHistory("c".to_string()));
    }

    #[test]
    fn test_delete_last_session_enters_new_chat() {
        let mut app = test_app();
        update(&mut app, Action::SessionsLoaded(vec![summary("a", 1)]));
        update(&mut app, Action::DeleteSession("a".to_string()));
        update(&mut app, Action::SessionDeleted("a".to_string()));
        assert_eq!(app.active, Some(ActiveContext::NewChat));
        assert!(app.sessions.is_empty());
    }

    #[test]
    fn test_failed_delete_restores_exact_list() {
        let mut app = two_session_app();
        let before = app.sessions.clone();
        update(&mut app, Action::DeleteSession("b".to_string()));
        assert_eq!(app.sessions.len(), 1);
        update(
            &mut app,
            Action::DeleteFailed {
                session_id: "b".to_string(),
                error: "HTTP 500".to_string(),
            },
        );
        assert_eq!(app.sessions, before);
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("b".to_string())));
        assert!(app.pending_deletes.is_empty());
    }

    #[test]
    fn test_overlapping_deletes_do_not_resurrect() {
        let mut app = two_session_app();
        update(&mut app, Action::DeleteSession("a".to_string()));
        update(&mut app, Action::DeleteSession("b".to_string()));
        update(&mut app, Action::SessionDeleted("a".to_string()));
        update(
            &mut app,
            Action::DeleteFailed {
                session_id: "b".to_string(),
                error: "boom".to_string(),
            },
        );
        let ids: Vec<&str> = app.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_failed_delete_keeps_reply_in_other_session() {
        let mut app = two_session_app();
        update(&mut app, Action::DeleteSession("a".to_string()));
        update(&mut app, Action::Submit("dose?".to_string()));
        update(&mut app, Action::ReplyReceived(reply("500mg", Some("b"))));
        update(
            &mut app,
            Action::DeleteFailed {
                session_id: "a".to_string(),
                error: "HTTP 500".to_string(),
            },
        );
        let ids: Vec<&str> = app.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(app.session("b").unwrap().messages.len(), 2);
    }

    #[test]
    fn test_failed_delete_keeps_session_promoted_meanwhile() {
        let mut app = two_session_app();
        update(&mut app, Action::NewChat);
        update(&mut app, Action::DeleteSession("a".to_string()));
        update(&mut app, Action::Submit("hello".to_string()));
        update(&mut app, Action::ReplyReceived(reply("hi", Some("s1"))));
        update(
            &mut app,
            Action::DeleteFailed {
                session_id: "a".to_string(),
                error: "HTTP 500".to_string(),
            },
        );
        assert!(app.session("a").is_some());
        assert!(app.session("s1").is_some());
        assert_eq!(app.sessions[0].id, "s1");
        assert_eq!(app.active, Some(ActiveContext::ExistingSession("s1".to_string())));
        assert!(app.can_send());
    }

    #[test]
    fn test_promoted_session_dated_by_first_message() {
        let mut app = new_chat_app();
        let stale = app.draft.messages[0].timestamp - chrono::Duration::hours(3);
        app.draft.messages[0].timestamp = stale;
        update(&mut app, Action::Submit("hello".to_string()));
        let sent_at = app.draft.messages.last().unwrap().timestamp;
        update(&mut app, Action::ReplyReceived(reply("hi", Some("s1"))));
        let created = app.session("s1").unwrap().created_at;
        assert_eq!(created, sent_at);
        assert!(created > stale);
    }

    #[test]
    fn test_promotion_drops_local_greeting() {
        let mut app = new_chat_app();
        update(&mut app, Action::Submit("hello".to_string()));
        update(&mut app, Action::ReplyReceived(reply("hi", Some("s1"))));
        let messages = &app.session("s1").unwrap().messages;
        assert!(messages.iter().all(|m| m.text != app.strings().greeting));
        let senders: Vec<Sender> = messages.iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Bot]);
        // the next draft greets again
        assert_eq!(app.draft.messages.len(), 1);
    }

    #[test]
    fn test_delete_unknown_session_is_noop() {
        let mut app = two_session_app();
        assert_eq!(update(&mut app, Action::DeleteSession("zzz".to_string())), Effect::None);
        assert_eq!(app.sessions.len(), 2);
    }

    #[test]
    fn test_health_check_reports_notification() {
        let mut app = new_chat_app();
        assert_eq!(update(&mut app, Action::HealthCheck), Effect::HealthCheck);
        update(&mut app, Action::HealthReported(Ok("ok".to_string())));
        assert_eq!(
            app.notifications.back().map(|n| n.text.as_str()),
            Some("Health check: ok")
        );
        update(&mut app, Action::HealthReported(Err("refused".to_string())));
        assert_eq!(
            app.notifications.back().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
    }

    #[test]
    fn test_toggle_rag() {
        let mut app = new_chat_app();
        update(&mut app, Action::ToggleRag);
        assert!(app.use_rag);
        update(&mut app, Action::ToggleRag);
        assert!(!app.use_rag);
    }

    #[test]
    fn test_new_chat_reuses_draft() {
        let mut app = two_session_app();
        update(&mut app, Action::NewChat);
        app.draft.messages.push(Message::user("typed earlier"));
        update(&mut app, Action::SelectSession("a".to_string()));
        update(&mut app, Action::NewChat);
        assert_eq!(user_count(&app.draft.messages), 1);
    }
}
