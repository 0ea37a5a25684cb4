//! # Effect Runner
//!
//! Turns the `Effect`s returned by `update()` into backend calls. Each call
//! runs on its own tokio task, owns clones of what it needs, and reports the
//! outcome back to the event loop as an `Action`.
//!
//! Nothing here retries or cancels; a superseded request simply finishes and
//! its result is reconciled by the reducer.

use std::sync::{Arc, mpsc};

use futures::StreamExt;
use log::{debug, info, warn};

use crate::api::{ChatBackend, ChatRequest};
use crate::core::action::{Action, Effect, OutgoingMessage};

/// Sends `action` to the event loop. A dropped receiver means the UI is
/// shutting down, which is not worth more than a log line.
fn report(tx: &mpsc::Sender<Action>, action: Action) -> bool {
    if tx.send(action).is_err() {
        warn!("Failed to report task result: receiver dropped");
        return false;
    }
    true
}

/// Spawns `effect` onto the tokio runtime. `Effect::None` and `Effect::Quit`
/// are handled by the caller and ignored here.
pub fn spawn(effect: Effect, backend: Arc<dyn ChatBackend>, tx: mpsc::Sender<Action>) {
    if matches!(effect, Effect::None | Effect::Quit) {
        return;
    }
    debug!("Spawning effect: {:?}", effect);
    tokio::spawn(execute(effect, backend, tx));
}

/// Runs one effect to completion, reporting every resulting action.
pub async fn execute(effect: Effect, backend: Arc<dyn ChatBackend>, tx: mpsc::Sender<Action>) {
    match effect {
        Effect::None | Effect::Quit => {}

        Effect::FetchSessions => {
            let action = match backend.list_sessions().await {
                Ok(sessions) => Action::SessionsLoaded(sessions),
                Err(e) => {
                    warn!("Failed to list sessions: {}", e);
                    Action::SessionsFailed(e.to_string())
                }
            };
            report(&tx, action);
        }

        Effect::FetchHistory(session_id) => {
            let action = match backend.fetch_history(&session_id).await {
                Ok(messages) => Action::HistoryLoaded {
                    session_id,
                    messages,
                },
                Err(e) => {
                    warn!("Failed to fetch history for {}: {}", session_id, e);
                    Action::HistoryFailed {
                        session_id,
                        error: e.to_string(),
                    }
                }
            };
            report(&tx, action);
        }

        Effect::Send(outgoing) => send(outgoing, backend.as_ref(), &tx).await,

        Effect::DeleteSession(session_id) => {
            let action = match backend.delete_session(&session_id).await {
                Ok(()) => Action::SessionDeleted(session_id),
                Err(e) => {
                    warn!("Failed to delete session {}: {}", session_id, e);
                    Action::DeleteFailed {
                        session_id,
                        error: e.to_string(),
                    }
                }
            };
            report(&tx, action);
        }

        Effect::HealthCheck => {
            let result = match backend.health().await {
                Ok(health) => Ok(health.status),
                Err(e) => {
                    warn!("Health check failed: {}", e);
                    Err(e.to_string())
                }
            };
            report(&tx, Action::HealthReported(result));
        }
    }
}

async fn send(outgoing: OutgoingMessage, backend: &dyn ChatBackend, tx: &mpsc::Sender<Action>) {
    let request = ChatRequest {
        query: outgoing.query,
        session_id: outgoing.session_id,
    };

    if !outgoing.streaming {
        let action = match backend.send_message(&request, outgoing.use_rag).await {
            Ok(reply) => Action::ReplyReceived(reply),
            Err(e) => {
                warn!("Send failed: {}", e);
                Action::SendFailed(e.to_string())
            }
        };
        report(tx, action);
        return;
    }

    let mut records = match backend.send_message_stream(&request, outgoing.use_rag).await {
        Ok(records) => records,
        Err(e) => {
            warn!("Streaming send failed: {}", e);
            report(tx, Action::SendFailed(e.to_string()));
            return;
        }
    };

    let mut forwarded = 0usize;
    while let Some(record) = records.next().await {
        match record {
            Ok(record) => {
                forwarded += 1;
                if !report(tx, Action::StreamRecord(record)) {
                    return;
                }
            }
            Err(e) => {
                warn!("Stream broke after {} records: {}", forwarded, e);
                report(tx, Action::SendFailed(e.to_string()));
                return;
            }
        }
    }
    info!("Stream complete: {} records", forwarded);
    report(tx, Action::StreamFinished);
}
