//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm. Backend
//! calls are started from here too: every `Effect` returned by `update()` is
//! handed to [`tasks::spawn`], whose results come back over an mpsc channel
//! and are fed into `update()` on the next loop turn.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (sessions or history loading, reply pending): draws every
//!   ~80ms so the spinner moves.
//! - **Idle**: sleeps up to 500ms, only redraws on input, task results,
//!   expiring notifications or terminal resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
pub mod markdown;
pub mod tasks;
mod ui;

use log::{debug, info};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::api::{ChatBackend, HttpBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::locale::Strings;
use crate::core::session::ActiveContext;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState, SidebarEvent, SidebarState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// How long a notification stays in the title bar.
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Which component receives key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
}

impl Focus {
    fn toggle(self) -> Self {
        match self {
            Focus::Input => Focus::Sidebar,
            Focus::Sidebar => Focus::Input,
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub input_box: InputBox,
    pub sidebar: SidebarState,
    pub thread: MessageListState,
    pub focus: Focus,
    /// Context shown last frame; a change resets the thread scroll.
    shown: Option<ActiveContext>,
}

impl TuiState {
    pub fn new(strings: &'static Strings) -> Self {
        Self {
            input_box: InputBox::new(strings.input_placeholder),
            sidebar: SidebarState::new(),
            thread: MessageListState::new(),
            focus: Focus::Input, // User expects to type immediately
            shown: None,
        }
    }

    /// Bring component state in line with `App` after it changed.
    fn sync(&mut self, app: &App) {
        self.sidebar.sync(app.sessions_by_recency());
        if self.shown != app.active {
            self.thread.reset();
            if let Some(id) = app.active.as_ref().and_then(ActiveContext::session_id) {
                self.sidebar.select_id(id);
            }
            self.shown = app.active.clone();
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste, Hide);
    }
}

/// Runs `action` through the reducer and starts whatever it asks for.
/// Returns true when the app should quit.
fn dispatch(
    app: &mut App,
    action: Action,
    backend: &Arc<dyn ChatBackend>,
    tx: &mpsc::Sender<Action>,
) -> bool {
    let effect = update(app, action);
    if effect == Effect::Quit {
        return true;
    }
    tasks::spawn(effect, Arc::clone(backend), tx.clone());
    false
}

/// Maps a key event to a reducer action, updating focus and component state
/// on the way.
fn route_event(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => Some(Action::Quit),
        TuiEvent::NewChat => {
            tui.focus = Focus::Input;
            Some(Action::NewChat)
        }
        TuiEvent::ToggleRag => Some(Action::ToggleRag),
        TuiEvent::HealthCheck => Some(Action::HealthCheck),
        TuiEvent::FocusNext => {
            tui.focus = tui.focus.toggle();
            tui.sidebar.confirm_delete = false;
            None
        }
        // Scroll events always go to the thread regardless of focus
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.thread.handle_event(event);
            None
        }
        TuiEvent::Resize => None,
        _ => match tui.focus {
            Focus::Input => {
                tui.input_box.enabled = app.can_send();
                match tui.input_box.handle_event(event)? {
                    InputEvent::Submit(text) => Some(Action::Submit(text)),
                    InputEvent::ContentChanged => None,
                }
            }
            Focus::Sidebar => {
                if matches!(event, TuiEvent::Escape) {
                    tui.focus = Focus::Input;
                    tui.sidebar.confirm_delete = false;
                    return None;
                }
                match tui.sidebar.handle_event(event)? {
                    SidebarEvent::Open(id) => {
                        tui.focus = Focus::Input;
                        Some(Action::SelectSession(id))
                    }
                    SidebarEvent::NewChat => {
                        tui.focus = Focus::Input;
                        Some(Action::NewChat)
                    }
                    SidebarEvent::Delete(id) => Some(Action::DeleteSession(id)),
                }
            }
        },
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(&config.backend_url));
    let mut app = App::from_config(&config);
    let mut tui = TuiState::new(app.strings());
    info!("Using backend at {}", config.backend_url);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let mut should_quit = dispatch(&mut app, Action::LoadSessions, &backend, &tx);

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    while !should_quit {
        tui.sync(&app);

        let animating = app.loading_sessions || !app.loading_history.is_empty() || app.is_sending();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = route_event(&event, &app, &mut tui)
                && dispatch(&mut app, action, &backend, &tx)
            {
                should_quit = true;
                break;
            }
            tui.sync(&app);
        }

        // Handle background task results
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, action, &backend, &tx) {
                should_quit = true;
            }
        }

        let before = app.notifications.len();
        app.prune_notifications(NOTIFICATION_TTL);
        if app.notifications.len() != before {
            needs_redraw = true;
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{session, test_app};

    fn tui_for(app: &App) -> TuiState {
        let mut tui = TuiState::new(app.strings());
        tui.sync(app);
        tui
    }

    #[test]
    fn test_global_shortcuts_map_to_actions() {
        let app = test_app();
        let mut tui = tui_for(&app);
        assert_eq!(route_event(&TuiEvent::ForceQuit, &app, &mut tui), Some(Action::Quit));
        assert_eq!(route_event(&TuiEvent::ToggleRag, &app, &mut tui), Some(Action::ToggleRag));
        assert_eq!(route_event(&TuiEvent::HealthCheck, &app, &mut tui), Some(Action::HealthCheck));
        assert_eq!(route_event(&TuiEvent::NewChat, &app, &mut tui), Some(Action::NewChat));
    }

    #[test]
    fn test_typing_and_enter_submits() {
        let mut app = test_app();
        app.active = Some(ActiveContext::NewChat);
        let mut tui = tui_for(&app);
        for c in "hi".chars() {
            assert_eq!(route_event(&TuiEvent::InputChar(c), &app, &mut tui), None);
        }
        assert_eq!(
            route_event(&TuiEvent::Submit, &app, &mut tui),
            Some(Action::Submit("hi".to_string()))
        );
    }

    #[test]
    fn test_submit_without_context_keeps_text() {
        let app = test_app(); // no active context yet
        let mut tui = tui_for(&app);
        route_event(&TuiEvent::InputChar('x'), &app, &mut tui);
        assert_eq!(route_event(&TuiEvent::Submit, &app, &mut tui), None);
        assert_eq!(tui.input_box.buffer, "x");
    }

    #[test]
    fn test_sidebar_flow() {
        let mut app = test_app();
        app.sessions = vec![session("b", 2), session("a", 1)];
        let mut tui = tui_for(&app);

        assert_eq!(route_event(&TuiEvent::FocusNext, &app, &mut tui), None);
        assert_eq!(tui.focus, Focus::Sidebar);

        // Letters go to the sidebar, not the input
        route_event(&TuiEvent::CursorDown, &app, &mut tui);
        route_event(&TuiEvent::InputChar('d'), &app, &mut tui);
        assert_eq!(
            route_event(&TuiEvent::InputChar('d'), &app, &mut tui),
            Some(Action::DeleteSession("b".to_string()))
        );
        assert!(tui.input_box.buffer.is_empty());

        assert_eq!(
            route_event(&TuiEvent::Submit, &app, &mut tui),
            Some(Action::SelectSession("b".to_string()))
        );
        assert_eq!(tui.focus, Focus::Input);
    }

    #[test]
    fn test_scroll_goes_to_thread_from_any_focus() {
        let app = test_app();
        let mut tui = tui_for(&app);
        tui.focus = Focus::Sidebar;
        assert_eq!(route_event(&TuiEvent::ScrollUp, &app, &mut tui), None);
        assert!(!tui.thread.stick_to_bottom);
    }

    #[test]
    fn test_context_change_resets_scroll_and_selection() {
        let mut app = test_app();
        app.sessions = vec![session("b", 2), session("a", 1)];
        let mut tui = tui_for(&app);
        tui.thread.stick_to_bottom = false;

        app.active = Some(ActiveContext::ExistingSession("a".to_string()));
        tui.sync(&app);
        assert!(tui.thread.stick_to_bottom);
        assert_eq!(tui.sidebar.selected_id(), Some("a"));
    }

    #[test]
    fn test_dispatch_reports_quit() {
        let mut app = test_app();
        let backend: Arc<dyn ChatBackend> = Arc::new(crate::test_support::NoopBackend);
        let (tx, _rx) = mpsc::channel();
        assert!(dispatch(&mut app, Action::Quit, &backend, &tx));
        assert!(!dispatch(&mut app, Action::ToggleRag, &backend, &tx));
    }
}
