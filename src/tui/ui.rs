use crate::core::session::ActiveContext;
use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, Sidebar, ThreadView, TitleBar};
use crate::tui::{Focus, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Sidebar width in columns, shrunk on narrow terminals.
const SIDEBAR_WIDTH: u16 = 30;

/// What the thread area shows for the current `App`.
fn thread_view(app: &App) -> ThreadView<'_> {
    let strings = app.strings();
    match &app.active {
        None if app.loading_sessions => ThreadView::Loading(strings.loading_sessions),
        None => ThreadView::Empty(strings.empty_state),
        Some(ActiveContext::NewChat) => ThreadView::Messages(&app.draft.messages),
        Some(ActiveContext::ExistingSession(id)) => match app.session(id) {
            Some(session) if session.messages.is_empty() && app.is_history_loading(id) => {
                ThreadView::Loading(strings.loading_messages)
            }
            Some(session) => ThreadView::Messages(&session.messages),
            None => ThreadView::Empty(strings.empty_state),
        },
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let strings = app.strings();

    let [title_area, body_area, help_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());
    let sidebar_width = SIDEBAR_WIDTH.min(body_area.width / 3);
    let [sidebar_area, main_area] =
        Layout::horizontal([Length(sidebar_width), Min(0)]).areas(body_area);
    let [thread_area, input_area] = Layout::vertical([Min(0), Length(3)]).areas(main_area);

    TitleBar::new(strings, app.active_title(), app.use_rag, app.streaming)
        .notification(app.notifications.back())
        .render(frame, title_area);

    let active_id = app.active.as_ref().and_then(ActiveContext::session_id);
    Sidebar::new(&mut tui.sidebar, app.sessions_by_recency(), strings)
        .active(active_id, app.active == Some(ActiveContext::NewChat))
        .loading(app.loading_sessions)
        .focused(tui.focus == Focus::Sidebar)
        .render(frame, sidebar_area);

    MessageList::new(&mut tui.thread, thread_view(app), strings, spinner_frame)
        .render(frame, thread_area);

    tui.input_box.enabled = app.can_send();
    tui.input_box.use_rag = app.use_rag;
    tui.input_box.focused = tui.focus == Focus::Input;
    tui.input_box.render(frame, input_area);

    let help = match tui.focus {
        Focus::Input => strings.help_input,
        Focus::Sidebar => strings.help_sidebar,
    };
    frame.render_widget(
        Line::from(vec![
            Span::styled(format!(" {help}"), Style::default().fg(Color::DarkGray)),
        ]),
        help_area,
    );
}
