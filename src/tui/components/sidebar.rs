//! # Sidebar Component
//!
//! Session list on the left of the screen. The first row starts a new chat,
//! the rest are the backend's sessions, newest first.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with borrowed state and props

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};

use crate::core::locale::Strings;
use crate::core::session::Session;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Persistent state for the sidebar.
pub struct SidebarState {
    /// Session ids in display order, refreshed from `App` every loop turn.
    pub entries: Vec<String>,
    /// Row index; 0 is the new chat row, `i + 1` is `entries[i]`.
    pub selected: usize,
    pub confirm_delete: bool,
    pub list_state: ListState,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self::new()
    }
}

impl SidebarState {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
            confirm_delete: false,
            list_state: ListState::default().with_selected(Some(0)),
        }
    }

    /// Replace the entries, keeping the selection on the same session when
    /// it is still listed and clamping it otherwise.
    pub fn sync(&mut self, sessions: &[Session]) {
        let selected_id = self.selected_id().map(str::to_string);
        self.entries = sessions.iter().map(|s| s.id.clone()).collect();
        self.selected = match selected_id {
            Some(id) => self
                .entries
                .iter()
                .position(|e| *e == id)
                .map_or(self.selected.min(self.entries.len()), |i| i + 1),
            None => 0,
        };
        self.list_state.select(Some(self.selected));
    }

    /// Move the selection onto `id`, e.g. when it was opened elsewhere.
    pub fn select_id(&mut self, id: &str) {
        if let Some(i) = self.entries.iter().position(|e| e == id) {
            self.selected = i + 1;
            self.list_state.select(Some(self.selected));
        }
    }

    /// Session id under the cursor; `None` on the new chat row.
    pub fn selected_id(&self) -> Option<&str> {
        self.selected
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
    }

    fn move_to(&mut self, row: usize) {
        self.selected = row.min(self.entries.len());
        self.list_state.select(Some(self.selected));
    }
}

/// Events emitted by the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    Open(String),
    NewChat,
    Delete(String),
}

impl EventHandler for SidebarState {
    type Event = SidebarEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<SidebarEvent> {
        // Any other key cancels a pending delete confirmation
        if !matches!(event, TuiEvent::InputChar('d')) {
            self.confirm_delete = false;
        }

        match event {
            TuiEvent::CursorUp => {
                self.move_to(self.selected.saturating_sub(1));
                None
            }
            TuiEvent::CursorDown => {
                self.move_to(self.selected + 1);
                None
            }
            TuiEvent::CursorHome => {
                self.move_to(0);
                None
            }
            TuiEvent::CursorEnd => {
                self.move_to(self.entries.len());
                None
            }
            TuiEvent::Submit => Some(match self.selected_id() {
                Some(id) => SidebarEvent::Open(id.to_string()),
                None => SidebarEvent::NewChat,
            }),
            TuiEvent::InputChar('n') => Some(SidebarEvent::NewChat),
            TuiEvent::InputChar('d') => {
                let id = self.selected_id()?.to_string();
                if self.confirm_delete {
                    self.confirm_delete = false;
                    Some(SidebarEvent::Delete(id))
                } else {
                    self.confirm_delete = true;
                    None
                }
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the sidebar.
pub struct Sidebar<'a> {
    state: &'a mut SidebarState,
    sessions: &'a [Session],
    active_id: Option<&'a str>,
    new_chat_active: bool,
    loading: bool,
    focused: bool,
    strings: &'static Strings,
}

impl<'a> Sidebar<'a> {
    pub fn new(
        state: &'a mut SidebarState,
        sessions: &'a [Session],
        strings: &'static Strings,
    ) -> Self {
        Self {
            state,
            sessions,
            active_id: None,
            new_chat_active: false,
            loading: false,
            focused: false,
            strings,
        }
    }

    pub fn active(mut self, active_id: Option<&'a str>, new_chat_active: bool) -> Self {
        self.active_id = active_id;
        self.new_chat_active = new_chat_active;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn row_style(&self, row: usize) -> Style {
        if self.focused && row == self.state.selected {
            let fg = if self.state.confirm_delete {
                Color::Red
            } else {
                Color::White
            };
            Style::default()
                .fg(fg)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    fn item(&self, row: usize, label: String, active: bool) -> ListItem<'static> {
        let marker = if active { "▌" } else { " " };
        let style = self.row_style(row);
        let marker_style = if active {
            style.fg(Color::Cyan)
        } else {
            style
        };
        ListItem::new(Line::from(vec![
            Span::styled(marker, marker_style),
            Span::styled(label, style),
        ]))
    }
}

/// Truncate to `max` characters, adding "..." if needed.
fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else if max <= 3 {
        ".".repeat(max)
    } else {
        let head: String = name.chars().take(max - 3).collect();
        format!("{head}...")
    }
}

impl<'a> Component for Sidebar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let help = if !self.focused {
            String::new()
        } else if self.state.confirm_delete {
            format!(" {} ", self.strings.confirm_delete)
        } else {
            " ↑↓ ⏎ n d ".to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", self.strings.sessions_title))
            .title_bottom(Line::from(help).centered())
            .padding(Padding::horizontal(1));

        let inner = block.inner(area);
        let label_width = usize::from(inner.width.saturating_sub(1));

        let mut items = vec![self.item(0, self.strings.new_chat_entry.to_string(), self.new_chat_active)];
        items.extend(self.sessions.iter().enumerate().map(|(i, session)| {
            let active = self.active_id == Some(session.id.as_str());
            self.item(i + 1, truncate_name(&session.name, label_width), active)
        }));

        frame.render_stateful_widget(List::new(items).block(block), area, &mut self.state.list_state);

        if self.sessions.is_empty() && inner.height > 2 {
            let notice = if self.loading {
                self.strings.loading_sessions
            } else {
                self.strings.no_sessions
            };
            let notice_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
            frame.render_widget(
                Paragraph::new(notice)
                    .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
                    .alignment(Alignment::Center),
                notice_area,
            );
        }
    }
}
