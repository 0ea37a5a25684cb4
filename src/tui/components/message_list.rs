//! # MessageList Component
//!
//! Scrollable view of the active thread.
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent scroll state) and the thread being
//! shown (props). Heights are measured each frame, then only the messages
//! intersecting the viewport are rendered into a `ScrollView`.
//!
//! When there is no thread to show it renders a placeholder instead: a
//! loading line while the session list or history is being fetched, or the
//! "select or start a chat" hint.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::locale::Strings;
use crate::core::message::Message as ChatMessage;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

/// What the list area should show this frame.
pub enum ThreadView<'a> {
    Messages(&'a [ChatMessage]),
    Loading(&'static str),
    Empty(&'static str),
}

/// Scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Heights of the messages as last measured
    pub heights: Vec<u16>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            heights: Vec::new(),
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        let total: u16 = self.heights.iter().sum();
        total.saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Forget the scroll position, e.g. when another thread is opened.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Index range of the messages intersecting `[offset, offset + viewport)`.
fn visible_range(heights: &[u16], offset: u16, viewport: u16) -> std::ops::Range<usize> {
    let end_y = offset.saturating_add(viewport);
    let mut top = 0u16;
    let mut start = heights.len();
    let mut end = heights.len();
    for (i, h) in heights.iter().enumerate() {
        let bottom = top.saturating_add(*h);
        if start == heights.len() && bottom > offset {
            start = i;
        }
        if top >= end_y {
            end = i;
            break;
        }
        top = bottom;
    }
    start.min(end)..end
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub view: ThreadView<'a>,
    pub strings: &'static Strings,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        view: ThreadView<'a>,
        strings: &'static Strings,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            view,
            strings,
            spinner_frame,
        }
    }

    fn render_placeholder(frame: &mut Frame, area: Rect, text: &str, style: Style) {
        let y = area.y + area.height / 2;
        let line_area = Rect::new(area.x, y, area.width, 1.min(area.height));
        frame.render_widget(
            Paragraph::new(text.to_string()).style(style).alignment(Alignment::Center),
            line_area,
        );
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let messages = match self.view {
            ThreadView::Messages(messages) => messages,
            ThreadView::Loading(text) => {
                let dim = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
                Self::render_placeholder(frame, area, text, dim);
                return;
            }
            ThreadView::Empty(text) => {
                Self::render_placeholder(frame, area, text, Style::default().fg(Color::DarkGray));
                return;
            }
        };

        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        self.state.heights = messages
            .iter()
            .map(|m| Message::new(m, self.strings, self.spinner_frame).calculate_height(content_width))
            .collect();
        let total_height: u16 = self.state.heights.iter().sum();

        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let offset = self.state.scroll_state.offset().y;
        let range = visible_range(&self.state.heights, offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y: u16 = self.state.heights[..range.start].iter().sum();
        for i in range {
            let height = self.state.heights[i];
            let message = Message::new(&messages[i], self.strings, self.spinner_frame);
            scroll_view.render_widget(message, Rect::new(0, y, content_width, height));
            y = y.saturating_add(height);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}
