//! # InputBox Component
//!
//! Single-line message input.
//!
//! The buffer and cursor are internal state; whether input is accepted and
//! the RAG flag are props copied from `App` before each render. Long input
//! scrolls horizontally so the cursor stays visible. Pasted newlines are
//! flattened to spaces.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Left and right border.
const HORIZONTAL_OVERHEAD: u16 = 2;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    ContentChanged,
}

/// Text input component.
///
/// # Props
///
/// - `enabled`: whether a submission would be accepted right now
/// - `use_rag`: shown in the title
/// - `focused`: draws the cursor and highlights the border
pub struct InputBox {
    pub buffer: String,
    pub enabled: bool,
    pub use_rag: bool,
    pub focused: bool,
    placeholder: &'static str,
    /// Cursor position as byte offset in buffer
    cursor: usize,
    /// First visible display column
    scroll: usize,
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..].chars().next().map_or(pos, |c| pos + c.len_utf8())
}

fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

impl InputBox {
    pub fn new(placeholder: &'static str) -> Self {
        Self {
            buffer: String::new(),
            enabled: true,
            use_rag: false,
            focused: true,
            placeholder,
            cursor: 0,
            scroll: 0,
        }
    }

    pub fn set_placeholder(&mut self, placeholder: &'static str) {
        self.placeholder = placeholder;
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Keep the cursor column inside `[scroll, scroll + width)`.
    fn update_scroll(&mut self, width: usize) {
        let cursor_col = display_width(&self.buffer[..self.cursor]);
        if width == 0 {
            self.scroll = cursor_col;
        } else if cursor_col < self.scroll {
            self.scroll = cursor_col;
        } else if cursor_col >= self.scroll + width {
            self.scroll = cursor_col + 1 - width;
        }
    }

    /// The slice of the buffer starting at display column `scroll` that fits
    /// in `width` columns.
    fn visible_text(&self, width: usize) -> String {
        let mut col = 0;
        let mut out = String::new();
        for c in self.buffer.chars() {
            let w = c.width().unwrap_or(0);
            if col >= self.scroll {
                if col + w > self.scroll + width {
                    break;
                }
                out.push(c);
            }
            col += w;
        }
        out
    }

    fn title(&self) -> Line<'static> {
        let rag = if self.use_rag {
            Span::styled(" RAG on ", Style::default().fg(Color::Green))
        } else {
            Span::styled(" RAG off ", Style::default().fg(Color::DarkGray))
        };
        Line::from(vec![rag])
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = usize::from(area.width.saturating_sub(HORIZONTAL_OVERHEAD));
        self.update_scroll(width);

        let border = if !self.enabled {
            Color::DarkGray
        } else if self.focused {
            Color::Green
        } else {
            Color::Gray
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(self.title());

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(self.placeholder)
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
        } else {
            Paragraph::new(self.visible_text(width)).style(Style::default().fg(Color::Green))
        };
        frame.render_widget(paragraph.block(block), area);

        if self.focused && self.enabled && area.height > 2 {
            let col = display_width(&self.buffer[..self.cursor]).saturating_sub(self.scroll);
            let x = area.x + 1 + u16::try_from(col).unwrap_or(u16::MAX).min(area.width.saturating_sub(2));
            frame.set_cursor_position((x, area.y + 1));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut buf = [0u8; 4];
                self.insert(c.encode_utf8(&mut buf));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let flat: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                self.insert(&flat);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::Escape => (!self.buffer.is_empty()).then(|| {
                self.buffer.clear();
                self.cursor = 0;
                self.scroll = 0;
                InputEvent::ContentChanged
            }),
            // Text stays in the buffer until a send would be accepted
            TuiEvent::Submit if self.enabled && !self.buffer.trim().is_empty() => {
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                self.scroll = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
