//! # TitleBar Component
//!
//! Top status line: app title, the open thread, the RAG and streaming
//! flags, and the newest notification.
//!
//! TitleBar is purely presentational. It receives all data as props and
//! has no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(strings, app.active_title(), app.use_rag, app.streaming)
//!     .notification(app.notifications.back());
//! title_bar.render(frame, area);
//! ```
//!
//! When the line is too narrow the notification wins over the flags, and the
//! flags win over the thread name.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::core::locale::Strings;
use crate::core::state::{Notification, NotificationLevel};
use crate::tui::component::Component;

pub struct TitleBar<'a> {
    pub strings: &'static Strings,
    /// Name of the open thread, if any
    pub thread: Option<String>,
    pub use_rag: bool,
    pub streaming: bool,
    pub notification: Option<&'a Notification>,
}

impl<'a> TitleBar<'a> {
    pub fn new(strings: &'static Strings, thread: Option<String>, use_rag: bool, streaming: bool) -> Self {
        Self {
            strings,
            thread,
            use_rag,
            streaming,
            notification: None,
        }
    }

    pub fn notification(mut self, notification: Option<&'a Notification>) -> Self {
        self.notification = notification;
        self
    }

    fn level_style(level: NotificationLevel) -> Style {
        let color = match level {
            NotificationLevel::Info => Color::Cyan,
            NotificationLevel::Success => Color::Green,
            NotificationLevel::Warning => Color::Yellow,
            NotificationLevel::Error => Color::Red,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    fn line(&self, width: usize) -> Line<'static> {
        let dim = Style::default().fg(Color::DarkGray);
        let mut spans = vec![Span::styled(
            format!(" {} ", self.strings.app_title),
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        )];

        let flags = format!(
            " RAG {} · stream {} ",
            if self.use_rag { "on" } else { "off" },
            if self.streaming { "on" } else { "off" },
        );
        let note = self
            .notification
            .map(|n| (format!(" {} ", n.text), Self::level_style(n.level)));

        let used = |spans: &[Span]| spans.iter().map(|s| s.content.width()).sum::<usize>();
        let reserved = note.as_ref().map_or(0, |(text, _)| text.width());

        if let Some(thread) = &self.thread {
            let candidate = format!(" {thread} ");
            if used(&spans) + candidate.width() + flags.width() + reserved <= width {
                spans.push(Span::styled(candidate, Style::default().add_modifier(Modifier::BOLD)));
            }
        }
        if used(&spans) + flags.width() + reserved <= width {
            spans.push(Span::styled(flags, dim));
        }
        if let Some((text, style)) = note {
            spans.push(Span::styled(text, style));
        }
        Line::from(spans)
    }
}

impl<'a> Component for TitleBar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(usize::from(area.width)), area);
    }
}
