use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Widget, Wrap};

use crate::api::Sender;
use crate::core::locale::Strings;
use crate::core::message::{Message as ChatMessage, MessageKind};
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) around the message body.
const CONTENT_PAD_H: u16 = 1;

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠸", "⠴"];

/// A stateless component that renders one chat message.
///
/// `Message` is a **transient component**: it is created fresh each frame
/// with the data it needs and holds no state of its own.
///
/// The header rule carries the author and local time (`You · 14:02`); the
/// body is plain text for the user, rendered markdown for the bot and red
/// text for locally generated errors.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
    pub strings: &'static Strings,
    pub spinner_frame: usize,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a ChatMessage, strings: &'static Strings, spinner_frame: usize) -> Self {
        Self {
            message,
            strings,
            spinner_frame,
        }
    }

    fn accent(&self) -> Style {
        match (self.message.sender, self.message.kind) {
            (_, MessageKind::Error) => Style::default().fg(Color::Red),
            (Sender::User, _) => Style::default().fg(Color::Green),
            (Sender::Bot, _) => Style::default().fg(Color::Blue),
        }
    }

    fn header(&self) -> Line<'static> {
        let author = match self.message.sender {
            Sender::User => self.strings.user_label,
            Sender::Bot => self.strings.app_title,
        };
        let time = self.message.timestamp.with_timezone(&Local).format("%H:%M");
        Line::from(vec![
            Span::styled(format!(" {author} "), self.accent().add_modifier(Modifier::BOLD)),
            Span::styled(format!("· {time} "), Style::default().fg(Color::DarkGray)),
        ])
    }

    fn body(&self) -> Text<'static> {
        let message = self.message;
        match (message.sender, message.kind) {
            (_, MessageKind::Error) => Text::styled(message.text.clone(), self.accent()),
            (Sender::Bot, MessageKind::Pending)
                if message.markdown.as_deref().is_none_or(|m| m.trim().is_empty()) =>
            {
                let frame = SPINNER[self.spinner_frame % SPINNER.len()];
                Text::styled(
                    format!("{frame} {}", self.strings.waiting_reply),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )
            }
            (Sender::Bot, _) => {
                let source = message.markdown.as_deref().unwrap_or(&message.text);
                markdown::render(source, Color::Reset)
            }
            (Sender::User, _) => Text::styled(message.text.clone(), Style::default()),
        }
    }

    fn paragraph(&self) -> Paragraph<'static> {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(self.accent().add_modifier(Modifier::DIM))
            .title(self.header())
            .padding(Padding::horizontal(CONTENT_PAD_H));
        Paragraph::new(self.body())
            .block(block)
            .wrap(Wrap { trim: false })
    }

    /// Rows needed to render this message at `width`, header included.
    pub fn calculate_height(&self, width: u16) -> u16 {
        if width <= CONTENT_PAD_H * 2 {
            return 1;
        }
        let lines = self.paragraph().line_count(width);
        u16::try_from(lines).unwrap_or(u16::MAX).max(2)
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.paragraph().render(area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
