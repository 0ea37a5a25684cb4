//! Markdown → ratatui `Text` renderer for bot replies.
//!
//! Walks `pulldown_cmark` events and builds styled lines. Handles headings,
//! emphasis, inline and fenced code (syntect-highlighted when the language is
//! known), nested lists, block quotes, links, rules and simple tables.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";
const MUTED: Color = Color::DarkGray;

/// Renders markdown into owned, styled text.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_TABLES);

    let mut builder = TextBuilder::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        builder.event(event);
    }
    builder.lines.into()
}

/// Block contexts that affect how lines are started.
enum Container {
    Quote,
    /// `None` = bullet list, `Some(n)` = next ordered number.
    List(Option<u64>),
}

struct TextBuilder {
    lines: Vec<Line<'static>>,
    base_fg: Color,
    inline: Vec<Style>,
    containers: Vec<Container>,
    code: Option<Option<HighlightLines<'static>>>,
    link: Option<String>,
    table_row: Option<Vec<String>>,
    gap: bool,
}

impl TextBuilder {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base_fg,
            inline: Vec::new(),
            containers: Vec::new(),
            code: None,
            link: None,
            table_row: None,
            gap: false,
        }
    }

    fn style(&self) -> Style {
        self.inline
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        let next = self.style().patch(overlay);
        self.inline.push(next);
    }

    /// Quote bars for every enclosing quote, plus list indentation.
    fn prefix(&self) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        let mut depth = 0usize;
        for container in &self.containers {
            match container {
                Container::Quote => spans.push(Span::styled("│ ", Style::default().fg(MUTED))),
                Container::List(_) => depth += 1,
            }
        }
        if depth > 1 {
            spans.push(Span::raw("  ".repeat(depth - 1)));
        }
        spans
    }

    fn start_block(&mut self) {
        if self.gap && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.gap = false;
    }

    fn new_line(&mut self) {
        let prefix = self.prefix();
        self.lines.push(Line::from(prefix));
    }

    fn push_span(&mut self, span: Span<'static>) {
        if let Some(row) = self.table_row.as_mut() {
            if let Some(cell) = row.last_mut() {
                cell.push_str(&span.content);
            }
            return;
        }
        match self.lines.last_mut() {
            Some(line) => line.spans.push(span),
            None => self.lines.push(Line::from(span)),
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_span(Span::styled(
                code.to_string(),
                Style::default().fg(Color::White).bg(MUTED),
            )),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                self.lines.push(Line::styled("─".repeat(40), Style::default().fg(MUTED)));
                self.gap = true;
            }
            Event::TaskListMarker(done) => {
                self.push_span(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // the first paragraph of a list item continues the bullet line
                if self.lines.last().is_some_and(|l| l.spans.last().is_some_and(|s| is_marker(&s.content))) {
                    return;
                }
                self.start_block();
                self.new_line();
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                let style = heading_style(self.base_fg, level);
                self.new_line();
                self.push_span(Span::styled(format!("{} ", "#".repeat(level as usize)), style));
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.containers.push(Container::Quote);
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or("").to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let border = Style::default().fg(MUTED);
                let mut top = vec![Span::styled("╭──", border)];
                if !lang.is_empty() {
                    top.push(Span::styled(format!(" {lang} "), border.add_modifier(Modifier::BOLD)));
                }
                self.lines.push(Line::from(top));
                let highlighter = SYNTAX_SET
                    .find_syntax_by_token(&lang)
                    .filter(|_| !lang.is_empty())
                    .and_then(|syntax| {
                        THEME_SET
                            .themes
                            .get(CODE_THEME)
                            .map(|theme| HighlightLines::new(syntax, theme))
                    });
                self.code = Some(highlighter);
            }
            Tag::List(start) => {
                if self.containers.iter().all(|c| !matches!(c, Container::List(_))) {
                    self.start_block();
                }
                self.containers.push(Container::List(start));
            }
            Tag::Item => {
                self.new_line();
                let marker = match self.containers.last_mut() {
                    Some(Container::List(Some(n))) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.push_span(Span::styled(marker, Style::default().fg(MUTED)));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED));
            }
            Tag::Table(_) => self.start_block(),
            Tag::TableHead | Tag::TableRow => self.table_row = Some(Vec::new()),
            Tag::TableCell => {
                if let Some(row) = self.table_row.as_mut() {
                    row.push(String::new());
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.gap = true,
            TagEnd::Heading(_) => {
                self.inline.pop();
                self.gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.containers.pop();
                self.inline.pop();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.lines.push(Line::styled("╰──", Style::default().fg(MUTED)));
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.containers.pop();
                self.gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link => {
                self.inline.pop();
                if let Some(url) = self.link.take() {
                    self.push_span(Span::styled(format!(" ({url})"), Style::default().fg(MUTED)));
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                let header = matches!(tag, TagEnd::TableHead);
                if let Some(cells) = self.table_row.take() {
                    let mut style = Style::default().fg(self.base_fg);
                    if header {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    let mut line = Line::from(self.prefix());
                    for (i, cell) in cells.into_iter().enumerate() {
                        if i > 0 {
                            line.spans.push(Span::styled(" │ ", Style::default().fg(MUTED)));
                        }
                        line.spans.push(Span::styled(cell.trim().to_string(), style));
                    }
                    self.lines.push(line);
                }
            }
            TagEnd::Table => self.gap = true,
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        let text = raw.replace('\t', "    ");
        let Some(highlighter) = self.code.as_mut() else {
            let style = self.style();
            self.push_span(Span::styled(text, style));
            return;
        };

        let border = Span::styled("│ ", Style::default().fg(MUTED));
        let mut rendered = Vec::new();
        for line in LinesWithEndings::from(&text) {
            let mut spans = vec![border.clone()];
            match highlighter.as_mut().map(|h| h.highlight_line(line, &SYNTAX_SET)) {
                Some(Ok(ranges)) => {
                    for (style, fragment) in ranges {
                        let fragment = fragment.trim_end_matches('\n');
                        if fragment.is_empty() {
                            continue;
                        }
                        let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                        spans.push(Span::styled(fragment.to_string(), Style::default().fg(fg)));
                    }
                }
                _ => spans.push(Span::styled(
                    line.trim_end_matches('\n').to_string(),
                    Style::default().fg(Color::White),
                )),
            }
            rendered.push(Line::from(spans));
        }
        self.lines.extend(rendered);
    }
}

fn is_marker(content: &str) -> bool {
    content == "• " || (content.ends_with(". ") && content[..content.len() - 2].chars().all(|c| c.is_ascii_digit()))
}

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    let style = Style::default().fg(base_fg).add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => style.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => style,
        _ => style.add_modifier(Modifier::ITALIC),
    }
}
