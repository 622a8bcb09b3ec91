use crate::search::ResultRecord;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

/// Snippets are clamped to this many wrapped lines
const SNIPPET_LINES: usize = 3;

/// Scrollable list of search results
pub struct ResultList {
    scroll_offset: u16,
    viewport_height: u16,
    content_height: u16,
}

impl ResultList {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0,
            viewport_height: 0,
            content_height: 0,
        }
    }

    /// Build the display lines for `results` at the given width
    pub fn build_lines(results: &[ResultRecord], width: u16) -> Vec<Line<'static>> {
        let content_width = (width.saturating_sub(4) as usize).max(10);
        let mut lines = Vec::new();

        for (index, record) in results.iter().enumerate() {
            if index > 0 {
                lines.push(Line::default());
            }

            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    truncate_to_width(record.display_url(), content_width),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));

            for title_line in wrap(record.title(), content_width) {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        title_line.to_string(),
                        Style::default()
                            .fg(Color::LightCyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
            }

            if !record.snippet().is_empty() {
                let wrapped = wrap(record.snippet(), content_width);
                let clamped = wrapped.len() > SNIPPET_LINES;
                for (i, snippet_line) in wrapped.into_iter().take(SNIPPET_LINES).enumerate() {
                    let mut text = snippet_line.to_string();
                    if clamped && i + 1 == SNIPPET_LINES {
                        text.push('…');
                    }
                    lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(text, Style::default().fg(Color::Gray)),
                    ]));
                }
            }
        }

        lines
    }

    /// Render the list
    pub fn render(&mut self, frame: &mut Frame, area: Rect, results: &[ResultRecord]) {
        self.viewport_height = area.height;

        let lines = Self::build_lines(results, area.width);
        self.content_height = lines.len().min(u16::MAX as usize) as u16;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());

        let paragraph = Paragraph::new(Text::from(lines)).scroll((self.scroll_offset, 0));
        frame.render_widget(paragraph, area);
    }

    fn max_scroll(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Scroll down by a number of lines
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(self.max_scroll());
    }

    /// Scroll up by a number of lines
    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll_offset
    }
}

impl Default for ResultList {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
