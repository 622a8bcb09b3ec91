use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tui_textarea::TextArea;

const PLACEHOLDER: &str = "What do you seek?";

/// Single-line query box wrapped around tui-textarea
pub struct InputWidget {
    textarea: TextArea<'static>,
}

impl InputWidget {
    /// Create a new input widget
    pub fn new() -> Self {
        Self {
            textarea: fresh_textarea(),
        }
    }

    /// Handle keyboard input (Enter is handled by the app, never reaches here)
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.textarea.input(key);
    }

    /// Current query text
    pub fn text(&self) -> String {
        self.textarea.lines().join(" ")
    }

    pub fn clear(&mut self) {
        self.textarea = fresh_textarea();
    }

    /// Replace the contents, cursor at the end
    pub fn set_text(&mut self, text: &str) {
        self.textarea = fresh_textarea();
        self.textarea.insert_str(text);
    }

    /// Render the input widget
    pub fn render(&mut self, frame: &mut Frame, area: Rect, loading: bool) {
        let title = if loading {
            " 🔍 Searching… "
        } else {
            " 🔍 Search (Enter=search │ Esc=home) "
        };
        self.textarea.set_block(input_block(title));
        frame.render_widget(&self.textarea, area);
    }
}

impl Default for InputWidget {
    fn default() -> Self {
        Self::new()
    }
}

fn fresh_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_block(input_block(" 🔍 Search "));
    textarea.set_placeholder_text(PLACEHOLDER);
    textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
    textarea.set_cursor_line_style(Style::default());
    textarea
}

fn input_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(Color::DarkGray))
}
