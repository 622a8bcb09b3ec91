use crate::event::{Event, EventResult};
use crate::session::{SearchSession, ViewState};
use crate::summary::SummaryState;
use crate::tui::{summary_panel, InputWidget, ResultList};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main application state
pub struct App {
    session: SearchSession,
    /// Input widget for the query
    pub input: InputWidget,
    results: ResultList,
    should_quit: bool,
    spinner_frame: usize,
    /// Where the logo was last drawn; clicking it goes home
    header_area: Rect,
}

impl App {
    /// Create a new application instance
    pub fn new(session: SearchSession) -> Self {
        Self {
            session,
            input: InputWidget::new(),
            results: ResultList::new(),
            should_quit: false,
            spinner_frame: 0,
            header_area: Rect::default(),
        }
    }

    /// Check if the application should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Drain network events and keep the summary in step with the results
    pub fn update(&mut self) {
        self.session.poll_events();
        self.session.sync_summary();
    }

    /// Handle an event
    pub fn handle_event(&mut self, event: Event) -> EventResult<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Tick => {
                self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
                self.update();
                Ok(())
            }
            Event::Quit => {
                self.should_quit = true;
                Ok(())
            }
            Event::Resize(..) => Ok(()),
        }
    }

    /// Handle mouse events
    fn handle_mouse(&mut self, mouse: MouseEvent) -> EventResult<()> {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.results.scroll_up(3),
            MouseEventKind::ScrollDown => self.results.scroll_down(3),
            MouseEventKind::Down(MouseButton::Left) => {
                if self.header_area.contains(Position::new(mouse.column, mouse.row)) {
                    self.go_home();
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        match key.code {
            KeyCode::Enter => self.submit_query(),
            KeyCode::Esc => self.go_home(),
            KeyCode::Up => self.results.scroll_up(1),
            KeyCode::Down => self.results.scroll_down(1),
            KeyCode::PageUp => self.results.scroll_up(10),
            KeyCode::PageDown => self.results.scroll_down(10),
            KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.results.scroll_to_top()
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.results.scroll_to_bottom()
            }
            _ => self.input.handle_key(key),
        }
        Ok(())
    }

    /// Submit the input text as a new search
    fn submit_query(&mut self) {
        let text = self.input.text();
        if self.session.submit(&text) {
            self.results.scroll_to_top();
        }
    }

    fn go_home(&mut self) {
        self.session.go_home();
        self.input.clear();
        self.results.scroll_to_top();
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        match self.session.view() {
            ViewState::Home => self.render_home(frame),
            ViewState::Searching | ViewState::Results => self.render_results_view(frame),
        }
    }

    fn render_home(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Length(3), // Logo
                Constraint::Length(3), // Input
                Constraint::Min(0),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[1]);
        let loading = self.session.is_loading();
        self.input.render(frame, centered(chunks[2], 80), loading);
    }

    fn render_results_view(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Logo
                Constraint::Length(3), // Input
                Constraint::Min(3),    // Summary + results
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        let loading = self.session.is_loading();
        self.input.render(frame, chunks[1], loading);
        self.render_feed(frame, chunks[2]);
        self.render_status(frame, chunks[3]);
    }

    fn render_header(&mut self, frame: &mut Frame, area: Rect) {
        self.header_area = area;
        let logo = Paragraph::new(Line::from(Span::styled(
            "p e r c e i v e",
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE));
        frame.render_widget(logo, area);
    }

    /// Summary panel on top, result list below
    fn render_feed(&mut self, frame: &mut Frame, area: Rect) {
        if self.session.view() == ViewState::Searching {
            let waiting = Paragraph::new(Line::from(Span::styled(
                format!("{} Searching...", SPINNER[self.spinner_frame]),
                Style::default().fg(Color::LightBlue),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(waiting, area);
            return;
        }

        if self.session.shows_no_results() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No results found.",
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(empty, area);
            return;
        }

        let summary = self.session.summary_state();
        let summary_height = summary_panel::height(summary, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(summary_height),
                Constraint::Length(if summary_height > 0 { 1 } else { 0 }),
                Constraint::Min(1),
            ])
            .split(area);

        summary_panel::render(frame, chunks[0], summary);
        self.results.render(frame, chunks[2], self.session.results());
    }

    /// Render status bar
    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let status = if self.session.is_loading() {
            "Searching..."
        } else {
            "Ready"
        };
        let summary = match self.session.summary_state() {
            SummaryState::Idle => "-",
            SummaryState::Loading => "thinking",
            SummaryState::Streaming(_) => "streaming",
            SummaryState::Complete(_) => "done",
            SummaryState::Failed => "-",
        };

        let line = Line::from(vec![
            Span::styled(" Status: ", Style::default().fg(Color::Yellow)),
            Span::raw(status),
            Span::raw(" | "),
            Span::styled("Results: ", Style::default().fg(Color::Cyan)),
            Span::raw(self.session.results().len().to_string()),
            Span::raw(" | "),
            Span::styled("AI: ", Style::default().fg(Color::Cyan)),
            Span::raw(summary),
            Span::styled(
                "  ↑↓/PgUp/PgDn=scroll  Esc=home  Ctrl+C=quit",
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// A horizontally centered slice of `area`, `percent` wide
fn centered(area: Rect, percent: u16) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent) / 2),
            Constraint::Percentage(percent),
            Constraint::Percentage((100 - percent) / 2),
        ])
        .split(area);
    chunks[1]
}
