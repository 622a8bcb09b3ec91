use crate::summary::SummaryState;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use textwrap::wrap;

/// Tallest the panel may grow, as a share of the feed area (percent)
const MAX_SHARE: u16 = 50;

/// Body lines for a summary, or `None` when the panel is hidden
pub fn body_lines(state: &SummaryState, width: usize) -> Option<Vec<String>> {
    let content = match state {
        SummaryState::Idle | SummaryState::Failed => return None,
        SummaryState::Loading => return Some(vec!["● ● ● Thinking...".to_string()]),
        SummaryState::Streaming(text) => format!("{text} ▌"),
        SummaryState::Complete(text) => text.clone(),
    };

    let width = width.max(10);
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(wrap(paragraph, width).into_iter().map(|cow| cow.to_string()));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    Some(lines)
}

/// Height the panel needs inside `area`, 0 when hidden
pub fn height(state: &SummaryState, area: Rect) -> u16 {
    let Some(lines) = body_lines(state, inner_width(area.width)) else {
        return 0;
    };
    let wanted = line_count(&lines).saturating_add(2);
    let cap = (u32::from(area.height) * u32::from(MAX_SHARE) / 100) as u16;
    let cap = cap.max(3);
    wanted.min(cap)
}

/// Draw the panel; keeps the newest text in view while streaming
pub fn render(frame: &mut Frame, area: Rect, state: &SummaryState) {
    let Some(lines) = body_lines(state, inner_width(area.width)) else {
        return;
    };

    let body_style = match state {
        SummaryState::Loading => Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::ITALIC),
        _ => Style::default().fg(Color::White),
    };

    let inner_height = area.height.saturating_sub(2);
    let overflow = line_count(&lines).saturating_sub(inner_height);

    let text = Text::from(
        lines
            .into_iter()
            .map(|l| Line::from(Span::styled(format!(" {l}"), body_style)))
            .collect::<Vec<_>>(),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::LightBlue))
        .title(Span::styled(
            " ✦ Perceive AI ",
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(Paragraph::new(text).block(block).scroll((overflow, 0)), area);
}

fn line_count(lines: &[String]) -> u16 {
    u16::try_from(lines.len()).unwrap_or(u16::MAX)
}

fn inner_width(width: u16) -> usize {
    width.saturating_sub(4) as usize
}
