pub mod widgets;

use crate::app::{App, Focus};
use crate::controller::DashboardState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListState, Paragraph, Wrap},
    Frame,
};
use widgets::form::MentionForm;

/// Everything the renderer needs besides the list scroll position.
pub struct DashboardView<'a> {
    pub state: &'a DashboardState,
    pub form: &'a MentionForm,
    pub focus: Focus,
    pub status: Option<&'a str>,
    pub polling: bool,
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let view = DashboardView {
        state: app.controller.state(),
        form: &app.form,
        focus: app.focus,
        status: app.status.as_deref(),
        polling: app.controller.is_running(),
    };
    render(frame, &view, &mut app.list_state);
}

pub fn render(frame: &mut Frame, view: &DashboardView, list_state: &mut ListState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, outer[0], view.polling);
    render_footer(frame, outer[2], view);

    if view.state.is_loading() {
        render_loading(frame, outer[1]);
        return;
    }

    let banner = view.state.error().map(|_| 3).unwrap_or(0);
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner),
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(4),
            Constraint::Min(5),
        ])
        .split(outer[1]);

    if let Some(error) = view.state.error() {
        render_error_banner(frame, body[0], error);
    }

    let summary = view.state.summary();
    widgets::summary::render(frame, body[1], summary, view.state.error().is_some());

    if let Some(summary) = summary {
        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body[2]);
        widgets::charts::render_sentiment(frame, charts[0], &summary.by_sentiment);
        widgets::charts::render_status(frame, charts[1], &summary.by_status);
    }

    widgets::form::render(frame, body[3], view.form, view.focus == Focus::Form);
    widgets::mentions::render(
        frame,
        body[4],
        view.state.mentions(),
        list_state,
        view.focus == Focus::List,
    );
}

fn render_header(frame: &mut Frame, area: Rect, polling: bool) {
    let indicator = if polling {
        Span::styled(" ● live", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ○ paused", Style::default().fg(Color::DarkGray))
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Mention Analysis Dashboard",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        indicator,
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let hints = match view.focus {
        Focus::List => "q quit | Tab/i write | j/k scroll | r refresh | Enter reload mention",
        Focus::Form => "Enter submit | Esc back to list",
    };
    let mut spans = vec![Span::styled(hints, Style::default().fg(Color::DarkGray))];
    if let Some(status) = view.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status, Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
    let loading = Paragraph::new(Span::styled(
        "⟳ Loading initial data...",
        Style::default().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(loading, rows[1]);
}

fn render_error_banner(frame: &mut Frame, area: Rect, error: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(
            "Error: ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(error, Style::default().fg(Color::Red)),
    ]))
    .wrap(Wrap { trim: true })
    .block(block);
    frame.render_widget(banner, area);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::feeds::{Mention, MentionStatus, Summary};
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::collections::BTreeMap;

    pub(crate) fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn mention(id: &str, text: &str, status: MentionStatus) -> Mention {
        Mention {
            id: id.to_string(),
            text: text.to_string(),
            source: Some("twitter".to_string()),
            metadata: None,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            updated_at: None,
            analysis_result: None,
            error_message: None,
        }
    }

    fn scenario() -> (Vec<Mention>, Summary) {
        let mentions = vec![
            mention("m-2", "Checkout page is slow", MentionStatus::Pending),
            mention("m-1", "Love the new app update", MentionStatus::Completed),
        ];
        let summary = Summary {
            total_mentions: 3,
            by_status: BTreeMap::from([("completed".to_string(), 2), ("pending".to_string(), 1)]),
            by_sentiment: BTreeMap::from([("positive".to_string(), 2), ("neutral".to_string(), 1)]),
        };
        (mentions, summary)
    }

    fn draw_state(state: &DashboardState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let form = MentionForm::default();
        let view = DashboardView {
            state,
            form: &form,
            focus: Focus::List,
            status: None,
            polling: true,
        };
        let mut list_state = ListState::default();
        terminal
            .draw(|frame| render(frame, &view, &mut list_state))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_loading_screen_hides_dashboard() {
        let text = draw_state(&DashboardState::default());

        assert!(text.contains("Loading initial data..."));
        assert!(!text.contains("Latest Mentions"));
        assert!(!text.contains("Submit New Mention"));
    }

    #[test]
    fn test_loaded_dashboard_scenario() {
        let (mentions, summary) = scenario();
        let text = draw_state(&DashboardState::with_data(mentions, Some(summary), None));

        assert!(text.contains("Total Mentions"));
        assert!(text.contains("N/A"));
        assert!(text.contains("Sentiment Analysis"));
        assert!(text.contains("Mentions by Status"));
        assert!(text.contains("Latest Mentions (2)"));
        assert!(!text.contains("Error:"));
        let first = text.find("Checkout page is slow").unwrap();
        let second = text.find("Love the new app update").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_error_banner_keeps_stale_data_visible() {
        let (mentions, summary) = scenario();
        let state = DashboardState::with_data(
            mentions,
            Some(summary),
            Some("Failed to load data: HTTP error fetching summary, status 503. Is the backend running?"),
        );

        let text = draw_state(&state);

        assert!(text.contains("Error: Failed to load data"));
        assert!(text.contains("Checkout page is slow"));
        assert!(text.contains("Total Mentions"));
    }
}
