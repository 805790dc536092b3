use crate::feeds::{Mention, MentionStatus};
use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn status_color(status: MentionStatus) -> Color {
    match status {
        MentionStatus::Pending => Color::Yellow,
        MentionStatus::Processing => Color::Blue,
        MentionStatus::Completed => Color::Green,
        MentionStatus::Failed => Color::Red,
    }
}

/// The lines of one list entry, with the mention text wrapped to `width`.
pub fn mention_lines(mention: &Mention, width: usize) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("ID: {}  ", mention.id), dim),
        Span::styled(
            format!("[{}]", mention.status),
            Style::default()
                .fg(status_color(mention.status))
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    for chunk in textwrap::wrap(&mention.text, width.max(10)) {
        lines.push(Line::from(Span::styled(
            chunk.into_owned(),
            Style::default().fg(Color::White),
        )));
    }

    lines.push(Line::from(Span::styled(
        format!(
            "Source: {} | Created: {}",
            mention.source.as_deref().unwrap_or("N/A"),
            mention
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        ),
        dim,
    )));

    if let Some(analysis) = mention.analysis() {
        lines.push(Line::from(vec![
            Span::styled("Analysis: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "{} | product {} | {}",
                analysis.sentiment,
                analysis.product,
                if analysis.needs_response {
                    "needs response"
                } else {
                    "no response needed"
                }
            )),
        ]));
        if let Some(response) = analysis.response.filter(|r| !r.is_empty()) {
            lines.push(Line::from(Span::styled(
                format!("  Suggested reply: {}", response),
                Style::default().fg(Color::Cyan),
            )));
        }
        if let Some(ticket) = analysis.support_ticket_description.filter(|t| !t.is_empty()) {
            lines.push(Line::from(Span::styled(
                format!("  Ticket: {}", ticket),
                Style::default().fg(Color::Magenta),
            )));
        }
    } else if mention.status == MentionStatus::Completed {
        if let Some(raw) = &mention.analysis_result {
            lines.push(Line::from(Span::styled(
                "Analysis:",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            let pretty = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
            for line in pretty.lines() {
                lines.push(Line::from(Span::styled(format!("  {}", line), dim)));
            }
        }
    }

    if let Some(error) = mention.failure() {
        lines.push(Line::from(Span::styled(
            format!("✗ Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    lines.push(Line::from(""));
    lines
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    mentions: &[Mention],
    state: &mut ListState,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    let block = Block::default()
        .title(format!(" Latest Mentions ({}) ", mentions.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if mentions.is_empty() {
        let empty_text = List::new(vec![ListItem::new("No mentions submitted yet.")]).block(block);
        frame.render_widget(empty_text, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = mentions
        .iter()
        .map(|mention| ListItem::new(mention_lines(mention, width)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_symbol("▌")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_stateful_widget(list, area, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::tests::buffer_text;
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn mention(id: &str, text: &str, status: MentionStatus) -> Mention {
        Mention {
            id: id.to_string(),
            text: text.to_string(),
            source: None,
            metadata: None,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            updated_at: None,
            analysis_result: None,
            error_message: None,
        }
    }

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_pending_mention_lines() {
        let lines = plain(&mention_lines(
            &mention("m-1", "hello there", MentionStatus::Pending),
            40,
        ));

        assert_eq!(lines[0], "ID: m-1  [pending]");
        assert_eq!(lines[1], "hello there");
        assert!(lines[2].starts_with("Source: N/A | Created: 2024-05-0"));
        assert_eq!(lines.last().unwrap(), "");
    }

    #[test]
    fn test_long_text_wraps() {
        let text = "word ".repeat(20);
        let lines = mention_lines(&mention("m-1", &text, MentionStatus::Pending), 20);
        // id line, wrapped text, source line, spacer
        assert!(lines.len() > 4);
    }

    #[test]
    fn test_completed_mention_shows_analysis() {
        let mut m = mention("m-2", "great app", MentionStatus::Completed);
        m.analysis_result = Some(json!({
            "product": "app",
            "sentiment": "positive",
            "needs_response": false,
            "response": null,
            "support_ticket_description": null
        }));

        let lines = plain(&mention_lines(&m, 40));

        assert!(lines
            .iter()
            .any(|l| l == "Analysis: positive | product app | no response needed"));
        assert!(!lines.iter().any(|l| l.contains("Suggested reply")));
    }

    #[test]
    fn test_completed_mention_with_unknown_payload_shows_json() {
        let mut m = mention("m-3", "hmm", MentionStatus::Completed);
        m.analysis_result = Some(json!({"score": 0.5}));

        let lines = plain(&mention_lines(&m, 40));

        assert!(lines.iter().any(|l| l == "Analysis:"));
        assert!(lines.iter().any(|l| l.contains("\"score\": 0.5")));
    }

    #[test]
    fn test_failed_mention_shows_error() {
        let mut m = mention("m-4", "broken", MentionStatus::Failed);
        m.error_message = Some("LLM timeout".to_string());

        let lines = plain(&mention_lines(&m, 40));

        assert!(lines.iter().any(|l| l == "✗ Error: LLM timeout"));
    }

    #[test]
    fn test_render_list_in_order() {
        let mut terminal = Terminal::new(TestBackend::new(60, 14)).unwrap();
        let mentions = vec![
            mention("second", "newest mention", MentionStatus::Pending),
            mention("first", "older mention", MentionStatus::Completed),
        ];
        let mut state = ListState::default();

        terminal
            .draw(|frame| render(frame, frame.area(), &mentions, &mut state, false))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        let newest = text.find("newest mention").unwrap();
        let older = text.find("older mention").unwrap();
        assert!(newest < older);
        assert!(text.contains("Latest Mentions (2)"));
    }

    #[test]
    fn test_render_empty_list() {
        let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();
        let mut state = ListState::default();

        terminal
            .draw(|frame| render(frame, frame.area(), &[], &mut state, true))
            .unwrap();

        assert!(buffer_text(terminal.backend().buffer()).contains("No mentions submitted yet."));
    }
}
