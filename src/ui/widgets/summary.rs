use crate::feeds::{MentionStatus, Summary};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub color: Color,
}

fn format_count(count: Option<u64>) -> String {
    count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn stat_cards(summary: &Summary) -> [StatCard; 4] {
    [
        StatCard {
            title: "Total Mentions",
            value: summary.total_mentions.to_string(),
            color: Color::Blue,
        },
        StatCard {
            title: "Completed",
            value: format_count(summary.status_count(MentionStatus::Completed)),
            color: Color::Green,
        },
        StatCard {
            title: "Pending",
            value: format_count(summary.status_count(MentionStatus::Pending)),
            color: Color::Yellow,
        },
        StatCard {
            title: "Failed",
            value: format_count(summary.status_count(MentionStatus::Failed)),
            color: Color::Red,
        },
    ]
}

pub fn render(frame: &mut Frame, area: Rect, summary: Option<&Summary>, has_error: bool) {
    let Some(summary) = summary else {
        if !has_error {
            let waiting = Paragraph::new(Span::styled(
                "Loading summary...",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(waiting, area);
        }
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (card, chunk) in stat_cards(summary).iter().zip(chunks.iter()) {
        let block = Block::default()
            .title(format!(" {} ", card.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));

        let value = Paragraph::new(Line::from(Span::styled(
            card.value.clone(),
            Style::default().fg(card.color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(block);

        frame.render_widget(value, *chunk);
    }
}
