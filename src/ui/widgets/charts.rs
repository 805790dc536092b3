use crate::feeds::MentionStatus;
use ratatui::{
    layout::{Direction, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBar {
    pub label: String,
    pub value: u64,
    pub color: Color,
}

pub fn sentiment_color(sentiment: &str) -> Color {
    match sentiment.to_lowercase().as_str() {
        "positive" => Color::Green,
        "negative" => Color::Red,
        "neutral" => Color::Yellow,
        _ => Color::Gray,
    }
}

pub fn status_color(status: &str) -> Color {
    match status.to_lowercase().as_str() {
        "pending" => Color::Yellow,
        "processing" => Color::Cyan,
        "completed" => Color::Green,
        "failed" => Color::Red,
        _ => Color::Gray,
    }
}

fn percent(value: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (value as f64 * 100.0 / total as f64).round() as u64
}

/// One bar per sentiment label, labelled with its share of the total.
pub fn sentiment_bars(by_sentiment: &BTreeMap<String, u64>) -> Vec<ChartBar> {
    let total: u64 = by_sentiment.values().sum();
    by_sentiment
        .iter()
        .map(|(name, &value)| ChartBar {
            label: format!("{} ({}%)", name, percent(value, total)),
            value,
            color: sentiment_color(name),
        })
        .collect()
}

/// Known statuses in lifecycle order, then anything else the backend reports.
pub fn status_bars(by_status: &BTreeMap<String, u64>) -> Vec<ChartBar> {
    let known = MentionStatus::ALL
        .into_iter()
        .filter_map(|status| {
            by_status
                .get_key_value(status.as_str())
                .map(|(name, &value)| (name, value))
        });
    let extra = by_status
        .iter()
        .filter(|(name, _)| !MentionStatus::ALL.iter().any(|s| s.as_str() == name.as_str()))
        .map(|(name, &value)| (name, value));

    known
        .chain(extra)
        .map(|(name, value)| ChartBar {
            label: name.clone(),
            value,
            color: status_color(name),
        })
        .collect()
}

pub fn render_sentiment(frame: &mut Frame, area: Rect, by_sentiment: &BTreeMap<String, u64>) {
    render_bars(
        frame,
        area,
        "Sentiment Analysis",
        &sentiment_bars(by_sentiment),
        "No sentiment data available.",
    );
}

pub fn render_status(frame: &mut Frame, area: Rect, by_status: &BTreeMap<String, u64>) {
    render_bars(
        frame,
        area,
        "Mentions by Status",
        &status_bars(by_status),
        "No status data available.",
    );
}

fn render_bars(frame: &mut Frame, area: Rect, title: &str, bars: &[ChartBar], empty: &str) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    if bars.is_empty() {
        let empty_text = Paragraph::new(Line::from(Span::styled(
            empty.to_string(),
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(empty_text, area);
        return;
    }

    let data: Vec<Bar> = bars
        .iter()
        .map(|bar| {
            Bar::default()
                .value(bar.value)
                .label(Line::from(bar.label.clone()))
                .style(Style::default().fg(bar.color))
                .value_style(Style::default().fg(Color::Black).bg(bar.color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&data));

    frame.render_widget(chart, area);
}
