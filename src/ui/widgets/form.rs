use crate::error::SubmitError;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Input buffer for a new mention. The text survives a failed submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionForm {
    text: String,
    error: Option<String>,
    submitting: bool,
}

impl MentionForm {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn add_char(&mut self, c: char) {
        if self.submitting {
            return;
        }
        self.text.push(c);
        self.error = None;
    }

    pub fn delete_char(&mut self) {
        if self.submitting {
            return;
        }
        self.text.pop();
        self.error = None;
    }

    pub fn begin_submit(&mut self) {
        self.submitting = true;
        self.error = None;
    }

    pub fn succeed(&mut self) {
        self.submitting = false;
        self.text.clear();
    }

    pub fn fail(&mut self, err: &SubmitError) {
        self.submitting = false;
        self.error = Some(match err {
            SubmitError::Validation => err.to_string(),
            SubmitError::Api(_) => format!("Submit failed: {}", err),
        });
    }
}

pub fn render(frame: &mut Frame, area: Rect, form: &MentionForm, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    let block = Block::default()
        .title(" Submit New Mention ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let input = if form.text.is_empty() && !focused {
        Line::from(Span::styled(
            "Enter mention text here...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let cursor = if focused && !form.submitting { "▏" } else { "" };
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(form.text.clone()),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ])
    };

    let status = if form.submitting {
        Line::from(Span::styled(
            "Submitting...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else if let Some(error) = &form.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else if focused {
        Line::from(Span::styled(
            "Enter to submit | Esc to cancel",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(Span::styled(
            "Press i to write a mention",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let paragraph = Paragraph::new(vec![input, status])
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::ui::tests::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn typed(text: &str) -> MentionForm {
        let mut form = MentionForm::default();
        text.chars().for_each(|c| form.add_char(c));
        form
    }

    #[test]
    fn test_typing_clears_error() {
        let mut form = typed("hi");
        form.fail(&SubmitError::Validation);
        assert!(form.error().is_some());

        form.add_char('!');
        assert_eq!(form.error(), None);
        assert_eq!(form.text(), "hi!");

        form.delete_char();
        assert_eq!(form.text(), "hi");
    }

    #[test]
    fn test_failed_submit_keeps_text() {
        let mut form = typed("too long text");
        form.begin_submit();
        assert!(form.is_submitting());

        form.fail(&SubmitError::Api(ApiError::Rejected {
            status: 400,
            message: "too long".to_string(),
        }));

        assert!(!form.is_submitting());
        assert_eq!(form.text(), "too long text");
        assert_eq!(form.error(), Some("Submit failed: too long"));
    }

    #[test]
    fn test_validation_message_is_not_prefixed() {
        let mut form = MentionForm::default();
        form.fail(&SubmitError::Validation);
        assert_eq!(form.error(), Some("Mention text cannot be empty."));
    }

    #[test]
    fn test_successful_submit_clears_text() {
        let mut form = typed("hello");
        form.begin_submit();
        form.succeed();
        assert_eq!(form.text(), "");
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_input_ignored_while_submitting() {
        let mut form = typed("hello");
        form.begin_submit();
        form.add_char('x');
        form.delete_char();
        assert_eq!(form.text(), "hello");
    }

    #[test]
    fn test_render_states() {
        let mut terminal = Terminal::new(TestBackend::new(50, 4)).unwrap();

        let form = MentionForm::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &form, false))
            .unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("Enter mention text here..."));

        let mut form = typed("draft");
        form.begin_submit();
        terminal
            .draw(|frame| render(frame, frame.area(), &form, true))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("> draft"));
        assert!(text.contains("Submitting..."));
    }
}
