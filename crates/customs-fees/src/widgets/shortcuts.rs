use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::AppState;

pub struct ShortcutsWidget;

impl ShortcutsWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let key = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let text = Style::default().fg(Color::Gray);

        let spans = if state.editing.is_some() {
            vec![
                Span::styled("Type a number, ", text),
                Span::styled("Enter", key),
                Span::styled(" to accept, ", text),
                Span::styled("Esc", key),
                Span::styled(" to cancel", text),
            ]
        } else {
            vec![
                Span::styled("Press ", text),
                Span::styled("q", key),
                Span::styled(" to quit, ", text),
                Span::styled("Tab", key),
                Span::styled(" to switch, ", text),
                Span::styled("r", key),
                Span::styled(" to refresh the rate, ", text),
                Span::styled("?", key),
                Span::styled(" for help", text),
            ]
        };

        let shortcuts = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);

        frame.render_widget(shortcuts, area);
    }
}
