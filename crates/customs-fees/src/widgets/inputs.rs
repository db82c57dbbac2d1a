use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::format::{format_rate, format_som};
use crate::{AppState, EditTarget};

pub struct InputsWidget;

impl InputsWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut lines = Vec::new();

        if let Some(form) = state.forms.get(state.active_tab) {
            for (index, field) in form.fields().into_iter().enumerate() {
                let selected = index == state.selected_field;
                let value = match &state.editing {
                    Some((EditTarget::Field(edited), buffer)) if *edited == index => {
                        format!("{}_", buffer)
                    }
                    _ => field.value,
                };

                let marker = if selected { "> " } else { "  " };
                let value_style = if selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                lines.push(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{:<32}", field.label),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(value, value_style),
                ]));
            }
        }

        lines.push(Line::from(" "));
        lines.push(Self::setting_line(
            "BHM (b)",
            format_som(state.bhm),
            state,
            EditTarget::Bhm,
        ));
        let rate_value = match state.manual_rate {
            Some(rate) => format!("{} (manual)", format_rate(rate)),
            None => format!("{} (auto)", format_rate(state.exchange_rate().rate())),
        };
        lines.push(Self::setting_line(
            "USD rate (u)",
            rate_value,
            state,
            EditTarget::Rate,
        ));

        if let Some(message) = &state.status_message {
            lines.push(Line::from(" "));
            lines.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Magenta),
            )));
        }

        let inputs = Paragraph::new(lines)
            .block(Block::bordered().title("Inputs"))
            .alignment(Alignment::Left);

        frame.render_widget(inputs, area);
    }

    fn setting_line(
        label: &'static str,
        value: String,
        state: &AppState,
        target: EditTarget,
    ) -> Line<'static> {
        let (value, style) = match &state.editing {
            Some((edited, buffer)) if *edited == target => (
                format!("{}_", buffer),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            _ => (value, Style::default().fg(Color::Cyan)),
        };

        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<32}", label), Style::default().fg(Color::Gray)),
            Span::styled(value, style),
        ])
    }
}
