use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::format::{format_rate, format_som};
use crate::AppState;

pub struct HeaderWidget;

impl HeaderWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let spinner = if state.is_loading {
            state.get_spinner_char().to_string()
        } else {
            " ".to_string()
        };

        let rate = state.exchange_rate();
        let rate_color = if rate.is_live() || state.manual_rate.is_some() {
            Color::Green
        } else {
            Color::Yellow
        };

        let header_text = vec![Line::from(vec![
            Span::styled(
                "Customs Fees (Resolution No. 55)",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  BHM ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_som(state.bhm),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  USD ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_rate(rate.rate()),
                Style::default().fg(rate_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({}, {})", state.rate_source(), rate.as_of_label()),
                Style::default().fg(Color::Gray),
            ),
            Span::raw(" "),
            Span::styled(spinner, Style::default().fg(Color::Yellow)),
        ])];

        let header = Paragraph::new(header_text)
            .block(Block::bordered().title("Status"))
            .alignment(Alignment::Center);

        frame.render_widget(header, area);
    }
}
