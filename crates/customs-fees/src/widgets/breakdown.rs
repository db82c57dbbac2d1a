use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::form::Tab;
use crate::format::{format_som, format_usd};
use crate::AppState;

pub struct BreakdownWidget;

impl BreakdownWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut text = Vec::new();
        let mut title = "Breakdown".to_string();

        match state.current_summary() {
            Some(Ok(summary)) => {
                title = summary.title().to_string();

                for item in summary.breakdown().items() {
                    let color = if item.amount() < 0.0 {
                        Color::Green
                    } else {
                        Color::White
                    };
                    text.push(Line::from(vec![
                        Span::styled(
                            format!("{:<40}", item.label()),
                            Style::default().fg(Color::Gray),
                        ),
                        Span::styled(
                            format!("{:>18}", format_som(item.amount())),
                            Style::default().fg(color),
                        ),
                    ]));
                }

                text.push(Line::from(" "));
                text.push(Line::from(vec![
                    Span::styled(
                        format!("{:<40}", "Total"),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{:>18}", format_som(summary.total())),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
                text.push(Line::from(vec![
                    Span::styled(
                        format!("{:<40}", "Total in USD"),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{:>18}", format_usd(summary.total_usd())),
                        Style::default().fg(Color::Green),
                    ),
                ]));

                if state.active_tab == Tab::Declaration {
                    let value = state.evaluator.goods_value_local(
                        state.forms.declaration.customs_value_usd(),
                        summary.exchange_rate().rate(),
                    );
                    text.push(Line::from(vec![
                        Span::styled(
                            format!("{:<40}", "Goods value"),
                            Style::default().fg(Color::Gray),
                        ),
                        Span::styled(
                            format!("{:>18}", format_som(value)),
                            Style::default().fg(Color::Cyan),
                        ),
                    ]));
                }
            }
            Some(Err(e)) => {
                text.push(Line::from(vec![
                    Span::styled("Error: ", Style::default().fg(Color::Red)),
                    Span::styled(e.to_string(), Style::default().fg(Color::Red)),
                ]));
            }
            None => {}
        }

        if let Some(last_update) = state.last_update {
            text.push(Line::from(" "));
            text.push(Line::from(vec![
                Span::styled("Rate checked: ", Style::default().fg(Color::White)),
                Span::styled(
                    last_update.format("%H:%M:%S UTC").to_string(),
                    Style::default().fg(Color::Cyan),
                ),
            ]));
        }

        if let Some(error) = state.rates.last_error() {
            text.push(Line::from(vec![
                Span::styled("Rate lookup: ", Style::default().fg(Color::Red)),
                Span::styled(
                    error.chars().take(50).collect::<String>()
                        + if error.len() > 50 { "..." } else { "" },
                    Style::default().fg(Color::Red),
                ),
            ]));
        }

        let breakdown = Paragraph::new(text)
            .block(Block::bordered().title(title))
            .alignment(Alignment::Left);

        frame.render_widget(breakdown, area);
    }
}
