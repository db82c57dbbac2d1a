use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Gauge},
    Frame,
};

use crate::AppState;

/// Share of goods value taken by the declaration fee, plotted on a 0-5% scale.
const SHARE_GAUGE_FULL_PCT: f64 = 5.0;

pub struct ProgressBarsWidget;

impl ProgressBarsWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let share_gauge = match state.fee_share_of_value() {
            Some(share) => {
                let ratio = (share / SHARE_GAUGE_FULL_PCT).clamp(0.0, 1.0);
                Gauge::default()
                    .gauge_style(if share > 2.0 {
                        Style::default().fg(Color::Red)
                    } else if share > 0.5 {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::Green)
                    })
                    .ratio(ratio)
                    .label(format!("{:.3}% of goods value", share))
            }
            None => Gauge::default()
                .gauge_style(Style::default().fg(Color::DarkGray))
                .ratio(0.0)
                .label("declaration tab only"),
        };

        frame.render_widget(
            share_gauge.block(Block::bordered().title("Fee / Goods Value")),
            chunks[0],
        );

        let (ratio, label) = if state.manual_rate.is_some() {
            (1.0, "manual rate".to_string())
        } else if state.offline {
            (1.0, "offline".to_string())
        } else if state.is_loading {
            (0.0, "fetching...".to_string())
        } else {
            let remaining = state.rates.time_until_refresh(Utc::now());
            let ttl = state.rates.ttl().num_seconds().max(1) as f64;
            let ratio = (remaining.num_seconds() as f64 / ttl).clamp(0.0, 1.0);
            (
                ratio,
                format!(
                    "{}m {}s until refresh",
                    remaining.num_minutes(),
                    remaining.num_seconds() % 60
                ),
            )
        };

        let rate_gauge = Gauge::default()
            .block(Block::bordered().title("USD Rate Cache"))
            .gauge_style(Style::default().fg(Color::Blue))
            .ratio(ratio)
            .label(label);

        frame.render_widget(rate_gauge, chunks[1]);
    }
}
