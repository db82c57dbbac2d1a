use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Paragraph, Row, Table},
    Frame,
};

use crate::format::{format_som, format_usd};
use crate::AppState;
use uz_customs_fees::schedule::group_thousands;
use uz_customs_fees::TariffRow;

pub struct TariffsWidget;

impl TariffsWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        match state.evaluator.tariff_rows(state.bhm) {
            Ok(rows) => frame.render_widget(
                Self::table(&rows, "Customs value (USD)", "Declaration fee by value"),
                columns[0],
            ),
            Err(e) => Self::render_error(frame, columns[0], "Declaration fee by value", e),
        }

        let usd_rate = state.exchange_rate().rate();
        match state.evaluator.tariff_curve(state.bhm, usd_rate) {
            Ok(points) => {
                let bars: Vec<Bar> = points
                    .iter()
                    .map(|point| {
                        Bar::default()
                            .label(Line::from(Self::short_usd(point.value_usd())))
                            .value((point.share_of_value_pct() * 1_000.0).round() as u64)
                            .text_value(format!("{:.2}%", point.share_of_value_pct()))
                    })
                    .collect();

                let chart = BarChart::default()
                    .block(Block::bordered().title(format!(
                        "Fee as % of goods value at {} so'm/USD",
                        group_thousands(usd_rate.round())
                    )))
                    .data(BarGroup::default().bars(&bars))
                    .bar_width(7)
                    .bar_gap(1)
                    .bar_style(Style::default().fg(Color::Cyan))
                    .value_style(
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    );
                frame.render_widget(chart, right[0]);
            }
            Err(e) => Self::render_error(frame, right[0], "Fee curve", e),
        }

        match state.evaluator.service_rows(state.bhm) {
            Ok(rows) => frame.render_widget(
                Self::table(&rows, "Service", "Other services"),
                right[1],
            ),
            Err(e) => Self::render_error(frame, right[1], "Other services", e),
        }
    }

    fn table<'a>(rows: &[TariffRow], first_column: &'a str, title: &'a str) -> Table<'a> {
        let body: Vec<Row> = rows
            .iter()
            .map(|row| {
                Row::new(vec![
                    row.range_label().to_string(),
                    format!("{}", row.multiplier()),
                    format_som(row.fee()),
                ])
            })
            .collect();

        Table::new(
            body,
            [
                Constraint::Fill(1),
                Constraint::Length(6),
                Constraint::Length(18),
            ],
        )
        .header(
            Row::new(vec![first_column, "BHM", "Fee"]).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .block(Block::bordered().title(title))
    }

    fn render_error(frame: &mut Frame, area: Rect, title: &str, error: impl ToString) {
        let text = Paragraph::new(error.to_string())
            .style(Style::default().fg(Color::Red))
            .block(Block::bordered().title(title.to_string()));
        frame.render_widget(text, area);
    }

    /// "$5k", "$1.5M" style labels that fit under a bar.
    fn short_usd(value: f64) -> String {
        if value >= 1_000_000.0 {
            format!("${}M", value / 1_000_000.0)
        } else if value >= 1_000.0 {
            format!("${}k", value / 1_000.0)
        } else {
            format_usd(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_usd_labels() {
        assert_eq!(TariffsWidget::short_usd(5_000.0), "$5k");
        assert_eq!(TariffsWidget::short_usd(1_500_000.0), "$1.5M");
        assert_eq!(TariffsWidget::short_usd(250.0), "$250.00");
    }
}
