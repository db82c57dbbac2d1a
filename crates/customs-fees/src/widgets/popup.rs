use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use crate::format::format_som;
use crate::AppState;

pub struct PopupWidget;

const KEYS: [(&str, &str); 11] = [
    ("Tab / Shift+Tab", "switch calculator"),
    ("Up / Down", "select a field"),
    ("Left / Right, - / +", "step a number, cycle a choice"),
    ("Space", "toggle a checkbox"),
    ("0-9 or Enter", "type a value, Enter to accept, Esc to cancel"),
    ("b", "edit the BHM"),
    ("u", "enter a USD rate, empty returns to the bank rate"),
    ("r", "fetch the central bank rate again"),
    ("s", "save the BHM as default"),
    ("?", "this help"),
    ("q", "quit"),
];

impl PopupWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let popup_area = Self::centered_rect(70, 80, area);

        frame.render_widget(Clear, popup_area);

        let popup = Paragraph::new(Self::create_help_text(state))
            .block(
                Block::bordered()
                    .title("Help")
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);

        frame.render_widget(popup, popup_area);
    }

    fn create_help_text(state: &AppState) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut text = vec![
            Line::from(Span::styled("Legal basis", heading)),
            Line::from(Span::styled(
                "Cabinet of Ministers Resolution No. 55 of 31.01.2025, in force from 01.05.2025.",
                Style::default().fg(Color::White),
            )),
            Line::from(Span::styled(
                format!(
                    "Fees are multiples of the base calculation unit (BHM), currently {}.",
                    format_som(state.bhm)
                ),
                Style::default().fg(Color::White),
            )),
            Line::from(Span::styled(
                "Results are estimates for planning; the customs authority's assessment prevails.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(" "),
            Line::from(Span::styled("Keys", heading)),
        ];

        for (keys, action) in KEYS {
            text.push(Line::from(vec![
                Span::styled(
                    format!("  {:<22}", keys),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(action, Style::default().fg(Color::White)),
            ]));
        }

        text.extend(vec![
            Line::from(" "),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Esc",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to close", Style::default().fg(Color::Gray)),
            ]),
        ]);

        text
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}
