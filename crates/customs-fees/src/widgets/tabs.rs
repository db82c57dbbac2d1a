use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Tabs},
    Frame,
};

use crate::form::Tab;
use crate::AppState;

pub struct TabsWidget;

impl TabsWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let titles: Vec<Line> = Tab::all()
            .iter()
            .map(|tab| Line::from(tab.title()))
            .collect();

        let tabs = Tabs::new(titles)
            .block(Block::bordered().title("Calculator"))
            .select(state.active_tab.index())
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );

        frame.render_widget(tabs, area);
    }
}
