//! Log view: the recent observations of every source, newest first.

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::display_name;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Recent observations ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let rows = app.data.as_ref().map(|d| d.newest_first()).unwrap_or_default();
    if rows.is_empty() {
        let paragraph = Paragraph::new("No observations recorded yet")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec!["Time", "Source", "Status", "Listeners"])
        .style(app.theme.header)
        .height(1);

    let rows = rows.into_iter().skip(app.log_offset).map(|observation| {
        let status = observation.status();
        Row::new(vec![
            Cell::from(observation.timestamp_text()),
            Cell::from(display_name(&observation.source)),
            Cell::from(status.label()).style(app.theme.status_style(Some(status.online))),
            Cell::from(observation.listeners.to_string()),
        ])
    });

    let widths = [
        Constraint::Length(20),
        Constraint::Min(12),
        Constraint::Length(8),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
