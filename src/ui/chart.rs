//! Chart view: listeners over time, one line per source.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::display_name;

/// Number of labels on the time axis.
const X_LABELS: usize = 3;
/// Number of labels on the listener axis.
const Y_LABELS: usize = 3;

/// Render the listener chart.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Listener history ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(data) = app.data.as_ref().filter(|d| !d.is_empty()) else {
        let paragraph = Paragraph::new("Waiting for the first observations...")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    // Points must outlive the datasets that borrow them.
    let points: Vec<(String, Vec<(f64, f64)>)> = data
        .series
        .iter()
        .map(|s| (display_name(&s.source), s.points()))
        .collect();

    let datasets: Vec<Dataset> = points
        .iter()
        .enumerate()
        .map(|(i, (name, points))| {
            Dataset::default()
                .name(name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(i)))
                .data(points)
        })
        .collect();

    let axis_style = Style::default().fg(app.theme.border);
    let x_axis = Axis::default()
        .title("Time")
        .style(axis_style)
        .bounds(data.x_bounds())
        .labels(data.x_labels(X_LABELS).into_iter().map(Span::from).collect::<Vec<_>>());
    let y_axis = Axis::default()
        .title("Listeners")
        .style(axis_style)
        .bounds(data.y_bounds())
        .labels(data.y_labels(Y_LABELS).into_iter().map(Span::from).collect::<Vec<_>>());

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((
            ratatui::layout::Constraint::Percentage(50),
            ratatui::layout::Constraint::Percentage(50),
        ));

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChartSnapshot, Observation, SourceSeries, StreamStatus};
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, app, frame.area())).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn app() -> (tokio::sync::watch::Sender<ChartSnapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        let app = App::with_theme(Box::new(source), vec!["tabajara".into()], Theme::dark());
        (tx, app)
    }

    #[test]
    fn test_placeholder_without_data() {
        let (_tx, app) = app();
        assert!(render_to_string(&app).contains("Waiting for the first observations"));
    }

    #[test]
    fn test_renders_series_legend() {
        let (tx, mut app) = app();
        let observations = vec![
            Observation::now("tabajara", StreamStatus::online(5)),
            Observation::now("tabajara", StreamStatus::online(12)),
        ];
        tx.send(ChartSnapshot::new(vec![SourceSeries::new("tabajara", observations)])).unwrap();
        app.reload_data().unwrap();

        let screen = render_to_string(&app);
        assert!(screen.contains("Listener history"));
        assert!(screen.contains("Tabajara"));
        assert!(screen.contains("17"));
    }
}
