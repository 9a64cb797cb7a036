//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::display_name;

/// Render the header bar with the current state of every source.
///
/// Displays one `Name: Online - N listeners` label per source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" RADIOWATCH ", Style::default().add_modifier(Modifier::BOLD)),
    ];

    for name in &app.source_names {
        spans.push(Span::raw("│ "));

        let (label, online) = match app.latest(name) {
            Some(observation) => (
                format!(
                    "{}: {} - {} listeners",
                    display_name(name),
                    observation.status().label(),
                    observation.listeners
                ),
                Some(observation.online),
            ),
            None => (format!("{}: checking...", display_name(name)), None),
        };

        let style = app.theme.status_style(online);
        spans.push(Span::styled("● ", style));
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = [View::Chart, View::Log]
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let selected = match app.current_view {
        View::Chart => 0,
        View::Log => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the data source, time since last update, and available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit", err)
    } else if let Some(ref data) = app.data {
        let controls = match app.current_view {
            View::Chart => "Tab:switch e:export ?:help q:quit",
            View::Log => "↑↓:scroll Tab:switch e:export ?:help q:quit",
        };

        format!(
            " {} | Updated {:.1}s ago | {}",
            app.source_description(),
            data.taken_at.elapsed().as_secs_f64(),
            controls,
        )
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ Tab     Switch views"),
        Line::from("  1/2         Chart / Log"),
        Line::from("  ↑/↓ j/k     Scroll log"),
        Line::from("  PgUp/PgDn   Scroll 10 rows"),
        Line::from("  Home        Back to newest"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Reload data"),
        Line::from("  e         Export to JSON"),
        Line::from("  q Esc     Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay, responsive to terminal size
    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChartSnapshot, Observation, SourceSeries, StreamStatus};
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use ratatui::{backend::TestBackend, Terminal};

    fn header_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 1)).unwrap();
        terminal.draw(|frame| render_header(frame, app, frame.area())).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_header_labels() {
        let (tx, source) = ChannelSource::create("test");
        let mut app = App::with_theme(
            Box::new(source),
            vec!["tabajara".into(), "parahyba".into(), "extra".into()],
            Theme::dark(),
        );
        tx.send(ChartSnapshot::new(vec![
            SourceSeries::new(
                "tabajara",
                vec![Observation::now("tabajara", StreamStatus::online(42))],
            ),
            SourceSeries::new(
                "parahyba",
                vec![Observation::now("parahyba", StreamStatus::offline())],
            ),
        ]))
        .unwrap();
        app.reload_data().unwrap();

        let text = header_text(&app);
        assert!(text.contains("Tabajara: Online - 42 listeners"));
        assert!(text.contains("Parahyba: Offline - 0 listeners"));
        assert!(text.contains("Extra: checking..."));
    }
}
