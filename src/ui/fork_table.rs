use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::app::App;
use crate::pagination::Phase;
use crate::projector::{self, COLUMNS};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if let Phase::Loading { target, .. } = app.pager.phase() {
        let frame_symbol = SPINNER[app.spinner_frame % SPINNER.len()];
        let loading = Paragraph::new(vec![
            Line::from(""),
            Line::from(format!(" Loading page {}... {}", target + 1, frame_symbol)),
        ])
        .style(Style::default().fg(Color::Yellow));
        frame.render_widget(loading, area);
        return;
    }

    let forks = app.pager.current_forks();
    let block = Block::default().borders(Borders::ALL);

    if forks.is_empty() {
        let empty = Paragraph::new("No forks on this page")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(COLUMNS.iter().map(|(title, _)| Cell::from(*title))).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = projector::project(forks)
        .into_iter()
        .map(|row| Row::new(row.cells))
        .collect();

    let widths = COLUMNS.iter().map(|(_, width)| Constraint::Length(*width));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default();
    state.select(Some(app.selected.min(forks.len() - 1)));

    frame.render_stateful_widget(table, area, &mut state);
}
