mod fork_table;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Status};

const HELP: &str = "[↑/k] Up  [↓/j] Down  [←/h] Prev Page  [→/l] Next Page  [s] Sort by Stars  [u] Sort by Updated  [Enter] Open Repo  [y] Copy URL  [q] Quit";

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_help(frame, chunks[1]);
    fork_table::render(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let page = app.pager.current_page();
    let mut title = format!(
        " GitHub Forks: {} (Page {}, Sort: {})  Total Forks: {}",
        app.session.repo,
        page + 1,
        app.pager.sort(),
        app.total_forks()
    );
    if !app.pager.is_loading() && app.pager.last_page() == Some(page) {
        title.push_str("  [last page]");
    }

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(Span::styled(
        format!(" {}", HELP),
        Style::default().fg(Color::Gray),
    )));
    frame.render_widget(help, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(Status::Error(msg)) => Line::from(Span::styled(
            format!(" {}", msg),
            Style::default().fg(Color::Red),
        )),
        Some(Status::Info(msg)) => Line::from(Span::styled(
            format!(" {}", msg),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(""),
    };

    frame.render_widget(Paragraph::new(line), area);
}
