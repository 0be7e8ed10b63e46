use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::keymap::{self, HitMap};
use crate::app::{Action, App, Mode, RepoStatus, View};

mod graph;
mod lists;
mod overlay;

pub(super) fn draw(frame: &mut Frame, app: &App, hits: &mut HitMap) {
    hits.clear();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app, hits);

    match &app.repo_status {
        RepoStatus::NotManaged { path } => overlay::draw_onboarding(frame, chunks[1], path, hits),
        RepoStatus::Loading if app.model.snapshot.is_empty() => {
            frame.render_widget(
                Paragraph::new("Loading repository…").style(Style::default().fg(Color::Gray)),
                chunks[1],
            );
        }
        _ => match app.view {
            View::Graph => graph::draw(frame, chunks[1], app, hits),
            View::PullRequests => lists::draw_pull_requests(frame, chunks[1], app, hits),
            View::Tickets => lists::draw_tickets(frame, chunks[1], app, hits),
        },
    }

    draw_status(frame, chunks[2], app);
    draw_hints(frame, chunks[3], app);

    if let Mode::Form(form) = &app.mode {
        overlay::draw_form(frame, form, hits);
    }
    if let Some(error) = &app.model.error {
        overlay::draw_error(frame, chunks[1], error, hits);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App, hits: &mut HitMap) {
    let mut spans = vec![
        Span::styled(" graft ", Style::default().fg(Color::Black).bg(Color::White)),
        Span::raw("  "),
    ];
    let mut x = area.x + 9;
    for view in View::ALL {
        let label = format!(" {} ", view.title());
        let width = label.chars().count() as u16;
        let style = if view == app.view {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Cyan)
        };
        hits.push(Rect::new(x, area.y, width, 1), Action::ShowView(view));
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
        x += width + 1;
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        app.repo_path().to_string(),
        Style::default().fg(Color::Gray),
    ));
    if let Some(op) = app.in_flight() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{}…", op.label()),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let style = if app.model.error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    };
    frame.render_widget(Paragraph::new(app.model.status.as_str()).style(style), area);
}

fn draw_hints(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for (key, help) in keymap::hints(keymap::scope_for(app)) {
        spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(
            format!(" {help}  "),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Registers one `Select(idx)` region per visible row of a list.
fn push_row_hits(hits: &mut HitMap, inner: Rect, offset: usize, len: usize) {
    for row in 0..inner.height {
        let idx = offset + row as usize;
        if idx >= len {
            break;
        }
        hits.push(Rect::new(inner.x, inner.y + row, inner.width, 1), Action::Select(idx));
    }
}
