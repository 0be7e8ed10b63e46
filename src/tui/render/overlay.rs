use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{Action, BookmarkAction, Form, Input, LoginStage, PrField};
use crate::tui::keymap::HitMap;

fn centered(area: Rect, max_w: u16, max_h: u16) -> Rect {
    let w = area.width.saturating_sub(6).clamp(20, max_w);
    let h = area.height.saturating_sub(4).clamp(6, max_h);
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

/// Lays out `[label]` buttons left to right on one row and registers their hits.
fn buttons(frame: &mut Frame, row: Rect, items: &[(&str, Action)], hits: &mut HitMap) {
    let mut x = row.x;
    let mut spans = Vec::new();
    for (label, action) in items {
        let text = format!("[ {label} ]");
        let width = text.chars().count() as u16;
        if x + width > row.x + row.width {
            break;
        }
        hits.push(Rect::new(x, row.y, width, 1), *action);
        spans.push(Span::styled(
            text,
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
        spans.push(Span::raw(" "));
        x += width + 1;
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), row);
}

pub(super) fn draw_onboarding(frame: &mut Frame, area: Rect, path: &str, hits: &mut HitMap) {
    let box_area = centered(area, 70, 9);
    frame.render_widget(Clear, box_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Not a jj repository");
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);
    let lines = vec![
        Line::from(Span::styled(path.to_string(), Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from("This directory is not managed by jj."),
        Line::from("Initialize a colocated repository here to get started."),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), parts[0]);
    buttons(
        frame,
        parts[1],
        &[("Initialize (i)", Action::InitRepo), ("Quit (q)", Action::Quit)],
        hits,
    );
}

pub(super) fn draw_error(frame: &mut Frame, area: Rect, error: &str, hits: &mut HitMap) {
    let box_area = centered(area, 80, 12);
    frame.render_widget(Clear, box_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title("Error");
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(error)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false }),
        parts[0],
    );
    buttons(
        frame,
        parts[1],
        &[
            ("Dismiss", Action::DismissError),
            ("Retry", Action::RetryError),
            ("Copy", Action::CopyError),
            ("Quit", Action::Quit),
        ],
        hits,
    );
}

/// Field box; the cursor is placed only for the focused, editable field.
fn field(frame: &mut Frame, area: Rect, label: &str, input: &Input, focused: bool, secret: bool) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text = if secret && !focused {
        mask(input.as_str())
    } else {
        input.as_str().to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(label.to_string());
    let inner = block.inner(area);
    let (line, col) = input.cursor_line_col();
    let scroll = line.saturating_sub(inner.height.saturating_sub(1) as usize) as u16;
    frame.render_widget(Paragraph::new(text).block(block).scroll((scroll, 0)), area);
    if focused {
        let x = inner.x + (col as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (line as u16).saturating_sub(scroll);
        frame.set_cursor_position((x, y));
    }
}

fn mask(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        "•".repeat(value.chars().count().min(24))
    }
}

pub(super) fn draw_form(frame: &mut Frame, form: &Form, hits: &mut HitMap) {
    let box_area = centered(frame.area(), 90, 24);
    frame.render_widget(Clear, box_area);
    let title = if form.is_submitting() {
        format!("{} (working…)", form.title())
    } else {
        form.title().to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);
    let body = parts[0];
    let editable = !form.is_submitting();

    match form {
        Form::Describe(f) => {
            let label = format!("Description for {}", f.change_id);
            field(frame, body, &label, &f.message, editable, false);
        }
        Form::Bookmark(f) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)])
                .split(body);
            field(frame, rows[0], "Bookmark name", &f.name, editable, false);
            let note = match f.action {
                BookmarkAction::Create => format!("Creates the bookmark at {}.", f.rev),
                BookmarkAction::Move => format!("Moves the bookmark to {}.", f.rev),
                BookmarkAction::Delete => "Deletes the bookmark locally.".to_string(),
            };
            frame.render_widget(
                Paragraph::new(note).style(Style::default().fg(Color::Gray)),
                rows[1],
            );
        }
        Form::CreatePr(f) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Length(3),
                    Constraint::Min(3),
                    Constraint::Length(3),
                ])
                .split(body);
            let head = if f.move_bookmark {
                format!("Moves {} to {} and pushes it", f.bookmark, f.rev)
            } else {
                format!("Pushes {}", f.bookmark)
            };
            frame.render_widget(
                Paragraph::new(head).style(Style::default().fg(Color::Cyan)),
                rows[0],
            );
            let focus = |which: PrField| editable && f.focus == which;
            field(frame, rows[1], "Title", &f.title, focus(PrField::Title), false);
            field(frame, rows[2], "Body", &f.body, focus(PrField::Body), false);
            field(frame, rows[3], "Base branch", &f.base, focus(PrField::Base), false);
        }
        Form::Settings(f) => {
            let visible = (body.height / 3).max(1) as usize;
            let start = f.focus.saturating_sub(visible.saturating_sub(1));
            let constraints: Vec<Constraint> =
                (0..visible).map(|_| Constraint::Length(3)).collect();
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(body);
            let shown = f.fields.iter().enumerate().skip(start).take(visible);
            for (slot, (idx, (key, input))) in shown.enumerate() {
                let focused = editable && idx == f.focus;
                field(frame, rows[slot], key.label(), input, focused, key.is_secret());
            }
        }
        Form::Login(f) => {
            let lines = match &f.stage {
                LoginStage::RequestingCode => vec![Line::from("Requesting a device code from GitHub…")],
                LoginStage::WaitingForUser(code) => vec![
                    Line::from("Open this page in a browser:"),
                    Line::from(Span::styled(
                        code.verification_uri.clone(),
                        Style::default().fg(Color::Cyan),
                    )),
                    Line::from(""),
                    Line::from("and enter the code:"),
                    Line::from(Span::styled(
                        code.user_code.clone(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from("Waiting for authorization…"),
                ],
                LoginStage::Saving => vec![Line::from("Saving token…")],
            };
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
        }
        Form::TicketTransition(f) => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(f.ticket.display_key.clone(), Style::default().fg(Color::Yellow)),
                    Span::raw(format!("  {}", f.ticket.summary)),
                ]),
                Line::from(Span::styled(
                    format!("Currently: {}", f.ticket.status),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(""),
            ];
            let header = lines.len() as u16;
            match &f.transitions {
                None => lines.push(Line::from("Loading transitions…")),
                Some(list) if list.is_empty() => lines.push(Line::from("No transitions available.")),
                Some(list) => {
                    for (idx, t) in list.iter().enumerate() {
                        let style = if idx == f.cursor {
                            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default()
                        };
                        lines.push(Line::from(Span::styled(format!("  {}", t.name), style)));
                        let y = body.y + header + idx as u16;
                        if y < body.y + body.height {
                            hits.push(Rect::new(body.x, y, body.width, 1), Action::Select(idx));
                        }
                    }
                }
            }
            frame.render_widget(Paragraph::new(lines), body);
        }
    }

    let mut actions = Vec::new();
    if editable && !matches!(form, Form::Login(_)) {
        actions.push(("Submit", Action::Submit));
    }
    actions.push(("Cancel", Action::Cancel));
    buttons(frame, parts[1], &actions, hits);
}
