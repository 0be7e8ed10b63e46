use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use super::push_row_hits;
use crate::app::App;
use crate::model::PrState;
use crate::tui::keymap::HitMap;

fn empty(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    frame.render_widget(
        Paragraph::new(message)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title(title.to_string())),
        area,
    );
}

pub(super) fn draw_pull_requests(frame: &mut Frame, area: Rect, app: &App, hits: &mut HitMap) {
    if !app.capabilities().hosting {
        empty(
            frame,
            area,
            "Pull requests",
            "GitHub is not configured. Press L to sign in or , to add a token.",
        );
        return;
    }
    let prs = &app.model.pull_requests;
    if prs.is_empty() {
        empty(frame, area, "Pull requests", "No pull requests.");
        return;
    }

    let items: Vec<ListItem> = prs
        .iter()
        .map(|pr| {
            let state_color = match pr.state {
                PrState::Open => Color::Green,
                PrState::Merged => Color::Magenta,
                PrState::Closed => Color::Red,
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<5}", pr.number), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{:<7}", pr.state.label()), Style::default().fg(state_color)),
                Span::raw(pr.title.clone()),
                Span::styled(
                    format!("  {} → {}", pr.head_branch, pr.base_branch),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Pull requests ({})", prs.len()));
    let inner = block.inner(area);
    let mut state = ListState::default();
    state.select(Some(app.pr_cursor.min(prs.len() - 1)));
    frame.render_stateful_widget(
        List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)),
        area,
        &mut state,
    );
    push_row_hits(hits, inner, state.offset(), prs.len());
}

pub(super) fn draw_tickets(frame: &mut Frame, area: Rect, app: &App, hits: &mut HitMap) {
    if !app.capabilities().tickets {
        empty(
            frame,
            area,
            "Tickets",
            "No ticket provider configured. Press , to pick one.",
        );
        return;
    }
    let tickets = &app.model.tickets;
    if tickets.is_empty() {
        empty(frame, area, "Tickets", "No tickets assigned to you.");
        return;
    }

    let key_width = tickets
        .iter()
        .map(|t| t.display_key.chars().count())
        .max()
        .unwrap_or(0);
    let items: Vec<ListItem> = tickets
        .iter()
        .map(|t| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<key_width$}  ", t.display_key),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(format!("[{}] ", t.status), Style::default().fg(Color::Cyan)),
                Span::raw(t.summary.clone()),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Tickets ({})", tickets.len()));
    let inner = block.inner(area);
    let mut state = ListState::default();
    state.select(Some(app.ticket_cursor.min(tickets.len() - 1)));
    frame.render_stateful_widget(
        List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)),
        area,
        &mut state,
    );
    push_row_hits(hits, inner, state.offset(), tickets.len());
}
