use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use time::OffsetDateTime;

use super::push_row_hits;
use crate::app::{App, Mode};
use crate::graph::{PrActions, PrAvailability};
use crate::model::{Commit, FileStatus, Snapshot, short};
use crate::tui::keymap::HitMap;
use crate::tui::time_fmt::fmt_commit_time;

fn glyph(commit: &Commit) -> Span<'static> {
    if commit.is_working {
        Span::styled("@", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else if commit.conflicted {
        Span::styled("×", Style::default().fg(Color::Red))
    } else if commit.immutable {
        Span::styled("◆", Style::default().fg(Color::Blue))
    } else {
        Span::raw("○")
    }
}

fn pr_hint(availability: &PrAvailability) -> Option<Span<'static>> {
    match availability {
        PrAvailability::Update { branch, .. } => Some(Span::styled(
            format!(" ⇡{branch}"),
            Style::default().fg(Color::Green),
        )),
        PrAvailability::Create { bookmark, direct: false } => Some(Span::styled(
            format!(" +{bookmark}"),
            Style::default().fg(Color::DarkGray),
        )),
        _ => None,
    }
}

/// Merge and fork markers next to the node glyph.
fn rails(commit: &Commit, snapshot: &Snapshot) -> &'static str {
    let forks = snapshot.children_of(&commit.id).len() > 1;
    match (commit.is_merge(), forks) {
        (true, true) => "┼ ",
        (true, false) => "┤ ",
        (false, true) => "├ ",
        (false, false) => "  ",
    }
}

fn commit_line(
    commit: &Commit,
    snapshot: &Snapshot,
    actions: &PrActions,
    rebase_source: Option<&str>,
    now: OffsetDateTime,
) -> Line<'static> {
    let rails = rails(commit, snapshot);
    let mut spans = vec![
        glyph(commit),
        Span::styled(rails, Style::default().fg(Color::DarkGray)),
        Span::styled(
            commit.short_change_id().to_string(),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(commit.short_id().to_string(), Style::default().fg(Color::DarkGray)),
    ];
    if commit.divergent {
        spans.push(Span::styled(" ??", Style::default().fg(Color::Red)));
    }
    if rebase_source == Some(commit.change_id.as_str()) {
        spans.push(Span::styled(" [moving]", Style::default().fg(Color::Yellow)));
    }
    for bookmark in &commit.branches {
        spans.push(Span::styled(
            format!(" {bookmark}"),
            Style::default().fg(Color::Cyan),
        ));
    }
    if let Some(hint) = pr_hint(&actions.availability(commit)) {
        spans.push(hint);
    }
    let summary_style = if commit.summary.trim().is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    spans.push(Span::raw("  "));
    spans.push(Span::styled(commit.display_summary().to_string(), summary_style));
    spans.push(Span::styled(
        format!("  {} {}", commit.author, fmt_commit_time(&commit.timestamp, now)),
        Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
    ));
    Line::from(spans)
}

pub(super) fn draw(frame: &mut Frame, area: Rect, app: &App, hits: &mut HitMap) {
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let now = OffsetDateTime::now_utc();
    let actions = app.pr_actions();
    let rebase_source = match &app.mode {
        Mode::RebaseSelect(select) => Some(select.source_change_id.as_str()),
        _ => None,
    };
    let items: Vec<ListItem> = app
        .model
        .snapshot
        .commits()
        .iter()
        .map(|c| ListItem::new(commit_line(c, &app.model.snapshot, &actions, rebase_source, now)))
        .collect();

    let (title, highlight) = match &app.mode {
        Mode::RebaseSelect(select) => (
            format!("Rebase {} onto…", select.source_label),
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        _ => (
            format!("Commits ({})", app.model.snapshot.len()),
            Style::default().bg(Color::DarkGray),
        ),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(parts[0]);
    let mut state = ListState::default();
    state.select(app.model.selected);
    frame.render_stateful_widget(
        List::new(items).block(block).highlight_style(highlight),
        parts[0],
        &mut state,
    );
    push_row_hits(hits, inner, state.offset(), app.model.snapshot.len());

    draw_detail(frame, parts[1], app, &actions, now);
}

fn draw_detail(frame: &mut Frame, area: Rect, app: &App, actions: &PrActions, now: OffsetDateTime) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let Some(commit) = app.model.selected_commit() else {
        frame.render_widget(Paragraph::new("No commit selected").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::Gray);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("change  ", label),
            Span::styled(commit.change_id.clone(), Style::default().fg(Color::Magenta)),
        ]),
        Line::from(vec![Span::styled("commit  ", label), Span::raw(commit.id.clone())]),
        Line::from(vec![
            Span::styled("author  ", label),
            Span::raw(format!(
                "{} ({})",
                commit.author,
                fmt_commit_time(&commit.timestamp, now)
            )),
        ]),
    ];
    let parents: Vec<&str> = commit
        .parents
        .iter()
        // Parents outside the loaded revset only have a commit id to show.
        .map(|id| {
            app.model
                .snapshot
                .by_id(id)
                .map_or(short(id), |p| p.short_change_id())
        })
        .collect();
    if !parents.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("parents ", label),
            Span::styled(parents.join(" "), Style::default().fg(Color::Magenta)),
        ]));
    }
    if !commit.branches.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("marks   ", label),
            Span::styled(commit.branches.join(" "), Style::default().fg(Color::Cyan)),
        ]));
    }
    let mut flags = Vec::new();
    if commit.is_working {
        flags.push("working copy");
    }
    if commit.immutable {
        flags.push("immutable");
    }
    if commit.conflicted {
        flags.push("conflicted");
    }
    if commit.divergent {
        flags.push("divergent");
    }
    if !flags.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("flags   ", label),
            Span::styled(flags.join(", "), Style::default().fg(Color::Yellow)),
        ]));
    }
    let pr_line = match actions.availability(commit) {
        PrAvailability::Update { branch, direct: true } => format!("open PR on {branch} (U pushes)"),
        PrAvailability::Update { branch, direct: false } => {
            format!("open PR on {branch} (U moves it here and pushes)")
        }
        PrAvailability::Create { bookmark, direct: true } => format!("p opens a PR from {bookmark}"),
        PrAvailability::Create { bookmark, direct: false } => {
            format!("p moves {bookmark} here and opens a PR")
        }
        PrAvailability::Unavailable => "no bookmark to open a PR from".to_string(),
    };
    lines.push(Line::from(vec![Span::styled("PR      ", label), Span::raw(pr_line)]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        commit.display_summary().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Changed files ({})", app.model.changed_files.len()),
        label,
    )));
    for file in &app.model.changed_files {
        let color = match file.status {
            FileStatus::Added => Color::Green,
            FileStatus::Deleted => Color::Red,
            FileStatus::Modified => Color::Yellow,
            FileStatus::Renamed | FileStatus::Copied => Color::Cyan,
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", file.status.code()), Style::default().fg(color)),
            Span::raw(file.path.clone()),
        ]));
    }

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

#[cfg(test)]
#[path = "../../tests/tui/graph_render_tests.rs"]
mod tests;
