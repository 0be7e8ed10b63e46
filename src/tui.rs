//! Terminal front end: draws the [`App`] and turns terminal events into
//! actions. All state changes go through [`App::update`].

use std::io::{self, IsTerminal};
use std::thread;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::{App, Effect, Msg};
use crate::dispatch::Dispatcher;

pub mod keymap;
mod render;
pub mod time_fmt;

use keymap::HitMap;

pub async fn run(mut app: App, mut dispatcher: Dispatcher) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("graft requires an interactive terminal (TTY)");
    }

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let res = run_loop(&mut terminal, &mut app, &mut dispatcher).await;

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .ok();
    terminal.show_cursor().ok();

    info!(pending = dispatcher.pending(), "exiting");
    res
}

/// Blocking terminal reads live on their own thread. It exits once the
/// receiver is gone.
fn spawn_input_thread() -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "terminal read failed");
                    break;
                }
            }
        }
    });
    rx
}

fn run_effects(dispatcher: &mut Dispatcher, effects: Vec<Effect>) {
    for effect in effects {
        dispatcher.dispatch(effect);
    }
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    dispatcher: &mut Dispatcher,
) -> Result<()> {
    let mut events = spawn_input_thread();
    let mut hits = HitMap::default();

    let effects = app.start();
    run_effects(dispatcher, effects);

    loop {
        terminal
            .draw(|f| render::draw(f, app, &mut hits))
            .context("draw")?;
        if app.quit {
            return Ok(());
        }

        let msgs: Vec<Msg> = tokio::select! {
            Some(ev) = events.recv() => {
                if let Event::Key(k) = &ev && k.kind != KeyEventKind::Press {
                    continue;
                }
                let scope = keymap::scope_for(app);
                keymap::translate(scope, &hits, &ev)
                    .into_iter()
                    .map(Msg::Action)
                    .collect()
            }
            Some(msg) = dispatcher.next() => vec![msg],
            else => {
                debug!("input closed and no work pending");
                return Ok(());
            }
        };

        for msg in msgs {
            let effects = app.update(msg);
            run_effects(dispatcher, effects);
        }
    }
}
