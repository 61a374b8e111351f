//! Terminal front end for the todo list.
//!
//! The core crate decides what to send and how to react; this crate owns
//! the terminal, runs requests on the tokio runtime and feeds their outcomes
//! back in as [`AppEvent`]s.

pub mod app;
pub mod config;
pub mod event;
pub mod transport;
pub mod ui;

use std::time::Duration;

use anyhow::Result;
use todo_core::{Effects, Outbound};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

pub use app::{App, Pane, Screen};
pub use event::AppEvent;
pub use transport::HttpTransport;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Start the work described by `effects`. Each request runs as its own task
/// so completions arrive in whatever order the server answers.
pub fn dispatch(effects: Effects, transport: &HttpTransport, tx: &UnboundedSender<AppEvent>) {
    for Outbound { ticket, request } in effects.requests {
        let transport = transport.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = transport.execute(request).await;
            if let Err(e) = &outcome {
                warn!(?ticket, error = %e, "request failed");
            }
            // Receiver gone means the UI has exited.
            let _ = tx.send(AppEvent::Settled { ticket, outcome });
        });
    }

    if let Some((notice, delay)) = effects.expire_notice {
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppEvent::ExpireNotice(notice));
        });
    }
}

/// Apply one event to the app, returning whatever it asks for next.
pub fn apply(app: &mut App, event: AppEvent) -> Effects {
    match event {
        AppEvent::Input(key) => app.handle_key(key),
        AppEvent::Resize => Effects::default(),
        AppEvent::Settled { ticket, outcome } => {
            app.handle_settled(ticket, outcome);
            Effects::default()
        }
        AppEvent::ExpireNotice(notice) => {
            app.handle_expire(notice);
            Effects::default()
        }
    }
}

/// Main loop: load, then redraw after every event until the user quits.
pub async fn run(terminal: &mut ui::Terminal, mut app: App, transport: HttpTransport) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    event::spawn_input_thread(tx.clone(), INPUT_POLL_INTERVAL);

    dispatch(app.start(), &transport, &tx);
    terminal.draw(|frame| ui::draw(frame, &app.screen()))?;

    while let Some(event) = rx.recv().await {
        let effects = apply(&mut app, event);
        if app.should_quit() {
            info!("quit requested");
            break;
        }
        if !effects.is_empty() {
            debug!(requests = effects.requests.len(), "dispatching");
        }
        dispatch(effects, &transport, &tx);
        terminal.draw(|frame| ui::draw(frame, &app.screen()))?;
    }
    Ok(())
}
