//! Events feeding the main loop

use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use todo_core::{ApiError, HttpResponse, NoticeId, RequestId};
use tokio::sync::mpsc::UnboundedSender;

/// Everything that can wake the main loop
#[derive(Debug)]
pub enum AppEvent {
    /// Key press from the terminal
    Input(KeyEvent),
    /// Terminal was resized; redraw
    Resize,
    /// A request finished, successfully or not
    Settled {
        ticket: RequestId,
        outcome: Result<HttpResponse, ApiError>,
    },
    /// An auto-clearing error notice is due
    ExpireNotice(NoticeId),
}

/// Poll the terminal on a dedicated thread and forward key presses.
/// The thread exits once the receiving side is dropped.
pub fn spawn_input_thread(tx: UnboundedSender<AppEvent>, poll_interval: Duration) {
    thread::spawn(move || loop {
        if tx.is_closed() {
            break;
        }
        if !event::poll(poll_interval).unwrap_or(false) {
            continue;
        }
        let Ok(evt) = event::read() else {
            continue;
        };
        let forwarded = match evt {
            // Press only, not release
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => tx.send(AppEvent::Input(key)),
            CrosstermEvent::Resize(_, _) => tx.send(AppEvent::Resize),
            _ => Ok(()),
        };
        if forwarded.is_err() {
            break;
        }
    });
}
