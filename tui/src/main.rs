use std::panic;

use anyhow::Result;
use clap::Parser;
use todo_core::{Presenter, TodoClient, TodoStore};
use todo_tui::config::{init_logging, Cli};
use todo_tui::{ui, App, HttpTransport};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let transport = HttpTransport::new()?;
    let client = TodoClient::new(&cli.base_url, cli.user_id);
    info!(base_url = client.base_url(), user_id = client.user_id(), "starting");
    let store = TodoStore::new(client);
    let app = App::new(Presenter::new(store, cli.filter));

    // Leave raw mode before the panic message is printed
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = ui::restore_terminal();
        default_hook(info);
    }));

    let mut terminal = ui::init_terminal()?;
    let result = todo_tui::run(&mut terminal, app, transport).await;
    let restored = ui::restore_terminal();

    if let Err(e) = &result {
        error!(error = %e, "exited with error");
    }
    result?;
    restored
}
