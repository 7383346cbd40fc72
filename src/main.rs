mod action;
mod app;
mod auth;
mod cache;
mod config;
mod error;
mod event;
mod github;
mod launcher;
mod pagination;
mod projector;
mod repo;
mod source;
mod startup;
#[cfg(test)]
mod test_utils;
mod tui;
mod types;
mod ui;

use std::fs::File;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::{App, Session};
use crate::config::Config;
use crate::error::ForkviewError;
use crate::github::GitHub;
use crate::launcher::SystemLauncher;
use crate::source::{ForkSource, RetryPolicy};
use crate::startup::Launch;
use crate::tui::EventHandler;
use crate::types::{RepoId, SortMode};

#[derive(Parser)]
#[command(name = "forkview", version, about = "Browse the forks of a GitHub repository")]
struct Cli {
    /// Repository as OWNER/REPO; defaults to the current directory's git remote
    repo: Option<String>,

    /// Initial sort: created, updated, pushed, name or stars
    #[arg(long, short)]
    sort: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::load();

    let repo = match cli.repo.as_deref() {
        Some(arg) => RepoId::parse(arg),
        None => repo::detect_current(),
    };
    let repo = repo.unwrap_or_else(|e| exit_with_error(e));

    let token = auth::load_token(&config.auth).unwrap_or_else(|e| exit_with_error(e));
    let github: Arc<dyn ForkSource> =
        Arc::new(GitHub::new(token).unwrap_or_else(|e| exit_with_error(e)));

    let session = match startup::prepare(github.as_ref(), &repo).await {
        Ok(Launch::NoForks) => {
            println!("No forks found for this repository. Exiting.");
            return Ok(());
        }
        Ok(Launch::Browse {
            head_ref,
            fork_count,
        }) => Session {
            repo,
            head_ref,
            fork_count,
        },
        Err(e) => exit_with_error(e),
    };

    let sort = match cli.sort.as_deref() {
        Some(s) => SortMode::parse_or_default(s),
        None => config.default_sort(),
    };

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(github, session, sort, &config).await;

    tui::restore()?;

    if let Some(msg) = result? {
        tracing::error!(error = %msg, "session aborted");
        println!("Error: {}", msg);
        std::process::exit(1);
    }

    Ok(())
}

/// Drive the TUI until the user quits. Returns the fatal error, if one ended the session.
async fn run(
    source: Arc<dyn ForkSource>,
    session: Session,
    sort: SortMode,
    config: &Config,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    // Fetch tasks report back on this channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let retry = RetryPolicy::from(&config.network);
    let mut app = App::new(
        source,
        Arc::new(SystemLauncher),
        session,
        sort,
        retry,
        action_tx.clone(),
    );
    app.start();

    let mut events = EventHandler::new(Duration::from_millis(config.ui.tick_rate_ms.max(16)));

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }
                let action = app.handle_event(event);
                if !matches!(action, Action::None) {
                    app.update(action);
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
            else => break,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(app.fatal.take())
}

/// Log to a file in the cache directory; the terminal belongs to the TUI.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_file = dirs::cache_dir()
        .map(|dir| dir.join("forkview"))
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
        .and_then(|dir| File::create(dir.join("forkview.log")).ok());

    let registry = tracing_subscriber::registry().with(filter);
    match log_file {
        Some(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
            .init(),
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::sink))
            .init(),
    }
}

fn exit_with_error(err: ForkviewError) -> ! {
    tracing::error!(error = %err, "startup failed");
    println!("Error: {}", err);
    std::process::exit(1);
}
