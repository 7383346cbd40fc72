use std::process::Stdio;

use crate::error::{ForkviewError, Result};

/// Side effects triggered from the fork table: opening and copying URLs.
pub trait Launcher: Send + Sync {
    fn open_url(&self, url: &str) -> Result<()>;
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

/// Default browser and system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open_url(&self, url: &str) -> Result<()> {
        open_url(url)
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        copy_to_clipboard(text)
    }
}

/// Open `url` in the default browser.
///
/// Tries each platform launcher `open` knows about until one succeeds. The
/// launcher's output is discarded so it can't scribble over the TUI.
fn open_url(url: &str) -> Result<()> {
    let commands = open::commands(url);
    if commands.is_empty() {
        return Err(ForkviewError::Browser(format!(
            "unsupported OS: {}",
            std::env::consts::OS
        )));
    }

    let mut last_error = None;
    for mut cmd in commands {
        let program = cmd.get_program().to_string_lossy().into_owned();
        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => {
                tracing::debug!(%program, url, "opened browser");
                return Ok(());
            }
            Ok(status) => last_error = Some(format!("{} exited with {}", program, status)),
            Err(err) => last_error = Some(format!("{}: {}", program, err)),
        }
    }

    Err(ForkviewError::Browser(last_error.unwrap_or_else(|| {
        "no supported browser launcher found".to_string()
    })))
}

/// Put `text` on the system clipboard.
fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ForkviewError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| ForkviewError::Clipboard(e.to_string()))
}
