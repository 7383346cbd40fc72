use std::path::PathBuf;

use crate::config::{config_dir, AuthConfig};
use crate::error::{ForkviewError, Result};

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        non_empty(&String::from_utf8_lossy(&output.stdout))
    } else {
        None
    }
}

/// ~/.config/forkview/token
fn token_path() -> Option<PathBuf> {
    Some(config_dir()?.join("token"))
}

fn load_stored_token() -> Option<String> {
    let path = token_path()?;
    let token = std::fs::read_to_string(path).ok()?;
    non_empty(&token)
}

fn non_empty(raw: &str) -> Option<String> {
    let token = raw.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Find a GitHub token, trying in order:
/// 1. the configured env var
/// 2. ~/.config/forkview/token
/// 3. the configured CLI command (`gh auth token` by default)
pub fn load_token(config: &AuthConfig) -> Result<String> {
    if let Some(env_var) = &config.token_env {
        if let Some(token) = std::env::var(env_var).ok().and_then(|t| non_empty(&t)) {
            tracing::debug!(env_var, "using token from environment");
            return Ok(token);
        }
    }

    if let Some(token) = load_stored_token() {
        tracing::debug!("using stored token");
        return Ok(token);
    }

    if let Some(cmd) = &config.token_command {
        if let Some(token) = try_cli_token(cmd) {
            tracing::debug!(command = %cmd, "using token from command");
            return Ok(token);
        }
    }

    Err(ForkviewError::Auth(format!(
        "no GitHub token found. Set {} or log in with `gh auth login`.",
        config.token_env.as_deref().unwrap_or("GITHUB_TOKEN")
    )))
}
