// Configuration comes entirely from the environment (optionally seeded
// from a `.env` file by `main`). Nothing is validated up front: a missing
// API key only shows up when the first request is rejected.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Directory name under the per-user data directory.
pub const APP_NAME: &str = "Cleverbit OpenAI API Tools";

/// Vendor directory; only part of the path on Windows.
pub const VENDOR: &str = "Cleverbit";

const STORE_FILE: &str = "thread_ids.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// `OPENAI_API_KEY`; empty values count as absent.
    pub api_key: Option<String>,
    /// `OPENAI_BASE_URL`, without a trailing slash.
    pub base_url: String,
    /// `OAI_TOOLS_DATA_DIR`, overrides where the thread store lives.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = non_empty("OPENAI_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());

        Config {
            api_key: non_empty("OPENAI_API_KEY").map(|k| k.trim().to_string()),
            base_url,
            data_dir: non_empty("OAI_TOOLS_DATA_DIR").map(PathBuf::from),
        }
    }

    /// Location of the thread id record:
    /// - Linux: `~/.local/share/Cleverbit OpenAI API Tools/thread_ids.json`
    /// - macOS: `~/Library/Application Support/Cleverbit OpenAI API Tools/thread_ids.json`
    /// - Windows: `%LOCALAPPDATA%\Cleverbit\Cleverbit OpenAI API Tools\thread_ids.json`
    pub fn store_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => app_data_dir()?,
        };
        Ok(dir.join(STORE_FILE))
    }
}

/// Outcome of loading a `.env` file worth telling the user about. A
/// missing file is normal and yields `None`; anything else (bad syntax,
/// unreadable file) comes back as the error.
pub fn dotenv_problem<T>(result: dotenvy::Result<T>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => Some(e),
    }
}

#[cfg(windows)]
fn app_data_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir().context("Could not determine the user data directory")?;
    Ok(base.join(VENDOR).join(APP_NAME))
}

#[cfg(not(windows))]
fn app_data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine the user data directory")?;
    Ok(base.join(APP_NAME))
}
