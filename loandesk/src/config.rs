//! Configuration loading for loandesk.
//!
//! Read once at startup from `$XDG_CONFIG_HOME/loandesk/config.toml`
//! (`~/.config/loandesk/config.toml` when the env var is absent). All
//! fields are optional in the file; anything missing takes its default.
//! Config errors are soft failures printed to stderr before the terminal
//! is initialised — the console always starts.

use serde::Deserialize;

/// Typed view of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the platform API.
    pub api_url: String,
    /// Bearer token for the admin API. Overridden by `LOANDESK_API_TOKEN`
    /// when set, so the token can stay out of the config file.
    pub api_token: String,
    /// Operator name recorded on the local console session. Defaults to
    /// `$USER`.
    pub operator: String,
    /// Theme name resolved by `Theme::from_name`.
    pub theme: String,
    /// Rows per page for both list views.
    pub page_size: u32,
    /// Notification poll period in seconds.
    pub poll_secs: u64,
    /// Quiet window of the list-fetch debounce, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_owned(),
            api_token: String::new(),
            operator: std::env::var("USER").unwrap_or_else(|_| "operator".to_owned()),
            theme: "catppuccin-mocha".to_owned(),
            page_size: 20,
            poll_secs: 60,
            debounce_ms: 300,
        }
    }
}

/// Returns the path to the loandesk config file.
///
/// Prefers `$XDG_CONFIG_HOME/loandesk/config.toml`; falls back to
/// `~/.config/loandesk/config.toml` when the env var is absent.
pub fn config_path() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(std::path::PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| std::path::PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| std::path::PathBuf::from(".config"));
    base.join("loandesk").join("config.toml")
}

/// Loads the config, applying defaults and the env-var token override.
///
/// Never panics — a missing file yields the defaults, a malformed file is
/// reported to stderr and also yields the defaults.
pub fn load() -> Config {
    let path = config_path();
    let mut config = match std::fs::read_to_string(&path) {
        Ok(raw) => match toml::from_str::<Config>(&raw) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("loandesk: config parse error in {:?}: {}", path, e);
                Config::default()
            }
        },
        Err(_) => Config::default(),
    };

    if let Ok(token) = std::env::var("LOANDESK_API_TOKEN") {
        config.api_token = token;
    }
    // Degenerate values would wedge the pager and the poller.
    config.page_size = config.page_size.max(1);
    config.poll_secs = config.poll_secs.max(5);
    config
}
