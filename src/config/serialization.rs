//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;
use std::path::Path;

/// Render a TOML basic string
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn quote_path(path: &Path) -> String {
    quote(&path.display().to_string())
}

impl Config {
    /// Serialize config to TOML, the template written on first run
    pub fn to_toml(&self) -> String {
        format!(
            r#"# teamtacles configuration

# Base URL of the TeamTacles REST API (TEAMTACLES_API_URL overrides)
api_url = {api_url}

# Per-request timeout in seconds
request_timeout_secs = {timeout}

# Where the sign-in token is stored (TEAMTACLES_TOKEN_PATH overrides)
token_path = {token_path}

# List views
[collections]
page_size = {page_size}
member_page_size = {member_page_size}
# Quiet period before an interactive search is sent
search_debounce_ms = {debounce}
# Re-filter fetched teams by title and creation date on display
teams_local_filter = {teams_local_filter}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON log files (in addition to stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            api_url = quote(&self.api_url),
            timeout = self.request_timeout_secs,
            token_path = quote_path(&self.token_path),
            page_size = self.collections.page_size,
            member_page_size = self.collections.member_page_size,
            debounce = self.collections.search_debounce_ms,
            teams_local_filter = self.collections.teams_local_filter,
            log_level = quote(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quote_path(&self.logging.file_dir),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = quote(&self.logging.file_prefix),
        )
    }
}
