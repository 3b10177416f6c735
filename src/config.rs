use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "VitalVault";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the extraction gateway server.
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Get the application data directory
/// ~/VitalVault/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("VitalVault")
}

/// Directory where uploaded document files are stored.
pub fn documents_dir() -> PathBuf {
    app_data_dir().join("documents")
}

/// Path of the SQLite database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("vitalvault.db")
}

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "vitalvault=info,tower_http=info"
}

/// Settings for the language-model completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible completion API.
    pub base_url: String,
    /// Bearer credential. `None` means analysis is unavailable and uploads
    /// proceed without it.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
        }
    }
}
