use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the EmmBook favorites API
    #[serde(default = "default_favorites_api_url")]
    pub favorites_api_url: String,

    /// Bearer token attached to favorites API requests
    pub favorites_api_token: String,

    /// Base URL of the Open Library catalog API
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Base URL of the cover image CDN
    #[serde(default = "default_covers_base_url")]
    pub covers_base_url: String,

    /// Recommendation cache TTL in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Per-request timeout for external calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_favorites_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_catalog_api_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_covers_base_url() -> String {
    "https://covers.openlibrary.org/b/id".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    120
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
