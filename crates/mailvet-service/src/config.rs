//! Service configuration.

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory when the `rocksdb-backend`
    /// feature is enabled (default: "/data/mailvet").
    pub data_dir: String,

    /// HS256 secret shared with the upstream auth gateway.
    pub auth_secret: String,

    /// Base URL of the key rotator's "available key" endpoint.
    pub rotator_base_url: String,

    /// Base URL of the Mailtester verification endpoint.
    pub provider_base_url: String,

    /// Timeout applied to each outbound call (rotator, provider), in
    /// seconds. Kept single-digit so a hung upstream cannot hold a
    /// reserved credit for long (default: 8).
    pub outbound_timeout_seconds: u64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/mailvet".into()),
            auth_secret: std::env::var("AUTH_SECRET")
                .unwrap_or_else(|_| "mailvet-dev-secret".into()),
            rotator_base_url: std::env::var("ROTATOR_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8090/keys/available".into()),
            provider_base_url: std::env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "https://happy.mailtester.ninja/ninja".into()),
            outbound_timeout_seconds: std::env::var("OUTBOUND_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024), // 64KB, payloads are a single email
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}
