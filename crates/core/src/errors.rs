use thiserror::Error;

/// Unified error type for the entire crypto-assistant-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── State file ──────────────────────────────────────────────────
    #[error("Invalid state file: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported state file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: wrong password or corrupted file")]
    Decryption,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("{provider} API key not configured. Get a free key at: {signup_url}")]
    MissingApiKey {
        provider: String,
        signup_url: String,
    },

    // ── Upstream APIs ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Rate limit reached ({0})")]
    RateLimited(String),

    #[error("Unauthorized ({0}): check the API key")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("No explorer available for chain: {0}")]
    UnsupportedChain(String),

    #[error("Coin not found: {0}")]
    CoinNotFound(String),

    // ── Business logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(String),
}

impl CoreError {
    /// Shorthand for an [`CoreError::Api`] tagged with the provider name.
    pub fn api(provider: &str, message: impl Into<String>) -> Self {
        CoreError::Api {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// True when the upstream refused the call because of quota/rate limits.
    ///
    /// Status-code classification happens in the adapters; the substring
    /// fallback covers errors that only carry the upstream's text.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            CoreError::RateLimited(_) => true,
            CoreError::Api { message, .. } | CoreError::Network(message) => {
                let lower = message.to_lowercase();
                lower.contains("429") || lower.contains("rate limit") || lower.contains("quota")
            }
            _ => false,
        }
    }

    /// True when the upstream rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::Unauthorized(_) => true,
            CoreError::Api { message, .. } | CoreError::Network(message) => {
                let lower = message.to_lowercase();
                lower.contains("401") || lower.contains("unauthorized")
            }
            _ => false,
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Etherscan and CryptoPanic take their keys as query parameters,
        // so never let a full URL reach a log line or a client.
        CoreError::Network(redact_query(&e.to_string()))
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}

/// Strip everything after the first `?` of a message that may embed a URL.
pub fn redact_query(message: &str) -> String {
    match message.find('?') {
        Some(idx) => format!("{}?<query redacted>", &message[..idx]),
        None => message.to_string(),
    }
}
