use thiserror::Error;

/// Unified error type for the entire spending-insights-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// The `Display` text of each variant is the human-readable message that ends
/// up in error envelopes, so a few variants carry exact wording that callers
/// match on (`"no data for selected category and period"`, `"empty input"`).
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input ───────────────────────────────────────────────────────
    #[error("{0} not found")]
    ColumnNotFound(String),

    #[error("Invalid date '{input}': expected format {expected}")]
    InvalidDate { input: String, expected: String },

    #[error("Failed to parse operation date: {0}")]
    DateParse(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    // ── Report logic ────────────────────────────────────────────────
    #[error("no data for selected category and period")]
    NoData,

    #[error("empty input")]
    EmptyInput,

    #[error("Amount overflow while summing {0}")]
    AmountOverflow(String),

    // ── Sources / File I/O ──────────────────────────────────────────
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Source is empty: {0}")]
    EmptySource(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No quote provider available for: {0}")]
    NoProvider(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Csv(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors often contain full URLs, and query strings carry API keys.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
