use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-configurable settings, read from a JSON file next to the ledger.
///
/// Older settings files use `user_currencies` / `user_stocks`; both spellings load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Currency codes to quote on the home page (e.g., "USD", "EUR").
    #[serde(default, alias = "user_currencies")]
    pub currencies: Vec<String>,

    /// Stock symbols to quote on the home page (e.g., "AAPL", "TSLA").
    #[serde(default, alias = "user_stocks")]
    pub stocks: Vec<String>,

    /// Currency that exchange rates are expressed in.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currencies: Vec::new(),
            stocks: Vec::new(),
            base_currency: default_base_currency(),
            api_keys: HashMap::new(),
        }
    }
}
