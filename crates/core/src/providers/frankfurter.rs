use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::quote::QuoteKind;
use super::traits::QuoteProvider;

const BASE_URL: &str = "https://api.frankfurter.dev/v1";

/// Frankfurter API provider for fiat currency exchange rates.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) data.
/// - **Coverage**: ~30 currencies (EUR, USD, GBP, JPY, CNY, ...).
///
/// Frankfurter answers "how many `symbol` per one `base`"; the home page wants
/// the price of one `symbol` in `base`, so each rate is inverted.
pub struct FrankfurterProvider {
    client: Client,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl QuoteProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "Frankfurter"
    }

    fn supported_kinds(&self) -> Vec<QuoteKind> {
        vec![QuoteKind::Currency]
    }

    async fn fetch_quotes(
        &self,
        symbols: &[String],
        base: &str,
    ) -> Result<HashMap<String, f64>, CoreError> {
        let base = base.to_uppercase();
        let mut quotes = HashMap::new();

        let mut wanted: Vec<String> = Vec::new();
        for symbol in symbols {
            let code = symbol.to_uppercase();
            // Same currency → rate is 1.0
            if code == base {
                quotes.insert(symbol.clone(), 1.0);
            } else if !wanted.contains(&code) {
                wanted.push(code);
            }
        }
        if wanted.is_empty() {
            return Ok(quotes);
        }

        let url = format!("{BASE_URL}/latest?base={base}&symbols={}", wanted.join(","));
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("HTTP {status} for {base}/{}", wanted.join(",")),
            });
        }

        let resp: RatesResponse = response.json().await.map_err(|e| CoreError::Api {
            provider: "Frankfurter".into(),
            message: format!("Failed to parse rates for base {base}: {e}"),
        })?;

        for symbol in symbols {
            let code = symbol.to_uppercase();
            if let Some(per_base) = resp.rates.get(&code) {
                if *per_base > 0.0 {
                    quotes.insert(symbol.clone(), 1.0 / per_base);
                }
            }
        }
        Ok(quotes)
    }
}
