use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::quote::QuoteKind;
use super::traits::QuoteProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage API provider for stock prices.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (settings `api_keys.alphavantage` or `ALPHAVANTAGE_API_KEY`).
/// - **Endpoint**: `GLOBAL_QUOTE`, one request per symbol.
///
/// Registered after Yahoo Finance as a fallback.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }

    /// `Ok(None)` when the API answered but had no quote (unknown symbol or
    /// rate limit note instead of data).
    async fn global_quote(&self, symbol: &str) -> Result<Option<f64>, CoreError> {
        let resp: GlobalQuoteResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", &symbol.to_uppercase()),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Alpha Vantage".into(),
                message: format!("Failed to parse quote for {symbol}: {e}"),
            })?;

        let Some(price_str) = resp.global_quote.and_then(|q| q.price) else {
            log::warn!("Alpha Vantage returned no quote for {symbol}; API limit may be exceeded");
            return Ok(None);
        };

        price_str.parse().map(Some).map_err(|e| CoreError::Api {
            provider: "Alpha Vantage".into(),
            message: format!("Invalid price format for {symbol}: {e}"),
        })
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "Alpha Vantage"
    }

    fn supported_kinds(&self) -> Vec<QuoteKind> {
        vec![QuoteKind::Stock]
    }

    async fn fetch_quotes(
        &self,
        symbols: &[String],
        _base: &str,
    ) -> Result<HashMap<String, f64>, CoreError> {
        let mut quotes = HashMap::new();
        for symbol in symbols {
            if let Some(price) = self.global_quote(symbol).await? {
                quotes.insert(symbol.clone(), price);
            }
        }
        Ok(quotes)
    }
}
