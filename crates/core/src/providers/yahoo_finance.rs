use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::quote::QuoteKind;
use super::traits::QuoteProvider;

/// Yahoo Finance API provider for stock prices.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices.
///
/// Uses the `yahoo_finance_api` crate. Prices are the latest daily close in
/// the stock's native currency (typically USD).
///
/// Yahoo does not distinguish "unknown symbol" from other failures, so a
/// symbol that fails on its own is reported as missing; the call only fails
/// when every symbol fails.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    async fn latest_close(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No quote data for {symbol}: {e}"),
        })?;

        Ok(quote.close)
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
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
        let mut last_error = None;

        for symbol in symbols {
            match self.latest_close(&symbol.to_uppercase()).await {
                Ok(close) => {
                    quotes.insert(symbol.clone(), close);
                }
                Err(e) => {
                    log::warn!("{e}");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if quotes.is_empty() => Err(e),
            _ => Ok(quotes),
        }
    }
}
