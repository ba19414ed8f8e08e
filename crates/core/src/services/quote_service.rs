use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::quote::{CurrencyRate, Quote, QuoteKind, StockPrice};
use crate::providers::registry::QuoteProviderRegistry;

/// Fetches currency rates and stock prices from the registered providers.
///
/// Providers for a kind are tried in registration order; the first one that
/// answers wins. Output keeps the requested order and always has one entry
/// per requested symbol: anything the provider had no value for is `"N/A"`.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one provider is available for a given quote kind.
    pub fn has_provider_for(&self, kind: &QuoteKind) -> bool {
        self.registry.get_provider_for(kind).is_some()
    }

    /// Names of all providers serving `kind`, in fallback order.
    pub fn get_provider_names(&self, kind: &QuoteKind) -> Vec<String> {
        self.registry
            .get_providers_for(kind)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Exchange rates for `codes` expressed in `base`, rounded to two decimals.
    pub async fn fetch_rates(
        &self,
        codes: &[String],
        base: &str,
    ) -> Result<Vec<CurrencyRate>, CoreError> {
        let quotes = self.fetch(QuoteKind::Currency, codes, base).await?;
        Ok(codes
            .iter()
            .map(|code| CurrencyRate {
                currency: code.clone(),
                rate: to_quote(quotes.get(code).copied(), Some(2)),
            })
            .collect())
    }

    /// Latest prices for `symbols`, unrounded.
    pub async fn fetch_stock_prices(
        &self,
        symbols: &[String],
    ) -> Result<Vec<StockPrice>, CoreError> {
        let quotes = self.fetch(QuoteKind::Stock, symbols, "").await?;
        Ok(symbols
            .iter()
            .map(|symbol| StockPrice {
                stock: symbol.clone(),
                price: to_quote(quotes.get(symbol).copied(), None),
            })
            .collect())
    }

    /// Ask each provider for `kind` in turn until one succeeds.
    async fn fetch(
        &self,
        kind: QuoteKind,
        symbols: &[String],
        base: &str,
    ) -> Result<HashMap<String, f64>, CoreError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let providers = self.registry.get_providers_for(&kind);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(kind.to_string()));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.fetch_quotes(symbols, base).await {
                Ok(quotes) => {
                    log::info!(
                        "{} returned {} of {} {kind} quotes",
                        provider.name(),
                        quotes.len(),
                        symbols.len()
                    );
                    return Ok(quotes);
                }
                Err(e) => {
                    log::warn!("{} failed for {kind} quotes: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(kind.to_string())))
    }
}

/// Convert a raw provider value. Non-finite or negative values are treated
/// as missing.
fn to_quote(raw: Option<f64>, decimals: Option<u32>) -> Quote {
    let Some(value) = raw.filter(|v| v.is_finite() && *v >= 0.0) else {
        return Quote::UNAVAILABLE;
    };
    match Decimal::try_from(value) {
        Ok(d) => Quote::Available(match decimals {
            Some(dp) => d.round_dp(dp),
            None => d,
        }),
        Err(e) => {
            log::warn!("Discarding quote {value}: {e}");
            Quote::UNAVAILABLE
        }
    }
}
