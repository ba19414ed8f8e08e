use std::collections::HashMap;

use crate::models::quote::QuoteKind;

use super::alphavantage::AlphaVantageProvider;
use super::frankfurter::FrankfurterProvider;
use super::traits::QuoteProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all available quote providers.
///
/// Routes requests to providers by `QuoteKind`, in registration order.
pub struct QuoteProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();

        // Frankfurter — fiat rates, no API key needed
        registry.register(Box::new(FrankfurterProvider::new()));

        // Yahoo Finance — stocks, no API key needed (primary)
        match YahooFinanceProvider::new() {
            Ok(yahoo) => registry.register(Box::new(yahoo)),
            Err(e) => log::warn!("Yahoo Finance provider unavailable: {e}"),
        }

        // Alpha Vantage — stocks, requires API key (fallback)
        if let Some(key) = api_keys.get("alphavantage") {
            registry.register(Box::new(AlphaVantageProvider::new(key.clone())));
        }

        registry
    }

    /// Register a new quote provider.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// Find the first provider that supports the given quote kind.
    pub fn get_provider_for(&self, kind: &QuoteKind) -> Option<&dyn QuoteProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_kinds().contains(kind))
            .map(|p| p.as_ref())
    }

    /// Return ALL providers that support the given kind, ordered by registration priority.
    /// Used for fallback: if the first provider fails, try the next one.
    pub fn get_providers_for(&self, kind: &QuoteKind) -> Vec<&dyn QuoteProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_kinds().contains(kind))
            .map(|p| p.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
