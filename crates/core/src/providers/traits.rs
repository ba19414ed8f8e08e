use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::quote::QuoteKind;

/// Trait abstraction for external quote sources.
///
/// Each API (Frankfurter, Yahoo Finance, Alpha Vantage) implements this
/// trait; if one stops working it is replaced without touching the report code.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which quote kinds this provider can serve.
    fn supported_kinds(&self) -> Vec<QuoteKind>;

    /// Fetch the latest quotes for `symbols`.
    ///
    /// For currencies the value is the price of one unit of the symbol in
    /// `base`; stocks ignore `base`. Symbols the source has no data for are
    /// absent from the map. Transport failures are errors.
    async fn fetch_quotes(
        &self,
        symbols: &[String],
        base: &str,
    ) -> Result<HashMap<String, f64>, CoreError>;
}
