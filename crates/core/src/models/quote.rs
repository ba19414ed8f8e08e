use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a quote is priced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteKind {
    /// Fiat exchange rate relative to a base currency
    Currency,
    /// Latest close of a listed stock
    Stock,
}

impl std::fmt::Display for QuoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteKind::Currency => write!(f, "Currency"),
            QuoteKind::Stock => write!(f, "Stock"),
        }
    }
}

/// Marker serialized as `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unavailable {
    #[serde(rename = "N/A")]
    NotAvailable,
}

/// A quote value, or an explicit marker that the source had none.
/// Symbols are never silently dropped from a quote listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quote {
    Available(Decimal),
    Unavailable(Unavailable),
}

impl Quote {
    pub const UNAVAILABLE: Quote = Quote::Unavailable(Unavailable::NotAvailable);

    pub fn value(&self) -> Option<Decimal> {
        match self {
            Quote::Available(value) => Some(*value),
            Quote::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Quote::Available(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub currency: String,
    pub rate: Quote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPrice {
    pub stock: String,
    pub price: Quote,
}
