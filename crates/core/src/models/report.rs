use chrono::{NaiveDateTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use super::quote::{CurrencyRate, StockPrice};
use super::transaction::Transaction;

/// Report identifiers, used for log lines and auto-generated output names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    SpendingByCategory,
    ExpensesByCategory,
    ExpensesByWeekday,
    TopTransactions,
    CardSummary,
    RecentTransactions,
    Search,
    HomePage,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::SpendingByCategory => "spending_by_category",
            ReportKind::ExpensesByCategory => "expenses_by_category",
            ReportKind::ExpensesByWeekday => "expenses_by_weekday",
            ReportKind::TopTransactions => "top_transactions",
            ReportKind::CardSummary => "card_summary",
            ReportKind::RecentTransactions => "recent_transactions",
            ReportKind::Search => "search",
            ReportKind::HomePage => "home_page",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Payloads ────────────────────────────────────────────────────────

/// Month-to-date spending in one category, with the rows that make it up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub amount: Decimal,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayTotal {
    pub weekday: String,
    pub amount: Decimal,
}

/// Spending per weekday, Monday first. Weekdays without rows are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayReport {
    pub results_count: usize,
    pub results: Vec<WeekdayTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub card: String,
    pub total_spent: Decimal,
    pub cashback: Decimal,
}

/// Ordering of card summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardOrder {
    /// Lexical by card identifier
    #[default]
    ByCard,
    /// Largest total first, ties by card identifier
    ByTotalDesc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub results_count: usize,
    pub results: Vec<Transaction>,
}

/// The composite "home" view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomePage {
    pub greeting: String,
    pub cards: Vec<CardSummary>,
    pub top_transactions: Vec<Transaction>,
    pub currency_rates: Vec<CurrencyRate>,
    pub stock_prices: Vec<StockPrice>,
}

/// Locale-invariant English weekday name.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── Envelope ────────────────────────────────────────────────────────

/// Outcome of a report operation. Reports never fail past their own
/// boundary; internal errors become `Error(message)`.
///
/// Two JSON renderings exist:
/// - status shape: `{"status":"success","data":…,"timestamp":…}` or
///   `{"status":"error","message":…,"timestamp":…}`
/// - bare shape: the payload itself, or `{"error":…}`
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEnvelope<T> {
    Success(T),
    Error(String),
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum StatusBody<'a, T> {
    Success {
        data: &'a T,
        timestamp: NaiveDateTime,
    },
    Error {
        message: &'a str,
        timestamp: NaiveDateTime,
    },
}

#[derive(Serialize)]
#[serde(untagged)]
enum BareBody<'a, T> {
    Data(&'a T),
    Error { error: &'a str },
}

impl<T> ReportEnvelope<T> {
    pub fn error(err: &CoreError) -> Self {
        ReportEnvelope::Error(err.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ReportEnvelope::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ReportEnvelope::Success(data) => Some(data),
            ReportEnvelope::Error(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ReportEnvelope::Success(_) => None,
            ReportEnvelope::Error(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            ReportEnvelope::Success(data) => Ok(data),
            ReportEnvelope::Error(message) => Err(message),
        }
    }
}

impl<T: Serialize> ReportEnvelope<T> {
    /// Status-shaped JSON value stamped with `timestamp`.
    pub fn to_status_value(&self, timestamp: NaiveDateTime) -> serde_json::Value {
        let body = match self {
            ReportEnvelope::Success(data) => StatusBody::Success { data, timestamp },
            ReportEnvelope::Error(message) => StatusBody::Error { message, timestamp },
        };
        serde_json::to_value(&body).unwrap_or_else(|e| {
            log::error!("Failed to serialize report payload: {e}");
            serde_json::json!({
                "status": "error",
                "message": format!("Serialization error: {e}"),
                "timestamp": timestamp,
            })
        })
    }

    pub fn to_bare_value(&self) -> serde_json::Value {
        let body = match self {
            ReportEnvelope::Success(data) => BareBody::Data(data),
            ReportEnvelope::Error(error) => BareBody::Error { error },
        };
        serde_json::to_value(&body).unwrap_or_else(|e| {
            log::error!("Failed to serialize report payload: {e}");
            serde_json::json!({ "error": format!("Serialization error: {e}") })
        })
    }

    /// Pretty-printed status JSON stamped with the current local time.
    pub fn render_status(&self) -> String {
        let now = chrono::Local::now().naive_local();
        format!("{:#}", self.to_status_value(now))
    }

    /// Compact bare JSON.
    pub fn render_bare(&self) -> String {
        self.to_bare_value().to_string()
    }
}

impl<T> From<Result<T, CoreError>> for ReportEnvelope<T> {
    fn from(result: Result<T, CoreError>) -> Self {
        match result {
            Ok(data) => ReportEnvelope::Success(data),
            Err(e) => ReportEnvelope::error(&e),
        }
    }
}
