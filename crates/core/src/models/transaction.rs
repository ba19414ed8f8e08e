use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::CoreError;
use super::window::DateWindow;

/// Card label used when a source row carries no card number.
pub const UNKNOWN_CARD: &str = "unknown";

/// A single ledger row after normalization.
///
/// Only `operation_date` is guaranteed; every other field is whatever the
/// source provided. Reports pick their own defaults for missing values
/// (see `amount_or_zero`, `card_or_unknown`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// When the operation happened (day-first bank exports carry seconds)
    pub operation_date: NaiveDateTime,

    /// When the payment settled, if the source has that column
    #[serde(default)]
    pub payment_date: Option<NaiveDateTime>,

    #[serde(default)]
    pub amount: Option<Decimal>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub card_id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub cashback: Option<Decimal>,
}

impl Transaction {
    pub fn new(operation_date: NaiveDateTime, amount: Decimal) -> Self {
        Self {
            operation_date,
            payment_date: None,
            amount: Some(amount),
            category: None,
            card_id: None,
            description: None,
            cashback: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_card(mut self, card_id: impl Into<String>) -> Self {
        self.card_id = Some(card_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_cashback(mut self, cashback: Decimal) -> Self {
        self.cashback = Some(cashback);
        self
    }

    pub fn with_payment_date(mut self, payment_date: NaiveDateTime) -> Self {
        self.payment_date = Some(payment_date);
        self
    }

    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    pub fn cashback_or_zero(&self) -> Decimal {
        self.cashback.unwrap_or(Decimal::ZERO)
    }

    pub fn card_or_unknown(&self) -> &str {
        self.card_id.as_deref().unwrap_or(UNKNOWN_CARD)
    }

    /// Case-insensitive substring match against the text form of every field.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        let mut fields = vec![
            self.operation_date.to_string(),
            self.operation_date.format("%d.%m.%Y %H:%M:%S").to_string(),
        ];
        if let Some(payment_date) = self.payment_date {
            fields.push(payment_date.format("%d.%m.%Y").to_string());
        }
        if let Some(amount) = self.amount {
            fields.push(amount.to_string());
        }
        if let Some(cashback) = self.cashback {
            fields.push(cashback.to_string());
        }
        fields.extend(self.category.iter().cloned());
        fields.extend(self.card_id.iter().cloned());
        fields.extend(self.description.iter().cloned());

        fields.iter().any(|f| f.to_lowercase().contains(needle))
    }
}

/// Logical ledger columns, independent of how a source spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    OperationDate,
    PaymentDate,
    Amount,
    Category,
    Card,
    Description,
    Cashback,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::OperationDate,
        Column::PaymentDate,
        Column::Amount,
        Column::Category,
        Column::Card,
        Column::Description,
        Column::Cashback,
    ];
}

/// The two header conventions a ledger source may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schema {
    /// `date`, `amount`, `category`, ...
    #[default]
    English,
    /// Bank export headers: `Дата операции`, `Сумма платежа`, `Категория`, ...
    Localized,
}

impl Schema {
    /// Header spellings accepted for a column, in priority order.
    /// The first entry is the name reported when the column is missing.
    pub fn header_candidates(&self, column: Column) -> &'static [&'static str] {
        match (self, column) {
            (Schema::English, Column::OperationDate) => &["date", "operation_date"],
            (Schema::English, Column::PaymentDate) => &["payment_date"],
            (Schema::English, Column::Amount) => &["amount"],
            (Schema::English, Column::Category) => &["category"],
            (Schema::English, Column::Card) => &["card", "card_id", "card_number"],
            (Schema::English, Column::Description) => &["description"],
            (Schema::English, Column::Cashback) => &["cashback"],

            (Schema::Localized, Column::OperationDate) => &["Дата операции"],
            (Schema::Localized, Column::PaymentDate) => &["Дата платежа"],
            (Schema::Localized, Column::Amount) => &[
                "Сумма платежа",
                "Сумма операции",
                "Сумма",
                "Сумма операции с округлением",
            ],
            (Schema::Localized, Column::Category) => &["Категория"],
            (Schema::Localized, Column::Card) => &["Номер карты"],
            (Schema::Localized, Column::Description) => &["Описание"],
            (Schema::Localized, Column::Cashback) => &["Кэшбэк", "Кешбэк"],
        }
    }

    pub fn primary_name(&self, column: Column) -> &'static str {
        self.header_candidates(column)[0]
    }

    /// Localized if any header matches a localized spelling, English otherwise.
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Schema {
        let localized = Column::ALL.iter().any(|&column| {
            Schema::Localized
                .header_candidates(column)
                .iter()
                .any(|candidate| headers.iter().any(|h| h.as_ref().trim() == *candidate))
        });
        if localized {
            Schema::Localized
        } else {
            Schema::English
        }
    }
}

/// A source row whose operation date could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub reason: String,
}

/// A field that was present but unparsable, so the row kept it blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCell {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub column: Column,
    pub value: String,
}

/// All transactions loaded for one report invocation, plus what the
/// normalizer learned about the source they came from.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,

    /// Header convention detected in the source
    pub schema: Schema,

    /// Columns the source actually provides
    pub columns: BTreeSet<Column>,

    /// Data rows in the source before any row was dropped
    pub source_rows: usize,

    /// Rows dropped because their operation date did not parse
    pub dropped: Vec<DroppedRow>,

    /// Payment date, amount, or cashback cells left blank because they did not parse
    pub invalid_cells: Vec<InvalidCell>,
}

impl Ledger {
    /// Build a ledger from already-typed transactions. Every column counts as present.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            source_rows: transactions.len(),
            transactions,
            schema: Schema::English,
            columns: Column::ALL.into_iter().collect(),
            dropped: Vec::new(),
            invalid_cells: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// True when the source itself had no data rows (as opposed to rows being
    /// dropped or filtered away).
    pub fn is_empty_source(&self) -> bool {
        self.source_rows == 0
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Fail with `"<column> not found"` for the first required column the source lacks.
    pub fn require(&self, required: &[Column]) -> Result<(), CoreError> {
        match required.iter().find(|c| !self.has_column(**c)) {
            Some(missing) => Err(CoreError::ColumnNotFound(
                self.schema.primary_name(*missing).to_string(),
            )),
            None => Ok(()),
        }
    }

    /// Transactions whose operation date falls inside the window.
    pub fn in_window<'a>(
        &'a self,
        window: &'a DateWindow,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |t| window.contains(t.operation_date))
    }
}
