use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::report::{
    CardOrder, CardSummary, CategorySpending, CategoryTotal, ReportEnvelope, ReportKind,
    SearchResult, WeekdayReport,
};
use crate::models::transaction::{Column, Ledger, Transaction};
use crate::models::window::{
    parse_reference, select_window, DateWindow, WindowPolicy, DAY_FIRST_DATE, ISO_DATE,
    ISO_DATETIME,
};
use crate::services::aggregation_service::AggregationService;
use crate::storage::sink::{auto_report_name, ReportSink};

/// Default size of top-transaction listings.
pub const DEFAULT_TOP_N: usize = 5;

/// Optional post-processing stage: write each successful payload to a sink.
struct SinkStage {
    sink: Box<dyn ReportSink>,
    /// Fixed output name; auto-generated per report when `None`.
    name: Option<String>,
}

/// Runs one fixed pipeline per report type:
/// column check → reference date → window → aggregation → envelope.
///
/// This is the only place internal errors become `ReportEnvelope::Error`;
/// every public method here returns an envelope and never a `Result`.
/// Single reports use the bare JSON shape (`render_bare`).
pub struct ReportService {
    aggregation: AggregationService,
    sink: Option<SinkStage>,
}

impl ReportService {
    pub fn new() -> Self {
        Self {
            aggregation: AggregationService::new(),
            sink: None,
        }
    }

    /// Persist every successful payload through `sink`, under `name` or an
    /// auto-generated `<report>_<timestamp>_<seq>.json`.
    pub fn with_sink(mut self, sink: Box<dyn ReportSink>, name: Option<String>) -> Self {
        self.sink = Some(SinkStage { sink, name });
        self
    }

    // ── Category ────────────────────────────────────────────────────

    /// Month-to-date spending in `category` as of `as_of` (`dd.mm.yyyy`).
    pub fn spending_by_category(
        &self,
        ledger: &Ledger,
        category: &str,
        as_of: &str,
    ) -> ReportEnvelope<CategorySpending> {
        self.finish(ReportKind::SpendingByCategory, || {
            ledger.require(&[Column::OperationDate, Column::Category, Column::Amount])?;
            let reference = parse_reference(as_of, DAY_FIRST_DATE)?;
            let window = select_window(reference, WindowPolicy::MonthToDate)?;
            let matched = self.aggregation.category_sum(ledger, category, &window)?;

            Ok(CategorySpending {
                category: category.to_string(),
                start: window.start.unwrap_or(window.end),
                end: window.end,
                amount: matched.amount,
                transactions: matched.rows.into_iter().cloned().collect(),
            })
        })
    }

    /// Spending in `category` over the 90 days starting at `start` (`yyyy-mm-dd`).
    pub fn expenses_by_category(
        &self,
        ledger: &Ledger,
        category: &str,
        start: &str,
    ) -> ReportEnvelope<CategoryTotal> {
        self.finish(ReportKind::ExpensesByCategory, || {
            ledger.require(&[Column::OperationDate, Column::Category, Column::Amount])?;
            let reference = parse_reference(start, ISO_DATE)?;
            let window = select_window(reference, WindowPolicy::FORWARD_90)?;
            let matched = self.aggregation.category_sum(ledger, category, &window)?;

            Ok(CategoryTotal {
                category: category.to_string(),
                amount: matched.amount,
            })
        })
    }

    // ── Weekday ─────────────────────────────────────────────────────

    /// Spending per weekday for everything up to `as_of` (`yyyy-mm-dd`),
    /// or up to today when no date is given.
    pub fn expenses_by_weekday(
        &self,
        ledger: &Ledger,
        as_of: Option<&str>,
    ) -> ReportEnvelope<WeekdayReport> {
        let now = chrono::Local::now().naive_local();
        self.finish(ReportKind::ExpensesByWeekday, || {
            ledger.require(&[Column::OperationDate, Column::Amount])?;
            let reference = reference_or(as_of, ISO_DATE, now)?;
            let window = select_window(reference, WindowPolicy::Cutoff)?;
            self.aggregation.weekday_sum(ledger, &window)
        })
    }

    // ── Listings ────────────────────────────────────────────────────

    /// The `n` largest transactions, optionally restricted to `window`.
    pub fn top_transactions(
        &self,
        ledger: &Ledger,
        window: Option<&DateWindow>,
        n: usize,
    ) -> ReportEnvelope<Vec<Transaction>> {
        self.finish(ReportKind::TopTransactions, || {
            ledger.require(&[Column::OperationDate, Column::Amount])?;
            let top = match window {
                Some(window) => self.aggregation.top_n(ledger.in_window(window), n),
                None => self.aggregation.top_n(&ledger.transactions, n),
            };
            Ok(top.into_iter().cloned().collect())
        })
    }

    /// Spending and cashback per card, optionally restricted to `window`.
    pub fn card_summary(
        &self,
        ledger: &Ledger,
        window: Option<&DateWindow>,
        order: CardOrder,
    ) -> ReportEnvelope<Vec<CardSummary>> {
        self.finish(ReportKind::CardSummary, || {
            ledger.require(&[Column::OperationDate, Column::Amount])?;
            match window {
                Some(window) => self.aggregation.card_sum(ledger.in_window(window), order),
                None => self.aggregation.card_sum(&ledger.transactions, order),
            }
        })
    }

    /// Transactions whose payment settled in the 90 days up to `as_of`
    /// (`yyyy-mm-dd HH:MM:SS`, default now). Rows without a payment date are skipped.
    pub fn recent_transactions(
        &self,
        ledger: &Ledger,
        as_of: Option<&str>,
    ) -> ReportEnvelope<Vec<Transaction>> {
        let now = chrono::Local::now().naive_local();
        self.finish(ReportKind::RecentTransactions, || {
            ledger.require(&[Column::PaymentDate])?;
            let reference = reference_or(as_of, ISO_DATETIME, now)?;
            let window = select_window(reference, WindowPolicy::ROLLING_90)?;
            Ok(ledger
                .transactions
                .iter()
                .filter(|t| t.payment_date.is_some_and(|d| window.contains(d)))
                .cloned()
                .collect())
        })
    }

    /// Case-insensitive free-text search over every field.
    pub fn search(&self, ledger: &Ledger, query: &str) -> ReportEnvelope<SearchResult> {
        self.finish(ReportKind::Search, || {
            log::info!("Search query: {query}");
            let needle = query.trim().to_lowercase();
            let results: Vec<Transaction> = ledger
                .transactions
                .iter()
                .filter(|t| t.matches_text(&needle))
                .cloned()
                .collect();
            log::info!("Search matched {} transactions", results.len());

            Ok(SearchResult {
                query: query.to_string(),
                results_count: results.len(),
                results,
            })
        })
    }

    // ── Pipeline tail ───────────────────────────────────────────────

    /// Run `build`, log and wrap a failure, persist a success.
    fn finish<T, F>(&self, kind: ReportKind, build: F) -> ReportEnvelope<T>
    where
        T: Serialize,
        F: FnOnce() -> Result<T, CoreError>,
    {
        match build() {
            Ok(payload) => {
                self.persist(kind, &payload);
                ReportEnvelope::Success(payload)
            }
            Err(e) => {
                log::error!("{kind} report failed: {e}");
                ReportEnvelope::error(&e)
            }
        }
    }

    /// Sink failures are logged and otherwise ignored.
    pub(crate) fn persist<T: Serialize>(&self, kind: ReportKind, payload: &T) {
        let Some(stage) = &self.sink else {
            return;
        };
        let name = stage.name.clone().unwrap_or_else(|| {
            auto_report_name(kind.as_str(), chrono::Local::now().naive_local())
        });
        let written = serde_json::to_string_pretty(payload)
            .map_err(|e| CoreError::Serialization(e.to_string()))
            .and_then(|text| stage.sink.persist(&name, &text));
        if let Err(e) = written {
            log::warn!("Could not save {kind} report as {name}: {e}");
        }
    }
}

impl Default for ReportService {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an optional reference date, falling back to `now` (captured once
/// by the caller) only when none was given.
fn reference_or(
    input: Option<&str>,
    format: &str,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, CoreError> {
    match input {
        Some(raw) => parse_reference(raw, format),
        None => Ok(now),
    }
}
