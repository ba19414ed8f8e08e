pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use models::{
    quote::QuoteKind,
    report::{
        CardOrder, CardSummary, CategorySpending, CategoryTotal, HomePage, ReportEnvelope,
        ReportKind, SearchResult, WeekdayReport,
    },
    settings::Settings,
    transaction::{Ledger, Transaction},
    window::{parse_reference, DateWindow, ISO_DATETIME},
};
use providers::registry::QuoteProviderRegistry;
use services::{
    home_service::HomeService, ledger_service::LedgerService, quote_service::QuoteService,
    report_service::ReportService,
};
use storage::{
    settings_file::load_settings,
    sink::ReportSink,
    source::{CsvSource, TabularSource},
};

use errors::CoreError;

/// Main entry point for the spending insights core library.
///
/// Holds the paths of the ledger and settings files plus the services that
/// operate on them. The ledger is re-read on every call, so each report
/// reflects the file as it is at that moment. Every operation returns a
/// `ReportEnvelope`; nothing here returns a bare error.
#[must_use]
pub struct SpendingInsights {
    ledger_path: String,
    settings_path: String,
    source: Box<dyn TabularSource>,
    ledger_service: LedgerService,
    report_service: ReportService,
    quote_service: QuoteService,
    home_service: HomeService,
}

impl std::fmt::Debug for SpendingInsights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpendingInsights")
            .field("ledger_path", &self.ledger_path)
            .field("settings_path", &self.settings_path)
            .finish()
    }
}

impl SpendingInsights {
    /// Read CSV ledgers from `ledger_path`, settings from `settings_path`,
    /// and quotes through `registry`.
    pub fn new(
        ledger_path: impl Into<String>,
        settings_path: impl Into<String>,
        registry: QuoteProviderRegistry,
    ) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            settings_path: settings_path.into(),
            source: Box::new(CsvSource::new()),
            ledger_service: LedgerService::new(),
            report_service: ReportService::new(),
            quote_service: QuoteService::new(registry),
            home_service: HomeService::new(),
        }
    }

    /// Replace the CSV reader with another tabular source.
    pub fn with_source(mut self, source: Box<dyn TabularSource>) -> Self {
        self.source = source;
        self
    }

    /// Persist every successful report through `sink`.
    /// `name` fixes the output name; `None` generates one per report.
    pub fn with_sink(mut self, sink: Box<dyn ReportSink>, name: Option<String>) -> Self {
        self.report_service = self.report_service.with_sink(sink, name);
        self
    }

    #[must_use]
    pub fn ledger_path(&self) -> &str {
        &self.ledger_path
    }

    /// Load and normalize the ledger as it currently is on disk.
    pub fn load_ledger(&self) -> Result<Ledger, CoreError> {
        self.ledger_service.load(self.source.as_ref(), &self.ledger_path)
    }

    /// Load the settings file.
    pub fn load_settings(&self) -> Result<Settings, CoreError> {
        load_settings(&self.settings_path)
    }

    // ── Provider availability ───────────────────────────────────────

    /// Check if at least one quote provider is available for `kind`.
    #[must_use]
    pub fn is_provider_available(&self, kind: &QuoteKind) -> bool {
        self.quote_service.has_provider_for(kind)
    }

    /// Names of the quote providers for `kind`, in fallback order.
    #[must_use]
    pub fn get_provider_names(&self, kind: &QuoteKind) -> Vec<String> {
        self.quote_service.get_provider_names(kind)
    }

    // ── Single reports (bare JSON shape) ────────────────────────────

    /// Month-to-date spending in `category`; `as_of` is `dd.mm.yyyy`.
    pub fn spending_by_category(
        &self,
        category: &str,
        as_of: &str,
    ) -> ReportEnvelope<CategorySpending> {
        self.with_ledger(ReportKind::SpendingByCategory, |ledger| {
            self.report_service
                .spending_by_category(ledger, category, as_of)
        })
    }

    /// 90-day spending in `category` from `start` (`yyyy-mm-dd`).
    pub fn expenses_by_category(&self, category: &str, start: &str) -> ReportEnvelope<CategoryTotal> {
        self.with_ledger(ReportKind::ExpensesByCategory, |ledger| {
            self.report_service
                .expenses_by_category(ledger, category, start)
        })
    }

    /// Spending per weekday up to `as_of` (`yyyy-mm-dd`, default today).
    pub fn expenses_by_weekday(&self, as_of: Option<&str>) -> ReportEnvelope<WeekdayReport> {
        self.with_ledger(ReportKind::ExpensesByWeekday, |ledger| {
            self.report_service.expenses_by_weekday(ledger, as_of)
        })
    }

    pub fn top_transactions(
        &self,
        window: Option<&DateWindow>,
        n: usize,
    ) -> ReportEnvelope<Vec<Transaction>> {
        self.with_ledger(ReportKind::TopTransactions, |ledger| {
            self.report_service.top_transactions(ledger, window, n)
        })
    }

    pub fn card_summary(
        &self,
        window: Option<&DateWindow>,
        order: CardOrder,
    ) -> ReportEnvelope<Vec<CardSummary>> {
        self.with_ledger(ReportKind::CardSummary, |ledger| {
            self.report_service.card_summary(ledger, window, order)
        })
    }

    /// Rows paid within 90 days of `as_of` (`yyyy-mm-dd HH:MM:SS`, default now).
    pub fn recent_transactions(&self, as_of: Option<&str>) -> ReportEnvelope<Vec<Transaction>> {
        self.with_ledger(ReportKind::RecentTransactions, |ledger| {
            self.report_service.recent_transactions(ledger, as_of)
        })
    }

    pub fn search(&self, query: &str) -> ReportEnvelope<SearchResult> {
        self.with_ledger(ReportKind::Search, |ledger| {
            self.report_service.search(ledger, query)
        })
    }

    // ── Composite (status JSON shape) ───────────────────────────────

    /// The home view for `datetime` (`yyyy-mm-dd HH:MM:SS`).
    ///
    /// The greeting is for the current local time. Any failure (ledger,
    /// settings, or a quote fetch) makes the whole page an error; there is
    /// no partial result.
    pub async fn home_page(&self, datetime: &str) -> ReportEnvelope<HomePage> {
        let now = chrono::Local::now().naive_local();
        let result = self.build_home_page(datetime, now).await;
        if let Ok(page) = &result {
            self.report_service.persist(ReportKind::HomePage, page);
        }
        if let Err(e) = &result {
            log::error!("{} failed: {e}", ReportKind::HomePage);
        }
        result.into()
    }

    async fn build_home_page(
        &self,
        datetime: &str,
        now: chrono::NaiveDateTime,
    ) -> Result<HomePage, CoreError> {
        let reference = parse_reference(datetime, ISO_DATETIME)?;
        let ledger = self.load_ledger()?;
        let settings = self.load_settings()?;
        self.home_service
            .assemble(&ledger, &settings, &self.quote_service, reference, now)
            .await
    }

    /// Load the ledger and hand it to `report`; a load failure becomes the
    /// report's error envelope.
    fn with_ledger<T, F>(&self, kind: ReportKind, report: F) -> ReportEnvelope<T>
    where
        F: FnOnce(&Ledger) -> ReportEnvelope<T>,
    {
        match self.load_ledger() {
            Ok(ledger) => report(&ledger),
            Err(e) => {
                log::error!("{kind} report failed: {e}");
                ReportEnvelope::error(&e)
            }
        }
    }
}
