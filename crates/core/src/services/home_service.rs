use chrono::{NaiveDateTime, Timelike};

use crate::errors::CoreError;
use crate::models::report::{CardOrder, HomePage};
use crate::models::settings::Settings;
use crate::models::transaction::{Column, Ledger};
use crate::models::window::{select_window, WindowPolicy};
use crate::services::aggregation_service::AggregationService;
use crate::services::quote_service::QuoteService;

/// Number of transactions listed on the home page.
pub const HOME_TOP_N: usize = 5;

/// Assembles the composite home view.
///
/// Unlike single reports this returns a `Result`: any failing component
/// fails the whole page, and the caller wraps that in one status envelope.
pub struct HomeService {
    aggregation: AggregationService,
}

impl HomeService {
    pub fn new() -> Self {
        Self {
            aggregation: AggregationService::new(),
        }
    }

    /// Card totals and the largest transactions of the reference month,
    /// plus quotes for everything listed in `settings`. The greeting follows
    /// `now`, not `reference`.
    pub async fn assemble(
        &self,
        ledger: &Ledger,
        settings: &Settings,
        quotes: &QuoteService,
        reference: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<HomePage, CoreError> {
        ledger.require(&[Column::OperationDate, Column::Amount])?;
        let window = select_window(reference, WindowPolicy::MonthToDate)?;

        let cards = self
            .aggregation
            .card_sum(ledger.in_window(&window), CardOrder::ByCard)?;
        let top_transactions = self
            .aggregation
            .top_n(ledger.in_window(&window), HOME_TOP_N)
            .into_iter()
            .cloned()
            .collect();

        let currency_rates = quotes
            .fetch_rates(&settings.currencies, &settings.base_currency)
            .await?;
        let stock_prices = quotes.fetch_stock_prices(&settings.stocks).await?;

        log::info!(
            "Home page for {reference}: {} cards, {} rates, {} stocks",
            cards.len(),
            currency_rates.len(),
            stock_prices.len()
        );

        Ok(HomePage {
            greeting: greeting_for_hour(now.hour()).to_string(),
            cards,
            top_transactions,
            currency_rates,
            stock_prices,
        })
    }
}

impl Default for HomeService {
    fn default() -> Self {
        Self::new()
    }
}

/// Greeting for an hour of the day (0-23).
pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        18..=22 => "Good evening",
        _ => "Good night",
    }
}
