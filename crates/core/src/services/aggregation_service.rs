use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::errors::CoreError;
use crate::models::report::{weekday_name, CardOrder, CardSummary, WeekdayReport, WeekdayTotal};
use crate::models::transaction::{Ledger, Transaction};
use crate::models::window::DateWindow;

/// Rows matched by a category filter and their summed amount.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySum<'a> {
    pub amount: Decimal,
    pub rows: Vec<&'a Transaction>,
}

/// Group-by and ranking over ledger rows.
///
/// Pure business logic, no I/O. All sums are exact decimals and every
/// output order is fully determined by the input (never by hash order).
pub struct AggregationService;

impl AggregationService {
    pub fn new() -> Self {
        Self
    }

    /// Sum the amounts of rows in `category` whose operation date is inside `window`.
    /// An empty match is `NoData`, not a zero total.
    pub fn category_sum<'a>(
        &self,
        ledger: &'a Ledger,
        category: &str,
        window: &DateWindow,
    ) -> Result<CategorySum<'a>, CoreError> {
        let rows: Vec<&Transaction> = ledger
            .transactions
            .iter()
            .filter(|t| t.category.as_deref() == Some(category))
            .filter(|t| window.contains(t.operation_date))
            .collect();

        if rows.is_empty() {
            return Err(CoreError::NoData);
        }

        let amount = checked_sum(rows.iter().map(|t| t.amount_or_zero()), category)?;
        Ok(CategorySum { amount, rows })
    }

    /// Spending per weekday for rows on or before the cutoff, Monday first.
    ///
    /// - a ledger whose source had no rows at all is `EmptyInput`
    /// - a ledger where every row's date failed to parse reports the first failure
    /// - rows existing but none inside the cutoff is an empty, successful report
    pub fn weekday_sum(
        &self,
        ledger: &Ledger,
        cutoff: &DateWindow,
    ) -> Result<WeekdayReport, CoreError> {
        if ledger.is_empty_source() {
            return Err(CoreError::EmptyInput);
        }
        if ledger.is_empty() {
            if let Some(first) = ledger.dropped.first() {
                return Err(CoreError::DateParse(format!(
                    "row {}: {}",
                    first.row, first.reason
                )));
            }
        }

        // Keyed by days-from-Monday so iteration order is Monday → Sunday.
        let mut totals: BTreeMap<u32, (chrono::Weekday, Decimal)> = BTreeMap::new();
        for t in ledger.in_window(cutoff) {
            let weekday = t.operation_date.weekday();
            let entry = totals
                .entry(weekday.num_days_from_monday())
                .or_insert((weekday, Decimal::ZERO));
            entry.1 = add(entry.1, t.amount_or_zero(), weekday_name(weekday))?;
        }

        let results: Vec<WeekdayTotal> = totals
            .into_values()
            .map(|(weekday, amount)| WeekdayTotal {
                weekday: weekday_name(weekday).to_string(),
                amount,
            })
            .collect();

        Ok(WeekdayReport {
            results_count: results.len(),
            results,
        })
    }

    /// The `n` largest rows by amount. Missing amounts rank as zero; equal
    /// amounts keep their input order.
    pub fn top_n<'a, I>(&self, rows: I, n: usize) -> Vec<&'a Transaction>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut sorted: Vec<&Transaction> = rows.into_iter().collect();
        // `sort_by` is stable: ties keep ledger order.
        sorted.sort_by(|a, b| b.amount_or_zero().cmp(&a.amount_or_zero()));
        sorted.truncate(n);
        sorted
    }

    /// Amount and cashback totals per card. Rows without a card are grouped
    /// under `"unknown"`.
    pub fn card_sum<'a, I>(
        &self,
        rows: I,
        order: CardOrder,
    ) -> Result<Vec<CardSummary>, CoreError>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut totals: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
        for t in rows {
            let card = t.card_or_unknown();
            let entry = totals.entry(card).or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 = add(entry.0, t.amount_or_zero(), card)?;
            entry.1 = add(entry.1, t.cashback_or_zero(), card)?;
        }

        let mut cards: Vec<CardSummary> = totals
            .into_iter()
            .map(|(card, (total_spent, cashback))| CardSummary {
                card: card.to_string(),
                total_spent,
                cashback,
            })
            .collect();

        if order == CardOrder::ByTotalDesc {
            cards.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
        }
        Ok(cards)
    }
}

fn add(total: Decimal, amount: Decimal, group: &str) -> Result<Decimal, CoreError> {
    total
        .checked_add(amount)
        .ok_or_else(|| CoreError::AmountOverflow(group.to_string()))
}

fn checked_sum<I>(amounts: I, group: &str) -> Result<Decimal, CoreError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| add(total, amount, group))
}

impl Default for AggregationService {
    fn default() -> Self {
        Self::new()
    }
}
