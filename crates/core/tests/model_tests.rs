// ═══════════════════════════════════════════════════════════════════
// Model Tests — Transaction, Ledger, Schema, windows, quotes,
// settings, report envelopes
// ═══════════════════════════════════════════════════════════════════

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use rust_decimal::Decimal;

use spending_insights_core::errors::CoreError;
use spending_insights_core::models::quote::{CurrencyRate, Quote, StockPrice};
use spending_insights_core::models::report::{
    weekday_name, CategoryTotal, ReportEnvelope, ReportKind,
};
use spending_insights_core::models::settings::Settings;
use spending_insights_core::models::transaction::{Column, Ledger, Schema, Transaction};
use spending_insights_core::models::window::{
    parse_reference, select_window, DateWindow, WindowPolicy, DAY_FIRST_DATE, ISO_DATE,
    ISO_DATETIME,
};

fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Windows
// ═══════════════════════════════════════════════════════════════════

mod windows {
    use super::*;

    #[test]
    fn month_to_date_starts_on_first_and_keeps_time() {
        let reference = dt(2025, 3, 20, 14, 30, 0);
        let window = select_window(reference, WindowPolicy::MonthToDate).unwrap();
        assert_eq!(window.start, Some(dt(2025, 3, 1, 14, 30, 0)));
        assert_eq!(window.end, reference);
    }

    #[test]
    fn month_to_date_on_first_day_is_a_single_instant() {
        let reference = dt(2025, 3, 1, 0, 0, 0);
        let window = select_window(reference, WindowPolicy::MonthToDate).unwrap();
        assert_eq!(window.start, Some(reference));
        assert!(window.contains(reference));
    }

    #[test]
    fn rolling_90_goes_back_ninety_days() {
        let reference = dt(2025, 4, 1, 12, 0, 0);
        let window = select_window(reference, WindowPolicy::ROLLING_90).unwrap();
        assert_eq!(window.start, Some(dt(2025, 1, 1, 12, 0, 0)));
        assert_eq!(window.end, reference);
    }

    #[test]
    fn forward_90_goes_ahead_ninety_days() {
        let reference = dt(2025, 1, 1, 0, 0, 0);
        let window = select_window(reference, WindowPolicy::FORWARD_90).unwrap();
        assert_eq!(window.start, Some(reference));
        assert_eq!(window.end, dt(2025, 4, 1, 0, 0, 0));
    }

    #[test]
    fn cutoff_includes_whole_reference_day() {
        let window = select_window(dt(2024, 4, 3, 0, 0, 0), WindowPolicy::Cutoff).unwrap();
        assert_eq!(window.start, None);
        assert!(window.contains(dt(2024, 4, 3, 23, 59, 59)));
        assert!(window.contains(dt(1999, 1, 1, 0, 0, 0)));
        assert!(!window.contains(dt(2024, 4, 4, 0, 0, 0)));
    }

    #[test]
    fn bounds_are_inclusive() {
        let window = DateWindow::between(dt(2025, 1, 1, 0, 0, 0), dt(2025, 1, 31, 0, 0, 0)).unwrap();
        assert!(window.contains(dt(2025, 1, 1, 0, 0, 0)));
        assert!(window.contains(dt(2025, 1, 31, 0, 0, 0)));
        assert!(!window.contains(dt(2025, 1, 31, 0, 0, 1)));
        assert!(!window.contains(dt(2024, 12, 31, 23, 59, 59)));
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        let err = DateWindow::between(dt(2025, 2, 1, 0, 0, 0), dt(2025, 1, 1, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidWindow(_)));
    }

    #[test]
    fn deserialized_windows_are_validated() {
        let window: DateWindow =
            serde_json::from_str(r#"{"start":"2025-01-01T00:00:00","end":"2025-01-31T00:00:00"}"#)
                .unwrap();
        assert_eq!(window.start, Some(dt(2025, 1, 1, 0, 0, 0)));

        let open: DateWindow = serde_json::from_str(r#"{"end":"2025-01-31T00:00:00"}"#).unwrap();
        assert_eq!(open, DateWindow::until(dt(2025, 1, 31, 0, 0, 0)));

        let err = serde_json::from_str::<DateWindow>(
            r#"{"start":"2025-02-01T00:00:00","end":"2025-01-01T00:00:00"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not be after end"));
    }

    #[test]
    fn policy_names() {
        assert_eq!(WindowPolicy::MonthToDate.to_string(), "month_to_date");
        assert_eq!(WindowPolicy::ROLLING_90.to_string(), "rolling_90");
        assert_eq!(WindowPolicy::FORWARD_90.to_string(), "forward_90");
        assert_eq!(WindowPolicy::Cutoff.to_string(), "cutoff");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Reference date parsing
// ═══════════════════════════════════════════════════════════════════

mod reference_dates {
    use super::*;

    #[test]
    fn day_first_date_is_midnight() {
        let parsed = parse_reference("20.03.2025", DAY_FIRST_DATE).unwrap();
        assert_eq!(parsed, dt(2025, 3, 20, 0, 0, 0));
    }

    #[test]
    fn iso_date_is_midnight() {
        let parsed = parse_reference("2025-01-01", ISO_DATE).unwrap();
        assert_eq!(parsed, dt(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn iso_datetime_keeps_time() {
        let parsed = parse_reference("2025-03-20 14:05:09", ISO_DATETIME).unwrap();
        assert_eq!(parsed, dt(2025, 3, 20, 14, 5, 9));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(parse_reference("  2025-01-01 ", ISO_DATE).is_ok());
    }

    #[test]
    fn wrong_format_is_invalid_date() {
        let err = parse_reference("2025-03-20", DAY_FIRST_DATE).unwrap_err();
        match err {
            CoreError::InvalidDate { input, expected } => {
                assert_eq!(input, "2025-03-20");
                assert_eq!(expected, DAY_FIRST_DATE);
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn impossible_date_is_rejected() {
        assert!(parse_reference("2025-02-30", ISO_DATE).is_err());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(parse_reference("", ISO_DATETIME).is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Transaction & Ledger
// ═══════════════════════════════════════════════════════════════════

mod transaction {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let tx = Transaction::new(dt(2025, 1, 10, 9, 0, 0), Decimal::from(100))
            .with_category("Food")
            .with_card("*7197")
            .with_description("Grocery")
            .with_cashback(Decimal::new(150, 2))
            .with_payment_date(dt(2025, 1, 11, 0, 0, 0));

        assert_eq!(tx.category.as_deref(), Some("Food"));
        assert_eq!(tx.card_or_unknown(), "*7197");
        assert_eq!(tx.cashback_or_zero(), Decimal::new(150, 2));
        assert_eq!(tx.payment_date, Some(dt(2025, 1, 11, 0, 0, 0)));
    }

    #[test]
    fn missing_values_default_for_aggregation() {
        let mut tx = Transaction::new(dt(2025, 1, 10, 9, 0, 0), Decimal::ONE);
        tx.amount = None;
        assert_eq!(tx.amount_or_zero(), Decimal::ZERO);
        assert_eq!(tx.cashback_or_zero(), Decimal::ZERO);
        assert_eq!(tx.card_or_unknown(), "unknown");
    }

    #[test]
    fn text_match_covers_every_field() {
        let tx = Transaction::new(dt(2025, 1, 10, 9, 0, 0), Decimal::new(12345, 2))
            .with_category("Supermarkets")
            .with_card("*4556")
            .with_description("Magnit");

        assert!(tx.matches_text("magnit"));
        assert!(tx.matches_text("supermarket"));
        assert!(tx.matches_text("4556"));
        assert!(tx.matches_text("123.45"));
        assert!(tx.matches_text("10.01.2025"));
        assert!(!tx.matches_text("pharmacy"));
    }

    #[test]
    fn transaction_serializes_amount_as_number() {
        let tx = Transaction::new(dt(2025, 1, 10, 9, 0, 0), Decimal::new(2505, 1));
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["amount"].as_f64(), Some(250.5));
        assert_eq!(value["operation_date"], "2025-01-10T09:00:00");
        assert!(value["category"].is_null());
    }

    #[test]
    fn typed_ledger_has_every_column() {
        let ledger = Ledger::from_transactions(vec![Transaction::new(
            dt(2025, 1, 10, 9, 0, 0),
            Decimal::ONE,
        )]);
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_empty_source());
        assert!(ledger
            .require(&[Column::OperationDate, Column::Category, Column::Cashback])
            .is_ok());
    }

    #[test]
    fn require_reports_first_missing_column_by_schema_name() {
        let mut ledger = Ledger::default();
        ledger.columns.insert(Column::OperationDate);

        let err = ledger
            .require(&[Column::OperationDate, Column::Category, Column::Amount])
            .unwrap_err();
        assert_eq!(err.to_string(), "category not found");

        ledger.schema = Schema::Localized;
        let err = ledger.require(&[Column::Amount]).unwrap_err();
        assert_eq!(err.to_string(), "Сумма платежа not found");
    }

    #[test]
    fn in_window_filters_by_operation_date() {
        let ledger = Ledger::from_transactions(vec![
            Transaction::new(dt(2025, 1, 1, 0, 0, 0), Decimal::ONE),
            Transaction::new(dt(2025, 2, 1, 0, 0, 0), Decimal::TWO),
        ]);
        let window = DateWindow::until(dt(2025, 1, 31, 0, 0, 0));
        let inside: Vec<_> = ledger.in_window(&window).collect();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].amount, Some(Decimal::ONE));
    }
}

mod schema {
    use super::*;

    #[test]
    fn english_headers() {
        let headers = ["date", "amount", "category"];
        assert_eq!(Schema::detect(&headers), Schema::English);
    }

    #[test]
    fn localized_headers() {
        let headers = ["Дата операции", "Сумма платежа", "Категория"];
        assert_eq!(Schema::detect(&headers), Schema::Localized);
    }

    #[test]
    fn unknown_headers_default_to_english() {
        let headers: [&str; 0] = [];
        assert_eq!(Schema::detect(&headers), Schema::English);
    }

    #[test]
    fn amount_candidates_are_prioritised() {
        let candidates = Schema::Localized.header_candidates(Column::Amount);
        assert_eq!(candidates[0], "Сумма платежа");
        assert_eq!(Schema::Localized.primary_name(Column::Amount), "Сумма платежа");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Quotes & Settings
// ═══════════════════════════════════════════════════════════════════

mod quotes {
    use super::*;

    #[test]
    fn unavailable_serializes_as_na() {
        let rate = CurrencyRate {
            currency: "EUR".into(),
            rate: Quote::UNAVAILABLE,
        };
        let value = serde_json::to_value(&rate).unwrap();
        assert_eq!(value, serde_json::json!({"currency": "EUR", "rate": "N/A"}));
    }

    #[test]
    fn available_serializes_as_number() {
        let price = StockPrice {
            stock: "AAPL".into(),
            price: Quote::Available(Decimal::new(1505, 1)),
        };
        let value = serde_json::to_value(&price).unwrap();
        assert_eq!(value["stock"], "AAPL");
        assert_eq!(value["price"].as_f64(), Some(150.5));
    }

    #[test]
    fn na_deserializes_back() {
        let rate: CurrencyRate =
            serde_json::from_str(r#"{"currency":"USD","rate":"N/A"}"#).unwrap();
        assert_eq!(rate.rate, Quote::UNAVAILABLE);
        assert!(!rate.rate.is_available());
        assert_eq!(rate.rate.value(), None);
    }
}

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(settings.currencies.is_empty());
        assert!(settings.stocks.is_empty());
        assert_eq!(settings.base_currency, "USD");
    }

    #[test]
    fn legacy_keys_are_accepted() {
        let json = r#"{"user_currencies":["USD","EUR"],"user_stocks":["AAPL"]}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.currencies, vec!["USD", "EUR"]);
        assert_eq!(settings.stocks, vec!["AAPL"]);
        assert_eq!(settings.base_currency, "USD");
    }

    #[test]
    fn current_keys_and_api_keys() {
        let json = r#"{
            "currencies": ["EUR"],
            "stocks": [],
            "base_currency": "RUB",
            "api_keys": {"alphavantage": "demo"}
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.base_currency, "RUB");
        assert_eq!(settings.api_keys.get("alphavantage").map(String::as_str), Some("demo"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Report envelopes
// ═══════════════════════════════════════════════════════════════════

mod envelopes {
    use super::*;

    fn total() -> CategoryTotal {
        CategoryTotal {
            category: "Food".into(),
            amount: Decimal::from(550),
        }
    }

    #[test]
    fn status_shape_success() {
        let envelope = ReportEnvelope::Success(total());
        let value = envelope.to_status_value(dt(2025, 4, 9, 10, 0, 0));
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["category"], "Food");
        assert_eq!(value["data"]["amount"].as_f64(), Some(550.0));
        assert_eq!(value["timestamp"], "2025-04-09T10:00:00");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn status_shape_error() {
        let envelope: ReportEnvelope<CategoryTotal> = ReportEnvelope::error(&CoreError::NoData);
        let value = envelope.to_status_value(dt(2025, 4, 9, 10, 0, 0));
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "no data for selected category and period");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn bare_shape_success_is_the_payload() {
        let envelope = ReportEnvelope::Success(total());
        let value = envelope.to_bare_value();
        assert_eq!(value["category"], "Food");
        assert!(value.get("status").is_none());
    }

    #[test]
    fn bare_shape_error() {
        let envelope: ReportEnvelope<CategoryTotal> = ReportEnvelope::error(&CoreError::EmptyInput);
        assert_eq!(
            envelope.to_bare_value(),
            serde_json::json!({"error": "empty input"})
        );
        assert_eq!(envelope.render_bare(), r#"{"error":"empty input"}"#);
    }

    #[test]
    fn bare_success_round_trips() {
        let envelope = ReportEnvelope::Success(total());
        let parsed: CategoryTotal = serde_json::from_str(&envelope.render_bare()).unwrap();
        assert_eq!(parsed, total());
    }

    #[test]
    fn render_status_is_pretty_json() {
        let envelope = ReportEnvelope::Success(total());
        let text = envelope.render_status();
        assert!(text.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["status"], "success");
    }

    #[test]
    fn from_result() {
        let ok: ReportEnvelope<u32> = Ok::<u32, CoreError>(3).into();
        assert!(ok.is_success());
        assert_eq!(ok.data(), Some(&3));

        let err: ReportEnvelope<u32> = Err::<u32, CoreError>(CoreError::NoData).into();
        assert_eq!(err.message(), Some("no data for selected category and period"));
        assert_eq!(
            err.into_result(),
            Err("no data for selected category and period".to_string())
        );
    }

    #[test]
    fn report_kind_names() {
        assert_eq!(ReportKind::ExpensesByWeekday.to_string(), "expenses_by_weekday");
        assert_eq!(ReportKind::HomePage.as_str(), "home_page");
    }

    #[test]
    fn weekday_names_are_english() {
        assert_eq!(weekday_name(Weekday::Mon), "Monday");
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
    }
}
