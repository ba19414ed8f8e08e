// ═══════════════════════════════════════════════════════════════════
// Storage Tests — CSV source, settings file, report file sink
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use std::collections::HashMap;

use spending_insights_core::errors::CoreError;
use spending_insights_core::models::settings::Settings;
use spending_insights_core::storage::settings_file::{load_settings, save_settings};
use spending_insights_core::storage::sink::{auto_report_name, FileSink, ReportSink};
use spending_insights_core::storage::source::{CsvSource, RawTable, TabularSource};

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

// ═══════════════════════════════════════════════════════════════════
// RawTable
// ═══════════════════════════════════════════════════════════════════

mod raw_table {
    use super::*;

    #[test]
    fn build_and_lookup() {
        let table = RawTable::new(["date", " amount "])
            .with_row(["2025-01-01", "5"])
            .with_row(["2025-01-02", "6"]);
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
        assert_eq!(table.column_index("amount"), Some(1));
        assert_eq!(table.column_index("category"), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// CsvSource
// ═══════════════════════════════════════════════════════════════════

mod csv_source {
    use super::*;

    #[test]
    fn comma_separated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ops.csv", "date,amount,category\n2025-01-01,5,Food\n");

        let table = CsvSource::new().load(&path).unwrap();
        assert_eq!(table.headers, vec!["date", "amount", "category"]);
        assert_eq!(table.rows, vec![vec!["2025-01-01", "5", "Food"]]);
    }

    #[test]
    fn semicolon_separated_with_decimal_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "ops.csv",
            "Дата операции;Сумма платежа;Категория\n31.12.2021 16:44:00;-160,89;Супермаркеты\n",
        );

        let table = CsvSource::new().load(&path).unwrap();
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows[0][1], "-160,89");
    }

    #[test]
    fn tab_separated() {
        let table = CsvSource::new()
            .read("date\tamount\n2025-01-01\t5\n".as_bytes())
            .unwrap();
        assert_eq!(table.headers, vec!["date", "amount"]);
        assert_eq!(table.rows[0], vec!["2025-01-01", "5"]);
    }

    #[test]
    fn explicit_delimiter_overrides_sniffing() {
        let table = CsvSource::with_delimiter(b'|')
            .read("date|amount\n2025-01-01|5,5\n".as_bytes())
            .unwrap();
        assert_eq!(table.rows[0], vec!["2025-01-01", "5,5"]);
    }

    #[test]
    fn bom_and_padding_are_stripped() {
        let table = CsvSource::new()
            .read("\u{feff}date , amount\n 2025-01-01 , 5 \n".as_bytes())
            .unwrap();
        assert_eq!(table.headers, vec!["date", "amount"]);
        assert_eq!(table.rows[0], vec!["2025-01-01", "5"]);
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let table = CsvSource::new()
            .read("date,amount,category\n2025-01-01,5\n".as_bytes())
            .unwrap();
        assert_eq!(table.rows[0].len(), 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = CsvSource::new().load(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn header_only_file_is_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.csv", "date,amount\n");
        let err = CsvSource::new().load(&path).unwrap_err();
        assert!(matches!(err, CoreError::EmptySource(_)));
    }

    #[test]
    fn reading_header_only_is_not_an_error() {
        let table = CsvSource::new().read("date,amount\n".as_bytes()).unwrap();
        assert!(table.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings file
// ═══════════════════════════════════════════════════════════════════

mod settings_file {
    use super::*;

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_settings.json");
        let path_str = path.to_str().unwrap();

        let mut api_keys = HashMap::new();
        api_keys.insert("alphavantage".to_string(), "key".to_string());
        let settings = Settings {
            currencies: vec!["USD".into(), "EUR".into()],
            stocks: vec!["AAPL".into()],
            base_currency: "RUB".into(),
            api_keys,
        };

        save_settings(&settings, path_str).unwrap();
        assert_eq!(load_settings(path_str).unwrap(), settings);
    }

    #[test]
    fn legacy_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "user_settings.json",
            r#"{"user_currencies": ["USD"], "user_stocks": ["AAPL", "TSLA"]}"#,
        );
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.currencies, vec!["USD"]);
        assert_eq!(settings.stocks.len(), 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.json");
        let err = load_settings(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn malformed_file_is_deserialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.json", "{ currencies: ");
        let err = load_settings(&path).unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Report file sink
// ═══════════════════════════════════════════════════════════════════

mod file_sink {
    use super::*;

    #[test]
    fn writes_into_created_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let sink = FileSink::new(&out);
        assert_eq!(sink.dir(), out.as_path());

        sink.persist("weekday.json", r#"{"results_count":0}"#).unwrap();
        let content = std::fs::read_to_string(out.join("weekday.json")).unwrap();
        assert_eq!(content, r#"{"results_count":0}"#);
    }

    #[test]
    fn never_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());

        sink.persist("report.json", "first").unwrap();
        let err = sink.persist("report.json", "second").unwrap_err();
        assert!(matches!(err, CoreError::FileIO(_)));

        let content = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
        assert_eq!(content, "first");
    }

    #[test]
    fn auto_names_are_unique_and_timestamped() {
        let now = NaiveDate::from_ymd_opt(2025, 4, 9)
            .unwrap()
            .and_hms_micro_opt(14, 30, 5, 123_456)
            .unwrap();

        let a = auto_report_name("search", now);
        let b = auto_report_name("search", now);
        assert_ne!(a, b);
        assert!(a.starts_with("search_20250409_143005_123456_"));
        assert!(a.ends_with(".json"));
    }

    #[test]
    fn auto_named_reports_coexist_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        let now = chrono::Local::now().naive_local();

        for _ in 0..5 {
            sink.persist(&auto_report_name("top_transactions", now), "[]")
                .unwrap();
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 5);
    }
}
