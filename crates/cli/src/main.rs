use clap::{Parser, Subcommand};
use spending_insights_core::{
    errors::CoreError,
    models::{
        quote::QuoteKind,
        report::{CardOrder, ReportEnvelope},
        window::{
            parse_reference, select_window, DateWindow, WindowPolicy, DAY_FIRST_DATE, ISO_DATE,
            ISO_DATETIME,
        },
    },
    providers::registry::QuoteProviderRegistry,
    services::report_service::DEFAULT_TOP_N,
    storage::{settings_file::load_settings, sink::FileSink},
    SpendingInsights,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "spending-insights",
    version,
    about = "Spending reports over a personal transaction ledger"
)]
struct Cli {
    /// Ledger export (CSV; `,`, `;` or tab separated)
    #[arg(long, default_value = "data/operations.csv")]
    ledger: String,

    /// Settings file with currencies, stocks and API keys
    #[arg(long, default_value = "user_settings.json")]
    settings: String,

    /// Also save each successful report as JSON into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Fixed file name for the saved report (auto-generated otherwise)
    #[arg(long, requires = "output_dir")]
    output_name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Greeting, card totals, top transactions and quotes for the current month
    Home {
        /// Reference moment, `YYYY-MM-DD HH:MM:SS` (default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Month-to-date spending in one category
    Category {
        category: String,
        /// As-of date, `DD.MM.YYYY` (default: today)
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Spending in one category over the 90 days from a start date
    CategoryTrend {
        category: String,
        /// Start date, `YYYY-MM-DD`
        #[arg(long)]
        start: String,
    },
    /// Spending per weekday up to a cutoff date
    Weekday {
        /// Cutoff date, `YYYY-MM-DD` (default: today)
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Largest transactions
    Top {
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        count: usize,
        /// First day, `YYYY-MM-DD`
        #[arg(long)]
        from: Option<String>,
        /// Last day, `YYYY-MM-DD`
        #[arg(long)]
        to: Option<String>,
    },
    /// Spending and cashback per card
    Cards {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// Largest total first instead of by card
        #[arg(long)]
        by_total: bool,
    },
    /// Transactions paid within the last 90 days
    Recent {
        /// Reference moment, `YYYY-MM-DD HH:MM:SS` (default: now)
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Case-insensitive search across all fields
    Search { query: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let (output, ok) = run(cli).await;
    println!("{output}");
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Run one command; returns the rendered JSON and whether it succeeded.
async fn run(cli: Cli) -> (String, bool) {
    let mut app = SpendingInsights::new(&cli.ledger, &cli.settings, build_registry(&cli.settings));
    if let Some(dir) = cli.output_dir {
        let sink = FileSink::new(dir);
        log::info!("Saving reports under {}", sink.dir().display());
        app = app.with_sink(Box::new(sink), cli.output_name);
    }

    match cli.command {
        Command::Home { at } => {
            for kind in [QuoteKind::Currency, QuoteKind::Stock] {
                if app.is_provider_available(&kind) {
                    log::debug!("{kind:?} quotes from {:?}", app.get_provider_names(&kind));
                } else {
                    log::warn!("No {kind:?} quote provider configured");
                }
            }
            let at = at.unwrap_or_else(|| now().format(ISO_DATETIME).to_string());
            let page = app.home_page(&at).await;
            (page.render_status(), page.is_success())
        }
        Command::Category { category, as_of } => {
            let as_of = as_of.unwrap_or_else(|| now().format(DAY_FIRST_DATE).to_string());
            app.spending_by_category(&category, &as_of).render()
        }
        Command::CategoryTrend { category, start } => {
            app.expenses_by_category(&category, &start).render()
        }
        Command::Weekday { as_of } => app.expenses_by_weekday(as_of.as_deref()).render(),
        Command::Top { count, from, to } => match day_range(from.as_deref(), to.as_deref()) {
            Ok(window) => app.top_transactions(window.as_ref(), count).render(),
            Err(e) => ReportEnvelope::<()>::error(&e).render(),
        },
        Command::Cards { from, to, by_total } => {
            let order = if by_total {
                CardOrder::ByTotalDesc
            } else {
                CardOrder::ByCard
            };
            match day_range(from.as_deref(), to.as_deref()) {
                Ok(window) => app.card_summary(window.as_ref(), order).render(),
                Err(e) => ReportEnvelope::<()>::error(&e).render(),
            }
        }
        Command::Recent { as_of } => app.recent_transactions(as_of.as_deref()).render(),
        Command::Search { query } => app.search(&query).render(),
    }
}

/// Quote providers configured from the settings file's API keys, with
/// `ALPHAVANTAGE_API_KEY` taking precedence.
fn build_registry(settings_path: &str) -> QuoteProviderRegistry {
    let mut api_keys = match load_settings(settings_path) {
        Ok(settings) => settings.api_keys,
        Err(e) => {
            log::debug!("No API keys from settings: {e}");
            Default::default()
        }
    };
    if let Ok(key) = std::env::var("ALPHAVANTAGE_API_KEY") {
        api_keys.insert("alphavantage".to_string(), key);
    }
    QuoteProviderRegistry::new_with_defaults(&api_keys)
}

/// Whole calendar days `from..=to`; either side may be open.
fn day_range(from: Option<&str>, to: Option<&str>) -> Result<Option<DateWindow>, CoreError> {
    let end = match to {
        Some(to) => Some(select_window(parse_reference(to, ISO_DATE)?, WindowPolicy::Cutoff)?.end),
        None => None,
    };
    let start = match from {
        Some(from) => Some(parse_reference(from, ISO_DATE)?),
        None => None,
    };
    match (start, end) {
        (None, None) => Ok(None),
        (None, Some(end)) => Ok(Some(DateWindow::until(end))),
        (Some(start), end) => DateWindow::between(start, end.unwrap_or_else(now)).map(Some),
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Single reports print the bare JSON shape.
trait Render {
    fn render(&self) -> (String, bool);
}

impl<T: serde::Serialize> Render for ReportEnvelope<T> {
    fn render(&self) -> (String, bool) {
        (self.render_bare(), self.is_success())
    }
}
