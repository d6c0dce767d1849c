//! # Simply Back Office Library
//!
//! Point of sale and back office for Simply Cosméticos: the hooks and
//! workflows the screens call, on top of `simply-core` (business rules)
//! and `simply-db` (stores).
//!
//! ## Module Organization
//! ```text
//! simply_backoffice/
//! ├── lib.rs          ◄─── You are here (startup, command-line entry)
//! ├── state/
//! │   ├── config.rs   ◄─── AppConfig from SIMPLY_* variables
//! │   └── context.rs  ◄─── AppContext: stores built once, injected
//! ├── hooks/
//! │   ├── products.rs ◄─── Catalog list, barcode lookup
//! │   ├── customers.rs
//! │   ├── sales.rs    ◄─── Sales list, sale deletion
//! │   └── auth.rs     ◄─── Session check, login/logout, sign-up
//! ├── workflow/
//! │   ├── checkout.rs ◄─── Dialog and till checkout state machine
//! │   └── reports.rs  ◄─── Reports, exports, dashboard
//! ├── receipt.rs      ◄─── Printable HTML receipt
//! ├── notify.rs       ◄─── Notification + Notifier
//! └── error.rs        ◄─── ApiError for every hook/workflow
//! ```

pub mod error;
pub mod hooks;
pub mod notify;
pub mod receipt;
pub mod state;
pub mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use simply_core::export::ExportFormat;
use simply_core::formatters::format_currency;
use simply_core::report::ReportPeriod;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use error::{ApiError, ErrorCode};
pub use notify::{Notification, NotificationLog, NotificationVariant, Notifier, TracingNotifier};
pub use state::{AppConfig, AppContext};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=simply=trace` - Show trace for simply crates only
/// - Default: `info,simply=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,simply=debug,sqlx=warn"));

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the dashboard totals.
    Dashboard,
    /// Export the sales report for a period.
    Report {
        period: ReportPeriod,
        format: ExportFormat,
        out_dir: PathBuf,
    },
    Help,
}

pub const USAGE: &str = "\
Simply POS Back Office

Usage:
  simply-backoffice [dashboard]
  simply-backoffice report [--days <N>] [--format csv|pdf] [--out <DIR>]

Options:
  --days <N>        Report period in days (default: SIMPLY_REPORT_PERIOD_DAYS or 30)
  --format <FMT>    csv or pdf (default: pdf)
  --out <DIR>       Output directory (default: current directory)
  -h, --help        Show this help message";

/// Parses `args` (without the program name).
pub fn parse_args(args: &[String], config: &AppConfig) -> Result<Command, ApiError> {
    let mut iter = args.iter().map(String::as_str);

    match iter.next() {
        None | Some("dashboard") => Ok(Command::Dashboard),
        Some("-h") | Some("--help") | Some("help") => Ok(Command::Help),
        Some("report") => {
            let mut period = config.report_period();
            let mut format = ExportFormat::Pdf;
            let mut out_dir = PathBuf::from(".");

            while let Some(flag) = iter.next() {
                let mut value = || {
                    iter.next()
                        .ok_or_else(|| ApiError::validation(format!("{} needs a value", flag)))
                };
                match flag {
                    "--days" | "-d" => {
                        let raw = value()?;
                        let days = raw
                            .parse::<i64>()
                            .map_err(|_| ApiError::validation(format!("invalid day count: {}", raw)))?;
                        period = ReportPeriod::new(days)
                            .map_err(|e| ApiError::validation(e.to_string()))?;
                    }
                    "--format" | "-f" => {
                        format = match value()? {
                            "csv" => ExportFormat::Csv,
                            "pdf" => ExportFormat::Pdf,
                            other => {
                                return Err(ApiError::validation(format!(
                                    "unknown format: {}",
                                    other
                                )))
                            }
                        };
                    }
                    "--out" | "-o" => out_dir = PathBuf::from(value()?),
                    "-h" | "--help" => return Ok(Command::Help),
                    other => {
                        return Err(ApiError::validation(format!("unknown option: {}", other)))
                    }
                }
            }

            Ok(Command::Report {
                period,
                format,
                out_dir,
            })
        }
        Some(other) => Err(ApiError::validation(format!("unknown command: {}", other))),
    }
}

/// Runs one command against the configured database.
pub async fn run(args: &[String]) -> Result<(), ApiError> {
    let config = AppConfig::from_env();
    let command = parse_args(args, &config)?;

    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    info!(store = %config.store_name, "Starting Simply POS back office");
    let ctx = AppContext::open(config, Arc::new(TracingNotifier)).await?;

    match command {
        Command::Dashboard => {
            let stats = ctx.reports().dashboard().await?;
            println!("{}", ctx.config.store_name);
            println!("  Vendas totais:     {}", format_currency(stats.total_sales));
            println!("  Vendas hoje:       {}", format_currency(stats.today_sales));
            println!("  Número de vendas:  {}", stats.sales_count);
            println!("  Lucro total:       {}", format_currency(stats.total_profit));
            println!("  Produtos ativos:   {}", stats.total_products);
            println!("  Estoque baixo:     {}", stats.low_stock_products);
        }
        Command::Report {
            period,
            format,
            out_dir,
        } => {
            let reports = ctx.reports();
            let report = reports.load(period).await?;
            let file = reports.export(&report, format);

            std::fs::create_dir_all(&out_dir).map_err(|e| {
                ApiError::internal(format!("Could not create {}: {}", out_dir.display(), e))
            })?;
            let path = out_dir.join(&file.file_name);
            std::fs::write(&path, &file.bytes).map_err(|e| {
                ApiError::internal(format!("Could not write {}: {}", path.display(), e))
            })?;
            println!("{}", path.display());
        }
        Command::Help => {}
    }

    Ok(())
}
