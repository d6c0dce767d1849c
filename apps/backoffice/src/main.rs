//! # Simply Back Office Entry Point
//!
//! Operator commands against the store database.
//!
//! ## Usage
//! ```bash
//! # Dashboard totals
//! cargo run -p simply-backoffice
//!
//! # Last 7 days as CSV into ./relatorios
//! cargo run -p simply-backoffice -- report --days 7 --format csv --out ./relatorios
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load `AppConfig` from `SIMPLY_*` variables
//! 3. Open the database & run migrations
//! 4. Run the command

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    simply_backoffice::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // The actual setup is in lib.rs for better testability
    match simply_backoffice::run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.message);
            if e.code == simply_backoffice::ErrorCode::ValidationError {
                eprintln!();
                eprintln!("{}", simply_backoffice::USAGE);
            }
            ExitCode::FAILURE
        }
    }
}
