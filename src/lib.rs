// RMB Dashboard - Core Library
// Exposes the numeral formatter and revenue reshaper for the CLI, the TUI, and tests

pub mod error;
pub mod numeral;  // Integer -> RMB uppercase numerals
pub mod revenue;  // Typed sheet rows + wide -> long melt
pub mod pivot;    // Long -> wide pivot for trend charts
pub mod sheet;    // CSV ingestion of the analytics sheet
pub mod config;
pub mod context;  // Per-invocation handler state

// Re-export commonly used types
pub use error::{NumeralError, ReshapeError};
pub use numeral::{
    parse_amount, parse_rmb_upper, to_rmb_upper, RmbFormatter, MAX_VALUE,
};
pub use revenue::{
    company_totals, format_millions, to_long,
    CompanyRevenueRow, CompanyTotal, Month, MonthlyEntry, MONTHS_PER_YEAR,
};
pub use pivot::{reshape_revenue, to_wide, RevenueMatrix, RevenueReport};
pub use sheet::{load_revenue_csv, read_revenue_csv};
pub use config::{DashboardConfig, SheetConfig};
pub use context::{Analytics, DashboardContext};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
