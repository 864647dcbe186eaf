// Dashboard context
// Explicit per-invocation state handed to every handler; nothing is process-global

use crate::config::DashboardConfig;
use crate::error::NumeralError;
use crate::numeral::{parse_amount, parse_rmb_upper, MAX_VALUE};
use crate::pivot::{reshape_revenue, RevenueReport};
use crate::revenue::CompanyRevenueRow;
use crate::sheet::load_revenue_csv;
use anyhow::{anyhow, Result};
use std::path::Path;

/// Message shown for converter input that is not a plain non-negative integer
pub const INVALID_INTEGER_MESSAGE: &str = "Please enter a valid positive integer.";

/// Rows of a loaded sheet together with the tables derived from them
#[derive(Debug, Clone)]
pub struct Analytics {
    pub rows: Vec<CompanyRevenueRow>,
    pub report: RevenueReport,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardContext {
    pub config: DashboardConfig,
}

impl DashboardContext {
    pub fn new(config: DashboardConfig) -> Self {
        DashboardContext { config }
    }

    /// Converter widget: validate raw text, then format it.
    ///
    /// Only ASCII digits are accepted; anything else (including an empty
    /// string, signs and whitespace) is rejected before formatting.
    pub fn convert_input(&self, input: &str) -> Result<String, NumeralError> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NumeralError::InvalidInput(INVALID_INTEGER_MESSAGE.to_string()));
        }

        let value: u64 = input.parse().map_err(|_| NumeralError::OutOfRange {
            value: input.to_string(),
            max: MAX_VALUE,
        })?;

        self.config.numeral.format(value)
    }

    /// Yuan amount with up to two decimals -> numeral with 元/角/分
    pub fn convert_amount(&self, input: &str) -> Result<String, NumeralError> {
        let fen = parse_amount(input)?;
        self.config.numeral.format_amount(fen)
    }

    pub fn parse_numeral(&self, input: &str) -> Result<u64, NumeralError> {
        parse_rmb_upper(input)
    }

    /// Load a sheet (explicit path or the configured one) and reshape it
    pub fn load_analytics(&self, path: Option<&Path>) -> Result<Analytics> {
        let path = path
            .or(self.config.sheet.path.as_deref())
            .ok_or_else(|| anyhow!("No revenue sheet given and none configured"))?;

        let rows = load_revenue_csv(path, self.config.sheet.delimiter_byte()?)?;
        let report = reshape_revenue(&rows)?;

        Ok(Analytics { rows, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use crate::numeral::RmbFormatter;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_convert_valid_input() {
        let ctx = DashboardContext::default();
        assert_eq!(ctx.convert_input("0").unwrap(), "零");
        assert_eq!(ctx.convert_input("100000005").unwrap(), "壹亿零伍");
        assert_eq!(ctx.convert_input("007").unwrap(), "柒");
    }

    #[test]
    fn test_convert_rejects_non_digits() {
        let ctx = DashboardContext::default();
        for input in ["", "-5", "1.5", " 12", "12a", "１２"] {
            assert_eq!(
                ctx.convert_input(input).unwrap_err(),
                NumeralError::InvalidInput(INVALID_INTEGER_MESSAGE.to_string()),
                "{:?}",
                input
            );
        }
    }

    #[test]
    fn test_convert_out_of_range() {
        let ctx = DashboardContext::default();
        assert!(matches!(
            ctx.convert_input("10000000000000000"),
            Err(NumeralError::OutOfRange { .. })
        ));
        assert!(matches!(
            ctx.convert_input("99999999999999999999999"),
            Err(NumeralError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_convert_uses_configured_formatter() {
        let mut config = DashboardConfig::default();
        config.numeral = RmbFormatter::new(false);
        let ctx = DashboardContext::new(config);
        assert_eq!(ctx.convert_input("12").unwrap(), "壹拾贰");
    }

    #[test]
    fn test_convert_amount() {
        let ctx = DashboardContext::default();
        assert_eq!(ctx.convert_amount("1.05").unwrap(), "壹元零伍分");
        assert!(ctx.convert_amount("1.005").is_err());
    }

    #[test]
    fn test_load_analytics_requires_a_sheet() {
        let ctx = DashboardContext::default();
        assert!(ctx.load_analytics(None).is_err());
    }

    #[test]
    fn test_load_analytics_from_configured_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "公司;收入;一月;二月;三月;四月;五月;六月;七月;八月;九月;十月;十一月;十二月").unwrap();
        writeln!(file, "甲公司;12;1;1;1;1;1;1;1;1;1;1;1;1").unwrap();
        file.flush().unwrap();

        let config = DashboardConfig {
            sheet: SheetConfig {
                path: Some(file.path().to_path_buf()),
                delimiter: ";".to_string(),
            },
            ..DashboardConfig::default()
        };
        let analytics = DashboardContext::new(config).load_analytics(None).unwrap();

        assert_eq!(analytics.rows.len(), 1);
        assert_eq!(analytics.report.long.len(), 12);
        assert_eq!(analytics.report.wide.company_count(), 1);
    }
}
