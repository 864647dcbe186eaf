// Analytics Sheet Loader
// CSV export of the "Analytics" sheet -> Vec<CompanyRevenueRow>

use crate::revenue::{CompanyRevenueRow, MONTHS_PER_YEAR};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Raw sheet line, columns matched by header name.
/// Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct SheetRecord {
    #[serde(rename = "公司")]
    company: String,

    #[serde(rename = "收入")]
    total_revenue: f64,

    #[serde(rename = "一月")]
    jan: f64,
    #[serde(rename = "二月")]
    feb: f64,
    #[serde(rename = "三月")]
    mar: f64,
    #[serde(rename = "四月")]
    apr: f64,
    #[serde(rename = "五月")]
    may: f64,
    #[serde(rename = "六月")]
    jun: f64,
    #[serde(rename = "七月")]
    jul: f64,
    #[serde(rename = "八月")]
    aug: f64,
    #[serde(rename = "九月")]
    sep: f64,
    #[serde(rename = "十月")]
    oct: f64,
    #[serde(rename = "十一月")]
    nov: f64,
    #[serde(rename = "十二月")]
    dec: f64,
}

impl SheetRecord {
    fn into_row(self, line: usize) -> Result<CompanyRevenueRow> {
        let months: [f64; MONTHS_PER_YEAR] = [
            self.jan, self.feb, self.mar, self.apr, self.may, self.jun, self.jul, self.aug,
            self.sep, self.oct, self.nov, self.dec,
        ];

        if !self.total_revenue.is_finite() {
            bail!("Line {}: total revenue for '{}' is not a finite number", line, self.company);
        }
        if let Some(i) = months.iter().position(|v| !v.is_finite()) {
            bail!(
                "Line {}: month {} for '{}' is not a finite number",
                line,
                i + 1,
                self.company
            );
        }

        Ok(CompanyRevenueRow::new(self.company.trim(), self.total_revenue, months))
    }
}

/// Load revenue rows from a CSV file
pub fn load_revenue_csv(csv_path: &Path, delimiter: u8) -> Result<Vec<CompanyRevenueRow>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open revenue sheet {}", csv_path.display()))?;
    let rows = read_revenue_csv(file, delimiter)
        .with_context(|| format!("Failed to read revenue sheet {}", csv_path.display()))?;

    tracing::info!(path = %csv_path.display(), rows = rows.len(), "Loaded revenue sheet");
    Ok(rows)
}

/// Load revenue rows from any reader (first line is the header)
pub fn read_revenue_csv<R: Read>(reader: R, delimiter: u8) -> Result<Vec<CompanyRevenueRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();

    for (idx, result) in rdr.deserialize::<SheetRecord>().enumerate() {
        // +2: header line, 1-based numbering
        let line = idx + 2;
        let record = result.with_context(|| format!("Failed to deserialize line {}", line))?;
        rows.push(record.into_row(line)?);
    }

    Ok(rows)
}
