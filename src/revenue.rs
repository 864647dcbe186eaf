// Revenue Data Model
// Typed spreadsheet rows, month vocabulary, and the wide -> long melt

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MONTHS_PER_YEAR: usize = 12;

// ============================================================================
// MONTH VOCABULARY
// ============================================================================

/// Calendar month; bijective with the labels 一月..十二月 and the indices 1..=12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Month {
    January = 1,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All months in calendar order
    pub const ALL: [Month; MONTHS_PER_YEAR] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Spreadsheet column label
    pub fn label(&self) -> &'static str {
        match self {
            Month::January => "一月",
            Month::February => "二月",
            Month::March => "三月",
            Month::April => "四月",
            Month::May => "五月",
            Month::June => "六月",
            Month::July => "七月",
            Month::August => "八月",
            Month::September => "九月",
            Month::October => "十月",
            Month::November => "十一月",
            Month::December => "十二月",
        }
    }

    /// 1-based month number
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Option<Month> {
        match index {
            1..=12 => Some(Month::ALL[usize::from(index) - 1]),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Month> {
        Month::ALL.iter().copied().find(|m| m.label() == label.trim())
    }

    fn offset(&self) -> usize {
        usize::from(self.index()) - 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> u8 {
        month.index()
    }
}

impl TryFrom<u8> for Month {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Month::from_index(index).ok_or_else(|| format!("month index {} outside 1..=12", index))
    }
}

// ============================================================================
// ROWS
// ============================================================================

/// One company's line of the analytics sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRevenueRow {
    pub company: String,
    pub total_revenue: f64,
    /// Monthly revenue, January first
    pub months: [f64; MONTHS_PER_YEAR],
}

impl CompanyRevenueRow {
    pub fn new(company: impl Into<String>, total_revenue: f64, months: [f64; MONTHS_PER_YEAR]) -> Self {
        CompanyRevenueRow {
            company: company.into(),
            total_revenue,
            months,
        }
    }

    pub fn month_value(&self, month: Month) -> f64 {
        self.months[month.offset()]
    }
}

/// One (company, month) observation of the long-form table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEntry {
    pub company: String,
    /// Copied from the source row
    pub total_revenue: f64,
    pub month: Month,
    pub month_value: f64,
}

impl MonthlyEntry {
    pub fn month_label(&self) -> &'static str {
        self.month.label()
    }
}

/// Total revenue bar for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyTotal {
    pub company: String,
    pub total_revenue: f64,
}

// ============================================================================
// TRANSFORMS
// ============================================================================

/// Melt rows into one entry per (company, month).
///
/// Rows keep their input order; within a row, months run January to December.
pub fn to_long(rows: &[CompanyRevenueRow]) -> Vec<MonthlyEntry> {
    let mut entries = Vec::with_capacity(rows.len() * MONTHS_PER_YEAR);

    for row in rows {
        for month in Month::ALL {
            entries.push(MonthlyEntry {
                company: row.company.clone(),
                total_revenue: row.total_revenue,
                month,
                month_value: row.month_value(month),
            });
        }
    }

    tracing::debug!(rows = rows.len(), entries = entries.len(), "Melted revenue rows");
    entries
}

/// Company totals in input order, for the revenue-per-company bar chart
pub fn company_totals(rows: &[CompanyRevenueRow]) -> Vec<CompanyTotal> {
    rows.iter()
        .map(|row| CompanyTotal {
            company: row.company.clone(),
            total_revenue: row.total_revenue,
        })
        .collect()
}

/// Axis label in millions: 10_000_000 -> "10.0M"
pub fn format_millions(value: f64) -> String {
    format!("{:.1}M", value * 1e-6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(company: &str, base: f64) -> CompanyRevenueRow {
        let mut months = [0.0; MONTHS_PER_YEAR];
        for (i, value) in months.iter_mut().enumerate() {
            *value = base + i as f64;
        }
        CompanyRevenueRow::new(company, months.iter().sum(), months)
    }

    #[test]
    fn test_month_label_mapping_is_bijective() {
        for (i, month) in Month::ALL.iter().enumerate() {
            assert_eq!(month.index() as usize, i + 1);
            assert_eq!(Month::from_label(month.label()), Some(*month));
            assert_eq!(Month::from_index(month.index()), Some(*month));
        }
        assert_eq!(Month::from_label("十三月"), None);
        assert_eq!(Month::from_index(0), None);
        assert_eq!(Month::from_index(13), None);
    }

    #[test]
    fn test_month_serializes_as_index() {
        assert_eq!(serde_json::to_string(&Month::March).unwrap(), "3");
        let month: Month = serde_json::from_str("12").unwrap();
        assert_eq!(month, Month::December);
        assert!(serde_json::from_str::<Month>("13").is_err());
    }

    #[test]
    fn test_to_long_order_and_length() {
        let rows = vec![sample_row("华东", 100.0), sample_row("华北", 200.0)];
        let long = to_long(&rows);

        assert_eq!(long.len(), rows.len() * MONTHS_PER_YEAR);
        assert_eq!(long[0].company, "华东");
        assert_eq!(long[0].month, Month::January);
        assert_eq!(long[11].month, Month::December);
        assert_eq!(long[12].company, "华北");
        assert_eq!(long[12].month, Month::January);
        assert_eq!(long[12].month_value, 200.0);
        assert_eq!(long[5].month_label(), "六月");
    }

    #[test]
    fn test_to_long_repeats_total() {
        let rows = vec![sample_row("华南", 1.0)];
        let long = to_long(&rows);
        assert!(long.iter().all(|e| e.total_revenue == rows[0].total_revenue));
    }

    #[test]
    fn test_to_long_empty() {
        assert!(to_long(&[]).is_empty());
    }

    #[test]
    fn test_company_totals_keep_input_order() {
        let rows = vec![sample_row("乙", 5.0), sample_row("甲", 1.0)];
        let totals = company_totals(&rows);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].company, "乙");
        assert_eq!(totals[1].total_revenue, rows[1].total_revenue);
    }

    #[test]
    fn test_format_millions() {
        assert_eq!(format_millions(10_000_000.0), "10.0M");
        assert_eq!(format_millions(1_260_000.0), "1.3M");
        assert_eq!(format_millions(0.0), "0.0M");
    }
}
