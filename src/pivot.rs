// Revenue Pivot
// Long-form monthly entries -> month x company matrix for trend charts

use crate::error::ReshapeError;
use crate::revenue::{to_long, CompanyRevenueRow, Month, MonthlyEntry, MONTHS_PER_YEAR};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Wide-form table: one row per month (January first), one column per company.
///
/// Columns follow the order in which companies first appear in the long-form
/// input, so identical input always yields the identical layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueMatrix {
    pub companies: Vec<String>,
    /// `values[month_offset][company_offset]`
    pub values: Vec<Vec<f64>>,
}

impl RevenueMatrix {
    pub fn month_count(&self) -> usize {
        self.values.len()
    }

    pub fn company_count(&self) -> usize {
        self.companies.len()
    }

    /// Iterate rows as (month, values per company)
    pub fn rows(&self) -> impl Iterator<Item = (Month, &[f64])> + '_ {
        Month::ALL
            .into_iter()
            .zip(self.values.iter())
            .map(|(month, row)| (month, row.as_slice()))
    }

    pub fn get(&self, month: Month, company: &str) -> Option<f64> {
        let column = self.column_index(company)?;
        self.values
            .get(usize::from(month.index()) - 1)
            .and_then(|row| row.get(column))
            .copied()
    }

    /// Chart points `(month_index, value)` for one company.
    /// Months whose row has no cell for the company are skipped.
    pub fn series(&self, company: &str) -> Option<Vec<(f64, f64)>> {
        let column = self.column_index(company)?;
        Some(
            self.rows()
                .filter_map(|(month, row)| {
                    row.get(column)
                        .map(|&value| (f64::from(month.index()), value))
                })
                .collect(),
        )
    }

    fn column_index(&self, company: &str) -> Option<usize> {
        self.companies.iter().position(|c| c == company)
    }
}

/// Pivot long-form entries into a [`RevenueMatrix`].
///
/// Every (month, company) combination must be present exactly once. Absent
/// cells are reported as `MissingDataPoint` instead of being filled with zero.
///
/// # Errors
/// * `ReshapeError::DuplicateDataPoint` - the same (month, company) appears twice
/// * `ReshapeError::MissingDataPoint` - a (month, company) cell has no entry
pub fn to_wide(entries: &[MonthlyEntry]) -> Result<RevenueMatrix, ReshapeError> {
    let mut companies: Vec<String> = Vec::new();
    let mut column_of: HashMap<&str, usize> = HashMap::new();
    let mut cells: HashMap<(Month, usize), f64> = HashMap::with_capacity(entries.len());

    for entry in entries {
        let column = match column_of.get(entry.company.as_str()) {
            Some(&column) => column,
            None => {
                companies.push(entry.company.clone());
                column_of.insert(entry.company.as_str(), companies.len() - 1);
                companies.len() - 1
            }
        };

        if cells.insert((entry.month, column), entry.month_value).is_some() {
            return Err(ReshapeError::DuplicateDataPoint {
                company: entry.company.clone(),
                month: entry.month.index(),
            });
        }
    }

    let mut values = Vec::with_capacity(MONTHS_PER_YEAR);
    for month in Month::ALL {
        let mut row = Vec::with_capacity(companies.len());
        for (column, company) in companies.iter().enumerate() {
            match cells.get(&(month, column)) {
                Some(&value) => row.push(value),
                None => {
                    return Err(ReshapeError::MissingDataPoint {
                        company: company.clone(),
                        month: month.index(),
                    })
                }
            }
        }
        values.push(row);
    }

    tracing::debug!(
        months = values.len(),
        companies = companies.len(),
        "Pivoted revenue entries"
    );

    Ok(RevenueMatrix { companies, values })
}

// ============================================================================
// REPORT
// ============================================================================

/// Both chart-ready tables derived from one set of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub long: Vec<MonthlyEntry>,
    pub wide: RevenueMatrix,
}

impl RevenueReport {
    /// SHA-256 over the long-form table, using exact float bit patterns.
    ///
    /// Two reports built from the same rows always share a digest.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.long {
            hasher.update(format!(
                "{}\u{1f}{:016x}\u{1f}{}\u{1f}{:016x}\n",
                entry.company,
                entry.total_revenue.to_bits(),
                entry.month.index(),
                entry.month_value.to_bits()
            ));
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Melt then pivot in one call
pub fn reshape_revenue(rows: &[CompanyRevenueRow]) -> Result<RevenueReport, ReshapeError> {
    let long = to_long(rows);
    let wide = to_wide(&long)?;
    Ok(RevenueReport { long, wide })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str, scale: f64) -> CompanyRevenueRow {
        let mut months = [0.0; MONTHS_PER_YEAR];
        for (i, value) in months.iter_mut().enumerate() {
            *value = scale * (i as f64 + 1.0);
        }
        CompanyRevenueRow::new(company, months.iter().sum(), months)
    }

    #[test]
    fn test_to_wide_shape_and_cells() {
        let rows = vec![row("甲公司", 1000.0), row("乙公司", 10.0)];
        let wide = to_wide(&to_long(&rows)).unwrap();

        assert_eq!(wide.month_count(), 12);
        assert_eq!(wide.company_count(), 2);
        assert_eq!(wide.companies, vec!["甲公司".to_string(), "乙公司".to_string()]);

        for source in &rows {
            for month in Month::ALL {
                assert_eq!(
                    wide.get(month, &source.company),
                    Some(source.month_value(month))
                );
            }
        }
    }

    #[test]
    fn test_columns_follow_first_seen_order() {
        let rows = vec![row("Zeta", 1.0), row("Alpha", 2.0)];
        let wide = to_wide(&to_long(&rows)).unwrap();
        assert_eq!(wide.companies, vec!["Zeta".to_string(), "Alpha".to_string()]);
    }

    #[test]
    fn test_missing_data_point() {
        let rows = vec![row("甲公司", 1.0), row("乙公司", 2.0)];
        let mut long = to_long(&rows);
        let removed = long.remove(12 + 4); // 乙公司, May

        let err = to_wide(&long).unwrap_err();
        assert_eq!(
            err,
            ReshapeError::MissingDataPoint {
                company: removed.company,
                month: 5,
            }
        );
    }

    #[test]
    fn test_duplicate_data_point() {
        let rows = vec![row("甲公司", 1.0)];
        let mut long = to_long(&rows);
        long.push(long[2].clone());

        let err = to_wide(&long).unwrap_err();
        assert_eq!(
            err,
            ReshapeError::DuplicateDataPoint {
                company: "甲公司".to_string(),
                month: 3,
            }
        );
    }

    #[test]
    fn test_empty_input_has_twelve_empty_rows() {
        let wide = to_wide(&[]).unwrap();
        assert_eq!(wide.month_count(), 12);
        assert_eq!(wide.company_count(), 0);
    }

    #[test]
    fn test_series_points() {
        let rows = vec![row("甲公司", 2.0)];
        let wide = to_wide(&to_long(&rows)).unwrap();
        let series = wide.series("甲公司").unwrap();
        assert_eq!(series.len(), 12);
        assert_eq!(series[0], (1.0, 2.0));
        assert_eq!(series[11], (12.0, 24.0));
        assert!(wide.series("不存在").is_none());
    }

    #[test]
    fn test_series_skips_short_rows() {
        let wide = RevenueMatrix {
            companies: vec!["甲公司".to_string(), "乙公司".to_string()],
            values: vec![vec![1.0, 2.0], vec![3.0]],
        };
        assert_eq!(wide.series("乙公司"), Some(vec![(1.0, 2.0)]));
        assert_eq!(wide.series("甲公司"), Some(vec![(1.0, 1.0), (2.0, 3.0)]));
        assert_eq!(wide.get(Month::February, "乙公司"), None);
    }

    #[test]
    fn test_reshape_is_deterministic() {
        let rows = vec![row("甲公司", 1.5), row("乙公司", 0.25)];
        let first = reshape_revenue(&rows).unwrap();
        let second = reshape_revenue(&rows).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.digest(), second.digest());
    }

    #[test]
    fn test_digest_changes_with_values() {
        let a = reshape_revenue(&[row("甲公司", 1.0)]).unwrap();
        let b = reshape_revenue(&[row("甲公司", 1.0000001)]).unwrap();
        assert_ne!(a.digest(), b.digest());
    }
}
