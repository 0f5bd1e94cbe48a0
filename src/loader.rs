use crate::fiscal;
use crate::types::{RawRow, Record};
use crate::util::{parse_date_safe, parse_f64_safe};
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use csv::{ReaderBuilder, Trim};
use log::warn;
use std::io::Read;
use std::path::Path;

/// Conventional report location used when no file is supplied explicitly.
pub const DEFAULT_REPORT_PATH: &str = "execution_report.csv";

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

/// Load the execution report from `source`, falling back to
/// [`DEFAULT_REPORT_PATH`] when none is given.
///
/// An explicit source that cannot be read is an error. Having neither a
/// source nor a default file is not: it yields an empty table plus a warning,
/// and every downstream aggregate degrades to its neutral value.
pub fn load(source: Option<&Path>) -> Result<(Vec<Record>, LoadReport)> {
    load_or_default(source, Path::new(DEFAULT_REPORT_PATH))
}

pub fn load_or_default(
    source: Option<&Path>,
    default_path: &Path,
) -> Result<(Vec<Record>, LoadReport)> {
    match source {
        Some(path) => load_from_path(path),
        None if default_path.exists() => load_from_path(default_path),
        None => {
            warn!(
                "no report supplied and {} not found; starting with an empty table",
                default_path.display()
            );
            Ok((Vec::new(), LoadReport::default()))
        }
    }
}

pub fn load_from_path(path: &Path) -> Result<(Vec<Record>, LoadReport)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening execution report {}", path.display()))?;
    load_from_reader(file)
}

/// Parse a CSV execution report into normalized records.
///
/// Header labels and cells are whitespace-trimmed; columns may appear in any
/// order and any subset (absent columns become all-null fields). Rows whose
/// shape defeats deserialization entirely are skipped and counted, never
/// fatal.
pub fn load_from_reader<R: Read>(reader: R) -> Result<(Vec<Record>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    // Resolved once so every row in one load shares the same fallback day.
    let today = Local::now().date_naive();

    let mut report = LoadReport::default();
    let mut records: Vec<Record> = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        match result {
            Ok(raw) => records.push(normalize(raw, today)),
            Err(_) => report.skipped_rows += 1,
        }
    }
    report.loaded_rows = records.len();
    Ok((records, report))
}

/// Turn one raw row into a [`Record`], deriving the calendar fields.
///
/// All coercions are total: unparsable dates and numbers become `None`, and
/// `effective_date` falls back from start date to end date to `today`.
pub fn normalize(raw: RawRow, today: NaiveDate) -> Record {
    let start_date = parse_date_safe(raw.start_date.as_deref());
    let end_date = parse_date_safe(raw.end_date.as_deref());
    let effective_date = start_date.or(end_date).unwrap_or(today);

    Record {
        sprint: clean_str(raw.sprint),
        start_date,
        end_date,
        inference_type: clean_str(raw.inference_type),
        region: clean_str(raw.region),
        cloud_provider: clean_str(raw.cloud_provider),
        current_monthly_cost: parse_f64_safe(raw.current_monthly_cost.as_deref()),
        estimated_monthly_cost: parse_f64_safe(raw.estimated_monthly_cost.as_deref()),
        cost_savings_amount: parse_f64_safe(raw.cost_savings_amount.as_deref()),
        cost_savings_percent: parse_f64_safe(raw.cost_savings_percent.as_deref()),
        achieved_savings: parse_f64_safe(raw.achieved_savings.as_deref()),
        unachievable_savings: parse_f64_safe(raw.unachievable_savings.as_deref()),
        delayed_savings: parse_f64_safe(raw.delayed_savings.as_deref()),
        initiated_savings: parse_f64_safe(raw.initiated_savings.as_deref()),
        effective_date,
        month: fiscal::month_name(effective_date),
        year: effective_date.year(),
        fiscal_year: fiscal::fiscal_year_label(effective_date),
        fiscal_quarter: fiscal::fiscal_quarter(effective_date).to_string(),
        fiscal_year_quarter: fiscal::fiscal_year_quarter(effective_date),
    }
}

fn clean_str(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn load_str(csv: &str) -> (Vec<Record>, LoadReport) {
        load_from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn missing_columns_materialize_as_null_fields() {
        let (records, report) = load_str("Sprint,Cost Savings in $\nS1,200\n");
        assert_eq!(report.loaded_rows, 1);
        let r = &records[0];
        assert_eq!(r.sprint.as_deref(), Some("S1"));
        assert_eq!(r.cost_savings_amount, Some(200.0));
        assert_eq!(r.inference_type, None);
        assert_eq!(r.current_monthly_cost, None);
        assert_eq!(r.start_date, None);
    }

    #[test]
    fn header_whitespace_is_trimmed() {
        let (records, _) = load_str("  Sprint , Cost Savings in $ \nS1,200\n");
        assert_eq!(records[0].sprint.as_deref(), Some("S1"));
        assert_eq!(records[0].cost_savings_amount, Some(200.0));
    }

    #[test]
    fn unparsable_cells_become_null_not_errors() {
        let (records, report) =
            load_str("Sprint,Start Date,Current Monthly Cost ($)\nS1,sometime,lots\n");
        assert_eq!(report.skipped_rows, 0);
        let r = &records[0];
        assert_eq!(r.start_date, None);
        assert_eq!(r.current_monthly_cost, None);
    }

    #[test]
    fn effective_date_falls_back_start_then_end_then_today() {
        let today = d(2026, 8, 25);
        let with_start = normalize(
            RawRow {
                start_date: Some("2024-05-01".into()),
                end_date: Some("2024-06-30".into()),
                ..RawRow::default()
            },
            today,
        );
        assert_eq!(with_start.effective_date, d(2024, 5, 1));

        let end_only = normalize(
            RawRow {
                end_date: Some("2024-06-30".into()),
                ..RawRow::default()
            },
            today,
        );
        assert_eq!(end_only.effective_date, d(2024, 6, 30));

        let neither = normalize(RawRow::default(), today);
        assert_eq!(neither.effective_date, today);
    }

    #[test]
    fn calendar_fields_are_derived_from_effective_date() {
        let r = normalize(
            RawRow {
                start_date: Some("2024-05-15".into()),
                ..RawRow::default()
            },
            d(2026, 8, 25),
        );
        assert_eq!(r.month, "May");
        assert_eq!(r.year, 2024);
        assert_eq!(r.fiscal_year, "FY2025");
        assert_eq!(r.fiscal_quarter, "Q1");
        assert_eq!(r.fiscal_year_quarter, "FY2025 Q1");
    }

    #[test]
    fn missing_default_yields_empty_table() {
        let (records, report) =
            load_or_default(None, Path::new("definitely/not/here.csv")).unwrap();
        assert!(records.is_empty());
        assert_eq!(report.total_rows, 0);
    }
}
