// Fiscal-calendar derivation.
//
// The fiscal year runs April 1 through March 31 and is labeled by its end
// year: Apr 2024 – Mar 2025 is "FY2025". Quarters follow the same calendar,
// so Q4 (Jan–Mar) falls in the calendar year after the one that started the
// fiscal year.
use chrono::{Datelike, NaiveDate};

/// Calendar end-year of the fiscal year containing `date`.
pub fn fiscal_year(date: NaiveDate) -> i32 {
    if date.month() >= 4 {
        date.year() + 1
    } else {
        date.year()
    }
}

pub fn fiscal_year_label(date: NaiveDate) -> String {
    format!("FY{}", fiscal_year(date))
}

/// Q1=Apr–Jun, Q2=Jul–Sep, Q3=Oct–Dec, Q4=Jan–Mar.
pub fn fiscal_quarter(date: NaiveDate) -> &'static str {
    match date.month() {
        4..=6 => "Q1",
        7..=9 => "Q2",
        10..=12 => "Q3",
        _ => "Q4",
    }
}

pub fn fiscal_year_quarter(date: NaiveDate) -> String {
    format!("{} {}", fiscal_year_label(date), fiscal_quarter(date))
}

/// Full English month name, e.g. "May".
pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}
