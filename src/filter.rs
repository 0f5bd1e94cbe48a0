// Multi-select filtering over the four report dimensions.
//
// Option sets are always computed from the FULL normalized table, never from
// a filtered view: the dimensions are independent, not cascading. Filtering
// clones matching rows into a derived view and leaves the source untouched.
use crate::types::Record;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Month,
    Year,
    FiscalYear,
    Sprint,
}

/// Sorted distinct non-null values per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub months: Vec<String>,
    pub years: Vec<i32>,
    pub fiscal_years: Vec<String>,
    pub sprints: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[Record]) -> Self {
        let months: BTreeSet<&str> = records.iter().map(|r| r.month.as_str()).collect();
        let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
        let fiscal_years: BTreeSet<&str> =
            records.iter().map(|r| r.fiscal_year.as_str()).collect();
        let sprints: BTreeSet<&str> = records
            .iter()
            .filter_map(|r| r.sprint.as_deref())
            .collect();
        FilterOptions {
            months: months.into_iter().map(str::to_string).collect(),
            years: years.into_iter().collect(),
            fiscal_years: fiscal_years.into_iter().map(str::to_string).collect(),
            sprints: sprints.into_iter().map(str::to_string).collect(),
        }
    }

    /// One dimension's options rendered as display strings.
    pub fn values(&self, dimension: Dimension) -> Vec<String> {
        match dimension {
            Dimension::Month => self.months.clone(),
            Dimension::Year => self.years.iter().map(|y| y.to_string()).collect(),
            Dimension::FiscalYear => self.fiscal_years.clone(),
            Dimension::Sprint => self.sprints.clone(),
        }
    }
}

/// The user's current multi-select state, one set per dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selections {
    pub months: BTreeSet<String>,
    pub years: BTreeSet<i32>,
    pub fiscal_years: BTreeSet<String>,
    pub sprints: BTreeSet<String>,
}

impl Selections {
    /// Default state: everything selected, i.e. an unfiltered view.
    pub fn select_all(options: &FilterOptions) -> Self {
        Selections {
            months: options.months.iter().cloned().collect(),
            years: options.years.iter().copied().collect(),
            fiscal_years: options.fiscal_years.iter().cloned().collect(),
            sprints: options.sprints.iter().cloned().collect(),
        }
    }

    /// A record passes iff its value in every dimension is a selected
    /// member. A null sprint is a member of no selection set, so such rows
    /// are excluded even when every option is selected.
    pub fn matches(&self, record: &Record) -> bool {
        self.months.contains(&record.month)
            && self.years.contains(&record.year)
            && self.fiscal_years.contains(&record.fiscal_year)
            && record
                .sprint
                .as_ref()
                .is_some_and(|s| self.sprints.contains(s))
    }
}

/// Derived view of `records` in source order; the input is not mutated.
pub fn apply_filters(records: &[Record], selections: &Selections) -> Vec<Record> {
    records
        .iter()
        .filter(|r| selections.matches(r))
        .cloned()
        .collect()
}
