// Aggregation over a (possibly filtered) view of normalized records.
//
// Every function here is a total, read-only fold: empty views and all-null
// columns degrade to zeros and no-values, never to errors. Group maps are
// `BTreeMap` so repeated runs over the same view produce identical output.
use crate::types::Record;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Kpis {
    pub total_recommendations: usize,
    pub total_savings: f64,
    pub weighted_savings_percent: f64,
    pub avg_savings_per_recommendation: Option<f64>,
}

/// Sum an optional column with nulls treated as zero.
fn sum_opt<I>(values: I) -> f64
where
    I: Iterator<Item = Option<f64>>,
{
    values.flatten().sum()
}

/// Mean over the non-null values of a column; `None` when there are none.
fn mean_opt<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = Option<f64>>,
{
    let present: Vec<f64> = values.flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Aggregate savings as a percentage of aggregate current spend.
///
/// When the view has no positive current spend the metric falls back to the
/// unweighted mean of the per-row percentages (and to 0 when those are all
/// null). The fallback deliberately mixes percentage bases; it reproduces
/// the established dashboard behavior.
pub fn weighted_savings_percent(records: &[Record]) -> f64 {
    let current = sum_opt(records.iter().map(|r| r.current_monthly_cost));
    let savings = sum_opt(records.iter().map(|r| r.cost_savings_amount));
    if current > 0.0 {
        savings / current * 100.0
    } else {
        mean_opt(records.iter().map(|r| r.cost_savings_percent)).unwrap_or(0.0)
    }
}

pub fn compute_kpis(records: &[Record]) -> Kpis {
    Kpis {
        total_recommendations: records.len(),
        total_savings: sum_opt(records.iter().map(|r| r.cost_savings_amount)),
        weighted_savings_percent: weighted_savings_percent(records),
        avg_savings_per_recommendation: mean_opt(
            records.iter().map(|r| r.cost_savings_amount),
        ),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceTypeSavings {
    pub inference_type: Option<String>,
    pub total_savings: f64,
}

/// Savings sum per inference type, descending. Rows without an inference
/// type form their own null group rather than being dropped.
pub fn group_by_inference_type(records: &[Record]) -> Vec<InferenceTypeSavings> {
    let mut by_type: BTreeMap<Option<String>, f64> = BTreeMap::new();
    for r in records {
        *by_type.entry(r.inference_type.clone()).or_insert(0.0) +=
            r.cost_savings_amount.unwrap_or(0.0);
    }
    let mut rows: Vec<InferenceTypeSavings> = by_type
        .into_iter()
        .map(|(inference_type, total_savings)| InferenceTypeSavings {
            inference_type,
            total_savings,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_savings
            .partial_cmp(&a.total_savings)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// Totals of the four savings-pipeline stages over a view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTotals {
    pub initiated: f64,
    pub delayed: f64,
    pub unachievable: f64,
    pub achieved: f64,
}

impl StageTotals {
    /// Pipeline order: Initiated → Delayed → Unachieveable → Achieved.
    pub fn funnel(&self) -> [(&'static str, f64); 4] {
        [
            ("Initiated", self.initiated),
            ("Delayed Savings", self.delayed),
            ("Unachieveable Savings", self.unachievable),
            ("Achieved Savings", self.achieved),
        ]
    }

    /// Unordered categorical mix, in the legend order the dashboard uses.
    pub fn mix(&self) -> [(&'static str, f64); 4] {
        [
            ("Achieved Savings", self.achieved),
            ("Unachieveable Savings", self.unachievable),
            ("Delayed Savings", self.delayed),
            ("Initiated", self.initiated),
        ]
    }
}

pub fn group_by_stage(records: &[Record]) -> StageTotals {
    StageTotals {
        initiated: sum_opt(records.iter().map(|r| r.initiated_savings)),
        delayed: sum_opt(records.iter().map(|r| r.delayed_savings)),
        unachievable: sum_opt(records.iter().map(|r| r.unachievable_savings)),
        achieved: sum_opt(records.iter().map(|r| r.achieved_savings)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SprintSummary {
    pub sprint: Option<String>,
    pub total_recommendations: usize,
    pub current_spend: f64,
    pub estimated_spend: f64,
    pub total_savings: f64,
    pub achieved: f64,
    pub unachievable: f64,
    pub delayed: f64,
    pub initiated: f64,
    pub achieved_count: usize,
    pub unachievable_count: usize,
    pub delayed_count: usize,
    pub initiated_count: usize,
    /// `100 * total_savings / current_spend`, forced to 0 when the division
    /// is not finite (zero or missing spend).
    pub total_savings_percent: f64,
}

/// Per-sprint rollup, sorted descending by savings sum. Rows without a
/// sprint keep their own null group. Stage counts tally rows where that
/// stage's value is strictly positive.
pub fn group_by_sprint(records: &[Record]) -> Vec<SprintSummary> {
    #[derive(Default)]
    struct Acc {
        count: usize,
        current: f64,
        estimated: f64,
        savings: f64,
        achieved: f64,
        unachievable: f64,
        delayed: f64,
        initiated: f64,
        achieved_n: usize,
        unachievable_n: usize,
        delayed_n: usize,
        initiated_n: usize,
    }

    fn positive(v: Option<f64>) -> bool {
        v.is_some_and(|x| x > 0.0)
    }

    let mut by_sprint: BTreeMap<Option<String>, Acc> = BTreeMap::new();
    for r in records {
        let acc = by_sprint.entry(r.sprint.clone()).or_default();
        acc.count += 1;
        acc.current += r.current_monthly_cost.unwrap_or(0.0);
        acc.estimated += r.estimated_monthly_cost.unwrap_or(0.0);
        acc.savings += r.cost_savings_amount.unwrap_or(0.0);
        acc.achieved += r.achieved_savings.unwrap_or(0.0);
        acc.unachievable += r.unachievable_savings.unwrap_or(0.0);
        acc.delayed += r.delayed_savings.unwrap_or(0.0);
        acc.initiated += r.initiated_savings.unwrap_or(0.0);
        acc.achieved_n += positive(r.achieved_savings) as usize;
        acc.unachievable_n += positive(r.unachievable_savings) as usize;
        acc.delayed_n += positive(r.delayed_savings) as usize;
        acc.initiated_n += positive(r.initiated_savings) as usize;
    }

    let mut rows: Vec<SprintSummary> = by_sprint
        .into_iter()
        .map(|(sprint, acc)| {
            let pct = acc.savings / acc.current * 100.0;
            SprintSummary {
                sprint,
                total_recommendations: acc.count,
                current_spend: acc.current,
                estimated_spend: acc.estimated,
                total_savings: acc.savings,
                achieved: acc.achieved,
                unachievable: acc.unachievable,
                delayed: acc.delayed,
                initiated: acc.initiated,
                achieved_count: acc.achieved_n,
                unachievable_count: acc.unachievable_n,
                delayed_count: acc.delayed_n,
                initiated_count: acc.initiated_n,
                total_savings_percent: if pct.is_finite() { pct } else { 0.0 },
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_savings
            .partial_cmp(&a.total_savings)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::normalize;
    use crate::types::RawRow;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
    }

    fn rec(raw: RawRow) -> Record {
        normalize(raw, today())
    }

    #[test]
    fn empty_view_yields_neutral_kpis() {
        let kpis = compute_kpis(&[]);
        assert_eq!(kpis.total_recommendations, 0);
        assert_eq!(kpis.total_savings, 0.0);
        assert_eq!(kpis.weighted_savings_percent, 0.0);
        assert_eq!(kpis.avg_savings_per_recommendation, None);
    }

    #[test]
    fn weighted_percent_uses_spend_when_positive() {
        let records = vec![
            rec(RawRow {
                current_monthly_cost: Some("1000".into()),
                cost_savings_amount: Some("200".into()),
                ..RawRow::default()
            }),
            rec(RawRow {
                current_monthly_cost: Some("500".into()),
                cost_savings_amount: Some("0".into()),
                ..RawRow::default()
            }),
        ];
        let pct = weighted_savings_percent(&records);
        assert!((pct - 200.0 / 1500.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_percent_falls_back_to_unweighted_mean() {
        let records = vec![
            rec(RawRow {
                cost_savings_percent: Some("10".into()),
                ..RawRow::default()
            }),
            rec(RawRow {
                cost_savings_percent: Some("20".into()),
                ..RawRow::default()
            }),
            rec(RawRow::default()),
        ];
        assert_eq!(weighted_savings_percent(&records), 15.0);
    }

    #[test]
    fn inference_grouping_keeps_null_category_and_sorts_descending() {
        let records = vec![
            rec(RawRow {
                inference_type: Some("Rightsizing".into()),
                cost_savings_amount: Some("100".into()),
                ..RawRow::default()
            }),
            rec(RawRow {
                cost_savings_amount: Some("300".into()),
                ..RawRow::default()
            }),
            rec(RawRow {
                inference_type: Some("Rightsizing".into()),
                cost_savings_amount: Some("50".into()),
                ..RawRow::default()
            }),
        ];
        let rows = group_by_inference_type(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].inference_type, None);
        assert_eq!(rows[0].total_savings, 300.0);
        assert_eq!(rows[1].inference_type.as_deref(), Some("Rightsizing"));
        assert_eq!(rows[1].total_savings, 150.0);
    }

    #[test]
    fn stage_totals_expose_funnel_and_mix_orders() {
        let records = vec![rec(RawRow {
            initiated_savings: Some("40".into()),
            delayed_savings: Some("30".into()),
            unachievable_savings: Some("20".into()),
            achieved_savings: Some("10".into()),
            ..RawRow::default()
        })];
        let totals = group_by_stage(&records);
        let funnel = totals.funnel();
        assert_eq!(funnel[0], ("Initiated", 40.0));
        assert_eq!(funnel[3], ("Achieved Savings", 10.0));
        let mix = totals.mix();
        assert_eq!(mix[0], ("Achieved Savings", 10.0));
        assert_eq!(mix[3], ("Initiated", 40.0));
    }

    #[test]
    fn sprint_summary_matches_reference_scenario() {
        let records = vec![
            rec(RawRow {
                sprint: Some("S1".into()),
                start_date: Some("2024-05-01".into()),
                current_monthly_cost: Some("1000".into()),
                cost_savings_amount: Some("200".into()),
                achieved_savings: Some("200".into()),
                ..RawRow::default()
            }),
            rec(RawRow {
                sprint: Some("S1".into()),
                start_date: Some("2024-06-15".into()),
                current_monthly_cost: Some("500".into()),
                cost_savings_amount: Some("0".into()),
                unachievable_savings: Some("50".into()),
                ..RawRow::default()
            }),
        ];
        assert!(records.iter().all(|r| r.fiscal_year == "FY2025"));

        let rows = group_by_sprint(&records);
        assert_eq!(rows.len(), 1);
        let s1 = &rows[0];
        assert_eq!(s1.sprint.as_deref(), Some("S1"));
        assert_eq!(s1.total_recommendations, 2);
        assert_eq!(s1.current_spend, 1500.0);
        assert_eq!(s1.total_savings, 200.0);
        assert_eq!(s1.achieved_count, 1);
        assert_eq!(s1.unachievable_count, 1);
        assert_eq!(s1.initiated_count, 0);
        assert!((s1.total_savings_percent - 200.0 / 1500.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_spend_sprint_reports_zero_percent() {
        let records = vec![rec(RawRow {
            sprint: Some("S9".into()),
            cost_savings_amount: Some("100".into()),
            ..RawRow::default()
        })];
        let rows = group_by_sprint(&records);
        assert_eq!(rows[0].current_spend, 0.0);
        assert_eq!(rows[0].total_savings_percent, 0.0);
    }

    #[test]
    fn sprint_grouping_is_deterministic() {
        let records = vec![
            rec(RawRow {
                sprint: Some("A".into()),
                cost_savings_amount: Some("10".into()),
                ..RawRow::default()
            }),
            rec(RawRow {
                sprint: Some("B".into()),
                cost_savings_amount: Some("10".into()),
                ..RawRow::default()
            }),
            rec(RawRow {
                sprint: Some("C".into()),
                cost_savings_amount: Some("10".into()),
                ..RawRow::default()
            }),
        ];
        assert_eq!(group_by_sprint(&records), group_by_sprint(&records));
    }
}
