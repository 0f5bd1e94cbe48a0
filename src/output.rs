use crate::aggregate::{InferenceTypeSavings, SprintSummary};
use crate::types::{InferenceTypeRow, SprintSummaryRow, StageRow};
use crate::util::{format_money, format_percent};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn preview_table<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Render the sprint rollup for table display / CSV export. Money columns
/// are whole dollars, the percentage keeps one decimal.
pub fn sprint_rows(summaries: &[SprintSummary]) -> Vec<SprintSummaryRow> {
    summaries
        .iter()
        .map(|s| SprintSummaryRow {
            sprint: s.sprint.clone().unwrap_or_else(|| "(none)".to_string()),
            total_recommendations: s.total_recommendations,
            current_spend: format_money(Some(s.current_spend), false),
            estimated_spend: format_money(Some(s.estimated_spend), false),
            total_savings: format_money(Some(s.total_savings), false),
            achieved: format_money(Some(s.achieved), false),
            unachievable: format_money(Some(s.unachievable), false),
            delayed: format_money(Some(s.delayed), false),
            initiated: format_money(Some(s.initiated), false),
            achieved_count: s.achieved_count,
            unachievable_count: s.unachievable_count,
            delayed_count: s.delayed_count,
            initiated_count: s.initiated_count,
            total_savings_percent: format_percent(s.total_savings_percent),
        })
        .collect()
}

pub fn inference_rows(groups: &[InferenceTypeSavings]) -> Vec<InferenceTypeRow> {
    groups
        .iter()
        .map(|g| InferenceTypeRow {
            inference_type: g
                .inference_type
                .clone()
                .unwrap_or_else(|| "(none)".to_string()),
            total_savings: format_money(Some(g.total_savings), false),
        })
        .collect()
}

pub fn stage_rows(stages: &[(&'static str, f64)]) -> Vec<StageRow> {
    stages
        .iter()
        .map(|(stage, value)| StageRow {
            stage: stage.to_string(),
            value: format_money(Some(*value), false),
        })
        .collect()
}
