use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One row of an execution report exactly as it appears on disk.
///
/// Every field is optional: reports arrive with arbitrary column subsets and
/// the loader reconciles the schema by treating absent columns as all-null.
/// Values stay `String` here; typed coercion happens in the loader so that an
/// unparsable cell degrades to `None` instead of failing the whole row.
#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Sprint")]
    pub sprint: Option<String>,
    #[serde(rename = "Start Date")]
    pub start_date: Option<String>,
    #[serde(rename = "End Date")]
    pub end_date: Option<String>,
    #[serde(rename = "Inference Type")]
    pub inference_type: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Cloud Provider")]
    pub cloud_provider: Option<String>,
    #[serde(rename = "Current Monthly Cost ($)")]
    pub current_monthly_cost: Option<String>,
    #[serde(rename = "Est. Monthly Cost ($)")]
    pub estimated_monthly_cost: Option<String>,
    #[serde(rename = "Cost Savings in $")]
    pub cost_savings_amount: Option<String>,
    #[serde(rename = "Cost Savings in %")]
    pub cost_savings_percent: Option<String>,
    #[serde(rename = "Achieved Savings")]
    pub achieved_savings: Option<String>,
    // Column spelling matches the upstream report schema.
    #[serde(rename = "Unachieveable Savings")]
    pub unachievable_savings: Option<String>,
    #[serde(rename = "Delayed Savings")]
    pub delayed_savings: Option<String>,
    #[serde(rename = "Initiated")]
    pub initiated_savings: Option<String>,
}

/// A normalized cost-optimization recommendation.
///
/// Built once at load time and immutable afterwards. Calendar fields are
/// derived from `effective_date`, which is guaranteed non-null: start date,
/// falling back to end date, falling back to the load day.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub sprint: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub inference_type: Option<String>,
    pub region: Option<String>,
    pub cloud_provider: Option<String>,
    pub current_monthly_cost: Option<f64>,
    pub estimated_monthly_cost: Option<f64>,
    pub cost_savings_amount: Option<f64>,
    pub cost_savings_percent: Option<f64>,
    pub achieved_savings: Option<f64>,
    pub unachievable_savings: Option<f64>,
    pub delayed_savings: Option<f64>,
    pub initiated_savings: Option<f64>,
    pub effective_date: NaiveDate,
    pub month: String,
    pub year: i32,
    pub fiscal_year: String,
    pub fiscal_quarter: String,
    pub fiscal_year_quarter: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SprintSummaryRow {
    #[serde(rename = "Sprint")]
    #[tabled(rename = "Sprint")]
    pub sprint: String,
    #[serde(rename = "Total_Recommendations")]
    #[tabled(rename = "Total_Recommendations")]
    pub total_recommendations: usize,
    #[serde(rename = "Current_Spend_USD")]
    #[tabled(rename = "Current_Spend_USD")]
    pub current_spend: String,
    #[serde(rename = "Est_Spend_USD")]
    #[tabled(rename = "Est_Spend_USD")]
    pub estimated_spend: String,
    #[serde(rename = "Total_Savings_USD")]
    #[tabled(rename = "Total_Savings_USD")]
    pub total_savings: String,
    #[serde(rename = "Achieved_USD")]
    #[tabled(rename = "Achieved_USD")]
    pub achieved: String,
    #[serde(rename = "Unachievable_USD")]
    #[tabled(rename = "Unachievable_USD")]
    pub unachievable: String,
    #[serde(rename = "Delayed_USD")]
    #[tabled(rename = "Delayed_USD")]
    pub delayed: String,
    #[serde(rename = "Initiated_USD")]
    #[tabled(rename = "Initiated_USD")]
    pub initiated: String,
    #[serde(rename = "Achieved_Count")]
    #[tabled(rename = "Achieved_Count")]
    pub achieved_count: usize,
    #[serde(rename = "Unachievable_Count")]
    #[tabled(rename = "Unachievable_Count")]
    pub unachievable_count: usize,
    #[serde(rename = "Delayed_Count")]
    #[tabled(rename = "Delayed_Count")]
    pub delayed_count: usize,
    #[serde(rename = "Initiated_Count")]
    #[tabled(rename = "Initiated_Count")]
    pub initiated_count: usize,
    #[serde(rename = "Total_Savings_%")]
    #[tabled(rename = "Total_Savings_%")]
    pub total_savings_percent: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct InferenceTypeRow {
    #[serde(rename = "InferenceType")]
    #[tabled(rename = "InferenceType")]
    pub inference_type: String,
    #[serde(rename = "TotalSavings")]
    #[tabled(rename = "TotalSavings")]
    pub total_savings: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StageRow {
    #[serde(rename = "Stage")]
    #[tabled(rename = "Stage")]
    pub stage: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}
