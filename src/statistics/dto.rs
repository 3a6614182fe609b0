use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(trend_date, Date, "[year]-[month]-[day]");

/// One day's aggregation bucket. Serialized both into responses and into the
/// cache, so it derives `Deserialize` as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(with = "trend_date")]
    pub date: Date,
    pub count: i64,
    /// Reserved for cost trends; always null for the visit-count trend.
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsOverview {
    pub total_patients: i64,
    pub total_visits: i64,
    pub department_count: i64,
    pub today_visits: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceMonth {
    /// `YYYY-MM`.
    pub month: String,
    pub insurance_pay: i64,
    pub personal_pay: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceCostControl {
    pub monthly_data: Vec<InsuranceMonth>,
    pub total_insurance_pay: f64,
    pub total_personal_pay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentUsage {
    pub name: String,
    pub usage_rate: i64,
}
