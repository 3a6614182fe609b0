use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// One clinical visit. `patient_id` is a de-identified patient code shared by
/// all of that patient's visits, so it is not unique per row.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PatientVisit {
    pub id: i64,
    pub patient_id: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub visit_date: Option<OffsetDateTime>,
    pub department: Option<String>,
    pub diagnosis: Option<String>,
    pub cost: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewPatientVisit {
    pub patient_id: String,
    pub visit_date: Option<OffsetDateTime>,
    pub department: Option<String>,
    pub diagnosis: Option<String>,
    pub cost: Option<Decimal>,
}
