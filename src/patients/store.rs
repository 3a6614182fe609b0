use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::patients::model::{NewPatientVisit, PatientVisit};
use crate::statistics::dto::TrendPoint;

/// Persistence seam for visit records. Aggregations used by the statistics
/// service live here as well so they can run in SQL against the real store.
#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<PatientVisit>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<PatientVisit>>;
    async fn find_by_patient_id(&self, patient_id: &str) -> anyhow::Result<Vec<PatientVisit>>;
    async fn insert(&self, visit: NewPatientVisit) -> anyhow::Result<PatientVisit>;
    async fn update(&self, visit: &PatientVisit) -> anyhow::Result<PatientVisit>;
    async fn delete(&self, id: i64) -> anyhow::Result<()>;
    /// Visit counts per day over the most recent 30 days.
    async fn outpatient_trend(&self) -> anyhow::Result<Vec<TrendPoint>>;
}

pub struct PgPatientStore {
    db: PgPool,
}

impl PgPatientStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PatientStore for PgPatientStore {
    async fn find_all(&self) -> anyhow::Result<Vec<PatientVisit>> {
        let visits = sqlx::query_as::<_, PatientVisit>(
            r#"
            SELECT id, patient_id, visit_date, department, diagnosis, cost
            FROM patient_visit
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(visits)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<PatientVisit>> {
        let visit = sqlx::query_as::<_, PatientVisit>(
            r#"
            SELECT id, patient_id, visit_date, department, diagnosis, cost
            FROM patient_visit
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(visit)
    }

    async fn find_by_patient_id(&self, patient_id: &str) -> anyhow::Result<Vec<PatientVisit>> {
        let visits = sqlx::query_as::<_, PatientVisit>(
            r#"
            SELECT id, patient_id, visit_date, department, diagnosis, cost
            FROM patient_visit
            WHERE patient_id = $1
            ORDER BY visit_date DESC NULLS LAST
            "#,
        )
        .bind(patient_id)
        .fetch_all(&self.db)
        .await?;
        Ok(visits)
    }

    async fn insert(&self, visit: NewPatientVisit) -> anyhow::Result<PatientVisit> {
        let inserted = sqlx::query_as::<_, PatientVisit>(
            r#"
            INSERT INTO patient_visit (patient_id, visit_date, department, diagnosis, cost)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, patient_id, visit_date, department, diagnosis, cost
            "#,
        )
        .bind(&visit.patient_id)
        .bind(visit.visit_date)
        .bind(&visit.department)
        .bind(&visit.diagnosis)
        .bind(visit.cost)
        .fetch_one(&self.db)
        .await?;
        Ok(inserted)
    }

    async fn update(&self, visit: &PatientVisit) -> anyhow::Result<PatientVisit> {
        let updated = sqlx::query_as::<_, PatientVisit>(
            r#"
            UPDATE patient_visit
            SET patient_id = $1, visit_date = $2, department = $3, diagnosis = $4, cost = $5
            WHERE id = $6
            RETURNING id, patient_id, visit_date, department, diagnosis, cost
            "#,
        )
        .bind(&visit.patient_id)
        .bind(visit.visit_date)
        .bind(&visit.department)
        .bind(&visit.diagnosis)
        .bind(visit.cost)
        .bind(visit.id)
        .fetch_one(&self.db)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM patient_visit WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn outpatient_trend(&self) -> anyhow::Result<Vec<TrendPoint>> {
        let points = sqlx::query(
            r#"
            SELECT visit_date::date AS date, COUNT(*) AS count
            FROM patient_visit
            WHERE visit_date >= CURRENT_DATE - INTERVAL '30 days'
            GROUP BY visit_date::date
            ORDER BY date
            "#,
        )
        .map(|row: sqlx::postgres::PgRow| TrendPoint {
            date: row.get("date"),
            count: row.get("count"),
            amount: None,
        })
        .fetch_all(&self.db)
        .await?;
        Ok(points)
    }
}
