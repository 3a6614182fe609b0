use std::sync::Arc;

use tracing::info;

use crate::error::ServiceError;
use crate::patients::model::PatientVisit;
use crate::patients::store::PatientStore;

pub struct PatientService {
    patients: Arc<dyn PatientStore>,
}

impl PatientService {
    pub fn new(patients: Arc<dyn PatientStore>) -> Self {
        Self { patients }
    }

    pub async fn list(&self) -> Result<Vec<PatientVisit>, ServiceError> {
        Ok(self.patients.find_all().await?)
    }

    pub async fn get(&self, id: i64) -> Result<PatientVisit, ServiceError> {
        self.patients
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("patient not found"))
    }

    /// The path id names one visit row; the answer is every visit sharing
    /// that row's patient code.
    pub async fn visits(&self, id: i64) -> Result<Vec<PatientVisit>, ServiceError> {
        let visit = self.get(id).await?;
        let history = self.patients.find_by_patient_id(&visit.patient_id).await?;
        info!(patient_id = %visit.patient_id, visits = history.len(), "visit history loaded");
        Ok(history)
    }
}
