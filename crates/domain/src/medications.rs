//! Medication assignments: which resident takes which catalog medication,
//! at what dosage and schedule.

use std::sync::Arc;

use isenior_core::model::{
    MedicationStatus, MedicationView, PatientMedication, PatientMedicationInput,
};
use isenior_core::store::{MedicationStore, ResidentStore};
use isenior_core::{Error, Result, Store};
use tracing::{debug, info};

use crate::enrich::{Enricher, Foreign};
use crate::validate;

pub struct MedicationService {
    store: Arc<dyn Store>,
}

impl MedicationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, resident_id: Option<i64>) -> Result<Vec<MedicationView>> {
        let rows = self.store.list_patient_medications(resident_id, None).await?;
        debug!("Listing {} medication assignments", rows.len());

        let mut enricher = Enricher::new(self.store.as_ref());
        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            views.push(Self::enrich(&mut enricher, row).await?);
        }
        Ok(views)
    }

    pub async fn get(&self, id: i64) -> Result<MedicationView> {
        let row = self
            .store
            .get_patient_medication(id)
            .await?
            .ok_or_else(|| Error::not_found("Medication assignment", id))?;
        self.view(row).await
    }

    pub async fn create(&self, input: PatientMedicationInput) -> Result<MedicationView> {
        self.check(&input).await?;
        let row = self.store.insert_patient_medication(&input).await?;
        info!(
            assignment = row.id,
            resident = row.resident_id,
            medication = row.medication_id,
            "Medication assigned"
        );
        self.view(row).await
    }

    pub async fn update(&self, id: i64, input: PatientMedicationInput) -> Result<MedicationView> {
        if self.store.get_patient_medication(id).await?.is_none() {
            return Err(Error::not_found("Medication assignment", id));
        }
        self.check(&input).await?;

        let row = self
            .store
            .update_patient_medication(id, &input)
            .await?
            .ok_or_else(|| Error::not_found("Medication assignment", id))?;
        info!(assignment = id, "Medication assignment updated");
        self.view(row).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete_patient_medication(id).await? {
            return Err(Error::not_found("Medication assignment", id));
        }
        info!(assignment = id, "Medication assignment deleted");
        Ok(())
    }

    async fn check(&self, input: &PatientMedicationInput) -> Result<()> {
        validate::non_empty("dosage", &input.dosage)?;
        MedicationStatus::try_from(input.status).map_err(|code| {
            Error::validation(format!(
                "status must be 0 (active), 1 (paused) or 2 (discontinued), got {code}"
            ))
        })?;

        if self.store.get_resident(input.resident_id).await?.is_none() {
            return Err(Error::validation(format!(
                "resident {} does not exist",
                input.resident_id
            )));
        }
        if self.store.get_medication(input.medication_id).await?.is_none() {
            return Err(Error::validation(format!(
                "medication {} does not exist",
                input.medication_id
            )));
        }
        Ok(())
    }

    async fn view(&self, row: PatientMedication) -> Result<MedicationView> {
        let mut enricher = Enricher::new(self.store.as_ref());
        Self::enrich(&mut enricher, row).await
    }

    async fn enrich(enricher: &mut Enricher<'_>, row: PatientMedication) -> Result<MedicationView> {
        let resident = enricher.name(Foreign::Resident, row.resident_id).await?;
        let medication = enricher.name(Foreign::Medication, row.medication_id).await?;
        Ok(MedicationView::new(row, resident, medication))
    }
}
