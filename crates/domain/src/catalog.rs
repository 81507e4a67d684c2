//! Read-only reference data: mutuelles, physicians, motifs and the
//! medication catalog.

use std::sync::Arc;

use isenior_core::model::{Medication, Motif, Mutuelle, Physician};
use isenior_core::store::{MedicationStore, ReferenceStore};
use isenior_core::{Error, Result, Store};

pub struct ReferenceService {
    store: Arc<dyn Store>,
}

impl ReferenceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn mutuelles(&self) -> Result<Vec<Mutuelle>> {
        Ok(self.store.list_mutuelles(None).await?)
    }

    pub async fn mutuelle(&self, id: i64) -> Result<Mutuelle> {
        self.store
            .get_mutuelle(id)
            .await?
            .ok_or_else(|| Error::not_found("Mutuelle", id))
    }

    pub async fn physicians(&self) -> Result<Vec<Physician>> {
        Ok(self.store.list_physicians(None).await?)
    }

    pub async fn physician(&self, id: i64) -> Result<Physician> {
        self.store
            .get_physician(id)
            .await?
            .ok_or_else(|| Error::not_found("Physician", id))
    }

    pub async fn motifs(&self) -> Result<Vec<Motif>> {
        Ok(self.store.list_motifs(None).await?)
    }

    pub async fn medications(&self) -> Result<Vec<Medication>> {
        Ok(self.store.list_medications(None).await?)
    }

    pub async fn medication(&self, id: i64) -> Result<Medication> {
        self.store
            .get_medication(id)
            .await?
            .ok_or_else(|| Error::not_found("Medication", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn seeded_reference_data_is_readable() {
        let service = ReferenceService::new(testing::store().await);
        assert_eq!(service.mutuelles().await.unwrap().len(), 7);
        assert_eq!(service.mutuelle(3).await.unwrap().code, 300);
        assert_eq!(service.physician(1).await.unwrap().name, "Dr. Smith");
        assert_eq!(service.motifs().await.unwrap()[0].name, "Consultation médicale");
        assert_eq!(
            service.medication(2).await.unwrap().reference_link.as_deref(),
            Some("https://cbip.be/fr/drugs/456")
        );
    }

    #[tokio::test]
    async fn missing_reference_rows_are_not_found() {
        let service = ReferenceService::new(testing::store().await);
        assert!(matches!(
            service.mutuelle(99).await.unwrap_err(),
            Error::NotFound { .. }
        ));
        assert!(matches!(
            service.medication(99).await.unwrap_err(),
            Error::NotFound { .. }
        ));
    }
}
