//! Fixtures for service tests.

use std::sync::Arc;

use isenior_core::model::{AppointmentInput, PatientMedicationInput, ResidentInput};
use isenior_core::Store;
use isenior_store::{seed_reference_data, SqliteStore};

/// Fresh in-memory store with reference data (mutuelles, physicians,
/// motifs, two catalog medications).
pub async fn store() -> Arc<dyn Store> {
    let store = SqliteStore::new("sqlite::memory:", 1).await.unwrap();
    seed_reference_data(&store).await.unwrap();
    Arc::new(store)
}

pub fn resident(last: &str, first: &str) -> ResidentInput {
    ResidentInput {
        last_name: last.into(),
        first_name: first.into(),
        birth_date: "1940-05-15".into(),
        mutuelle_id: Some(1),
        national_id: None,
        physician_id: Some(1),
        medication_note: None,
        room_number: None,
    }
}

pub fn appointment(resident_id: i64, date: &str, reason: &str) -> AppointmentInput {
    AppointmentInput {
        resident_id,
        date: date.into(),
        time: "10:00".into(),
        reason: reason.into(),
        transporter: Some("Transport A".into()),
        transport_time: Some("09:30".into()),
    }
}

pub fn assignment(resident_id: i64, medication_id: i64) -> PatientMedicationInput {
    PatientMedicationInput {
        resident_id,
        medication_id,
        dosage: "500mg".into(),
        time_of_day: "Matin".into(),
        frequency: "3x/jour".into(),
        status: 0,
    }
}
