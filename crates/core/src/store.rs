//! Store trait: the abstraction over the relational persistence layer.
//!
//! The store is deliberately dumb: it reads and writes rows and reports
//! constraint violations. Referential checks, capacity rules, and read-side
//! enrichment live in the domain services built on top of it.
//!
//! Every list method takes an optional `limit`; rows come back in insertion
//! order (ascending id, or room number for rooms).
//!
//! Implementations: SQLite (`isenior-store`).

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::*;

type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait ResidentStore: Send + Sync {
    async fn list_residents(&self, limit: Option<usize>) -> StoreResult<Vec<Resident>>;
    async fn get_resident(&self, id: i64) -> StoreResult<Option<Resident>>;
    async fn insert_resident(&self, input: &ResidentInput) -> StoreResult<Resident>;
    /// Returns `None` when no resident has this id.
    async fn update_resident(&self, id: i64, input: &ResidentInput)
    -> StoreResult<Option<Resident>>;
    /// Returns `false` when no resident has this id.
    async fn delete_resident(&self, id: i64) -> StoreResult<bool>;
    /// Number of appointments plus medication assignments pointing at a resident.
    async fn count_resident_dependents(&self, id: i64) -> StoreResult<i64>;
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn list_rooms(&self, limit: Option<usize>) -> StoreResult<Vec<Room>>;
    async fn get_room(&self, room_number: i64) -> StoreResult<Option<Room>>;
    async fn insert_room(&self, input: &RoomInput) -> StoreResult<Room>;
    async fn update_room_capacity(&self, room_number: i64, capacity: i64)
    -> StoreResult<Option<Room>>;
    async fn delete_room(&self, room_number: i64) -> StoreResult<bool>;
    /// Residents assigned to the room, optionally ignoring one resident
    /// (the one being updated).
    async fn count_room_occupants(
        &self,
        room_number: i64,
        excluding_resident: Option<i64>,
    ) -> StoreResult<i64>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn list_appointments(
        &self,
        resident_id: Option<i64>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Appointment>>;
    async fn get_appointment(&self, id: i64) -> StoreResult<Option<Appointment>>;
    async fn insert_appointment(&self, input: &AppointmentInput) -> StoreResult<Appointment>;
    async fn update_appointment(
        &self,
        id: i64,
        input: &AppointmentInput,
    ) -> StoreResult<Option<Appointment>>;
    async fn delete_appointment(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait MedicationStore: Send + Sync {
    async fn list_medications(&self, limit: Option<usize>) -> StoreResult<Vec<Medication>>;
    async fn get_medication(&self, id: i64) -> StoreResult<Option<Medication>>;

    async fn list_patient_medications(
        &self,
        resident_id: Option<i64>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<PatientMedication>>;
    async fn get_patient_medication(&self, id: i64) -> StoreResult<Option<PatientMedication>>;
    async fn insert_patient_medication(
        &self,
        input: &PatientMedicationInput,
    ) -> StoreResult<PatientMedication>;
    async fn update_patient_medication(
        &self,
        id: i64,
        input: &PatientMedicationInput,
    ) -> StoreResult<Option<PatientMedication>>;
    async fn delete_patient_medication(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn list_mutuelles(&self, limit: Option<usize>) -> StoreResult<Vec<Mutuelle>>;
    async fn get_mutuelle(&self, id: i64) -> StoreResult<Option<Mutuelle>>;
    async fn list_physicians(&self, limit: Option<usize>) -> StoreResult<Vec<Physician>>;
    async fn get_physician(&self, id: i64) -> StoreResult<Option<Physician>>;
    async fn list_motifs(&self, limit: Option<usize>) -> StoreResult<Vec<Motif>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: i64, update: &UserUpdate) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;
}

/// The full persistence surface, implemented once per backend.
///
/// Services hold it as `Arc<dyn Store>`; it is constructed at startup and
/// injected, never reached through a global.
#[async_trait]
pub trait Store:
    ResidentStore + RoomStore + AppointmentStore + MedicationStore + ReferenceStore + UserStore
{
    /// A human-readable name for this backend (e.g., "sqlite").
    fn name(&self) -> &str;

    /// Cheap connectivity probe.
    async fn ping(&self) -> StoreResult<()>;
}
