//! Entities, write inputs, and enriched read views.
//!
//! Entities mirror the nine stored tables one-to-one. `*Input` types are what
//! callers submit on create/update (full replace), and `*View` types are what
//! leaves the domain layer: foreign keys always travel together with the
//! resolved display names.

use serde::{Deserialize, Serialize};

// ── Residents ─────────────────────────────────────────────────────────────

/// A person living in the facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    /// ISO date, `YYYY-MM-DD`.
    pub birth_date: String,
    pub mutuelle_id: Option<i64>,
    pub national_id: Option<String>,
    pub physician_id: Option<i64>,
    /// Legacy free-text note, superseded by patient medications.
    pub medication_note: Option<String>,
    pub room_number: Option<i64>,
}

impl Resident {
    /// "First Last", the name shown everywhere a resident is referenced.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields submitted when admitting or updating a resident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentInput {
    pub last_name: String,
    pub first_name: String,
    pub birth_date: String,
    #[serde(default)]
    pub mutuelle_id: Option<i64>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub physician_id: Option<i64>,
    #[serde(default)]
    pub medication_note: Option<String>,
    #[serde(default)]
    pub room_number: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentView {
    #[serde(flatten)]
    pub resident: Resident,
    pub full_name: String,
}

impl From<Resident> for ResidentView {
    fn from(resident: Resident) -> Self {
        let full_name = resident.display_name();
        Self {
            resident,
            full_name,
        }
    }
}

// ── Reference data ────────────────────────────────────────────────────────

/// Health-insurance / mutual-aid body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutuelle {
    pub id: i64,
    pub name: String,
    /// Official mutuelle number (100, 200, …).
    pub code: i64,
    pub address: String,
    pub email: String,
    pub phone: String,
}

/// Attending doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Physician {
    pub id: i64,
    pub name: String,
    pub specialty: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Reason-for-visit label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motif {
    pub id: i64,
    pub name: String,
}

/// Catalog medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub name: String,
    pub active_ingredient: Option<String>,
    /// Link to the external drug reference (CBIP).
    pub reference_link: Option<String>,
}

// ── Rooms ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub room_number: i64,
    pub capacity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInput {
    pub room_number: i64,
    pub capacity: i64,
}

/// A room together with the number of residents currently assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomView {
    pub room_number: i64,
    pub capacity: i64,
    pub occupancy: i64,
}

// ── Appointments ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub resident_id: i64,
    pub date: String,
    pub time: String,
    pub reason: String,
    pub transporter: Option<String>,
    pub transport_time: Option<String>,
}

/// Every mutable appointment field; updates replace all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentInput {
    pub resident_id: i64,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub transporter: Option<String>,
    #[serde(default)]
    pub transport_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentView {
    pub id: i64,
    pub resident_id: i64,
    pub resident_name: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    pub transporter: Option<String>,
    pub transport_time: Option<String>,
}

impl AppointmentView {
    pub fn new(appointment: Appointment, resident_name: String) -> Self {
        Self {
            id: appointment.id,
            resident_id: appointment.resident_id,
            resident_name,
            date: appointment.date,
            time: appointment.time,
            reason: appointment.reason,
            transporter: appointment.transporter,
            transport_time: appointment.transport_time,
        }
    }
}

// ── Patient medications ───────────────────────────────────────────────────

/// Meaning of the `status` column on a medication assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedicationStatus {
    Active = 0,
    Paused = 1,
    Discontinued = 2,
}

impl MedicationStatus {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Discontinued => "discontinued",
        }
    }
}

impl TryFrom<i64> for MedicationStatus {
    type Error = i64;

    fn try_from(code: i64) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Active),
            1 => Ok(Self::Paused),
            2 => Ok(Self::Discontinued),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientMedication {
    pub id: i64,
    pub resident_id: i64,
    pub medication_id: i64,
    pub dosage: String,
    pub time_of_day: String,
    pub frequency: String,
    pub status: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientMedicationInput {
    pub resident_id: i64,
    pub medication_id: i64,
    pub dosage: String,
    #[serde(default)]
    pub time_of_day: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub status: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationView {
    pub id: i64,
    pub resident_id: i64,
    pub resident_name: String,
    pub medication_id: i64,
    pub medication_name: String,
    pub dosage: String,
    pub time_of_day: String,
    pub frequency: String,
    pub status: i64,
}

impl MedicationView {
    pub fn new(row: PatientMedication, resident_name: String, medication_name: String) -> Self {
        Self {
            id: row.id,
            resident_id: row.resident_id,
            resident_name,
            medication_id: row.medication_id,
            medication_name,
            dosage: row.dosage,
            time_of_day: row.time_of_day,
            frequency: row.frequency,
            status: row.status,
        }
    }
}

// ── Users ─────────────────────────────────────────────────────────────────

pub mod user_status {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
}

/// A staff account as stored, including the password hash.
#[derive(Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub email: String,
    pub phone: Option<String>,
    pub email_verified: bool,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("status", &self.status)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("email_verified", &self.email_verified)
            .finish()
    }
}

/// Row to insert for a new account. The password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub email: String,
    pub phone: Option<String>,
    pub email_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub username: String,
    pub role: String,
    pub status: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// The externally visible part of a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub status: String,
    pub email: String,
    pub phone: Option<String>,
    pub email_verified: bool,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            status: user.status,
            email: user.email,
            phone: user.phone,
            email_verified: user.email_verified,
        }
    }
}
