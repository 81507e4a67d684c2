//! # iSenior Core
//!
//! Domain types, traits, and error definitions for the iSenior care-home
//! backend. This crate has **zero framework dependencies**; it defines the
//! data model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Storage and the language-model backend are traits here. Implementations
//! live in their respective crates (`isenior-store`, `isenior-providers`),
//! and services receive them as `Arc<dyn …>` at construction time.

pub mod error;
pub mod message;
pub mod model;
pub mod provider;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, StoreError};
pub use message::{Message, Role};
pub use model::{
    Appointment, AppointmentInput, AppointmentView, Medication, MedicationStatus, MedicationView,
    Motif, Mutuelle, NewUser, PatientMedication, PatientMedicationInput, Physician, Resident,
    ResidentInput, ResidentView, Room, RoomInput, RoomView, User, UserUpdate, UserView,
};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use store::Store;
