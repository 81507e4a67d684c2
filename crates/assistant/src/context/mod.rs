//! Facility context assembly.
//!
//! Builds one plain-text summary of the care home for the chat prompt.
//! Each table contributes a labeled segment sampled to at most
//! [`MAX_SAMPLE_ROWS`] rows, in this order:
//!
//! | Segment | Source | Rendering |
//! |---------|--------|-----------|
//! | Residents | `residents` | "First Last (room N)" |
//! | Mutuelles | `mutuelles` | name |
//! | Physicians | `physicians` | name, specialty |
//! | Rooms | `rooms` | "N (capacity C)" |
//! | Appointments | `appointments` | date, time, reason, resident name |
//! | Medications | catalog | name |
//! | Patient medications | `patient_medications` | resident, medication, dosage, schedule |
//! | Motifs | `motifs` | name |
//!
//! Empty segments are left out entirely.

pub mod assembler;

pub use assembler::{AssembledContext, ContextAssembler, SectionStats, MAX_SAMPLE_ROWS};
