//! The context assembler: samples each table and renders labeled segments.
//!
//! ```text
//! User: bintein_nicolas (role: Infirmière)
//! Residents: Marie Dupont (room 101); Pierre Martin (room 102)
//! Appointments: 2025-09-01 10:00 Consultation médicale for Marie Dupont
//! ...
//! ```

use std::sync::Arc;

use isenior_core::store::{
    AppointmentStore, MedicationStore, ReferenceStore, ResidentStore, RoomStore, UserStore,
};
use isenior_core::{Error, Result, Store};
use isenior_domain::{Enricher, Foreign};
use serde::Serialize;
use tracing::debug;

/// Rows sampled per table.
pub const MAX_SAMPLE_ROWS: usize = 5;

/// Default ceiling on the rendered context, in characters.
pub const DEFAULT_MAX_CHARS: usize = 8000;

/// The rendered context plus what went into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledContext {
    /// Newline-separated segments, ready to append to the system instruction.
    pub text: String,
    /// Segments that made it into `text`, in render order.
    pub sections: Vec<SectionStats>,
    /// True when `text` was cut at the character ceiling.
    pub truncated: bool,
}

impl AssembledContext {
    pub fn section(&self, name: &str) -> Option<&SectionStats> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Per-segment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    pub name: String,
    pub items: usize,
}

/// Builds the facility summary. Holds no state between calls.
pub struct ContextAssembler {
    store: Arc<dyn Store>,
    max_chars: usize,
}

impl ContextAssembler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    /// Cap the rendered text at `max_chars` characters.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Assemble the context for `username`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no user has that username. Empty tables are not an
    /// error; their segments are simply absent.
    pub async fn assemble(&self, username: &str) -> Result<AssembledContext> {
        let store = self.store.as_ref();
        let limit = Some(MAX_SAMPLE_ROWS);

        let user = store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| Error::not_found("User", username))?;

        let mut lines = vec![format!("User: {} (role: {})", user.username, user.role)];
        let mut sections = Vec::new();
        let mut push = |name: &str, items: Vec<String>| {
            if items.is_empty() {
                return;
            }
            lines.push(format!("{name}: {}", items.join("; ")));
            sections.push(SectionStats {
                name: name.to_string(),
                items: items.len(),
            });
        };

        let residents = store.list_residents(limit).await?;
        push(
            "Residents",
            residents
                .iter()
                .map(|r| match r.room_number {
                    Some(room) => format!("{} (room {room})", r.display_name()),
                    None => r.display_name(),
                })
                .collect(),
        );

        let mutuelles = store.list_mutuelles(limit).await?;
        push("Mutuelles", mutuelles.into_iter().map(|m| m.name).collect());

        let physicians = store.list_physicians(limit).await?;
        push(
            "Physicians",
            physicians
                .into_iter()
                .map(|p| match p.specialty {
                    Some(specialty) => format!("{} ({specialty})", p.name),
                    None => p.name,
                })
                .collect(),
        );

        let rooms = store.list_rooms(limit).await?;
        push(
            "Rooms",
            rooms
                .iter()
                .map(|r| format!("{} (capacity {})", r.room_number, r.capacity))
                .collect(),
        );

        let mut names = Enricher::new(store);

        let appointments = store.list_appointments(None, limit).await?;
        let mut rendered = Vec::with_capacity(appointments.len());
        for a in &appointments {
            let resident = names.name(Foreign::Resident, a.resident_id).await?;
            let mut line = format!("{} {} {} for {resident}", a.date, a.time, a.reason);
            if let Some(transporter) = &a.transporter {
                line.push_str(&format!(", transport by {transporter}"));
                if let Some(at) = &a.transport_time {
                    line.push_str(&format!(" at {at}"));
                }
            }
            rendered.push(line);
        }
        push("Appointments", rendered);

        let medications = store.list_medications(limit).await?;
        push("Medications", medications.into_iter().map(|m| m.name).collect());

        let assignments = store.list_patient_medications(None, limit).await?;
        let mut rendered = Vec::with_capacity(assignments.len());
        for pm in &assignments {
            let resident = names.name(Foreign::Resident, pm.resident_id).await?;
            let medication = names.name(Foreign::Medication, pm.medication_id).await?;
            rendered.push(format!(
                "{resident}: {medication} {} ({}, {})",
                pm.dosage, pm.time_of_day, pm.frequency
            ));
        }
        push("Patient medications", rendered);

        let motifs = store.list_motifs(limit).await?;
        push("Motifs", motifs.into_iter().map(|m| m.name).collect());

        let (text, truncated) = truncate_chars(lines.join("\n"), self.max_chars);
        debug!(
            username,
            sections = sections.len(),
            chars = text.chars().count(),
            truncated,
            context = %text,
            "Context assembled"
        );

        Ok(AssembledContext {
            text,
            sections,
            truncated,
        })
    }
}

fn truncate_chars(mut text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            text.truncate(cut);
            (text, true)
        }
        None => (text, false),
    }
}
