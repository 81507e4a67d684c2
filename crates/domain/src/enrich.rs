//! Read-side join: turn foreign keys into display names.
//!
//! Appointments and medication assignments never leave the domain layer with
//! bare ids. [`Enricher`] resolves each referenced row once per listing and
//! projects the field shown to staff. A reference to a row that no longer
//! exists renders as a placeholder instead of failing the whole listing.

use std::collections::HashMap;

use isenior_core::store::{MedicationStore, ResidentStore};
use isenior_core::{Result, Store};
use tracing::warn;

/// Which table a foreign key points into, and therefore which field is projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Foreign {
    /// Projects "First Last".
    Resident,
    /// Projects the catalog name.
    Medication,
}

impl Foreign {
    fn label(self) -> &'static str {
        match self {
            Self::Resident => "resident",
            Self::Medication => "medication",
        }
    }

    /// Shown in place of a name when the referenced row is gone.
    pub fn placeholder(self, id: i64) -> String {
        format!("unknown {} #{id}", self.label())
    }
}

/// Memoizing name resolver scoped to one read operation.
pub struct Enricher<'a> {
    store: &'a dyn Store,
    cache: HashMap<(Foreign, i64), String>,
}

impl<'a> Enricher<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// Display name for `id` in the `foreign` table.
    pub async fn name(&mut self, foreign: Foreign, id: i64) -> Result<String> {
        if let Some(name) = self.cache.get(&(foreign, id)) {
            return Ok(name.clone());
        }

        let projected = match foreign {
            Foreign::Resident => self
                .store
                .get_resident(id)
                .await?
                .map(|r| r.display_name()),
            Foreign::Medication => self.store.get_medication(id).await?.map(|m| m.name),
        };

        let name = projected.unwrap_or_else(|| {
            warn!("Dangling {} reference #{id}", foreign.label());
            foreign.placeholder(id)
        });
        self.cache.insert((foreign, id), name.clone());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isenior_core::model::ResidentInput;
    use isenior_store::{seed_reference_data, SqliteStore};

    #[tokio::test]
    async fn resolves_and_projects_names() {
        let store = SqliteStore::new("sqlite::memory:", 1).await.unwrap();
        seed_reference_data(&store).await.unwrap();
        let marie = store
            .insert_resident(&ResidentInput {
                last_name: "Dupont".into(),
                first_name: "Marie".into(),
                birth_date: "1940-05-15".into(),
                mutuelle_id: None,
                national_id: None,
                physician_id: None,
                medication_note: None,
                room_number: None,
            })
            .await
            .unwrap();

        let mut enricher = Enricher::new(&store);
        assert_eq!(
            enricher.name(Foreign::Resident, marie.id).await.unwrap(),
            "Marie Dupont"
        );
        assert_eq!(
            enricher.name(Foreign::Medication, 1).await.unwrap(),
            "Paracétamol"
        );
    }

    #[tokio::test]
    async fn dangling_reference_renders_placeholder() {
        let store = SqliteStore::new("sqlite::memory:", 1).await.unwrap();
        let mut enricher = Enricher::new(&store);
        assert_eq!(
            enricher.name(Foreign::Resident, 42).await.unwrap(),
            "unknown resident #42"
        );
        assert_eq!(
            enricher.name(Foreign::Medication, 7).await.unwrap(),
            "unknown medication #7"
        );
    }
}
