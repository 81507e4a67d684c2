//! Resident admission and records.

use std::sync::Arc;

use isenior_core::model::{ResidentInput, ResidentView};
use isenior_core::store::{ReferenceStore, ResidentStore, RoomStore};
use isenior_core::{Error, Result, Store};
use tracing::info;

use crate::validate;

pub struct ResidentService {
    store: Arc<dyn Store>,
}

impl ResidentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<ResidentView>> {
        let rows = self.store.list_residents(None).await?;
        Ok(rows.into_iter().map(ResidentView::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<ResidentView> {
        self.store
            .get_resident(id)
            .await?
            .map(ResidentView::from)
            .ok_or_else(|| Error::not_found("Resident", id))
    }

    /// Admit a resident. A room assignment must leave the room within capacity.
    pub async fn create(&self, input: ResidentInput) -> Result<ResidentView> {
        self.check(&input, None).await?;
        let resident = self.store.insert_resident(&input).await?;
        info!(resident = resident.id, room = ?resident.room_number, "Resident admitted");
        Ok(resident.into())
    }

    pub async fn update(&self, id: i64, input: ResidentInput) -> Result<ResidentView> {
        if self.store.get_resident(id).await?.is_none() {
            return Err(Error::not_found("Resident", id));
        }
        self.check(&input, Some(id)).await?;

        let resident = self
            .store
            .update_resident(id, &input)
            .await?
            .ok_or_else(|| Error::not_found("Resident", id))?;
        info!(resident = id, "Resident updated");
        Ok(resident.into())
    }

    /// Refused while appointments or medication assignments still point at the resident.
    pub async fn delete(&self, id: i64) -> Result<()> {
        if self.store.get_resident(id).await?.is_none() {
            return Err(Error::not_found("Resident", id));
        }
        let dependents = self.store.count_resident_dependents(id).await?;
        if dependents > 0 {
            return Err(Error::conflict(format!(
                "resident {id} still has {dependents} appointment(s) or medication assignment(s)"
            )));
        }
        if !self.store.delete_resident(id).await? {
            return Err(Error::not_found("Resident", id));
        }
        info!(resident = id, "Resident removed");
        Ok(())
    }

    async fn check(&self, input: &ResidentInput, existing: Option<i64>) -> Result<()> {
        validate::non_empty("last_name", &input.last_name)?;
        validate::non_empty("first_name", &input.first_name)?;
        validate::date("birth_date", &input.birth_date)?;

        if let Some(mutuelle) = input.mutuelle_id {
            if self.store.get_mutuelle(mutuelle).await?.is_none() {
                return Err(Error::validation(format!("mutuelle {mutuelle} does not exist")));
            }
        }
        if let Some(physician) = input.physician_id {
            if self.store.get_physician(physician).await?.is_none() {
                return Err(Error::validation(format!(
                    "physician {physician} does not exist"
                )));
            }
        }
        if let Some(room_number) = input.room_number {
            let room = self
                .store
                .get_room(room_number)
                .await?
                .ok_or_else(|| Error::validation(format!("room {room_number} does not exist")))?;
            let occupants = self
                .store
                .count_room_occupants(room_number, existing)
                .await?;
            if occupants >= room.capacity {
                return Err(Error::conflict(format!(
                    "room {room_number} is full ({occupants}/{})",
                    room.capacity
                )));
            }
        }
        Ok(())
    }
}
