//! Appointment management.
//!
//! Every appointment belongs to exactly one resident. Reads always carry the
//! resident's display name next to `resident_id`.

use std::sync::Arc;

use isenior_core::model::{Appointment, AppointmentInput, AppointmentView};
use isenior_core::store::{AppointmentStore, ResidentStore};
use isenior_core::{Error, Result, Store};
use tracing::{debug, info};

use crate::enrich::{Enricher, Foreign};
use crate::validate;

pub struct AppointmentService {
    store: Arc<dyn Store>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All appointments in id order, optionally for one resident only.
    pub async fn list(&self, resident_id: Option<i64>) -> Result<Vec<AppointmentView>> {
        let rows = self.store.list_appointments(resident_id, None).await?;
        debug!("Listing {} appointments", rows.len());

        let mut enricher = Enricher::new(self.store.as_ref());
        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let name = enricher.name(Foreign::Resident, row.resident_id).await?;
            views.push(AppointmentView::new(row, name));
        }
        Ok(views)
    }

    pub async fn get(&self, id: i64) -> Result<AppointmentView> {
        let row = self
            .store
            .get_appointment(id)
            .await?
            .ok_or_else(|| Error::not_found("Appointment", id))?;
        self.view(row).await
    }

    pub async fn create(&self, input: AppointmentInput) -> Result<AppointmentView> {
        self.check(&input).await?;
        let row = self.store.insert_appointment(&input).await?;
        info!(
            appointment = row.id,
            resident = row.resident_id,
            "Appointment created"
        );
        self.view(row).await
    }

    /// Full replace of every mutable field.
    pub async fn update(&self, id: i64, input: AppointmentInput) -> Result<AppointmentView> {
        if self.store.get_appointment(id).await?.is_none() {
            return Err(Error::not_found("Appointment", id));
        }
        self.check(&input).await?;

        let row = self
            .store
            .update_appointment(id, &input)
            .await?
            .ok_or_else(|| Error::not_found("Appointment", id))?;
        info!(appointment = id, "Appointment updated");
        self.view(row).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete_appointment(id).await? {
            return Err(Error::not_found("Appointment", id));
        }
        info!(appointment = id, "Appointment deleted");
        Ok(())
    }

    async fn check(&self, input: &AppointmentInput) -> Result<()> {
        validate::date("date", &input.date)?;
        validate::time("time", &input.time)?;
        validate::non_empty("reason", &input.reason)?;
        validate::optional_time("transport_time", input.transport_time.as_deref())?;

        if self.store.get_resident(input.resident_id).await?.is_none() {
            return Err(Error::validation(format!(
                "resident {} does not exist",
                input.resident_id
            )));
        }
        Ok(())
    }

    async fn view(&self, row: Appointment) -> Result<AppointmentView> {
        let name = Enricher::new(self.store.as_ref())
            .name(Foreign::Resident, row.resident_id)
            .await?;
        Ok(AppointmentView::new(row, name))
    }
}
