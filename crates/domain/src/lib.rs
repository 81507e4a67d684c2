//! Domain services for iSenior.
//!
//! Each service holds the injected `Arc<dyn Store>` and owns the rules the
//! store does not: referential checks on write (reported as validation
//! errors), room capacity, and read-side enrichment of foreign keys.

pub mod appointments;
pub mod catalog;
pub mod enrich;
pub mod medications;
pub mod residents;
pub mod rooms;
pub mod users;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use isenior_core::Store;

pub use appointments::AppointmentService;
pub use catalog::ReferenceService;
pub use enrich::{Enricher, Foreign};
pub use medications::MedicationService;
pub use residents::ResidentService;
pub use rooms::RoomService;
pub use users::{seed_demo_staff, Registration, UserService};

/// Every service, wired to one store.
pub struct Services {
    pub store: Arc<dyn Store>,
    pub appointments: AppointmentService,
    pub medications: MedicationService,
    pub residents: ResidentService,
    pub rooms: RoomService,
    pub users: UserService,
    pub reference: ReferenceService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            appointments: AppointmentService::new(store.clone()),
            medications: MedicationService::new(store.clone()),
            residents: ResidentService::new(store.clone()),
            rooms: RoomService::new(store.clone()),
            users: UserService::new(store.clone()),
            reference: ReferenceService::new(store.clone()),
            store,
        }
    }
}
