//! `isenior init-db` — Create the schema and seed data.

use std::path::Path;
use std::sync::Arc;

use isenior_domain::{seed_demo_staff, UserService};
use isenior_store::{seed_demo_records, seed_reference_data};
use tracing::warn;

pub async fn run(config_path: Option<&Path>, demo: bool, force: bool) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;

    println!("iSenior database: {}", config.database.path);

    if force {
        warn!(database = %config.database.path, "Dropping all tables");
        store.reset().await?;
        println!("   Tables dropped and recreated");
    }

    let reference = seed_reference_data(&store).await?;
    println!(
        "   Reference data: {} mutuelles, {} physicians, {} motifs, {} medications",
        reference.mutuelles, reference.physicians, reference.motifs, reference.medications
    );

    if demo {
        let records = seed_demo_records(&store).await?;
        println!(
            "   Demo records: {} rooms, {} residents, {} medication assignments, {} appointments",
            records.rooms, records.residents, records.patient_medications, records.appointments
        );

        let users = UserService::new(Arc::new(store));
        let staff = seed_demo_staff(&users).await?;
        println!("   Demo staff accounts: {staff}");
    }

    println!("Database ready.");
    Ok(())
}
