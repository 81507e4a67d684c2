//! `isenior create-user` — Add an approved staff account.

use std::path::Path;
use std::sync::Arc;

use isenior_domain::{Registration, UserService};

pub async fn run(config_path: Option<&Path>, registration: Registration) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;

    let users = UserService::new(Arc::new(store));
    let user = users.create_approved(registration).await?;

    println!(
        "Created user '{}' (id {}, role {}, status {})",
        user.username, user.id, user.role, user.status
    );
    Ok(())
}
