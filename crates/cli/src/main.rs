//! iSenior CLI — the main entry point.
//!
//! Commands:
//! - `serve`        — Start the HTTP API
//! - `init-db`      — Create tables and seed reference (and demo) data
//! - `create-user`  — Add an approved staff account
//! - `onboard`      — Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "isenior",
    about = "iSenior — care-home administration backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.isenior/config.toml)
    #[arg(short, long, global = true, env = "ISENIOR_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the schema and seed reference data
    InitDb {
        /// Also insert sample rooms, residents, appointments and staff
        #[arg(long)]
        demo: bool,

        /// Drop every table first
        #[arg(long)]
        force: bool,
    },

    /// Create an approved, verified staff account
    CreateUser {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        role: String,

        #[arg(long, env = "ISENIOR_USER_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Write a default config file
    Onboard {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::InitDb { demo, force } => {
            commands::init_db::run(config_path, demo, force).await?
        }
        Commands::CreateUser {
            username,
            email,
            role,
            password,
            phone,
        } => {
            let registration = isenior_domain::Registration {
                username,
                password,
                role,
                email,
                phone,
            };
            commands::create_user::run(config_path, registration).await?
        }
        Commands::Onboard { force } => commands::onboard::run(config_path, force)?,
    }

    Ok(())
}
