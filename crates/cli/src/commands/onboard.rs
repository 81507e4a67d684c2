//! `isenior onboard` — Write a default config file.

use std::path::Path;

use isenior_config::AppConfig;

pub fn run(config_path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let config_path = super::config_path(config_path);

    println!("iSenior — First-Time Setup");
    println!("==========================\n");

    if let Some(dir) = config_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("   Edit it manually, or re-run with --force to overwrite.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!(
        "   1. Set llm.api_key in {} (or export ISENIOR_API_KEY)",
        config_path.display()
    );
    println!("   2. Run: isenior init-db --demo");
    println!("   3. Run: isenior serve\n");

    Ok(())
}
