//! Init config command handler

use crate::config::Config;

pub fn cmd_init_config() -> anyhow::Result<()> {
    let path = Config::default_config_path();
    if Config::create_default_if_missing()? {
        println!(
            "✓ Config file created at {} with a generated auth.jwt_secret.",
            path.display()
        );
    } else {
        println!("Config file already exists: {}", path.display());
    }
    Ok(())
}
