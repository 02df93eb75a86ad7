//! `roadsafe init`: Write a default node configuration.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

const DEFAULT_CONFIG: &str = r#"# RoadSafe Node Configuration

[api]
listen_addr = "127.0.0.1"
port = 3000

[backend]
base_url = "http://127.0.0.1:5000"
timeout_secs = 30

[gateway]
valid_status = "VALID"
success_page = "/payment/success"
failed_page = "/payment/failed"
cancelled_page = "/payment/cancelled"

[cache]
default_ttl_secs = 30

[logging]
level = "info"
format = "text"
"#;

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let config_path = args.dir.join("roadsafe.toml");

    if config_path.exists() {
        anyhow::bail!("configuration file already exists at {}", config_path.display());
    }

    std::fs::create_dir_all(&args.dir)?;
    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Initialized RoadSafe node at {}", config_path.display());
    println!("Edit roadsafe.toml to point at your backend.");
    println!("Run 'roadsafe-node' to start serving payment callbacks.");

    Ok(())
}
