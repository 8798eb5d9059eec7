use std::env;
use std::sync::Arc;

use judgekit_gateway::config::Config;
use judgekit_utils::tracing::setup_tracing;

use anyhow::Result;
use dotenv::dotenv;
use tracing::info;

const CONFIG_PATH: &str = "judgekit.toml";

#[tracing::instrument(err)]
fn load_config() -> Result<Config> {
    let path = env::current_dir()?.join(CONFIG_PATH);

    let config = if path.exists() {
        info!("loading config from {}", path.display());
        Config::from_file(&path)?
    } else {
        info!("{} not found, loading config from environment", path.display());
        Config::from_env()?
    };
    info!("config is loaded:\n{:#?}", config);

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    setup_tracing();

    let config = load_config()?;
    judgekit_gateway::run(Arc::new(config)).await
}
