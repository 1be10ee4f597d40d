mod app;
mod assets;
mod config;
mod input;
mod model;
mod render;
mod sim;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    app::run()?;
    Ok(())
}
