use anyhow::Result;
use log::info;

fn main() -> Result<()> {
    // Pick up RESERVEBOT_* and SUPPORTED_ENVS from a local .env if present
    let _ = dotenvy::dotenv();

    reservebot::init_logger();
    info!("Starting ReserveBot");

    reservebot::run()
}
