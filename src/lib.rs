pub mod app;
pub mod config;
pub mod parser;
pub mod reservation;

use anyhow::Result;
use env_logger::Env;
use log::info;

pub fn run() -> Result<()> {
    let app = app::Application::new()?;
    info!("Initializing ReserveBot application");
    app.run()
}

pub fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use config::{Config, EnvironmentList};
pub use parser::time::TimeError;
pub use reservation::{Requester, Reservation};
