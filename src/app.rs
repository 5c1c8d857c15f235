//! Interactive terminal front end
//!
//! A readline loop that feeds each line through the reservation parser and
//! prints the reply a chat bot would post. A real chat host would supply the
//! requester identity from its user store; here it comes from environment
//! variables.

use crate::config::Config;
use crate::reservation::{Requester, Reservation};
use anyhow::Result;
use chrono::Utc;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const USER_VAR: &str = "RESERVEBOT_USER";
const TIMEZONE_VAR: &str = "RESERVEBOT_TZ";

pub struct Application {
    requester: Requester,
    config: Config,
}

impl Application {
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        let name = std::env::var(USER_VAR).unwrap_or_else(|_| "dev".to_string());
        let timezone = std::env::var(TIMEZONE_VAR).unwrap_or_else(|_| "UTC".to_string());

        Ok(Self { requester: Requester::new(&name, &timezone), config })
    }

    pub fn run(&self) -> Result<()> {
        log::info!(
            "Starting ReserveBot terminal for {} ({})",
            self.requester.name,
            self.requester.timezone
        );

        let mut rl = DefaultEditor::new()?;
        println!("Welcome to ReserveBot! Type a reservation message, or 'help' for examples.");
        let prompt = ">> ";

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    if let Err(err) = self.process_input(&line) {
                        log::error!("Failed to process message: {:?}", err);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn process_input(&self, line: &str) -> Result<()> {
        let line = line.trim();
        match line {
            "" => return Ok(()),
            "help" => {
                print_help();
                return Ok(());
            }
            "exit" => std::process::exit(0),
            _ => {}
        }

        // `json <message>` echoes the parsed record instead of the reply.
        let (as_json, message) = match line.strip_prefix("json ") {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        let reservation = Reservation::from_message(message, &self.requester, Utc::now())?;
        if reservation.environment.is_empty() {
            println!("That doesn't look like a reservation message. Type 'help' for examples.");
            return Ok(());
        }

        let environments = self.config.environments();
        if !environments.is_empty() && !reservation.is_valid_environment(&environments) {
            println!(
                "Unknown environment '{}'. Known environments: {}",
                reservation.environment,
                environments.names().join(", ")
            );
            return Ok(());
        }

        if as_json {
            println!("{}", serde_json::to_string_pretty(&reservation)?);
        } else {
            println!("{}", reservation.human_readable()?);
            if reservation.is_current() {
                println!("(this reservation is active right now)");
            }
        }

        Ok(())
    }
}

fn print_help() {
    println!("Reservation messages:");
    println!("  @reservebot <environment> <start> [<end>] [comment] [--repo <repo>]");
    println!();
    println!("Examples:");
    println!("  @reservebot staging-nz now 1h just testing");
    println!("  @reservebot demo-au 13:00 -");
    println!("  @reservebot demo-au now 3hrs load test --repo infra-tools");
    println!("  @reservebot demo-au free");
    println!();
    println!("Prefix a message with 'json ' to see the parsed record.");
    println!("Set {} and {} to change the requester identity.", USER_VAR, TIMEZONE_VAR);
}
