//! The reservation record: parsed fields, activity and validity queries, and
//! the chat-ready rendering.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EnvironmentList;
use crate::parser::scanner;
use crate::parser::time::{self, TimeError};

/// Identity of the person asking for a reservation, as supplied by the chat
/// host's user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requester {
    pub name: String,
    pub timezone: String,
}

impl Requester {
    pub fn new(name: &str, timezone: &str) -> Self {
        Self { name: name.to_string(), timezone: timezone.to_string() }
    }
}

/// One parsed reservation request.
///
/// Built once from a message, read thereafter. Fields that could not be
/// parsed stay empty or unset rather than failing the whole message, so a
/// caller has to treat them as "unspecified".
#[derive(Debug, Clone, Serialize)]
pub struct Reservation {
    pub environment: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub repo: Option<String>,
    pub user_name: String,
    pub timezone: String,
}

impl Reservation {
    /// Parse a chat message into a reservation for `requester`, resolving
    /// relative time expressions against `now`.
    ///
    /// The only error is an unknown timezone on the requester record;
    /// malformed messages degrade to a mostly-empty reservation instead.
    pub fn from_message(
        message: &str,
        requester: &Requester,
        now: DateTime<Utc>,
    ) -> Result<Self, TimeError> {
        let raw = scanner::scan_message(message);

        let start_time = time::resolve(&raw.start, &requester.timezone, now, None)?;
        debug!("resolved start time as {:?}", start_time);

        // An end time is never resolved without a start to anchor it.
        let end_time = match (start_time, &raw.end) {
            (Some(_), Some(token)) => {
                let end = time::resolve(token, &requester.timezone, now, start_time)?;
                debug!("resolved end time as {:?}", end);
                end
            }
            _ => None,
        };

        Ok(Self {
            environment: raw.environment,
            start_time,
            end_time,
            comment: raw.comment,
            repo: raw.repo,
            user_name: requester.name.clone(),
            timezone: requester.timezone.clone(),
        })
    }

    /// Whether the reservation is in effect at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.start_time {
            Some(start) => start <= now && self.end_time.map_or(true, |end| now <= end),
            None => false,
        }
    }

    /// Whether the reservation is in effect right now.
    pub fn is_current(&self) -> bool {
        self.is_active(Utc::now())
    }

    /// Whether the environment names one of the allowed targets.
    pub fn is_valid_environment(&self, environments: &EnvironmentList) -> bool {
        environments.contains(&self.environment)
    }

    /// Render the reservation as a chat-ready status message, with times
    /// shown in the requester's timezone.
    pub fn human_readable(&self) -> Result<String, TimeError> {
        let start = match self.start_time {
            Some(start) => start,
            None => return Ok(format!("{} is now free for use", self.environment)),
        };

        let tz = time::parse_tz(&self.timezone)?;

        let end_msg = match self.end_time {
            Some(end) => format!("until {}", format_time(end, tz)),
            None => "with no specified end".to_string(),
        };
        let reason = match &self.comment {
            Some(comment) => format!("Reason: {}", comment),
            None => "No reason given".to_string(),
        };
        let repo_msg = match &self.repo {
            Some(repo) => format!("Repo `{}` ", repo),
            None => String::new(),
        };

        Ok(format!(
            "{}Environment `{}` is reserved by {}\nFrom {}, {}\n{}\n",
            repo_msg,
            self.environment,
            self.user_name,
            format_time(start, tz),
            end_msg,
            reason,
        ))
    }
}

fn format_time(time: DateTime<Utc>, tz: Tz) -> String {
    time.with_timezone(&tz).format("%a %d, %R").to_string()
}
