//! Message scanning for reservation commands
//!
//! Splits a free-text chat message of the form
//! `... @reservebot <environment> <start> [<end>] [comment] [--repo <repo>]`
//! into its raw fields. Scanning never fails: fields that cannot be matched
//! come back empty or unset and are treated as "unspecified" downstream.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+\b").unwrap());
static ENVIRONMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z\-:]+").unwrap());
static START_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"now|\d{1,2}:\d{2}|\d{1,2}[hrs]+").unwrap());
static END_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-|\d{2}:\d{2}|\d{1,2}[hrs]+").unwrap());

const REPO_DELIMITER: &str = "--repo";

/// Raw fields extracted from one chat message, before time resolution.
///
/// `end` is `None` when the message ended right after the start token and
/// `Some("")` when an end token was looked for but not found. `comment` is
/// `Some("")` when scanning proceeded past the start token with no tail text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCommand {
    pub environment: String,
    pub start: String,
    pub end: Option<String>,
    pub comment: Option<String>,
    pub repo: Option<String>,
}

/// Cursor over the message text. A failed scan leaves the cursor in place so
/// later fields can still be picked out of the remaining text.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Advance past the first match of `re`, returning whether one was found.
    fn skip_past(&mut self, re: &Regex) -> bool {
        match re.find(&self.input[self.pos..]) {
            Some(m) => {
                self.pos += m.end();
                true
            }
            None => false,
        }
    }

    /// Return the next run matching `re` and advance past it, or yield an
    /// empty token without advancing.
    fn scan(&mut self, re: &Regex) -> &'a str {
        match re.find(&self.input[self.pos..]) {
            Some(m) => {
                let token = m.as_str();
                self.pos += m.end();
                token
            }
            None => "",
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }
}

/// Scan a chat message into its raw command fields.
pub fn scan_message(message: &str) -> RawCommand {
    let mut scanner = Scanner::new(message);

    if !scanner.skip_past(&MENTION) {
        debug!("no mention marker in message, yielding empty command");
        return RawCommand::default();
    }

    let environment = sanitize(scanner.scan(&ENVIRONMENT));
    let start = sanitize(scanner.scan(&START_TOKEN));

    if scanner.at_end() {
        return RawCommand { environment, start, ..RawCommand::default() };
    }

    let end = sanitize(scanner.scan(&END_TOKEN));
    let (comment, repo) = split_tail(scanner.rest());

    RawCommand { environment, start, end: Some(end), comment: Some(comment), repo }
}

/// Split the trimmed remainder into comment and repo on the first `--repo`.
fn split_tail(tail: &str) -> (String, Option<String>) {
    let tail = tail.trim();
    match tail.split_once(REPO_DELIMITER) {
        Some((comment, repo)) => {
            let repo = repo.trim();
            let repo = if repo.is_empty() { None } else { Some(repo.to_string()) };
            (comment.trim().to_string(), repo)
        }
        None => (tail.to_string(), None),
    }
}

/// Strip a token down to letters, digits, `:`, `-` and `_`.
pub fn sanitize(token: &str) -> String {
    token.chars().filter(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '-' | '_')).collect()
}
