//! Location query parsing
//!
//! Grammar: `[<class>:]<name>[:<start>(,|-|..)<stop>]`. Digit-group commas
//! inside coordinates are stripped. The first matching rule wins:
//!
//! 1. `name:start,stop` (plain numbers around a single comma)
//! 2. `name:start-stop` or `name:start..stop` (commas allowed inside numbers)
//! 3. `class:name`
//! 4. bare `name`
//!
//! Rules 1 and 2 also accept a leading `class:` prefix.

use crate::error::{BrowseError, BrowseResult};
use crate::types::Position;
use regex::Regex;
use std::sync::OnceLock;

/// A parsed location query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub class: Option<String>,
    pub name: String,
    pub start: Option<Position>,
    pub stop: Option<Position>,
}

impl LocationQuery {
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            class: None,
            name: name.into(),
            start: None,
            stop: None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.name.contains('*')
    }

    pub fn has_range(&self) -> bool {
        self.start.is_some() && self.stop.is_some()
    }
}

fn comma_range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:([\w.\-]+):)?([\w.\-*]+):(-?[\d.]+),(-?[\d.]+)$").expect("valid regex")
    })
}

fn dash_range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:([\w.\-]+):)?([\w.\-*]+):(-?[\d,.]+)(?:-|\.\.)(-?[\d,.]+)$").expect("valid regex")
    })
}

fn class_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\w+):(.+)$").expect("valid regex"))
}

/// Parse a user location string
pub fn parse_location(text: &str) -> BrowseResult<LocationQuery> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BrowseError::invalid_input("empty location"));
    }
    if !text.is_ascii() {
        return Err(BrowseError::invalid_input(format!("location {:?} is not ASCII", text)));
    }

    let ranged = comma_range_pattern()
        .captures(text)
        .or_else(|| dash_range_pattern().captures(text));
    if let Some(caps) = ranged {
        let start = parse_coordinate(&caps[3], text)?;
        let stop = parse_coordinate(&caps[4], text)?;
        return Ok(LocationQuery {
            class: caps.get(1).map(|m| m.as_str().to_string()),
            name: caps[2].to_string(),
            start: Some(start),
            stop: Some(stop),
        });
    }

    if let Some(caps) = class_pattern().captures(text) {
        return Ok(LocationQuery {
            class: Some(caps[1].to_string()),
            name: caps[2].to_string(),
            start: None,
            stop: None,
        });
    }

    Ok(LocationQuery::named(text))
}

fn parse_coordinate(raw: &str, text: &str) -> BrowseResult<Position> {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    digits.parse::<Position>().map_err(|_| {
        BrowseError::invalid_input(format!("coordinate {:?} in {:?} is not an integer", raw, text))
    })
}
