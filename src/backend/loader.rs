use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::interval::types::IntervalSet;

/// Loads an availability file into the backend's local table.
///
/// One user per line: `username;[start,end] [start,end]`. Comma separators
/// between pairs and stray spacing are tolerated (the legacy files write
/// `alice; [1,5], [7,9]`), blank lines are skipped, and intervals are
/// assumed pre-sorted and disjoint. Usernames with embedded whitespace and
/// duplicate usernames within one file are configuration errors.
pub fn load_availability(path: &Path) -> Result<HashMap<String, IntervalSet>> {
    let text = fs::read_to_string(path)?;
    parse_availability(&text)
}

pub fn parse_availability(text: &str) -> Result<HashMap<String, IntervalSet>> {
    let mut table = HashMap::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let (name, intervals) = raw.split_once(';').ok_or(Error::MalformedAvailability {
            line,
            reason: "missing ';' separator".to_string(),
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::MalformedAvailability {
                line,
                reason: "empty username".to_string(),
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(Error::MalformedAvailability {
                line,
                reason: format!("username '{name}' contains whitespace"),
            });
        }
        let availability =
            IntervalSet::from_wire(intervals).map_err(|e| Error::MalformedAvailability {
                line,
                reason: e.to_string(),
            })?;
        if table.insert(name.to_string(), availability).is_some() {
            return Err(Error::MalformedAvailability {
                line,
                reason: format!("duplicate username '{name}'"),
            });
        }
    }
    Ok(table)
}
