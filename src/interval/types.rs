use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A contiguous block of time, `start < end`, in arbitrary integer units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// Returns `None` for degenerate or inverted pairs; they are never stored.
    pub fn new(start: i64, end: i64) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

/// An ordered sequence of pairwise-disjoint intervals, sorted ascending by
/// start. Sets are only ever built from pre-sorted input (availability
/// files) or by the sweep in [`crate::interval::engine`], so the invariant
/// falls out of construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSet(Vec<Interval>);

impl IntervalSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_intervals(intervals: Vec<Interval>) -> Self {
        Self(intervals)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.0.iter()
    }

    /// Canonical wire text: `[start,end]` pairs joined by single spaces,
    /// `[]` for the empty set.
    pub fn to_wire(&self) -> String {
        if self.0.is_empty() {
            return "[]".to_string();
        }
        self.0
            .iter()
            .map(|iv| iv.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parses the wire text form.
    ///
    /// Tolerates the `[]` empty-set token, surplus whitespace, and comma
    /// separators between pairs (the availability file format writes
    /// `[1,5], [7,9]`). Delimiter-only fragments are ignored, degenerate
    /// pairs are discarded, anything else is rejected.
    pub fn from_wire(text: &str) -> Result<Self> {
        let text = text.trim();
        let mut intervals = Vec::new();
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            if c.is_whitespace() || c == ',' {
                rest = &rest[c.len_utf8()..];
                continue;
            }
            if c != '[' {
                return Err(Error::MalformedIntervals(format!(
                    "unexpected '{c}' in '{text}'"
                )));
            }
            let close = rest
                .find(']')
                .ok_or_else(|| Error::MalformedIntervals(format!("unclosed '[' in '{text}'")))?;
            let body = &rest[1..close];
            rest = &rest[close + 1..];

            // `[]` carries no interval; mid-stream it is just noise.
            if body.trim().is_empty() {
                continue;
            }

            let (start, end) = body.split_once(',').ok_or_else(|| {
                Error::MalformedIntervals(format!("missing ',' in '[{body}]'"))
            })?;
            let start: i64 = start.trim().parse().map_err(|_| {
                Error::MalformedIntervals(format!("bad start in '[{body}]'"))
            })?;
            let end: i64 = end.trim().parse().map_err(|_| {
                Error::MalformedIntervals(format!("bad end in '[{body}]'"))
            })?;
            match Interval::new(start, end) {
                Some(iv) => intervals.push(iv),
                None => tracing::debug!("discarding degenerate interval [{start},{end}]"),
            }
        }
        Ok(Self(intervals))
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl FromIterator<Interval> for IntervalSet {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
