use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::Result;

/// Opaque shard identity. The deployment ships two shards named "A" and
/// "B", but nothing in the crate assumes a fixed count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(pub String);

impl BackendId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BackendId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// Correlation id for one shard query round trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct QueryId(pub String);

impl QueryId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The wire protocol between backends and the coordinator (bincode over
/// UDP).
///
/// - `Register`: sent once by each backend at startup, announcing every
///   username it owns. The datagram's source address doubles as the
///   backend's query address.
/// - `Query`: sent by the coordinator to exactly one backend; the username
///   list is never empty.
/// - `Reply`: the backend's answer, addressed to the query's source.
///   `intervals` is the canonical wire text of the local fold-intersection;
///   `matched` lists the usernames actually found in the local table, so
///   the coordinator can tell "contributed no data" apart from "zero
///   overlap".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShardMessage {
    Register {
        backend: BackendId,
        usernames: Vec<String>,
    },

    Query {
        id: QueryId,
        usernames: Vec<String>,
    },

    Reply {
        id: QueryId,
        matched: Vec<String>,
        intervals: String,
    },
}

impl ShardMessage {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
