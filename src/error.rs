//! Error types for schedule-cluster
//!
//! One taxonomy for the whole crate: configuration problems are fatal at
//! process startup, per-message problems (malformed datagrams, bad request
//! lines) are rejected without taking the process down, and backend
//! timeouts are degraded into partial responses rather than surfaced here.

use thiserror::Error;

use crate::registry::types::BackendId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Wire errors ===
    #[error("malformed interval text: {0}")]
    MalformedIntervals(String),

    #[error("malformed shard message: {0}")]
    Codec(#[from] bincode::Error),

    #[error("session encode error: {0}")]
    Json(#[from] serde_json::Error),

    // === Configuration errors (fatal at startup) ===
    #[error("availability file line {line}: {reason}")]
    MalformedAvailability { line: usize, reason: String },

    #[error("username '{username}' claimed by both backend {first} and backend {second}")]
    DuplicateClaim {
        username: String,
        first: BackendId,
        second: BackendId,
    },

    #[error("backends never registered: {}", format_backends(.0))]
    RegistrationTimeout(Vec<BackendId>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn format_backends(backends: &[BackendId]) -> String {
    backends
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

