//! Requester Session Protocol
//!
//! Defines the Data Transfer Objects exchanged with a requester over one
//! persistent TCP connection. Each message is a single JSON line; requests
//! are answered strictly in arrival order.

use serde::{Deserialize, Serialize};

use crate::registry::types::BackendId;

/// One requester utterance: the usernames to find common availability for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub usernames: Vec<String>,
}

/// The answer to one request. Built fresh per request, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    /// Merged availability in canonical wire text (`[]` when empty).
    pub intervals: String,
    /// Usernames found in no backend. Not an error; a normal field.
    pub unknown: Vec<String>,
    /// Usernames resolved to some backend, in request order. Display only.
    pub resolved: Vec<String>,
    /// Backends that failed to reply in time; their contribution is absent
    /// and the merged result is partial. Empty in the healthy case.
    pub degraded: Vec<BackendId>,
}

/// Reply to a request line that could not be parsed. The session survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}
