//! Configuration for cluster components
//!
//! Every component receives an explicit config struct at construction.
//! Listening addresses, peer addresses and timeouts all live here; there is
//! no process-wide mutable socket state.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::registry::types::BackendId;

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// UDP address backends register with and queries go out from.
    pub shard_addr: SocketAddr,

    /// TCP address requester sessions connect to.
    pub client_addr: SocketAddr,

    /// Backends that must register before any request is served.
    pub expected_backends: Vec<BackendId>,

    /// Bootstrap deadline: how long to wait for all registrations.
    #[serde(default = "default_registration_timeout_ms")]
    pub registration_timeout_ms: u64,

    /// Per-request deadline for collecting backend replies.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

fn default_registration_timeout_ms() -> u64 {
    10_000
}
fn default_query_timeout_ms() -> u64 {
    2_000
}

impl CoordinatorConfig {
    pub fn registration_timeout(&self) -> Duration {
        Duration::from_millis(self.registration_timeout_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            shard_addr: "127.0.0.1:7400".parse().unwrap(),
            client_addr: "127.0.0.1:7500".parse().unwrap(),
            expected_backends: vec![BackendId::new("A"), BackendId::new("B")],
            registration_timeout_ms: default_registration_timeout_ms(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

/// Backend shard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Shard identity, must match one of the coordinator's expected backends.
    pub id: BackendId,

    /// UDP bind address; port 0 picks an ephemeral port.
    pub bind_addr: SocketAddr,

    /// The coordinator's shard UDP address.
    pub coordinator_addr: SocketAddr,

    /// Availability file, one `name;[start,end] [start,end]` line per user.
    pub data_path: PathBuf,
}
