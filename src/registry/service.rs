use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::net::SocketAddr;

use super::types::BackendId;
use crate::error::{Error, Result};

/// A request split into per-backend sublists plus the unresolved remainder.
///
/// Every requested username lands in exactly one bucket: some backend's
/// sublist or `unknown`. `resolved` repeats the owned usernames in request
/// order for display purposes only.
#[derive(Debug, Default)]
pub struct PartitionedRequest {
    pub shards: BTreeMap<BackendId, Vec<String>>,
    pub unknown: Vec<String>,
    pub resolved: Vec<String>,
}

/// Username to owning-backend mapping, built during coordinator bootstrap.
///
/// Writes happen only while registrations are being collected, strictly
/// before any request is served, so the read path never contends with a
/// writer.
pub struct ShardRegistry {
    owners: DashMap<String, BackendId>,
    backends: DashMap<BackendId, SocketAddr>,
}

impl ShardRegistry {
    pub fn new() -> Self {
        Self {
            owners: DashMap::new(),
            backends: DashMap::new(),
        }
    }

    /// Records one backend's username list and reply address.
    ///
    /// Idempotent per backend: re-announcing an already-owned username is a
    /// no-op. A username already owned by a different backend is a
    /// configuration error; silently reassigning it would corrupt the
    /// mapping.
    pub fn register(
        &self,
        backend: &BackendId,
        addr: SocketAddr,
        usernames: &[String],
    ) -> Result<()> {
        for username in usernames {
            match self.owners.entry(username.clone()) {
                Entry::Occupied(existing) => {
                    if existing.get() != backend {
                        return Err(Error::DuplicateClaim {
                            username: username.clone(),
                            first: existing.get().clone(),
                            second: backend.clone(),
                        });
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(backend.clone());
                }
            }
        }
        // An empty username list still counts as a completed registration.
        self.backends.insert(backend.clone(), addr);
        Ok(())
    }

    pub fn lookup(&self, username: &str) -> Option<BackendId> {
        self.owners.get(username).map(|entry| entry.value().clone())
    }

    pub fn addr_of(&self, backend: &BackendId) -> Option<SocketAddr> {
        self.backends.get(backend).map(|entry| *entry.value())
    }

    pub fn is_registered(&self, backend: &BackendId) -> bool {
        self.backends.contains_key(backend)
    }

    /// Expected backends that have not registered yet.
    pub fn missing(&self, expected: &[BackendId]) -> Vec<BackendId> {
        expected
            .iter()
            .filter(|backend| !self.is_registered(backend))
            .cloned()
            .collect()
    }

    pub fn is_complete(&self, expected: &[BackendId]) -> bool {
        self.missing(expected).is_empty()
    }

    pub fn user_count(&self) -> usize {
        self.owners.len()
    }

    /// Splits a request into per-backend sublists and the unknown set.
    pub fn partition(&self, usernames: &[String]) -> PartitionedRequest {
        let mut parts = PartitionedRequest::default();
        for username in usernames {
            match self.lookup(username) {
                Some(backend) => {
                    parts
                        .shards
                        .entry(backend)
                        .or_default()
                        .push(username.clone());
                    parts.resolved.push(username.clone());
                }
                None => parts.unknown.push(username.clone()),
            }
        }
        parts
    }
}

impl Default for ShardRegistry {
    fn default() -> Self {
        Self::new()
    }
}
