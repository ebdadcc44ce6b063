use std::collections::HashMap;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use super::loader;
use crate::config::BackendConfig;
use crate::error::Result;
use crate::interval::engine;
use crate::interval::types::IntervalSet;
use crate::registry::types::{QueryId, ShardMessage};

/// Upper bound on one shard datagram; matches the coordinator's receive
/// buffer.
pub const MAX_DATAGRAM: usize = 64 * 1024;

/// One backend shard: an immutable username table plus the serving loop.
pub struct BackendService {
    config: BackendConfig,
    table: HashMap<String, IntervalSet>,
}

impl BackendService {
    /// Loading phase: parse the availability file into the local table.
    pub fn load(config: BackendConfig) -> Result<Self> {
        let table = loader::load_availability(&config.data_path)?;
        info!(
            "backend {} loaded {} users from {}",
            config.id,
            table.len(),
            config.data_path.display()
        );
        Ok(Self { config, table })
    }

    /// Builds a backend from an in-memory table, bypassing the file loader.
    pub fn with_table(config: BackendConfig, table: HashMap<String, IntervalSet>) -> Self {
        Self { config, table }
    }

    /// Registering phase followed by the serving loop; never returns under
    /// normal operation.
    pub async fn serve(self) -> Result<()> {
        let socket = UdpSocket::bind(self.config.bind_addr).await?;
        self.register(&socket).await?;
        info!(
            "backend {} is up and running using UDP on {}",
            self.config.id,
            socket.local_addr()?
        );

        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, src) = socket.recv_from(&mut buf).await?;
            match ShardMessage::decode(&buf[..len]) {
                Ok(ShardMessage::Query { id, usernames }) => {
                    debug!(
                        "backend {} received a query for {} users from {}",
                        self.config.id,
                        usernames.len(),
                        src
                    );
                    let reply = self.answer(id, &usernames);
                    if let ShardMessage::Reply { intervals, matched, .. } = &reply {
                        info!(
                            "backend {} found intersection {} for {}",
                            self.config.id,
                            intervals,
                            matched.join(", ")
                        );
                    }
                    // reply goes to the query's source, never broadcast
                    match reply.encode() {
                        Ok(bytes) => {
                            if let Err(e) = socket.send_to(&bytes, src).await {
                                warn!(
                                    "backend {} failed to send reply to {}: {}",
                                    self.config.id, src, e
                                );
                            }
                        }
                        Err(e) => warn!("backend {} failed to encode reply: {}", self.config.id, e),
                    }
                }
                Ok(other) => {
                    warn!(
                        "backend {} ignoring unexpected message from {}: {:?}",
                        self.config.id, src, other
                    );
                }
                Err(e) => {
                    warn!(
                        "backend {} dropping malformed datagram from {}: {}",
                        self.config.id, src, e
                    );
                }
            }
        }
    }

    async fn register(&self, socket: &UdpSocket) -> Result<()> {
        let usernames: Vec<String> = self.table.keys().cloned().collect();
        let msg = ShardMessage::Register {
            backend: self.config.id.clone(),
            usernames,
        };
        socket
            .send_to(&msg.encode()?, self.config.coordinator_addr)
            .await?;
        info!(
            "backend {} finished sending its username list to the coordinator at {}",
            self.config.id, self.config.coordinator_addr
        );
        Ok(())
    }

    /// Computes one query's reply: fold-intersection over the requested
    /// users that exist in the local table.
    ///
    /// A requested username missing from the table means the coordinator's
    /// registry and this table disagree; that is a local diagnostic, not
    /// something the requester hears about.
    pub fn answer(&self, id: QueryId, usernames: &[String]) -> ShardMessage {
        let mut matched = Vec::new();
        let mut sets = Vec::new();
        for username in usernames {
            match self.table.get(username) {
                Some(availability) => {
                    matched.push(username.clone());
                    sets.push(availability);
                }
                None => warn!(
                    "backend {}: no availability for '{}' (registry out of sync with local table)",
                    self.config.id, username
                ),
            }
        }
        let intersection = engine::intersect_all(sets);
        ShardMessage::Reply {
            id,
            matched,
            intervals: intersection.to_wire(),
        }
    }
}
