use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, UdpSocket};
use tracing::{debug, info, warn};

use super::protocol::{ErrorReply, ScheduleRequest, ScheduleResponse};
use crate::backend::service::MAX_DATAGRAM;
use crate::error::Result;
use crate::interval::engine;
use crate::interval::types::IntervalSet;
use crate::registry::service::ShardRegistry;
use crate::registry::types::{BackendId, QueryId, ShardMessage};

/// One backend's partial result for the request in flight.
#[derive(Debug)]
pub struct ShardReply {
    pub backend: BackendId,
    pub matched: Vec<String>,
    pub intervals: String,
}

/// What one fan-out round produced: the replies that arrived in time and
/// the backends that could not be queried or went silent.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub replies: Vec<ShardReply>,
    pub failed: Vec<BackendId>,
}

/// Drives the repeated request/response cycle over one requester
/// connection. Holds no per-request state between iterations.
pub struct Session {
    registry: Arc<ShardRegistry>,
    socket: Arc<UdpSocket>,
    query_timeout: Duration,
}

impl Session {
    pub fn new(
        registry: Arc<ShardRegistry>,
        socket: Arc<UdpSocket>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            socket,
            query_timeout,
        }
    }

    /// Runs until the requester disconnects. A malformed line gets an error
    /// reply and the session continues.
    pub async fn run(&self, stream: TcpStream) -> Result<()> {
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let reply = match serde_json::from_str::<ScheduleRequest>(&line) {
                Ok(request) => {
                    info!(
                        "received a request from the requester for {} usernames",
                        request.usernames.len()
                    );
                    let response = self.handle(&request.usernames).await?;
                    serde_json::to_string(&response)?
                }
                Err(e) => {
                    warn!("rejecting malformed request line: {}", e);
                    serde_json::to_string(&ErrorReply {
                        error: format!("malformed request: {e}"),
                    })?
                }
            };
            write_half.write_all(reply.as_bytes()).await?;
            write_half.write_all(b"\n").await?;
            info!("sent the result to the requester");
        }
        Ok(())
    }

    /// Answers one request: partition, fan out, collect, merge.
    pub async fn handle(&self, usernames: &[String]) -> Result<ScheduleResponse> {
        let parts = self.registry.partition(usernames);
        for (backend, sublist) in &parts.shards {
            info!(
                "found {} located at backend {}; sending the sublist",
                sublist.join(", "),
                backend
            );
        }
        if !parts.unknown.is_empty() {
            info!("{} do not exist in any backend", parts.unknown.join(", "));
        }

        let outcome = self.dispatch(&parts.shards).await?;
        let (merged, mut degraded) = merge_replies(&outcome.replies);
        degraded.extend(outcome.failed);
        if !degraded.is_empty() {
            warn!(
                "answer is partial: no usable contribution from backend(s) {}",
                degraded
                    .iter()
                    .map(|b| b.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(ScheduleResponse {
            intervals: merged.to_wire(),
            unknown: parts.unknown,
            resolved: parts.resolved,
            degraded,
        })
    }

    /// Sends one query per non-empty sublist, then collects replies off the
    /// shared socket under a single deadline. All round trips are in flight
    /// concurrently; a backend with an empty sublist is neither queried nor
    /// waited on.
    ///
    /// A backend that cannot be reached, a socket hiccup mid-collect, or a
    /// reply that never comes all degrade that backend's contribution to
    /// absent; none of them abort the request, and the requester always
    /// gets an answer.
    async fn dispatch(&self, shards: &BTreeMap<BackendId, Vec<String>>) -> Result<DispatchOutcome> {
        let mut outcome = DispatchOutcome::default();
        let mut pending: HashMap<QueryId, BackendId> = HashMap::new();
        for (backend, sublist) in shards {
            let Some(addr) = self.registry.addr_of(backend) else {
                // partition() only yields registered backends
                warn!("no address recorded for backend {}", backend);
                continue;
            };
            let id = QueryId::new();
            let query = ShardMessage::Query {
                id: id.clone(),
                usernames: sublist.clone(),
            };
            match self.socket.send_to(&query.encode()?, addr).await {
                Ok(_) => {
                    pending.insert(id, backend.clone());
                }
                Err(e) => {
                    warn!(
                        "failed to send query to backend {} at {}: {}; treating its contribution as absent",
                        backend, addr, e
                    );
                    outcome.failed.push(backend.clone());
                }
            }
        }

        let deadline = tokio::time::Instant::now() + self.query_timeout;
        let mut buf = vec![0u8; MAX_DATAGRAM];
        while !pending.is_empty() {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                break;
            }
            let received = match tokio::time::timeout(remaining, self.socket.recv_from(&mut buf)).await
            {
                Ok(Ok(io)) => io,
                Ok(Err(e)) => {
                    warn!("shard socket receive error: {}", e);
                    continue;
                }
                Err(_) => break,
            };
            let (len, src) = received;
            match ShardMessage::decode(&buf[..len]) {
                Ok(ShardMessage::Reply {
                    id,
                    matched,
                    intervals,
                }) => match pending.remove(&id) {
                    Some(backend) => {
                        info!(
                            "received from backend {} the intersection result: {}",
                            backend, intervals
                        );
                        outcome.replies.push(ShardReply {
                            backend,
                            matched,
                            intervals,
                        });
                    }
                    None => debug!("dropping stale reply {} from {}", id, src),
                },
                Ok(ShardMessage::Register { backend, .. }) => {
                    // the registry froze at the end of bootstrap
                    warn!(
                        "ignoring registration from backend {} after bootstrap",
                        backend
                    );
                }
                Ok(other) => debug!("ignoring unexpected message from {}: {:?}", src, other),
                Err(e) => warn!("dropping malformed datagram from {}: {}", src, e),
            }
        }
        outcome.failed.extend(pending.into_values());
        outcome.failed.sort();
        Ok(outcome)
    }
}

/// Folds the collected partial results into the final answer.
///
/// A reply whose `matched` list is empty contributed no constraint at all
/// and is excluded from the fold; only a genuine zero-overlap `[]` from a
/// backend that did match users propagates emptiness. A reply whose
/// interval text does not parse degrades that backend instead of poisoning
/// the merge.
pub fn merge_replies(replies: &[ShardReply]) -> (IntervalSet, Vec<BackendId>) {
    let mut sets = Vec::new();
    let mut degraded = Vec::new();
    for reply in replies {
        if reply.matched.is_empty() {
            debug!(
                "backend {} matched no requested users; excluding it from the merge",
                reply.backend
            );
            continue;
        }
        match IntervalSet::from_wire(&reply.intervals) {
            Ok(set) => sets.push(set),
            Err(e) => {
                warn!(
                    "unparseable intervals from backend {}: {}",
                    reply.backend, e
                );
                degraded.push(reply.backend.clone());
            }
        }
    }
    (engine::intersect_all(sets.iter()), degraded)
}
