use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tracing::{debug, info, warn};

use super::session::Session;
use crate::backend::service::MAX_DATAGRAM;
use crate::config::CoordinatorConfig;
use crate::error::{Error, Result};
use crate::registry::service::ShardRegistry;
use crate::registry::types::{BackendId, ShardMessage};

/// The process mediating between requesters and backend shards.
pub struct Coordinator {
    config: CoordinatorConfig,
    registry: Arc<ShardRegistry>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            registry: Arc::new(ShardRegistry::new()),
        }
    }

    /// Bootstraps the registry, then serves requester sessions forever.
    ///
    /// The requester listener only opens once every expected backend has
    /// registered; sessions are served one at a time, each to completion.
    pub async fn serve(self) -> Result<()> {
        if self.config.expected_backends.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one expected backend is required".to_string(),
            ));
        }

        let socket = Arc::new(UdpSocket::bind(self.config.shard_addr).await?);
        info!(
            "coordinator shard endpoint listening on {}",
            socket.local_addr()?
        );

        await_registrations(
            &self.registry,
            &socket,
            &self.config.expected_backends,
            self.config.registration_timeout(),
        )
        .await?;
        info!(
            "all {} backends registered ({} users total)",
            self.config.expected_backends.len(),
            self.registry.user_count()
        );

        let listener = TcpListener::bind(self.config.client_addr).await?;
        info!(
            "coordinator is up and running; accepting requester sessions on {}",
            listener.local_addr()?
        );

        loop {
            let (stream, peer) = listener.accept().await?;
            info!("requester session opened from {}", peer);
            let session = Session::new(
                self.registry.clone(),
                socket.clone(),
                self.config.query_timeout(),
            );
            if let Err(e) = session.run(stream).await {
                warn!("requester session from {} ended with error: {}", peer, e);
            } else {
                info!("requester session from {} closed", peer);
            }
        }
    }
}

/// Consumes `Register` messages off the shard socket until every expected
/// backend has checked in, under one bounded deadline.
///
/// A backend that never registers, or a username claimed by two different
/// backends, aborts startup: both are configuration errors, and serving
/// requests against a partial or corrupt registry would answer wrongly.
pub async fn await_registrations(
    registry: &ShardRegistry,
    socket: &UdpSocket,
    expected: &[BackendId],
    timeout: Duration,
) -> Result<()> {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut buf = vec![0u8; MAX_DATAGRAM];
    while !registry.is_complete(expected) {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return Err(Error::RegistrationTimeout(registry.missing(expected)));
        }
        let received = match tokio::time::timeout(remaining, socket.recv_from(&mut buf)).await {
            Ok(io) => io?,
            Err(_) => return Err(Error::RegistrationTimeout(registry.missing(expected))),
        };
        let (len, src) = received;
        match ShardMessage::decode(&buf[..len]) {
            Ok(ShardMessage::Register { backend, usernames }) => {
                if !expected.contains(&backend) {
                    warn!(
                        "ignoring registration from unexpected backend {} at {}",
                        backend, src
                    );
                    continue;
                }
                registry.register(&backend, src, &usernames)?;
                info!(
                    "received the username list from backend {} at {} ({} users)",
                    backend,
                    src,
                    usernames.len()
                );
            }
            Ok(other) => debug!("ignoring non-registration message from {}: {:?}", src, other),
            Err(e) => warn!("dropping malformed datagram from {}: {}", src, e),
        }
    }
    Ok(())
}
