//! Coordinator Module
//!
//! The coordinator mediates between requesters and the backend shards.
//!
//! ## Lifecycle
//! 1. **Bootstrapping**: collect one registration per expected backend
//!    under a bounded deadline; the shard registry is complete and frozen
//!    before anything else happens.
//! 2. **Awaiting Session**: accept one persistent requester TCP connection
//!    at a time.
//! 3. **Serving**: per request, partition usernames by owner, fan one query
//!    out to each implicated backend concurrently, collect replies under a
//!    deadline, merge the partial results with the interval engine, and
//!    answer with the merged set, the unknown usernames, and any degraded
//!    backends.

pub mod protocol;
pub mod service;
pub mod session;
