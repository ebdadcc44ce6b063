//! Shard Registry Module
//!
//! Maps usernames to the backend shard that owns them. The registry is
//! built exactly once, from the registration messages each backend sends at
//! startup, and is effectively immutable for the rest of the coordinator's
//! lifetime: writes happen only during bootstrapping, reads take no
//! registry-wide lock.
//!
//! ## Core Mechanisms
//! - **Registration**: each backend announces its full username list (and,
//!   implicitly, its reply address) in a single datagram.
//! - **Ownership**: every username has exactly one owner; a second backend
//!   claiming an already-owned username is a configuration error, never
//!   last-writer-wins.
//! - **Partitioning**: a request is split into per-backend sublists plus
//!   the set of usernames no backend knows.

pub mod service;
pub mod types;
