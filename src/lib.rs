//! Distributed Availability Lookup Library
//!
//! This library crate defines the core modules of the scheduling cluster.
//! It serves as the foundation for the binary executable (`main.rs`), which
//! runs either role of the system.
//!
//! ## Architecture Modules
//! The system is composed of four loosely coupled subsystems:
//!
//! - **`interval`**: The pure interval engine. Intersects sorted, disjoint
//!   interval sets with a two-pointer sweep, folds N sets into the time
//!   common to all, and speaks the bracketed wire text form.
//! - **`registry`**: The shard registry. Built once from the registration
//!   message each backend sends at startup, it maps every username to its
//!   owning backend and partitions requests accordingly.
//! - **`backend`**: The backend shard service. Owns one partition of the
//!   username availability data, loaded from a file at startup, and answers
//!   coordinator queries with the local fold-intersection.
//! - **`coordinator`**: The coordinator service and requester session loop.
//!   Fans each request out to the implicated backends concurrently, merges
//!   their partial results, and reports usernames no backend knows.
//!
//! ## Data Flow
//! backend (registration) -> coordinator builds the shard registry ->
//! requester request -> coordinator (per-shard query) -> backend
//! (partial result) -> coordinator merge -> requester response.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod interval;
pub mod registry;

// Re-export commonly used types
pub use backend::service::BackendService;
pub use config::{BackendConfig, CoordinatorConfig};
pub use coordinator::service::Coordinator;
pub use error::{Error, Result};
