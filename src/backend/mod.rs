//! Backend Shard Module
//!
//! A backend process owns one disjoint partition of the
//! username-to-availability data. Its lifecycle has three phases:
//!
//! 1. **Loading**: parse the availability file into an immutable local
//!    table.
//! 2. **Registering**: announce the full local username list to the
//!    coordinator in one datagram. A send failure is fatal; the process
//!    cannot usefully run headless.
//! 3. **Serving**: answer coordinator queries by fold-intersecting the
//!    requested, locally-known users. Queries are independent; no state
//!    survives an iteration.

pub mod loader;
pub mod service;

#[cfg(test)]
mod tests;
