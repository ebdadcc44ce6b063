//! Interval Engine
//!
//! Pure function library for time-availability math. No I/O: both the
//! coordinator (merging partial results) and the backends (intersecting
//! their local users) consume the same engine.
//!
//! ## Core Concepts
//! - **Interval**: a contiguous `[start, end)` block of time in arbitrary
//!   integer units, non-degenerate (`start < end`).
//! - **IntervalSet**: sorted, pairwise-disjoint intervals for one owner.
//!   The invariant holds by construction, never by a validation pass.
//! - **Fold-intersection**: repeated pairwise intersection across N sets to
//!   find the time common to all of them.
//! - **Wire text**: the canonical `[9,12] [14,18]` form (empty set: `[]`)
//!   used in shard replies and requester responses.

pub mod engine;
pub mod types;
