//! Host update loop.
//!
//! Stands in for an application that owns the router: producers submit
//! records concurrently while the host drains one bounded batch per tick.

mod driver;
mod stats;

pub use driver::{Host, HostConfig};
