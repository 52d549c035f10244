//! HTTP adapters used by the prober and the SLA calculator.
//!
//! Each module exposes a concrete client while the seams the processes
//! depend on are the traits defined in [`traits`].

#![warn(missing_docs, clippy::pedantic)]

pub mod oncall;
pub mod sage;
pub mod traits;

mod http_client;
