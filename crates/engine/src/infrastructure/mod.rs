//! Infrastructure: ports, adapters and configuration.

pub mod clock;
pub mod config;
pub mod memory;
pub mod ports;
