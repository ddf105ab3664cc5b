//! Ports layer: the client API and the services it drives.

pub mod inbound;
pub mod outbound;
