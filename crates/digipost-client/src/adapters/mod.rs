//! Adapters: reqwest transport and the in-memory mock client.

pub mod mock;
pub mod reqwest_transport;
