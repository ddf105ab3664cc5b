//! # Ports Layer
//!
//! - **Outbound (Driven)**: key material the authenticator depends on

pub mod outbound;
