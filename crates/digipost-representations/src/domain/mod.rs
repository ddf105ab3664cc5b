//! # Domain Layer
//!
//! Immutable value objects of the Digipost v7 API, each with its XML content
//! model.

pub mod delivery;
pub mod document;
pub mod entry_point;
pub mod errors;
pub mod events;
pub mod identification;
pub mod inbox;
pub mod link;
pub mod message;
pub mod print;
pub mod recipient;
pub mod search;
pub mod sender;
pub mod status;
