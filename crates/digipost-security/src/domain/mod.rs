//! # Domain Layer
//!
//! Pure signing-protocol logic: canonical strings, digests, errors.

pub mod canonical;
pub mod digest;
pub mod entities;
pub mod errors;
pub mod provider;
