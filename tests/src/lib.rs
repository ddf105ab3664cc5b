//! # Digipost Client Test Suite
//!
//! Cross-crate tests that run the real client pipeline (signing, transport,
//! verification, XML codec, delivery state machine) against an in-process
//! fake of the API.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fake_server.rs    # Signing fake of the Digipost API
//! └── integration/
//!     ├── delivery_flow.rs      # create -> add content -> send
//!     ├── response_tampering.rs # forged, altered and replayed responses
//!     ├── certificate_trust.rs  # pinned vs entry-point certificate
//!     └── mock_client.rs        # the in-memory client behind the same trait
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p digipost-tests
//! cargo test -p digipost-tests integration::response_tampering::
//! ```

pub mod fake_server;
pub mod integration;
