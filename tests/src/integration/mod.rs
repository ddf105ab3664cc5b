//! End-to-end flows against [`FakeDigipost`](crate::fake_server::FakeDigipost).

mod certificate_trust;
mod delivery_flow;
mod mock_client;
mod response_tampering;
