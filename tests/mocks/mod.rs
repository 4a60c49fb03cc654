//! Centralized mocks and fixtures for integration tests
//!
//! Every server spawned here runs against in-process adapters and a static
//! price feed, so no test touches the network.

pub mod adapters;
pub mod api_fixtures;
pub mod configs;
pub mod feeds;
pub mod test_server;

#[allow(unused_imports)]
pub use api_fixtures::ApiFixtures;
#[allow(unused_imports)]
pub use test_server::TestServer;
