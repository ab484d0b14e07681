//! End-to-end tests for stacks-facilitator.
//!
//! Every test runs the real `HiroClient` and `Facilitator` against a mock
//! Hiro API served over local HTTP.

mod integration_tests;

pub use harness::{sip010_transfer, stx_transfer, MockHiro, MockResponse};
