//! Integration tests
//!
//! Each module drives the public API against wiremock backends.

mod gateway_tests;
mod operation_tests;
