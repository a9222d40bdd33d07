//! Client module for talking to the extraction API
//!
//! This module contains:
//! - HTTP client construction (pass-through and API flavours)
//! - The typed API client used by the orchestrator and the poller
//! - Upstream error message classification

mod api;
pub mod classify;
mod transport;

pub use api::{ApiClient, CrawlStatusResponse, GatewayInfo, Submission};
pub use classify::{describe_upstream_error, RequestContext};
pub use transport::{bearer, build_api_client, build_passthrough_client, describe_transport_error};
