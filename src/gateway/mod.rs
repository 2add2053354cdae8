//! IPFS API gateway client
//!
//! This module resolves content hashes through an IPFS node's HTTP API:
//! listing a hash to learn its type, size, and links, and fetching raw
//! bytes under a content path. Listing never recurses; directory fan-out
//! is the crawl engine's job.

mod client;
mod types;

pub use client::Client;
pub use types::{Link, Listing};

use thiserror::Error;

/// Errors that can occur talking to the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The node answered with something that is not a valid listing.
    /// Retrying cannot help; the engine poisons the hash.
    #[error("Gateway protocol error: {0}")]
    Protocol(String),

    #[error("Gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gateway transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
