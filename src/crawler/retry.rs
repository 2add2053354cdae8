use crate::extractor::ExtractorError;
use crate::gateway::GatewayError;
use std::io::ErrorKind;

/// What to do with a failed gateway or extractor call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Host or network condition expected to clear: wait and try again
    /// within the same task. Retries are unbounded; the task holds its
    /// delivery the whole time.
    Retry,

    /// No point retrying: return the error and let the task fail
    Permanent,

    /// The hash itself is unprocessable: record it as invalid in the index
    /// before failing, so redeliveries short-circuit
    Poison,
}

/// Classifies a gateway error
pub fn classify_gateway(error: &GatewayError) -> Disposition {
    match error {
        GatewayError::Protocol(_) => Disposition::Poison,
        GatewayError::Status { .. } => Disposition::Permanent,
        GatewayError::Http(e) => classify_transport(e),
    }
}

/// Classifies an extractor error
pub fn classify_extractor(error: &ExtractorError) -> Disposition {
    match error {
        ExtractorError::Status { .. } => Disposition::Permanent,
        ExtractorError::Decode(_) => Disposition::Permanent,
        ExtractorError::Http(e) => classify_transport(e),
    }
}

/// Classifies a transport-level HTTP error
///
/// Timeouts are permanent for the task: the gateway timeout is already
/// minutes long, and a hash that slow is better left to redelivery.
/// Refused and dropped connections mean the host is restarting or
/// unreachable, a condition worth waiting out in place.
pub fn classify_transport(error: &reqwest::Error) -> Disposition {
    if error.is_timeout() {
        return Disposition::Permanent;
    }

    if error.is_connect() {
        return Disposition::Retry;
    }

    match io_error_kind(error) {
        Some(
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected,
        ) => Disposition::Retry,
        _ => Disposition::Permanent,
    }
}

/// Walks an error's source chain looking for an underlying IO error
fn io_error_kind(error: &(dyn std::error::Error + 'static)) -> Option<ErrorKind> {
    let mut source = error.source();
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = inner.source();
    }
    None
}
