//! Worker supervisor
//!
//! This module owns the broker connection and the worker pools. The
//! supervisor declares the publish side once, then spawns the configured
//! number of hash and file consumers, each with its own channel and queue
//! subscription. Consumer startups are staggered so a restart does not
//! stampede the gateway.
//!
//! Task errors never stop the supervisor; they are forwarded to an error
//! sink for logging and the task is acked or requeued according to its
//! classification.

mod consumer;
mod supervisor;

pub use consumer::TaskFailure;
pub use supervisor::Worker;
