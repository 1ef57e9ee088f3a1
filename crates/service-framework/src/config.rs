//! # Service Configuration
//!
//! Settings applied when a [`LifecycleActor`](crate::LifecycleActor) is created.

/// Default capacity of the actor's request queue.
pub const DEFAULT_BUFFER_SIZE: usize = 32;

/// Configuration for a single blocking service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Name attached to every log line emitted for this service.
    pub name: String,
    /// Capacity of the request queue. Callers wait for space once it is full.
    /// A value of zero is treated as one.
    pub buffer_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "service".to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ServiceConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
