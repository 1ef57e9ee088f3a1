//! # Observability & Tracing
//!
//! Every actor logs through `tracing` with a `service` field, so one filter
//! shows the full lifecycle of a single service:
//!
//! ```text
//! INFO Actor started service=http
//! INFO Started service=http
//! INFO First member finished, stopping group
//! INFO Stopped service=http
//! INFO Shutdown service=http state=stopped
//! ```
//!
//! Rejected requests (`InvalidStart`, `InvalidStop`, `InvalidWait`) are logged
//! at `warn`; every request the actor receives is logged at `debug`.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=service_framework=debug cargo run
//! ```

/// Initializes a compact `tracing` subscriber filtered by `RUST_LOG`.
///
/// Call once at the start of a binary; it panics if a global subscriber is
/// already installed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
