//! # Sample Services
//!
//! Concrete services wrapped with the framework:
//!
//! - [`EchoServer`] - a TCP accept loop, wrapped as a blocking service
//! - [`Ticker`] - a periodic heartbeat, wrapped as a blocking service
//! - [`Announcer`] - a readiness flag with instant start/stop, wrapped with the start/stop adapter

pub mod announcer;
pub mod echo;
pub mod ticker;

pub use announcer::Announcer;
pub use echo::EchoServer;
pub use ticker::Ticker;
