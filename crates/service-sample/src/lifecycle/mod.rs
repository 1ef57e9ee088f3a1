//! # System Lifecycle & Orchestration
//!
//! Wires the sample services into one [`ServiceGroup`](service_framework::ServiceGroup) and drives it.
//!
//! ## Start Order
//!
//! Members start in list order and roll back on failure:
//!
//! 1. **ticker** - heartbeat, no dependencies
//! 2. **echo** - the TCP server
//! 3. **announcer** - flips readiness once everything before it is up
//!
//! If the echo server failed to start, the ticker would be stopped again and
//! the announcer would never report ready.
//!
//! ## Shutdown
//!
//! [`AppSystem::wait`] returns once every member has finished. The first
//! member to finish, or an explicit [`AppSystem::shutdown`], stops the rest.

pub mod app_system;

pub use app_system::*;
