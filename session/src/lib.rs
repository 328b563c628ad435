//! Per-channel game sessions.
//!
//! A [`SessionRegistry`] binds at most one live [`Session`] to each channel id. Every session serializes the
//! mutations of its own game while different channels never wait on each other. [`ChannelService`] puts the
//! dispatcher-facing operations on top and reports the [`Notice`](chansweep_protocol::Notice)s to broadcast.

pub use error::*;
pub use registry::*;
pub use service::*;
pub use session::*;

mod error;
mod registry;
mod service;
mod session;
