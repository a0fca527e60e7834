//! Relay that tracks the Handshake chain height and fans it out in real time.
//!
//! The flow is: hsd node → [`net`] adapter → [`store`] height cell →
//! [`relay`] broadcast → subscribed clients. The store holds exactly one
//! value (the latest height); subscribers that fall behind skip straight to
//! the newest value rather than replaying history.

pub mod api;
pub mod config;
pub mod net;
pub mod relay;
pub mod store;

/// Number of confirmed blocks on the tracked chain.
pub type Height = u32;
