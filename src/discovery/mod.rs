//! LAN discovery over UDP.
//!
//! Clients that don't know the server's address broadcast a probe on a
//! well-known port; the responder answers with the HTTP URL to use.

mod responder;

pub use responder::DiscoveryResponder;
