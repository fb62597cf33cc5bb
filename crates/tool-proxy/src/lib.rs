//! Tool proxy pipeline for the Toolgate gateway.
//!
//! This crate contains the transport-independent core: the tool registry
//! (loaded once, shared read-only), the inbound-to-backend envelope
//! transform, the outbound dispatcher with outcome classification, and the
//! descriptor synthesizer.
//!
//! It intentionally contains **no** HTTP server surface and **no**
//! credential handling; the `toolgate-gateway` binary wires those around it.

pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod transform;
