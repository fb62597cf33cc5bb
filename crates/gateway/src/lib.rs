//! Toolgate gateway: a bearer-token gate in front of a registry of named
//! backend tools, plus a live OpenAPI surface synthesized from the same
//! registry.
//!
//! Request flow for `POST /tool/{name}`:
//! verify credential -> resolve tool -> transform (path + envelope) ->
//! dispatch -> map the classified outcome back to the caller.

pub mod auth;
pub mod contracts;
pub mod server;
