//! # Anneal Protocol
//!
//! Shared payload types for syncing configs across a transport. The
//! transport itself (framing, permissions, delivery) is someone else's
//! job: these types only pin down the request/response shapes and the
//! size caps a well-behaved peer must respect.

mod sync;

pub use sync::{
    ConfigRequest, ConfigResponse, ProtocolError, MAX_IDENTIFIER_UNITS, MAX_PAYLOAD_UNITS,
};
