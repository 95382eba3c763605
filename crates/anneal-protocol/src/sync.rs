//! Config sync payloads.
//!
//! A request names a config by identifier; the response carries the full
//! serialized snapshot text. Sizes are measured in UTF-16 code units to
//! match length-prefixed string encodings on the wire, and are enforced
//! at construction so an oversized transfer can never be built.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use anneal_core::Config;

/// Largest accepted config identifier, in UTF-16 code units.
pub const MAX_IDENTIFIER_UNITS: usize = 32_767;

/// Largest accepted snapshot payload, in UTF-16 code units.
pub const MAX_PAYLOAD_UNITS: usize = 262_144;

/// Errors constructing sync payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Config identifier exceeds the wire limit.
    #[error("config identifier is {size} units (max {max})")]
    IdentifierTooLarge {
        /// Measured identifier size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Serialized snapshot exceeds the transfer limit.
    #[error("config payload is {size} units (max {max})")]
    PayloadTooLarge {
        /// Measured payload size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },
}

fn utf16_units(text: &str) -> usize {
    text.encode_utf16().count()
}

/// A request for one config's serialized state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequest {
    /// Correlates the answer with the asking session.
    pub session: Uuid,
    /// Identifier of the requested config.
    pub identifier: String,
}

impl ConfigRequest {
    /// Build a request, enforcing the identifier cap.
    pub fn new(session: Uuid, identifier: impl Into<String>) -> Result<Self, ProtocolError> {
        let identifier = identifier.into();
        let size = utf16_units(&identifier);
        if size > MAX_IDENTIFIER_UNITS {
            return Err(ProtocolError::IdentifierTooLarge {
                size,
                max: MAX_IDENTIFIER_UNITS,
            });
        }
        Ok(Self {
            session,
            identifier,
        })
    }
}

/// The full serialized text of a requested config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResponse {
    /// Session the answer belongs to.
    pub session: Uuid,
    /// Snapshot text of the config.
    pub payload: String,
}

impl ConfigResponse {
    /// Build a response, enforcing the payload cap.
    pub fn new(session: Uuid, payload: impl Into<String>) -> Result<Self, ProtocolError> {
        let payload = payload.into();
        let size = utf16_units(&payload);
        if size > MAX_PAYLOAD_UNITS {
            return Err(ProtocolError::PayloadTooLarge {
                size,
                max: MAX_PAYLOAD_UNITS,
            });
        }
        Ok(Self { session, payload })
    }

    /// Answer a request by snapshotting the matching config.
    pub fn answer(request: &ConfigRequest, config: &Config) -> Result<Self, ProtocolError> {
        Self::new(request.session, config.snapshot())
    }

    /// Apply this response's payload back into a declared config.
    pub fn apply_to(&self, config: &mut Config) {
        config.apply_snapshot(&self.payload);
    }
}
