//! Serialized form of the cart.
//!
//! The slot holds a versioned envelope:
//!
//! ```json
//! {"state":{"items":[{"product":{...},"quantity":2}]},"version":0}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tienda_core::CartState;

/// Envelope version written by this build.
pub const VERSION: u32 = 0;

/// Errors decoding a persisted cart.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The slot does not contain a valid envelope.
    #[error("Malformed cart data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The slot was written by a newer build.
    #[error("Unsupported cart data version {found} (supported: {VERSION})")]
    UnsupportedVersion { found: u32 },
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a CartState,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: CartState,
    #[serde(default)]
    version: u32,
}

/// Serialize a cart into its envelope.
///
/// # Errors
///
/// Returns an error if a product snapshot cannot be serialized.
pub fn encode(state: &CartState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EnvelopeRef {
        state,
        version: VERSION,
    })
}

/// Decode an envelope, restoring the one-item-per-product invariant.
///
/// # Errors
///
/// Returns an error if the data is malformed or from a newer version.
pub fn decode(raw: &str) -> Result<CartState, PersistError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.version > VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: envelope.version,
        });
    }
    Ok(CartState::from_items(envelope.state.into_items()))
}
