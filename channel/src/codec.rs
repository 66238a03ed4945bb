//! JSON wire format for calls and responses.
//!
//! ```text
//! call:     { "method": "getICloudDocumentsPath", "arguments": null }
//! success:  { "status": "success", "payload": "/path/to/Documents" }
//! error:    { "status": "error", "payload": { "code": "...", "message": "...", "details": "..." } }
//! missing:  { "status": "not_implemented" }
//! ```

use crate::{MethodCall, MethodResponse};

/// Decode a call from JSON bytes.
///
/// # Errors
/// Returns the serde error if the bytes are not a valid call.
pub fn decode_call(bytes: &[u8]) -> Result<MethodCall, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Encode a call as JSON bytes.
///
/// # Errors
/// Returns the serde error if the arguments cannot be serialized.
pub fn encode_call(call: &MethodCall) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(call)
}

/// Decode a response from JSON bytes.
///
/// # Errors
/// Returns the serde error if the bytes are not a valid response.
pub fn decode_response(bytes: &[u8]) -> Result<MethodResponse, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Encode a response as JSON bytes.
///
/// # Errors
/// Returns the serde error if the payload cannot be serialized.
pub fn encode_response(response: &MethodResponse) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(response)
}
