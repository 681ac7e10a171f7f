//! Decoding of desired state from raw configuration bytes.

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Turns raw configuration bytes into desired entities.
pub trait Decoder<E>: Send + Sync {
    /// Decodes the full desired collection. Any error aborts the run.
    fn decode(&self, raw: &[u8]) -> Result<Vec<E>, DecodeError>;
}

/// Decodes a YAML sequence of entities.
///
/// A blank document or an explicit `null` yields an empty collection, which
/// asks for every unprotected remote entity to be removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDecoder;

impl<E: DeserializeOwned> Decoder<E> for YamlDecoder {
    fn decode(&self, raw: &[u8]) -> Result<Vec<E>, DecodeError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let entries: Option<Vec<E>> = serde_yaml::from_slice(raw)?;
        Ok(entries.unwrap_or_default())
    }
}
