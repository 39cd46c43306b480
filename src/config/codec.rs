//! JSON codec for configuration values
//!
//! Decoding overlays the document onto the live value: members present in
//! the file replace the current ones, members absent from the file keep
//! their current value. Nested objects merge recursively, arrays and scalars
//! are replaced. Fields the type doesn't serialize (`#[serde(skip)]`) can't
//! take part in the overlay and come back as their `Default`.

use serde_json::Value;
use std::path::Path;

use super::Config;
use crate::error::{BootError, Result};

/// Apply defaults, then serialize with two-space indentation
pub fn encode<C: Config>(config: &mut C) -> Result<Vec<u8>> {
    config.set_defaults();
    let mut bytes = serde_json::to_vec_pretty(config).map_err(BootError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse `bytes` read from `path` and overlay the result onto `config`
///
/// Document errors are `MalformedConfig`; a live value that can't be
/// serialized is `Encode`. On error `config` is left untouched.
pub fn decode_into<C: Config>(config: &mut C, bytes: &[u8], path: &Path) -> Result<()> {
    let malformed = |source| BootError::MalformedConfig {
        path: path.to_path_buf(),
        source,
    };

    let incoming: Value = serde_json::from_slice(bytes).map_err(malformed)?;
    let mut current = serde_json::to_value(&*config).map_err(BootError::Encode)?;
    merge(&mut current, incoming);
    *config = serde_json::from_value(current).map_err(malformed)?;
    Ok(())
}

fn merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match target.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}
