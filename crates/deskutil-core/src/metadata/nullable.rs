//! Lenient field decoding for documents written by other tools.

use serde::{Deserialize, Deserializer};

/// Deserialize a field, reading an explicit `null` as the type's default.
///
/// Pair with `#[serde(default)]` so an absent key behaves the same way.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
