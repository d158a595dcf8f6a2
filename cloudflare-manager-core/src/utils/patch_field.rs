//! Three-state fields for partial updates.
//!
//! Used as `#[serde(default, deserialize_with = "crate::utils::patch_field::deserialize")]`
//! on an `Option<Option<T>>`: an absent key stays `None` (keep the current value),
//! an explicit `null` becomes `Some(None)` (clear it) and a value becomes `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
