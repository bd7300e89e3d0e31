use serde::{Deserialize, Deserializer};

/// Reads a patch field that tells "absent" apart from "null".
///
/// Pair with `#[serde(default, deserialize_with = "nullable")]`: a missing
/// field stays `None`, an explicit `null` becomes `Some(None)` and clears the
/// column.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
