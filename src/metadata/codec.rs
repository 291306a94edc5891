use super::types::{MetadataMap, RawMetadata};
use log::trace;

/// Decode bytes as ISO-8859-1. Every byte maps to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode a string as ISO-8859-1.
///
/// Returns `None` if the string holds a character above U+00FF, which has no
/// single-byte representation.
pub fn encode_latin1(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(c).ok()).collect()
}

/// Convert the demuxer's raw pairs into a string map.
///
/// Absent input yields an empty map. Later entries overwrite earlier ones
/// with the same decoded key.
pub fn to_string_mapping(raw: Option<RawMetadata>) -> MetadataMap {
    let Some(raw) = raw else {
        return MetadataMap::new();
    };

    let mut map = MetadataMap::with_capacity(raw.len());
    for (key, value) in raw {
        let key = decode_latin1(&key);
        let value = decode_latin1(&value);
        trace!("metadata {}: {}", key, value);
        map.insert(key, value);
    }
    map
}
