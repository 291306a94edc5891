mod codec;
mod types;

pub use codec::{decode_latin1, encode_latin1, to_string_mapping};
pub use types::*;
