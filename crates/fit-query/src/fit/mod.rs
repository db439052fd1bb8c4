//! FIT activity files: discovery, fingerprinting and decoding

pub mod collect;
pub mod decode;
pub mod hash;

pub use collect::{collect_activity_files, collect_files, is_activity_file, ACTIVITY_EXTENSIONS};
pub use decode::{
    decode_file, record_from_messages, semicircles_to_degrees, FieldValue, Message, MessageKind,
};
pub use hash::{fingerprint, fingerprint_file};
