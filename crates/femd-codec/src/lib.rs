//! Codec for the tagged 16-bit word stream carried inside a Feminos frame:
//! parsing, classification, and the event envelope used by the event
//! builder.

pub mod classify;
pub mod error;
pub mod event;
pub mod frame;
pub mod item;
pub mod prefix;
pub mod vflags;

pub use error::{CodecError, Result};
pub use event::{extract_envelope, timestamps_match_within_tolerance, EventEnvelope};
pub use frame::{parse as parse_frame, Frame};
pub use item::{decode_word, encode_word, Word};
pub use vflags::VerboseFlags;
