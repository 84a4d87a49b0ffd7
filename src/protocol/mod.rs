//! Wire protocol for patch messages.
//!
//! Peers exchange [`PatchMessage`](crate::types::PatchMessage)s as JSON objects.
//! Field order is fixed so encoded messages are byte-for-byte reproducible:
//!
//! | Field | Type | Notes |
//! |-------|------|-------|
//! | `msgType` | string | always `"patch"` |
//! | `id` | string | document id |
//! | `clientId` | string | sender's client id |
//! | `edits` | array | oldest pending first, newest last |
//!
//! Each edit is `{"clientVersion", "serverVersion", "checksum", "diffs"}`. A
//! `clientVersion` of `-1` marks a seeded edit. `checksum` is always empty and
//! carries no integrity guarantee.
//!
//! # Examples
//!
//! ```
//! use diffsync::protocol::{decode_message, encode_message};
//! use diffsync::PatchMessage;
//!
//! let msg = PatchMessage::new("d1", "c1", Vec::new());
//! let wire = encode_message(&msg).unwrap();
//! assert_eq!(wire, r#"{"msgType":"patch","id":"d1","clientId":"c1","edits":[]}"#);
//! assert_eq!(decode_message(&wire).unwrap(), msg);
//! ```

mod codec;
pub mod constants;

pub use codec::{decode_message, decode_value, encode_message, encode_value};
