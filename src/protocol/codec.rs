//! JSON encoding and decoding of patch messages.

use super::constants::{MSG_TYPE_FIELD, MSG_TYPE_PATCH};
use crate::error::{Result, SyncError};
use crate::types::PatchMessage;
use serde_json::Value;

/// Encode a patch message as a compact JSON string.
///
/// # Examples
///
/// ```
/// use diffsync::protocol::encode_message;
/// use diffsync::{diff::DiffSet, Edit, PatchMessage};
///
/// let edit = Edit::seeded(0, DiffSet::default());
/// let msg = PatchMessage::new("d1", "c1", vec![edit]);
/// assert_eq!(
///     encode_message(&msg).unwrap(),
///     r#"{"msgType":"patch","id":"d1","clientId":"c1","edits":[{"clientVersion":-1,"serverVersion":0,"checksum":"","diffs":[]}]}"#
/// );
/// ```
pub fn encode_message(msg: &PatchMessage) -> Result<String> {
    Ok(serde_json::to_string(msg)?)
}

/// Encode a patch message as a JSON value.
pub fn encode_value(msg: &PatchMessage) -> Result<Value> {
    Ok(serde_json::to_value(msg)?)
}

/// Decode a patch message from a JSON string.
///
/// # Errors
///
/// - [`SyncError::Json`] if the input is not valid JSON or misses required fields
/// - [`SyncError::InvalidMessage`] if `msgType` is absent or not `"patch"`
///
/// # Examples
///
/// ```
/// use diffsync::protocol::decode_message;
///
/// let msg = decode_message(r#"{"msgType":"patch","id":"d1","clientId":"c1","edits":[]}"#).unwrap();
/// assert_eq!(msg.id, "d1");
///
/// assert!(decode_message(r#"{"msgType":"join","id":"d1"}"#).is_err());
/// ```
pub fn decode_message(input: &str) -> Result<PatchMessage> {
    let value: Value = serde_json::from_str(input)?;
    decode_value(value)
}

/// Decode a patch message from a JSON value.
///
/// # Errors
///
/// Same as [`decode_message`].
pub fn decode_value(value: Value) -> Result<PatchMessage> {
    let msg_type = value
        .get(MSG_TYPE_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| SyncError::InvalidMessage(format!("missing '{}'", MSG_TYPE_FIELD)))?;

    if msg_type != MSG_TYPE_PATCH {
        return Err(SyncError::InvalidMessage(format!(
            "unsupported {} '{}'",
            MSG_TYPE_FIELD,
            msg_type
        )));
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffSet;
    use crate::types::Edit;
    use serde_json::json;

    #[test]
    fn test_encode_field_order() {
        let edit = Edit {
            client_version: 2,
            server_version: 5,
            checksum: String::new(),
            diffs: DiffSet::new(vec![json!({"op": "replace", "path": "/text", "value": "Hi"})]),
        };
        let msg = PatchMessage::new("d1", "c1", vec![edit]);
        assert_eq!(
            encode_message(&msg).unwrap(),
            r#"{"msgType":"patch","id":"d1","clientId":"c1","edits":[{"clientVersion":2,"serverVersion":5,"checksum":"","diffs":[{"op":"replace","path":"/text","value":"Hi"}]}]}"#
        );
    }

    #[test]
    fn test_decode_foreign_message() {
        let input = r#"{
            "msgType": "patch",
            "id": "doc-7",
            "clientId": "browser",
            "edits": [
                {"clientVersion": -1, "serverVersion": 0, "checksum": "", "diffs": []},
                {"clientVersion": 0, "serverVersion": 0, "checksum": "", "diffs": [{"op": "remove", "path": "/a"}]}
            ]
        }"#;
        let msg = decode_message(input).unwrap();
        assert_eq!(msg.id, "doc-7");
        assert_eq!(msg.client_id, "browser");
        assert!(msg.edits[0].is_seeded());
        assert_eq!(msg.edits[1].diffs.len(), 1);
    }

    #[test]
    fn test_decode_missing_checksum_defaults() {
        let input = r#"{"msgType":"patch","id":"d1","clientId":"c1","edits":[{"clientVersion":0,"serverVersion":0,"diffs":[]}]}"#;
        let msg = decode_message(input).unwrap();
        assert!(msg.edits[0].checksum.is_empty());
    }

    #[test]
    fn test_decode_wrong_type() {
        let err = decode_message(r#"{"msgType":"ack","id":"d1"}"#).unwrap_err();
        assert!(matches!(err, SyncError::InvalidMessage(_)));

        let err = decode_message(r#"{"id":"d1"}"#).unwrap_err();
        assert!(matches!(err, SyncError::InvalidMessage(_)));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(decode_message("{"), Err(SyncError::Json(_))));
        assert!(matches!(
            decode_message(r#"{"msgType":"patch","id":"d1"}"#),
            Err(SyncError::Json(_))
        ));
    }

    #[test]
    fn test_encode_value() {
        let msg = PatchMessage::new("d1", "c1", Vec::new());
        let value = encode_value(&msg).unwrap();
        assert_eq!(value[MSG_TYPE_FIELD], MSG_TYPE_PATCH);
        assert_eq!(decode_value(value).unwrap(), msg);
    }
}
