//! Protocol constants.

/// JSON field that names the message kind.
pub const MSG_TYPE_FIELD: &str = "msgType";

/// `msgType` of a patch message.
pub const MSG_TYPE_PATCH: &str = "patch";
