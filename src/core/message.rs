use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Shown as an assistant message whenever a chat request fails.
pub const ERROR_REPLY_TEXT: &str = "Error: Unable to get response.";

/// One transcript entry, wire-compatible with the backend's
/// `{"role": ..., "content": ...}` payloads.
///
/// Roles are kept as strings: the backend is free to reply with roles this
/// client does not know about, and those still render (with default styling)
/// rather than being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ROLE_USER, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ROLE_ASSISTANT, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == ROLE_USER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_roles() {
        assert!(Message::user("hi").is_user());
        assert_eq!(Message::assistant("hi").role, ROLE_ASSISTANT);
    }

    #[test]
    fn serializes_to_wire_shape() {
        let json = serde_json::to_string(&Message::user("hello")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }

    #[test]
    fn unknown_roles_survive_deserialization() {
        let msg: Message = serde_json::from_str(r#"{"role":"tool","content":"x"}"#).unwrap();
        assert_eq!(msg.role, "tool");
        assert!(!msg.is_user());
    }
}
