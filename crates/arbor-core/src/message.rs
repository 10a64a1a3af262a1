//! Message types for the conversation tree.
//!
//! The collection arrives pre-fetched and pre-validated from the host's
//! session data source; these types are the boundary contract. A message
//! has at most one parent, and `parent_id` referencing a message outside
//! the collection is repaired during indexing, not here.

use serde::{Deserialize, Serialize};

/// Stable identifier for a message. Supplied by the host.
pub type MessageId = String;

/// Role in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    Tool,
    System,
}

/// A tool invocation carried by an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
}

/// Aggregate cost and token usage reported for one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub cost_usd: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<MessageId>,
    /// Unix seconds.
    pub created_at: u64,
    /// Auxiliary/tool flow rather than the main conversation.
    #[serde(default)]
    pub sidechain: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    pub data: MessageData,
}

/// Role-specific message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum MessageData {
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolUse>,
    },
    Tool {
        tool_use_id: String,
        output: String,
    },
    System {
        content: String,
    },
}

impl Message {
    pub fn role(&self) -> Role {
        match &self.data {
            MessageData::User { .. } => Role::User,
            MessageData::Assistant { .. } => Role::Assistant,
            MessageData::Tool { .. } => Role::Tool,
            MessageData::System { .. } => Role::System,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Character count of the displayable content. Drives the coarse
    /// extent buckets in `arbor-view`.
    pub fn content_len(&self) -> usize {
        match &self.data {
            MessageData::User { content }
            | MessageData::Assistant { content, .. }
            | MessageData::System { content } => content.chars().count(),
            MessageData::Tool { output, .. } => output.chars().count(),
        }
    }

    /// Whether this message carries tool activity (a tool result, or an
    /// assistant turn with tool calls attached).
    pub fn bears_tool(&self) -> bool {
        match &self.data {
            MessageData::Tool { .. } => true,
            MessageData::Assistant { tool_calls, .. } => !tool_calls.is_empty(),
            MessageData::User { .. } | MessageData::System { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant(id: &str, content: &str, tool_calls: Vec<ToolUse>) -> Message {
        Message {
            id: id.to_string(),
            parent_id: None,
            created_at: 1000,
            sidechain: false,
            usage: None,
            data: MessageData::Assistant {
                content: content.to_string(),
                tool_calls,
            },
        }
    }

    #[test]
    fn bears_tool_requires_tool_activity() {
        let plain = assistant("a1", "hello", vec![]);
        assert!(!plain.bears_tool());

        let with_call = assistant(
            "a2",
            "running",
            vec![ToolUse {
                id: "call_1".to_string(),
                name: "bash".to_string(),
                input: serde_json::json!({"command": "ls"}),
            }],
        );
        assert!(with_call.bears_tool());

        let result = Message {
            id: "t1".to_string(),
            parent_id: Some("a2".to_string()),
            created_at: 1001,
            sidechain: false,
            usage: None,
            data: MessageData::Tool {
                tool_use_id: "call_1".to_string(),
                output: "ok".to_string(),
            },
        };
        assert!(result.bears_tool());
    }

    #[test]
    fn content_len_counts_chars_not_bytes() {
        let msg = assistant("a1", "héllo", vec![]);
        assert_eq!(msg.content_len(), 5);
    }

    #[test]
    fn message_round_trips_through_serde_with_role_tag() {
        let msg = assistant("a1", "hi", vec![]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["data"]["role"], "assistant");
        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }
}
