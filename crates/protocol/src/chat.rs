use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Immutable snapshot of one text-generation request.
///
/// Composed once when the user asks for a summary or an answer; later filter
/// changes never reach a prompt that is already in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPrompt {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            messages: vec![ChatMessage::user(user)],
        }
    }

    /// System prompt first, then the conversation
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        std::iter::once(ChatMessage::system(self.system.clone()))
            .chain(self.messages.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_leads_the_message_list() {
        let prompt = ChatPrompt::new("be brief", "hello");
        let messages = prompt.to_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1], ChatMessage::user("hello"));

        let raw = serde_json::to_string(&messages[0]).unwrap();
        assert_eq!(raw, r#"{"role":"system","content":"be brief"}"#);
    }
}
